//! Clock/Reset Sequencer.
//!
//! This module drives a circuit model's `clk` and `rst` inputs. It performs:
//! 1. **Settle:** One `step()` with inputs at their model defaults.
//! 2. **Reset assert:** `rst = true`, then one full tick.
//! 3. **Reset release:** `rst = false`, no step.
//! 4. **Free run:** One tick after another, indefinitely.
//!
//! A tick is exactly two evaluations: `clk = false; step()` then `clk = true; step()`.
//! Nothing but `clk` changes between them, and after release nothing but `clk` changes at all.

use std::fmt;

use tracing::{info, trace};

use crate::common::SimError;
use crate::soc::traits::{CLK, CircuitModel, RST};
use crate::stats::SimStats;

/// Sequencer phase, in the order the phases are entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Initial evaluation with default inputs.
    Settle,
    /// Reset asserted for one tick.
    ResetAssert,
    /// Reset deasserted; no edge is taken in this phase.
    ResetRelease,
    /// Steady-state ticking. Never left.
    FreeRun,
}

impl Phase {
    /// Returns the phase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Settle => "Settle",
            Self::ResetAssert => "ResetAssert",
            Self::ResetRelease => "ResetRelease",
            Self::FreeRun => "FreeRun",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns a circuit model and advances it through the startup protocol and free run.
#[derive(Debug)]
pub struct Sequencer<M: CircuitModel> {
    model: M,
    phase: Phase,
    rst: bool,
    stats: SimStats,
}

impl<M: CircuitModel> Sequencer<M> {
    /// Takes ownership of `model`; no input is driven until [`startup`](Self::startup).
    pub fn new(model: M) -> Self {
        Self {
            model,
            phase: Phase::Settle,
            rst: false,
            stats: SimStats::default(),
        }
    }

    /// Returns the current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the number of `step()` calls made so far.
    pub const fn steps(&self) -> u64 {
        self.stats.steps
    }

    /// Returns the number of full ticks made so far, including the reset tick.
    pub const fn ticks(&self) -> u64 {
        self.stats.ticks
    }

    /// Returns the run statistics.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Returns the circuit model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Returns the circuit model mutably, e.g. to probe a flash cell between ticks.
    pub const fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consumes the sequencer and returns the model.
    pub fn into_model(self) -> M {
        self.model
    }

    fn step(&mut self) -> Result<(), SimError> {
        self.model.step()?;
        self.stats.steps += 1;
        Ok(())
    }

    fn set_reset(&mut self, value: bool) -> Result<(), SimError> {
        self.model.set_input(RST, value)?;
        self.rst = value;
        Ok(())
    }

    /// Performs one clock tick: low phase, then rising edge.
    ///
    /// Returns the total tick count.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the model while setting `clk` or stepping.
    pub fn tick(&mut self) -> Result<u64, SimError> {
        self.model.set_input(CLK, false)?;
        self.step()?;
        self.model.set_input(CLK, true)?;
        self.step()?;

        self.stats.ticks += 1;
        if self.rst {
            self.stats.reset_ticks += 1;
        }
        trace!(tick = self.stats.ticks, "tick");
        Ok(self.stats.ticks)
    }

    /// Runs `Settle`, `ResetAssert` and `ResetRelease`, leaving the sequencer in `FreeRun`.
    ///
    /// Exactly three `step()` calls are made. Reset is only ever sequenced once.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PhaseOrder`] on a second call, or any error raised by the model.
    pub fn startup(&mut self) -> Result<(), SimError> {
        if self.phase != Phase::Settle {
            return Err(SimError::PhaseOrder {
                expected: Phase::Settle.name(),
                actual: self.phase.name(),
            });
        }

        self.step()?;

        self.phase = Phase::ResetAssert;
        info!("asserting reset");
        self.set_reset(true)?;
        let _ = self.tick()?;

        self.phase = Phase::ResetRelease;
        self.set_reset(false)?;
        info!("reset released after {} steps", self.stats.steps);

        self.phase = Phase::FreeRun;
        Ok(())
    }

    /// Returns an unbounded iterator that performs one tick per `next()`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PhaseOrder`] before [`startup`](Self::startup) has completed.
    pub fn free_run(&mut self) -> Result<FreeRun<'_, M>, SimError> {
        if self.phase != Phase::FreeRun {
            return Err(SimError::PhaseOrder {
                expected: Phase::FreeRun.name(),
                actual: self.phase.name(),
            });
        }
        Ok(FreeRun { sequencer: self })
    }

    /// Runs startup if needed, then free-runs.
    ///
    /// With `max_ticks == None` this only returns on a model error. With `Some(n)` it
    /// returns after `n` free-run ticks; the budget is checked between ticks, never
    /// between the two edges of one. Returns the number of free-run ticks performed.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the model during startup or free run.
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<u64, SimError> {
        if self.phase == Phase::Settle {
            self.startup()?;
        }
        let start = self.stats.ticks;
        info!("free-running");

        let ticks = self.free_run()?;
        match max_ticks {
            Some(max) => {
                for tick in ticks.take(usize::try_from(max).unwrap_or(usize::MAX)) {
                    let _ = tick?;
                }
            }
            None => {
                for tick in ticks {
                    let _ = tick?;
                }
            }
        }
        Ok(self.stats.ticks - start)
    }
}

/// Unbounded tick iterator returned by [`Sequencer::free_run`].
///
/// Every `next()` performs one tick and yields the running tick count; it never yields
/// `None`.
#[derive(Debug)]
pub struct FreeRun<'a, M: CircuitModel> {
    sequencer: &'a mut Sequencer<M>,
}

impl<M: CircuitModel> Iterator for FreeRun<'_, M> {
    type Item = Result<u64, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sequencer.tick())
    }
}
