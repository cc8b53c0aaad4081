//! Simulator: loads the firmware, then hands the circuit to the sequencer.
//!
//! The loader always runs to completion before the first clock edge. If it fails, no
//! sequencer is built and the circuit model is never stepped.

use tracing::info;

use crate::common::SimError;
use crate::common::constants::FLASH_CELL;
use crate::config::Config;
use crate::sim::loader;
use crate::sim::sequencer::Sequencer;
use crate::soc::top::BootTop;
use crate::soc::traits::CircuitModel;
use crate::stats::SimStats;

/// Top-level simulator: a booted circuit model and its sequencer.
#[derive(Debug)]
pub struct Simulator<M: CircuitModel> {
    sequencer: Sequencer<M>,
    image_bytes: usize,
}

impl<M: CircuitModel> Simulator<M> {
    /// Loads `config.image_path` into the model's flash cell at `config.load_offset`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Load`] if the image is missing, unreadable, empty, or too
    /// large, and [`SimError::MissingCell`] if the model has no flash cell. Either way
    /// no `step()` has been made.
    pub fn boot(mut model: M, config: &Config) -> Result<Self, SimError> {
        let image_bytes = loader::load_into(
            &mut model,
            FLASH_CELL,
            &config.image_path,
            config.load_offset,
        )?;
        Ok(Self {
            sequencer: Sequencer::new(model),
            image_bytes,
        })
    }

    /// Runs startup and free-runs for `max_ticks` ticks, or forever with `None`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the circuit model.
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<u64, SimError> {
        let ticks = self.sequencer.run(max_ticks)?;
        info!(
            "stopped after {} free-run ticks ({} steps)",
            ticks,
            self.sequencer.steps()
        );
        Ok(ticks)
    }

    /// Returns the number of image bytes loaded into flash.
    pub const fn image_bytes(&self) -> usize {
        self.image_bytes
    }

    /// Returns the sequencer.
    pub const fn sequencer(&self) -> &Sequencer<M> {
        &self.sequencer
    }

    /// Returns the sequencer mutably.
    pub const fn sequencer_mut(&mut self) -> &mut Sequencer<M> {
        &mut self.sequencer
    }

    /// Returns the run statistics.
    pub const fn stats(&self) -> &SimStats {
        self.sequencer.stats()
    }
}

impl Simulator<BootTop> {
    /// Builds the reference circuit described by `config` and boots it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails [`Config::validate`], otherwise
    /// as [`boot`](Self::boot).
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        Self::boot(BootTop::from_config(config), config)
    }
}
