//! Simulation driving and program loading.
//!
//! Provides the firmware loader, the clock/reset sequencer, and the simulator that
//! runs one after the other.

pub mod loader;
pub mod sequencer;
pub mod simulator;

pub use sequencer::{FreeRun, Phase, Sequencer};
pub use simulator::Simulator;
