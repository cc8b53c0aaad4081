//! Host-side driver for cycle-accurate SoC simulations.
//!
//! This crate boots a stepped circuit model from a firmware image in SPI flash:
//! 1. **Loader:** Reads a binary image and places it in the flash model at an offset.
//! 2. **Sequencer:** Drives `clk`/`rst` through settle, reset, release, and free run.
//! 3. **SoC:** The circuit capability trait, an SPI NOR flash model, and a reference
//!    boot circuit.
//! 4. **Configuration:** Image path, load offset, flash geometry, and run length.

/// Common constants and error types.
pub mod common;
/// Driver configuration (defaults, JSON loading, offset parsing).
pub mod config;
/// Loader, sequencer, and simulator.
pub mod sim;
/// Circuit trait, flash model, and reference circuit.
pub mod soc;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Clock/reset sequencer over any circuit model.
pub use crate::sim::{Phase, Sequencer, Simulator};
/// Circuit capability trait, flash model, and reference circuit.
pub use crate::soc::{BootTop, CircuitModel, SpiFlash};
