//! Common types and constants shared across the simulation driver.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Constants:** Flash geometry, erased value, SPI opcodes, boot layout.
//! 2. **Error Handling:** Load, simulation, and configuration error types.

/// Flash geometry, SPI opcodes, and boot layout constants.
pub mod constants;

/// Error types for loading, sequencing, and configuration.
pub mod error;

pub use error::{ConfigError, LoadError, SimError};
