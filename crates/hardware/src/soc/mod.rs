//! System-on-Chip (SoC) Models.
//!
//! This module organizes the simulated hardware the driver talks to: the capability
//! trait every circuit model implements, the SPI flash model, and the reference
//! boot circuit.

/// SPI NOR flash behavioral model.
pub mod flash;

/// Reference boot circuit (registered reset plus SPI boot fetcher).
pub mod top;

/// Circuit model capability trait and port names.
pub mod traits;

pub use flash::SpiFlash;
pub use top::BootTop;
pub use traits::CircuitModel;
