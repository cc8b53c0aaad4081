//! Error definitions for the simulation driver.
//!
//! There is no recoverable tier: every error here aborts the run.
//! 1. **Load Errors:** Startup-fatal failures while placing the firmware image.
//! 2. **Simulation Errors:** Runtime-fatal failures surfaced by the circuit model.
//! 3. **Configuration Errors:** Bad config files or option values.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a firmware image into flash.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image path could not be opened.
    #[error("firmware image not found: {}", path.display())]
    SourceNotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying open failure.
        #[source]
        source: io::Error,
    },

    /// The image does not fit in flash at the requested offset.
    #[error(
        "image of {size} bytes at offset {offset:#x} overflows flash capacity of {capacity} bytes"
    )]
    ImageTooLarge {
        /// Image length in bytes.
        size: usize,
        /// Requested load offset.
        offset: u64,
        /// Flash capacity in bytes.
        capacity: usize,
    },

    /// The image could not be read completely.
    #[error("failed reading firmware image {}", path.display())]
    ReadError {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O failure (`UnexpectedEof` for truncated reads).
        #[source]
        source: io::Error,
    },

    /// The image file exists but holds no bytes.
    #[error("firmware image {} is empty", path.display())]
    EmptyImage {
        /// Path that was read.
        path: PathBuf,
    },
}

/// Failure surfaced while driving the circuit model.
#[derive(Debug, Error)]
pub enum SimError {
    /// A port name the circuit model does not expose.
    #[error("circuit has no port named `{0}`")]
    UnknownPort(String),

    /// The circuit model violated one of its own invariants during `step()`.
    #[error("circuit model fault: {0}")]
    ModelFault(String),

    /// A sequencing operation was requested out of order.
    #[error("sequencer is in phase {actual}, expected {expected}")]
    PhaseOrder {
        /// Phase the operation requires.
        expected: &'static str,
        /// Phase the sequencer is actually in.
        actual: &'static str,
    },

    /// The circuit model has no flash cell with this name.
    #[error("circuit has no flash cell named `{0}`")]
    MissingCell(String),

    /// Loading the firmware image failed before simulation began.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The configuration cannot describe a runnable circuit.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {}", path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for [`Config`](crate::config::Config).
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A load offset string that is not a decimal or `0x` hex integer.
    #[error("invalid load offset `{0}`")]
    InvalidOffset(String),

    /// A load offset beyond the 24-bit SPI address space.
    #[error("load offset {0:#x} is not reachable with 24-bit SPI addresses")]
    OffsetNotAddressable(u64),

    /// A flash capacity of zero bytes.
    #[error("flash capacity must be non-zero")]
    ZeroCapacity,
}
