//! Configuration for the simulation driver.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline image path, load offset, and flash geometry.
//! 2. **Structures:** Top-level image options plus flash and run sections.
//! 3. **Parsing:** JSON loading and load-offset string parsing for the CLI.
//!
//! Configuration is supplied as JSON (`--config`) or use `Config::default()` for the CLI.
//! Every field is optional in JSON; missing fields take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::ConfigError;
use crate::common::constants;

/// Default configuration constants for the driver.
mod defaults {
    use crate::common::constants;

    /// Firmware image path when none is configured.
    pub const IMAGE_PATH: &str = constants::DEFAULT_IMAGE_PATH;

    /// Byte offset of the image within flash (1 MiB).
    ///
    /// Leaves the low megabyte free for a bitstream or bootloader.
    pub const LOAD_OFFSET: u64 = constants::DEFAULT_LOAD_OFFSET;

    /// Flash capacity in bytes (16 MiB).
    pub const FLASH_CAPACITY: usize = constants::FLASH_CAPACITY;

    /// Value of never-written flash bytes.
    pub const ERASED_VALUE: u8 = constants::FLASH_ERASED;

    /// Bytes the reference boot fetcher reads after reset.
    pub const BOOT_FETCH_LEN: usize = 16;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use socsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.load_offset, 0x0010_0000);
/// assert_eq!(config.flash.erased_value, 0xFF);
/// assert_eq!(config.run.max_ticks, None);
/// ```
///
/// Overriding a subset of fields from JSON:
///
/// ```
/// use socsim_core::config::Config;
///
/// let json = r#"{
///     "image_path": "build/firmware.bin",
///     "load_offset": 0,
///     "run": { "max_ticks": 1000 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.load_offset, 0);
/// assert_eq!(config.run.max_ticks, Some(1000));
/// assert_eq!(config.flash.capacity, 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Firmware image to load into flash
    #[serde(default = "Config::default_image_path")]
    pub image_path: PathBuf,

    /// Byte offset in flash where the first image byte lands
    #[serde(default = "Config::default_load_offset")]
    pub load_offset: u64,

    /// Flash model geometry
    #[serde(default)]
    pub flash: FlashConfig,

    /// Run-length and boot fetch options
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Returns the default firmware image path.
    fn default_image_path() -> PathBuf {
        PathBuf::from(defaults::IMAGE_PATH)
    }

    /// Returns the default load offset.
    const fn default_load_offset() -> u64 {
        defaults::LOAD_OFFSET
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields, and any
    /// error [`validate`](Self::validate) reports.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks option values that serde cannot reject on its own.
    ///
    /// Offsets past the end of flash are left to the loader, which reports them
    /// as `ImageTooLarge` together with the image size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] for an empty flash and
    /// [`ConfigError::OffsetNotAddressable`] for a load offset above the 24-bit SPI
    /// address space, which the boot fetcher could only reach wrapped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flash.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.load_offset > u64::from(constants::FLASH_ADDR_MASK) {
            return Err(ConfigError::OffsetNotAddressable(self.load_offset));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: Self::default_image_path(),
            load_offset: defaults::LOAD_OFFSET,
            flash: FlashConfig::default(),
            run: RunConfig::default(),
        }
    }
}

/// Flash model geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashConfig {
    /// Capacity in bytes
    #[serde(default = "FlashConfig::default_capacity")]
    pub capacity: usize,

    /// Fill value for bytes not covered by the image
    #[serde(default = "FlashConfig::default_erased_value")]
    pub erased_value: u8,
}

impl FlashConfig {
    /// Returns the default flash capacity.
    const fn default_capacity() -> usize {
        defaults::FLASH_CAPACITY
    }

    /// Returns the default erased byte value.
    const fn default_erased_value() -> u8 {
        defaults::ERASED_VALUE
    }
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::FLASH_CAPACITY,
            erased_value: defaults::ERASED_VALUE,
        }
    }
}

/// Run-length and reference-circuit options.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Free-run tick budget; `None` runs until the process is killed
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Bytes the reference boot fetcher reads from the image after reset
    #[serde(default = "RunConfig::default_boot_fetch_len")]
    pub boot_fetch_len: usize,
}

impl RunConfig {
    /// Returns the default boot fetch length.
    const fn default_boot_fetch_len() -> usize {
        defaults::BOOT_FETCH_LEN
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: None,
            boot_fetch_len: defaults::BOOT_FETCH_LEN,
        }
    }
}

/// Parses a load offset written as decimal or `0x`-prefixed hex.
///
/// Underscores are accepted as digit separators (`0x0010_0000`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOffset`] if the text is not an unsigned integer.
pub fn parse_offset(text: &str) -> Result<u64, ConfigError> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse::<u64>(),
    };
    parsed.map_err(|_| ConfigError::InvalidOffset(text.to_string()))
}

/// Returns the 24-bit SPI address corresponding to a flash byte offset.
///
/// Bits above 23 are dropped; [`Config::validate`] rejects offsets where that matters.
pub const fn spi_address(offset: u64) -> u32 {
    (offset as u32) & constants::FLASH_ADDR_MASK
}
