//! Global Simulation Constants.
//!
//! This module defines constants shared by the loader, the flash model, and the
//! reference circuit. It includes:
//! 1. **Flash Geometry:** Capacity, page and sector sizes, address width.
//! 2. **Erased State:** The deterministic value of flash bytes never written.
//! 3. **SPI Opcodes:** Command bytes understood by the flash model.
//! 4. **Boot Layout:** Default firmware path and load offset.

/// Default flash capacity in bytes (16 MiB, the full 24-bit address space).
pub const FLASH_CAPACITY: usize = 16 * 1024 * 1024;

/// Mask applied to 24-bit SPI addresses.
pub const FLASH_ADDR_MASK: u32 = 0x00FF_FFFF;

/// Program page size in bytes; page programs wrap within a page.
pub const FLASH_PAGE_SIZE: usize = 256;

/// Erase sector size in bytes (4 KiB).
pub const FLASH_SECTOR_SIZE: usize = 4096;

/// Value of an erased NOR flash byte.
///
/// Every flash byte outside a loaded image holds this value, so firmware that
/// probes past the end of its image reads `0xFF` deterministically.
pub const FLASH_ERASED: u8 = 0xFF;

/// JEDEC identification bytes returned by `READ ID`, repeating.
pub const FLASH_JEDEC_ID: [u8; 4] = [0xCA, 0x7C, 0xA7, 0xFF];

/// Default byte offset of the firmware image within flash.
pub const DEFAULT_LOAD_OFFSET: u64 = 0x0010_0000;

/// Default firmware image path, relative to the working directory.
pub const DEFAULT_IMAGE_PATH: &str = "../../vex-soc/software/bios.bin";

/// Name of the embedded flash cell inside the circuit model.
pub const FLASH_CELL: &str = "flash";

/// SPI flash command opcodes.
pub mod spi {
    /// Page program (3 address bytes, then data).
    pub const PAGE_PROGRAM: u8 = 0x02;
    /// Single-bit read (3 address bytes, then data).
    pub const READ: u8 = 0x03;
    /// Clear the write-enable latch.
    pub const WRITE_DISABLE: u8 = 0x04;
    /// Read status register 1.
    pub const READ_STATUS: u8 = 0x05;
    /// Set the write-enable latch.
    pub const WRITE_ENABLE: u8 = 0x06;
    /// 4 KiB sector erase (3 address bytes, executes on deselect).
    pub const SECTOR_ERASE: u8 = 0x20;
    /// JEDEC identification.
    pub const READ_ID: u8 = 0x9F;
    /// Release from deep power-down.
    pub const POWER_UP: u8 = 0xAB;
    /// Quad I/O read (address, mode and dummy bytes on four lines).
    pub const QUAD_READ: u8 = 0xEB;

    /// Status register: write in progress. Always clear in the model.
    pub const STATUS_WIP: u8 = 1 << 0;
    /// Status register: write-enable latch.
    pub const STATUS_WEL: u8 = 1 << 1;
}
