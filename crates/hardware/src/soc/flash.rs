//! SPI NOR Flash Behavioral Model.
//!
//! This module implements a serial NOR flash chip as seen from its pins. It provides:
//! 1. **Backing Store:** A fixed-size byte array, erased to `0xFF` unless configured otherwise.
//! 2. **Loading:** Bounds-checked placement of a firmware image at a byte offset.
//! 3. **SPI Decoder:** Command framing sampled on rising `sclk`, data driven on falling `sclk`.
//! 4. **Programming:** Write-enable latch, page program, and sector erase with NOR semantics.
//!
//! The host driver only ever calls [`SpiFlash::load`]; the decoder is exercised by the
//! circuit model that owns the flash cell.

use std::fmt;

use tracing::{debug, trace};

use crate::common::LoadError;
use crate::common::constants::{
    FLASH_ADDR_MASK, FLASH_ERASED, FLASH_JEDEC_ID, FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE, spi,
};

/// SPI flash device state.
pub struct SpiFlash {
    /// Backing store.
    data: Vec<u8>,
    /// Value of erased bytes; also returned for reads past the end of `data`.
    erased: u8,

    /// `sclk` level seen at the previous `step`.
    last_clk: bool,
    /// `csn` level seen at the previous `step`.
    last_csn: bool,

    /// Bits shifted into `curr_byte` so far.
    bit_count: u8,
    /// Bytes completed since the last select.
    byte_count: u32,
    /// Input shift register.
    curr_byte: u8,
    /// Output shift register.
    out_buffer: u8,
    /// Opcode of the current (or last) transaction.
    command: u8,
    /// Address register for read/program/erase.
    addr: u32,
    /// Data lines in use: 1 (single) or 4 (quad).
    data_width: u8,
    /// Value driven on `d_i`, held between falling edges.
    d_i: u8,

    /// Write-enable latch.
    wel: bool,

    /// Rising `sclk` edges seen while selected.
    posedges: u64,
    /// Falling `sclk` edges seen while selected.
    negedges: u64,
}

impl SpiFlash {
    /// Creates an erased (`0xFF`) flash of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::with_fill(capacity, FLASH_ERASED)
    }

    /// Creates a flash of `capacity` bytes with every byte set to `erased`.
    pub fn with_fill(capacity: usize, erased: u8) -> Self {
        Self {
            data: vec![erased; capacity],
            erased,
            last_clk: false,
            last_csn: true,
            bit_count: 0,
            byte_count: 0,
            curr_byte: 0,
            out_buffer: 0,
            command: 0,
            addr: 0,
            data_width: 1,
            d_i: 0,
            wel: false,
            posedges: 0,
            negedges: 0,
        }
    }

    /// Returns the capacity in bytes.
    pub const fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the erased byte value.
    pub const fn erased_value(&self) -> u8 {
        self.erased
    }

    /// Copies `data` into the backing store starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ImageTooLarge`] if `offset + data.len()` exceeds the
    /// capacity; in that case nothing is written.
    pub fn load(&mut self, data: &[u8], offset: u64) -> Result<(), LoadError> {
        let capacity = self.data.len();
        let too_large = || LoadError::ImageTooLarge {
            size: data.len(),
            offset,
            capacity,
        };
        let start = usize::try_from(offset).map_err(|_| too_large())?;
        let end = start.checked_add(data.len()).ok_or_else(too_large)?;
        let dst = self.data.get_mut(start..end).ok_or_else(too_large)?;
        dst.copy_from_slice(data);
        Ok(())
    }

    /// Returns `len` bytes of the backing store starting at `offset`, if in range.
    pub fn read(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    /// Returns the whole backing store.
    pub const fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Returns the opcode of the current or most recent transaction.
    pub const fn command(&self) -> u8 {
        self.command
    }

    /// Returns whether the write-enable latch is set.
    pub const fn write_enabled(&self) -> bool {
        self.wel
    }

    /// Returns the value currently driven on the data-in lines.
    pub const fn output(&self) -> u8 {
        self.d_i
    }

    /// Returns the number of rising `sclk` edges seen while selected.
    pub const fn posedges(&self) -> u64 {
        self.posedges
    }

    /// Returns the number of falling `sclk` edges seen while selected.
    pub const fn negedges(&self) -> u64 {
        self.negedges
    }

    /// Status register 1.
    ///
    /// Program and erase complete within the deselect edge, so `STATUS_WIP` never
    /// reads back set.
    const fn status(&self) -> u8 {
        if self.wel { spi::STATUS_WEL } else { 0 }
    }

    /// Reads one byte at a 24-bit address, returning the erased value past the end.
    fn read_byte(&self, addr: u32) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(self.erased)
    }

    /// Accumulates address byte `byte_count` (1..=3), most significant first.
    fn shift_address(&mut self) {
        if (1..=3).contains(&self.byte_count) {
            self.addr |= (self.curr_byte as u32) << ((3 - self.byte_count) * 8);
        }
    }

    /// Emits the byte at `addr` and advances it, wrapping at 16 MiB.
    fn stream_read(&mut self) {
        self.out_buffer = self.read_byte(self.addr);
        self.addr = self.addr.wrapping_add(1) & FLASH_ADDR_MASK;
    }

    /// Handles a completed byte; `byte_count` is the index of that byte.
    fn process_byte(&mut self) {
        self.out_buffer = 0;
        if self.byte_count == 0 {
            self.command = self.curr_byte;
            self.addr = 0;
            self.data_width = 1;
            debug!("spi flash command {:#04x}", self.command);
            match self.command {
                spi::WRITE_ENABLE => self.wel = true,
                spi::WRITE_DISABLE => self.wel = false,
                spi::READ_STATUS => self.out_buffer = self.status(),
                spi::READ_ID => self.out_buffer = FLASH_JEDEC_ID[0],
                spi::QUAD_READ => self.data_width = 4,
                _ => {}
            }
            return;
        }

        match self.command {
            spi::READ => {
                self.shift_address();
                if self.byte_count >= 3 {
                    self.stream_read();
                }
            }
            spi::QUAD_READ => {
                // 3 address bytes, 1 mode byte, 2 dummy bytes, then data.
                self.shift_address();
                if self.byte_count >= 6 {
                    self.stream_read();
                }
            }
            spi::READ_ID => {
                self.out_buffer = FLASH_JEDEC_ID[self.byte_count as usize % FLASH_JEDEC_ID.len()];
            }
            spi::READ_STATUS => self.out_buffer = self.status(),
            spi::PAGE_PROGRAM => {
                self.shift_address();
                if self.byte_count >= 4 && self.wel {
                    self.program_byte();
                }
            }
            spi::SECTOR_ERASE => self.shift_address(),
            _ => {}
        }
    }

    /// Programs `curr_byte` at `addr` and advances within the current page.
    fn program_byte(&mut self) {
        let idx = (self.addr & FLASH_ADDR_MASK) as usize;
        if let Some(cell) = self.data.get_mut(idx) {
            // NOR programming only clears bits.
            *cell &= self.curr_byte;
        }
        let page_mask = (FLASH_PAGE_SIZE - 1) as u32;
        self.addr = (self.addr & !page_mask) | (self.addr.wrapping_add(1) & page_mask);
    }

    /// Completes the transaction on `csn` rising.
    fn deselect(&mut self) {
        let complete = self.byte_count >= 4;
        match self.command {
            spi::SECTOR_ERASE if complete && self.wel => {
                let base = (self.addr as usize) & !(FLASH_SECTOR_SIZE - 1);
                let end = (base + FLASH_SECTOR_SIZE).min(self.data.len());
                if base < end {
                    self.data[base..end].fill(self.erased);
                }
                debug!("spi flash sector {base:#x} erased");
                self.wel = false;
            }
            spi::PAGE_PROGRAM if complete => self.wel = false,
            _ => {}
        }
        self.bit_count = 0;
        self.byte_count = 0;
        self.data_width = 1;
        self.d_i = 0;
    }

    /// Advances the SPI state machine given the current pin levels.
    ///
    /// `d_o` carries the controller's output lines (bit 0 is MOSI in single mode).
    /// Returns the level driven on the flash's output lines: MISO on bit 1 in single
    /// mode, the high nibble of the output shift register in quad mode. The value is
    /// updated on falling `sclk` and held otherwise.
    pub fn step(&mut self, clk: bool, csn: bool, d_o: u8) -> u8 {
        if csn && !self.last_csn {
            self.deselect();
        } else if clk && !self.last_clk && !csn {
            self.posedges += 1;
            if self.data_width == 4 {
                self.curr_byte = (self.curr_byte << 4) | (d_o & 0xF);
            } else {
                self.curr_byte = (self.curr_byte << 1) | (d_o & 0x1);
            }
            self.out_buffer <<= self.data_width;
            self.bit_count += self.data_width;
            if self.bit_count >= 8 {
                self.process_byte();
                self.byte_count += 1;
                self.bit_count = 0;
            }
        } else if !clk && self.last_clk && !csn {
            self.negedges += 1;
            self.d_i = if self.data_width == 4 {
                (self.out_buffer >> 4) & 0xF
            } else {
                ((self.out_buffer >> 7) & 0x1) << 1
            };
            trace!(d_i = self.d_i, "spi flash drive");
        }

        self.last_clk = clk;
        self.last_csn = csn;
        self.d_i
    }
}

impl fmt::Debug for SpiFlash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiFlash")
            .field("capacity", &self.data.len())
            .field("erased", &self.erased)
            .field("command", &self.command)
            .field("addr", &self.addr)
            .field("wel", &self.wel)
            .finish_non_exhaustive()
    }
}
