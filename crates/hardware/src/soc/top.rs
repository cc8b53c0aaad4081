//! Reference Boot Circuit.
//!
//! A small synchronous design standing in for a generated SoC model. It provides:
//! 1. **Reset:** A registered synchronous reset, power-on asserted.
//! 2. **Boot Fetcher:** An SPI master that, once out of reset, issues a `READ` at the
//!    boot address and shifts in a fixed number of bytes, at half the system clock.
//! 3. **Flash Cell:** An embedded [`SpiFlash`] named `"flash"`, stepped every evaluation.
//!
//! All registers update on the rising edge of `clk` only, so evaluating twice with the
//! same inputs is a no-op.
//!
//! # Ports
//!
//! * Inputs: `clk`, `rst`
//! * Outputs: `rst_sync`, `flash_clk`, `flash_csn`, `flash_d0`, `boot_done`, `boot_bytes`

use crate::common::SimError;
use crate::common::constants::{FLASH_CELL, spi};
use crate::config::{self, Config};
use crate::soc::flash::SpiFlash;
use crate::soc::traits::{CLK, CircuitModel, RST};

/// Boot fetcher state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    /// Waiting to start a transaction.
    Idle,
    /// Shifting out opcode and address; `remaining` bits left to send.
    Command {
        /// Bits not yet sampled by the flash.
        remaining: u8,
    },
    /// Shifting in data bytes.
    Data,
    /// Last byte captured; chip select released on the next edge.
    Deselect,
    /// All boot bytes fetched.
    Done,
}

/// Reference SoC top level.
// One field per wire or single-bit register.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct BootTop {
    clk: bool,
    rst: bool,
    /// `clk` level at the previous evaluation.
    prev_clk: bool,

    /// Registered reset.
    rst_q: bool,

    state: FetchState,
    sclk: bool,
    csn: bool,
    mosi: bool,
    shift_out: u32,
    shift_in: u8,
    in_bits: u8,
    fetched: Vec<u8>,

    boot_addr: u32,
    boot_len: usize,

    flash: SpiFlash,
}

impl BootTop {
    /// Creates a design around `flash` that boots `boot_len` bytes from `boot_addr`.
    pub fn new(flash: SpiFlash, boot_addr: u32, boot_len: usize) -> Self {
        Self {
            clk: false,
            rst: false,
            prev_clk: false,
            rst_q: true,
            state: FetchState::Idle,
            sclk: false,
            csn: true,
            mosi: false,
            shift_out: 0,
            shift_in: 0,
            in_bits: 0,
            fetched: Vec::with_capacity(boot_len),
            boot_addr,
            boot_len,
            flash,
        }
    }

    /// Creates the design described by `config`.
    ///
    /// The boot address is `config.load_offset` truncated to 24 bits; callers go through
    /// [`Config::validate`] to reject offsets that do not fit.
    pub fn from_config(config: &Config) -> Self {
        let flash = SpiFlash::with_fill(config.flash.capacity, config.flash.erased_value);
        Self::new(
            flash,
            config::spi_address(config.load_offset),
            config.run.boot_fetch_len,
        )
    }

    /// Returns the bytes fetched from flash since reset was last released.
    pub const fn fetched(&self) -> &[u8] {
        self.fetched.as_slice()
    }

    /// Returns the boot fetcher state.
    pub const fn fetch_state(&self) -> FetchState {
        self.state
    }

    /// Returns whether the design is held in reset.
    pub const fn in_reset(&self) -> bool {
        self.rst_q
    }

    /// Returns the embedded flash.
    pub const fn flash(&self) -> &SpiFlash {
        &self.flash
    }

    /// Returns the fetcher to idle and drops fetched bytes.
    fn reset_fetcher(&mut self) {
        self.state = FetchState::Idle;
        self.sclk = false;
        self.csn = true;
        self.mosi = false;
        self.shift_out = 0;
        self.shift_in = 0;
        self.in_bits = 0;
        self.fetched.clear();
    }

    /// Advances the SPI master by one system clock edge.
    fn advance_fetcher(&mut self) -> Result<(), SimError> {
        match self.state {
            FetchState::Idle => {
                if self.fetched.len() >= self.boot_len {
                    self.state = FetchState::Done;
                    return Ok(());
                }
                if self.boot_addr as usize >= self.flash.capacity() {
                    return Err(SimError::ModelFault(format!(
                        "boot address {:#x} outside flash of {} bytes",
                        self.boot_addr,
                        self.flash.capacity()
                    )));
                }
                self.shift_out = ((spi::READ as u32) << 24) | self.boot_addr;
                self.mosi = self.shift_out >> 31 != 0;
                self.csn = false;
                self.sclk = false;
                self.state = FetchState::Command { remaining: 32 };
            }
            FetchState::Command { remaining } => {
                if self.sclk {
                    self.sclk = false;
                    if remaining == 0 {
                        self.mosi = false;
                        self.state = FetchState::Data;
                    } else {
                        self.shift_out <<= 1;
                        self.mosi = self.shift_out >> 31 != 0;
                    }
                } else {
                    self.sclk = true;
                    self.state = FetchState::Command {
                        remaining: remaining - 1,
                    };
                }
            }
            FetchState::Data => {
                if self.sclk {
                    self.sclk = false;
                } else {
                    // MISO was driven on the previous falling edge.
                    let miso = (self.flash.output() >> 1) & 1;
                    self.shift_in = (self.shift_in << 1) | miso;
                    self.in_bits += 1;
                    self.sclk = true;
                    if self.in_bits == 8 {
                        self.fetched.push(self.shift_in);
                        self.in_bits = 0;
                        if self.fetched.len() >= self.boot_len {
                            self.state = FetchState::Deselect;
                        }
                    }
                }
            }
            FetchState::Deselect => {
                self.sclk = false;
                self.csn = true;
                self.state = FetchState::Done;
            }
            FetchState::Done => {}
        }
        Ok(())
    }
}

impl Default for BootTop {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CircuitModel for BootTop {
    fn set_input(&mut self, port: &str, value: bool) -> Result<(), SimError> {
        match port {
            CLK => self.clk = value,
            RST => self.rst = value,
            _ => return Err(SimError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn output(&self, port: &str) -> Result<u64, SimError> {
        let value = match port {
            CLK => self.clk as u64,
            RST => self.rst as u64,
            "rst_sync" => self.rst_q as u64,
            "flash_clk" => self.sclk as u64,
            "flash_csn" => self.csn as u64,
            "flash_d0" => self.mosi as u64,
            "boot_done" => (self.state == FetchState::Done) as u64,
            "boot_bytes" => self.fetched.len() as u64,
            _ => return Err(SimError::UnknownPort(port.to_string())),
        };
        Ok(value)
    }

    fn step(&mut self) -> Result<(), SimError> {
        let rising = self.clk && !self.prev_clk;
        self.prev_clk = self.clk;

        if rising {
            let in_reset = self.rst_q;
            self.rst_q = self.rst;
            if in_reset {
                self.reset_fetcher();
            } else {
                self.advance_fetcher()?;
            }
        }

        let _ = self.flash.step(self.sclk, self.csn, self.mosi as u8);
        Ok(())
    }

    fn flash_mut(&mut self, cell: &str) -> Option<&mut SpiFlash> {
        (cell == FLASH_CELL).then_some(&mut self.flash)
    }
}
