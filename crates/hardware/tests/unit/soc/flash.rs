//! # SPI Flash Tests
//!
//! Pin-level transactions against the flash model: reads, identification, status,
//! programming, and erase.

use pretty_assertions::assert_eq;
use socsim_core::common::constants::{FLASH_JEDEC_ID, spi};
use socsim_core::soc::flash::SpiFlash;

use crate::common::harness::pattern;

/// Drives chip select low with the clock idle.
fn select(flash: &mut SpiFlash) {
    let _ = flash.step(false, false, 0);
}

/// Drives chip select high, completing the transaction.
fn deselect(flash: &mut SpiFlash) {
    let _ = flash.step(false, true, 0);
}

/// Clocks one byte on MOSI, MSB first, and returns the byte seen on MISO.
fn xfer(flash: &mut SpiFlash, byte: u8) -> u8 {
    let mut read = 0u8;
    for bit in (0..8).rev() {
        let mosi = (byte >> bit) & 1;
        let _ = flash.step(false, false, mosi);
        let miso = (flash.step(true, false, mosi) >> 1) & 1;
        read = (read << 1) | miso;
    }
    read
}

/// Clocks one byte on all four data lines, high nibble first.
fn xfer_quad(flash: &mut SpiFlash, byte: u8) -> u8 {
    let mut read = 0u8;
    for nibble in [byte >> 4, byte & 0xF] {
        let _ = flash.step(false, false, nibble);
        let out = flash.step(true, false, nibble) & 0xF;
        read = (read << 4) | out;
    }
    read
}

/// Sends an opcode followed by a 24-bit address.
fn command(flash: &mut SpiFlash, opcode: u8, addr: u32) {
    let _ = xfer(flash, opcode);
    for shift in [16, 8, 0] {
        let _ = xfer(flash, (addr >> shift) as u8);
    }
}

fn read(flash: &mut SpiFlash, addr: u32, len: usize) -> Vec<u8> {
    select(flash);
    command(flash, spi::READ, addr);
    let data = (0..len).map(|_| xfer(flash, 0)).collect();
    deselect(flash);
    data
}

fn write_enable(flash: &mut SpiFlash) {
    select(flash);
    let _ = xfer(flash, spi::WRITE_ENABLE);
    deselect(flash);
}

fn page_program(flash: &mut SpiFlash, addr: u32, data: &[u8]) {
    select(flash);
    command(flash, spi::PAGE_PROGRAM, addr);
    for &byte in data {
        let _ = xfer(flash, byte);
    }
    deselect(flash);
}

fn sector_erase(flash: &mut SpiFlash, addr: u32) {
    select(flash);
    command(flash, spi::SECTOR_ERASE, addr);
    deselect(flash);
}

#[test]
fn test_new_flash_is_erased() {
    let flash = SpiFlash::new(1024);
    assert_eq!(flash.capacity(), 1024);
    assert_eq!(flash.erased_value(), 0xFF);
    assert!(flash.as_bytes().iter().all(|&b| b == 0xFF));
}

#[test]
fn test_read_streams_sequential_bytes() {
    let mut flash = SpiFlash::new(4096);
    let data = pattern(32);
    flash.load(&data, 0x100).unwrap();

    assert_eq!(read(&mut flash, 0x100, 32), data);
    assert_eq!(flash.command(), spi::READ);
}

#[test]
fn test_read_past_image_returns_erased() {
    let mut flash = SpiFlash::new(4096);
    flash.load(&[0xAB, 0xCD], 0x10).unwrap();
    assert_eq!(read(&mut flash, 0x10, 4), vec![0xAB, 0xCD, 0xFF, 0xFF]);
}

#[test]
fn test_read_past_capacity_returns_erased() {
    let mut flash = SpiFlash::with_fill(64, 0x00);
    assert_eq!(read(&mut flash, 0x00_1000, 2), vec![0x00, 0x00]);

    let mut flash = SpiFlash::new(64);
    assert_eq!(read(&mut flash, 0x3E, 4), vec![0xFF; 4]);
}

#[test]
fn test_quad_read() {
    let mut flash = SpiFlash::new(4096);
    let data = pattern(8);
    flash.load(&data, 0x200).unwrap();

    select(&mut flash);
    let _ = xfer(&mut flash, spi::QUAD_READ);
    for byte in [0x00, 0x02, 0x00] {
        let _ = xfer_quad(&mut flash, byte);
    }
    // Mode byte, then two dummy bytes.
    for _ in 0..3 {
        let _ = xfer_quad(&mut flash, 0);
    }
    let got: Vec<u8> = (0..8).map(|_| xfer_quad(&mut flash, 0)).collect();
    deselect(&mut flash);

    assert_eq!(got, data);
    assert_eq!(flash.command(), spi::QUAD_READ);
}

#[test]
fn test_read_id_repeats() {
    let mut flash = SpiFlash::new(16);
    select(&mut flash);
    let _ = xfer(&mut flash, spi::READ_ID);
    let id: Vec<u8> = (0..8).map(|_| xfer(&mut flash, 0)).collect();
    deselect(&mut flash);

    let expected: Vec<u8> = FLASH_JEDEC_ID.iter().chain(&FLASH_JEDEC_ID).copied().collect();
    assert_eq!(id, expected);
}

#[test]
fn test_power_up_is_accepted() {
    let mut flash = SpiFlash::new(16);
    select(&mut flash);
    assert_eq!(xfer(&mut flash, spi::POWER_UP), 0);
    deselect(&mut flash);
    assert_eq!(flash.command(), spi::POWER_UP);
    assert_eq!(flash.output(), 0);
}

#[test]
fn test_status_tracks_write_enable() {
    let mut flash = SpiFlash::new(16);
    let status = |flash: &mut SpiFlash| {
        select(flash);
        let _ = xfer(flash, spi::READ_STATUS);
        let value = xfer(flash, 0);
        deselect(flash);
        value
    };

    assert_eq!(status(&mut flash), 0);
    write_enable(&mut flash);
    assert!(flash.write_enabled());
    assert_eq!(status(&mut flash), spi::STATUS_WEL);

    select(&mut flash);
    let _ = xfer(&mut flash, spi::WRITE_DISABLE);
    deselect(&mut flash);
    assert!(!flash.write_enabled());
    assert_eq!(status(&mut flash), 0);
}

#[test]
fn test_status_never_reports_write_in_progress() {
    let mut flash = SpiFlash::new(8 * 1024);
    write_enable(&mut flash);
    page_program(&mut flash, 0x10, &[0x00; 16]);

    select(&mut flash);
    let _ = xfer(&mut flash, spi::READ_STATUS);
    let status = xfer(&mut flash, 0);
    deselect(&mut flash);
    assert_eq!(status & spi::STATUS_WIP, 0);

    write_enable(&mut flash);
    sector_erase(&mut flash, 0x1000);
    select(&mut flash);
    let _ = xfer(&mut flash, spi::READ_STATUS);
    let status = xfer(&mut flash, 0);
    deselect(&mut flash);
    assert_eq!(status, 0);
}

#[test]
fn test_page_program_requires_write_enable() {
    let mut flash = SpiFlash::new(4096);
    page_program(&mut flash, 0x40, &[0x00, 0x11]);
    assert_eq!(flash.read(0x40, 2).unwrap(), &[0xFF, 0xFF]);

    write_enable(&mut flash);
    page_program(&mut flash, 0x40, &[0x00, 0x11]);
    assert_eq!(flash.read(0x40, 2).unwrap(), &[0x00, 0x11]);
    assert!(!flash.write_enabled());
}

#[test]
fn test_page_program_only_clears_bits() {
    let mut flash = SpiFlash::new(4096);
    flash.load(&[0xF0], 0x80).unwrap();

    write_enable(&mut flash);
    page_program(&mut flash, 0x80, &[0x3C]);
    assert_eq!(flash.read(0x80, 1).unwrap(), &[0x30]);
}

#[test]
fn test_page_program_wraps_within_page() {
    let mut flash = SpiFlash::new(4096);
    write_enable(&mut flash);
    page_program(&mut flash, 0x1FE, &[1, 2, 3, 4]);

    assert_eq!(flash.read(0x1FE, 2).unwrap(), &[1, 2]);
    assert_eq!(flash.read(0x100, 2).unwrap(), &[3, 4]);
    assert_eq!(flash.read(0x200, 2).unwrap(), &[0xFF, 0xFF]);
}

#[test]
fn test_sector_erase() {
    let mut flash = SpiFlash::new(16 * 1024);
    flash.load(&[0u8; 3 * 4096], 0).unwrap();

    write_enable(&mut flash);
    sector_erase(&mut flash, 0x1234);

    assert!(flash.read(0x1000, 4096).unwrap().iter().all(|&b| b == 0xFF));
    assert_eq!(flash.read(0x0FFF, 1).unwrap(), &[0x00]);
    assert_eq!(flash.read(0x2000, 1).unwrap(), &[0x00]);
    assert!(!flash.write_enabled());
}

#[test]
fn test_sector_erase_without_write_enable_is_ignored() {
    let mut flash = SpiFlash::new(8 * 1024);
    flash.load(&[0u8; 16], 0x1000).unwrap();

    sector_erase(&mut flash, 0x1000);
    assert_eq!(flash.read(0x1000, 16).unwrap(), &[0u8; 16]);
}

#[test]
fn test_programmed_bytes_read_back_over_spi() {
    let mut flash = SpiFlash::new(4096);
    write_enable(&mut flash);
    page_program(&mut flash, 0x300, &[0xDE, 0xAD, 0xBE, 0xEF]);

    assert_eq!(read(&mut flash, 0x300, 4), vec![0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn test_out_of_range_host_read() {
    let flash = SpiFlash::new(64);
    assert!(flash.read(60, 4).is_some());
    assert!(flash.read(60, 5).is_none());
    assert!(flash.read(usize::MAX, 2).is_none());
}
