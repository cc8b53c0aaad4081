//! # Configuration Tests
//!
//! Defaults, JSON deserialization, validation, and load-offset parsing.

use std::path::PathBuf;

use rstest::rstest;
use socsim_core::common::ConfigError;
use socsim_core::config::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(
        config.image_path,
        PathBuf::from("../../vex-soc/software/bios.bin")
    );
    assert_eq!(config.load_offset, 0x0010_0000);
    assert_eq!(config.flash.capacity, 16 * 1024 * 1024);
    assert_eq!(config.flash.erased_value, 0xFF);
    assert_eq!(config.run.max_ticks, None);
    assert_eq!(config.run.boot_fetch_len, 16);
}

#[test]
fn test_empty_json_uses_defaults() {
    let config = Config::from_json_str("{}").unwrap();
    assert_eq!(config.load_offset, 0x0010_0000);
    assert_eq!(config.flash.capacity, 16 * 1024 * 1024);
    assert_eq!(config.run.max_ticks, None);
}

#[test]
fn test_json_overrides() {
    let json = r#"{
        "image_path": "fw/app.bin",
        "load_offset": 4096,
        "flash": { "capacity": 65536, "erased_value": 0 },
        "run": { "max_ticks": 250, "boot_fetch_len": 4 }
    }"#;
    let config = Config::from_json_str(json).unwrap();
    assert_eq!(config.image_path, PathBuf::from("fw/app.bin"));
    assert_eq!(config.load_offset, 4096);
    assert_eq!(config.flash.capacity, 65536);
    assert_eq!(config.flash.erased_value, 0);
    assert_eq!(config.run.max_ticks, Some(250));
    assert_eq!(config.run.boot_fetch_len, 4);
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = Config::from_json_str(r#"{ "flash": { "capacity": 1024 } }"#).unwrap();
    assert_eq!(config.flash.capacity, 1024);
    assert_eq!(config.flash.erased_value, 0xFF);
}

#[test]
fn test_unknown_field_rejected() {
    let err = Config::from_json_str(r#"{ "load_ofset": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_capacity_rejected() {
    let err = Config::from_json_str(r#"{ "flash": { "capacity": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroCapacity));
}

#[test]
fn test_offset_above_24_bits_rejected() {
    let json = r#"{ "load_offset": 16777216, "flash": { "capacity": 33554432 } }"#;
    let err = Config::from_json_str(json).unwrap_err();
    assert!(matches!(err, ConfigError::OffsetNotAddressable(0x0100_0000)));
}

#[test]
fn test_validate_accepts_top_of_address_space() {
    let config = Config {
        load_offset: 0x00FF_FFFF,
        ..Config::default()
    };
    config.validate().unwrap();
}

#[test]
fn test_missing_config_file() {
    let err = Config::from_json_file(std::path::Path::new("/nonexistent/socsim.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[rstest]
#[case("0x00100000", 0x0010_0000)]
#[case("0X1F", 0x1F)]
#[case("0x0010_0000", 0x0010_0000)]
#[case("4096", 4096)]
#[case(" 0 ", 0)]
fn test_parse_offset(#[case] text: &str, #[case] expected: u64) {
    assert_eq!(parse_offset(text).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("0x")]
#[case("1MiB")]
#[case("-1")]
#[case("0xZZ")]
fn test_parse_offset_rejects(#[case] text: &str) {
    assert!(matches!(
        parse_offset(text),
        Err(ConfigError::InvalidOffset(t)) if t == text
    ));
}

#[test]
fn test_spi_address_masks_to_24_bits() {
    assert_eq!(spi_address(0x0010_0000), 0x0010_0000);
    assert_eq!(spi_address(0x0123_4567), 0x0023_4567);
}
