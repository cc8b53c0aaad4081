//! # Unit Components
//!
//! Tests grouped by the module they exercise.

/// Configuration defaults, JSON loading, and offset parsing.
pub mod config;
