//! Circuit model capability trait.
//!
//! This module defines the `CircuitModel` trait through which the driver reaches a
//! stepped circuit. It provides:
//! 1. **Inputs:** Named boolean ports (`clk`, `rst`, and any model-specific ones).
//! 2. **Outputs:** Named port values for observation and tests.
//! 3. **Evaluation:** `step`, which settles every signal for the current inputs.
//! 4. **Cells:** Access to embedded flash cells by instance name, for loading.
//!
//! The driver never depends on a model's internal structure; generated models and the
//! reference [`BootTop`](crate::soc::top::BootTop) plug in through this trait alone.

use crate::common::SimError;
use crate::soc::flash::SpiFlash;

/// Clock input port name.
pub const CLK: &str = "clk";

/// Reset input port name (active high).
pub const RST: &str = "rst";

/// Trait for stepped synchronous circuit models.
///
/// Inputs set through [`set_input`](CircuitModel::set_input) take effect at the next
/// [`step`](CircuitModel::step). `step` takes `&mut self`, so it can never overlap with
/// another `step` or with an input change.
pub trait CircuitModel {
    /// Sets a named boolean input port.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownPort`] if the model has no such input.
    fn set_input(&mut self, port: &str, value: bool) -> Result<(), SimError>;

    /// Returns the current value of a named port.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownPort`] if the model has no such port.
    fn output(&self, port: &str) -> Result<u64, SimError>;

    /// Propagates the current inputs through the model.
    ///
    /// Calling `step` again with unchanged inputs after the model has settled must not
    /// change any observable output.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ModelFault`] when the model detects an internal violation.
    /// The fault is unrecoverable.
    fn step(&mut self) -> Result<(), SimError>;

    /// Returns the embedded flash cell with the given instance name, if any.
    fn flash_mut(&mut self, cell: &str) -> Option<&mut SpiFlash>;
}
