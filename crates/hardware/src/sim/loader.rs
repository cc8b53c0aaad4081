//! Firmware Image Loader.
//!
//! This module places a firmware image into a flash model before simulation starts. It performs:
//! 1. **Image read:** Opens the file in binary mode and reads exactly its reported size.
//! 2. **Flash load:** Copies the bytes verbatim into the flash backing store at an offset.
//! 3. **Cell lookup:** Resolves the flash cell through the circuit model's cell accessor.
//!
//! Every failure here is startup-fatal. Nothing is retried and a failed load never writes
//! part of an image.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::info;

use crate::common::{LoadError, SimError};
use crate::soc::flash::SpiFlash;
use crate::soc::traits::CircuitModel;

/// Reads a firmware image from disk.
///
/// # Errors
///
/// Returns `SourceNotFound` if the file cannot be opened, `ReadError` if fewer bytes
/// arrive than the file's reported size, and `EmptyImage` for a zero-length file.
pub fn read_image(path: &Path) -> Result<Vec<u8>, LoadError> {
    let mut file = File::open(path).map_err(|source| LoadError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let expected = file
        .metadata()
        .map_err(|source| LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    read_sized(&mut file, expected, path)
}

/// Reads an image of `expected` bytes from `reader`; `path` only labels errors.
///
/// # Errors
///
/// Returns `ReadError` on an I/O failure or when the reader ends before `expected`
/// bytes, and `EmptyImage` when it yields nothing at all.
pub fn read_sized<R: Read>(
    reader: &mut R,
    expected: u64,
    path: &Path,
) -> Result<Vec<u8>, LoadError> {
    let read_error = |source: io::Error| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    };

    let mut data = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
    let got = reader.read_to_end(&mut data).map_err(read_error)?;

    if (got as u64) < expected {
        return Err(read_error(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read {got} of {expected} bytes"),
        )));
    }
    if data.is_empty() {
        return Err(LoadError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(data)
}

/// Loads the image at `path` into `flash` starting at byte `offset`.
///
/// On success flash bytes `[offset, offset + len)` equal the file contents and every other
/// byte is unchanged. Returns the number of bytes loaded.
///
/// # Errors
///
/// Returns any [`read_image`] error, or `ImageTooLarge` if the image does not fit.
pub fn load(flash: &mut SpiFlash, path: &Path, offset: u64) -> Result<usize, LoadError> {
    let image = read_image(path)?;
    flash.load(&image, offset)?;
    info!(
        "loaded {} ({} bytes) into flash at {:#010x}",
        path.display(),
        image.len(),
        offset
    );
    Ok(image.len())
}

/// Loads the image at `path` into the flash cell named `cell` inside `model`.
///
/// The image is read before the cell is resolved, so a missing file never touches the model.
///
/// # Errors
///
/// Returns [`SimError::Load`] for any [`load`] failure and [`SimError::MissingCell`] if
/// the model has no cell named `cell`.
pub fn load_into<M>(model: &mut M, cell: &str, path: &Path, offset: u64) -> Result<usize, SimError>
where
    M: CircuitModel + ?Sized,
{
    let image = read_image(path)?;
    let flash = model
        .flash_mut(cell)
        .ok_or_else(|| SimError::MissingCell(cell.to_string()))?;
    flash.load(&image, offset)?;
    info!(
        "loaded {} ({} bytes) into {cell} at {:#010x}",
        path.display(),
        image.len(),
        offset
    );
    Ok(image.len())
}
