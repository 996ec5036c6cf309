// SPDX-License-Identifier: LGPL-2.1

//! Library for writing camera raw mosaics as DNG files.
//!
//! The output path is scanline oriented: open a session with an
//! [`ImageSpec`] describing the image, push rows one at a time, close.
//! Each row becomes its own TIFF strip so nothing has to be buffered.
//!
//! # Example
//!
//! ```no_run
//! use rawout::{AttrValue, DngOutput, ImageSpec, OpenMode, PixelFormat};
//!
//! fn main() -> rawout::Result<()> {
//!   let mut spec = ImageSpec::new(4, 4, 1, PixelFormat::U16);
//!   spec.set_attribute("raw:FilterPattern", AttrValue::Str("RGGB".into()));
//!
//!   let mut out = DngOutput::new();
//!   out.open("shot.dng", &spec, OpenMode::Create)?;
//!   let row = [0u8; 8]; // 4 samples, 2 bytes each
//!   for y in 0..4 {
//!     out.write_scanline(y, 0, PixelFormat::U16, &row, None)?;
//!   }
//!   out.close()
//! }
//! ```

pub mod bits;
pub mod cfa;
pub mod dng;
pub mod formats;
pub mod imagespec;
pub mod normalize;
pub mod tags;

use std::path::PathBuf;

use thiserror::Error;

pub use crate::dng::{DngOutput, OpenMode};
pub use crate::imagespec::{AttrValue, ImageSpec, PixelFormat};

/// Error types for the output path.
#[derive(Debug, Error)]
pub enum RawOutError {
  #[error("Unable to open '{}': {}", _0.display(), _1)]
  Open(PathBuf, String),

  #[error("Unsupported: {}", _0)]
  Unsupported(String),

  #[error("{}", _0)]
  General(String),
}

pub type Result<T> = std::result::Result<T, RawOutError>;

impl From<crate::formats::tiff::TiffError> for RawOutError {
  fn from(err: crate::formats::tiff::TiffError) -> Self {
    Self::General(err.to_string())
  }
}

impl From<String> for RawOutError {
  fn from(msg: String) -> Self {
    Self::General(msg)
  }
}
