// SPDX-License-Identifier: MIT

use thiserror::Error;

pub mod entry;
pub mod reader;
pub mod value;
pub mod writer;

pub use entry::Entry;
pub use reader::{GenericTiffReader, IFD};
pub use value::{Rational, SRational, TiffAscii, Value};
pub use writer::{DirectoryWriter, ScanlineWriter, TiffWriter};

pub(crate) const TIFF_MAGIC: u16 = 42;

pub enum CompressionMethod {
  None = 1,
  Huffman = 2,
  LZW = 5,
  JPEG = 6,
  // "Extended JPEG" or "new JPEG" style
  ModernJPEG = 7,
  Deflate = 8,
}

impl From<CompressionMethod> for Value {
  fn from(value: CompressionMethod) -> Self {
    Value::Short(vec![value as u16])
  }
}

#[allow(clippy::upper_case_acronyms)]
pub enum PhotometricInterpretation {
  WhiteIsZero = 0,
  BlackIsZero = 1,
  RGB = 2,
  YCbCr = 6,
  // Defined by DNG
  CFA = 32803,
  LinearRaw = 34892,
}

impl From<PhotometricInterpretation> for Value {
  fn from(value: PhotometricInterpretation) -> Self {
    Value::Short(vec![value as u16])
  }
}

pub enum PlanarConfiguration {
  Chunky = 1,
  Planar = 2,
}

impl From<PlanarConfiguration> for Value {
  fn from(value: PlanarConfiguration) -> Self {
    Value::Short(vec![value as u16])
  }
}

pub enum Orientation {
  TopLeft = 1,
  TopRight = 2,
  BottomRight = 3,
  BottomLeft = 4,
}

impl From<Orientation> for Value {
  fn from(value: Orientation) -> Self {
    Value::Short(vec![value as u16])
  }
}

#[allow(clippy::upper_case_acronyms)]
pub enum SampleFormat {
  Uint = 1,
  Int = 2,
  IEEEFP = 3,
  Void = 4,
}

impl From<SampleFormat> for Value {
  fn from(value: SampleFormat) -> Self {
    Value::Short(vec![value as u16])
  }
}

/// Error variants for the container layer
#[derive(Debug, Error)]
pub enum TiffError {
  /// Overflow of input, size constraints...
  #[error("Overflow error: {}", _0)]
  Overflow(String),

  #[error("General error: {}", _0)]
  General(String),

  #[error("Format mismatch: {}", _0)]
  FormatMismatch(String),

  /// Error on internal cursor type
  #[error("I/O error: {:?}", _0)]
  Io(#[from] std::io::Error),
}

/// Result type for container results
pub type Result<T> = std::result::Result<T, TiffError>;
