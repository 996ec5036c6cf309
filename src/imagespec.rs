// SPDX-License-Identifier: LGPL-2.1

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// In-memory sample type of a caller supplied scanline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
  U8,
  U16,
  F32,
}

impl PixelFormat {
  pub fn bytes_per_sample(&self) -> usize {
    match self {
      Self::U8 => 1,
      Self::U16 => 2,
      Self::F32 => 4,
    }
  }
}

/// Typed value for named optional image attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
  Str(String),
  Int(i32),
  Float(f32),
  /// 3-component color or vector
  Color([f32; 3]),
  /// 3x3 matrix, row major
  Matrix3([f32; 9]),
}

/// Description of the image a writer session is opened with.
///
/// The data window is `width` x `height` starting at (`x`, `y`). The full
/// (display) window is tracked separately so a crop can be expressed as a
/// data window inside a larger full window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
  pub width: usize,
  pub height: usize,
  pub x: usize,
  pub y: usize,
  pub full_x: usize,
  pub full_y: usize,
  pub full_width: usize,
  pub full_height: usize,
  pub nchannels: usize,
  format: PixelFormat,
  attributes: BTreeMap<String, AttrValue>,
}

impl ImageSpec {
  /// New spec with the full window matching the data window.
  pub fn new(width: usize, height: usize, nchannels: usize, format: PixelFormat) -> Self {
    Self {
      width,
      height,
      x: 0,
      y: 0,
      full_x: 0,
      full_y: 0,
      full_width: width,
      full_height: height,
      nchannels,
      format,
      attributes: BTreeMap::new(),
    }
  }

  pub fn format(&self) -> PixelFormat {
    self.format
  }

  pub fn set_format(&mut self, format: PixelFormat) {
    self.format = format;
  }

  pub fn set_attribute(&mut self, name: impl Into<String>, value: AttrValue) {
    self.attributes.insert(name.into(), value);
  }

  pub fn get_attribute(&self, name: &str) -> Option<&AttrValue> {
    self.attributes.get(name)
  }

  /// String attribute lookup. A value of a different type behaves as absent.
  pub fn get_string_attribute(&self, name: &str) -> Option<&str> {
    match self.attributes.get(name) {
      Some(AttrValue::Str(value)) => Some(value.as_str()),
      _ => None,
    }
  }

  /// 3x3 matrix attribute lookup. A value of a different type behaves as absent.
  pub fn get_matrix3(&self, name: &str) -> Option<[f32; 9]> {
    match self.attributes.get(name) {
      Some(AttrValue::Matrix3(value)) => Some(*value),
      _ => None,
    }
  }

  /// Color attribute lookup. A value of a different type behaves as absent.
  pub fn get_color3(&self, name: &str) -> Option<[f32; 3]> {
    match self.attributes.get(name) {
      Some(AttrValue::Color(value)) => Some(*value),
      _ => None,
    }
  }

  /// Resolve a caller supplied stride. `None` means samples are packed
  /// contiguously in the caller's format.
  pub fn auto_stride(&self, xstride: Option<usize>, format: PixelFormat) -> usize {
    xstride.unwrap_or(self.nchannels * format.bytes_per_sample())
  }

  /// Byte count of one native scanline as stored on disk.
  pub fn scanline_bytes(&self) -> usize {
    self.width * self.nchannels * self.format.bytes_per_sample()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auto_stride_resolution() {
    let spec = ImageSpec::new(8, 8, 1, PixelFormat::U16);
    assert_eq!(spec.auto_stride(None, PixelFormat::U16), 2);
    assert_eq!(spec.auto_stride(None, PixelFormat::F32), 4);
    assert_eq!(spec.auto_stride(Some(12), PixelFormat::U8), 12);
  }

  #[test]
  fn typed_attribute_lookup() {
    let mut spec = ImageSpec::new(8, 8, 1, PixelFormat::U16);
    spec.set_attribute("raw:FilterPattern", AttrValue::Str("RGGB".into()));
    spec.set_attribute("raw:asShotNeutral", AttrValue::Color([0.8, 1.0, 0.9]));

    assert_eq!(spec.get_string_attribute("raw:FilterPattern"), Some("RGGB"));
    assert_eq!(spec.get_color3("raw:asShotNeutral"), Some([0.8, 1.0, 0.9]));
    // Wrong type or missing name both read as absent
    assert_eq!(spec.get_matrix3("raw:FilterPattern"), None);
    assert_eq!(spec.get_string_attribute("raw:ColorMatrix1"), None);
  }

  #[test]
  fn full_window_defaults_to_data_window() {
    let spec = ImageSpec::new(640, 480, 1, PixelFormat::U16);
    assert_eq!(spec.full_width, 640);
    assert_eq!(spec.full_height, 480);
    assert_eq!((spec.full_x, spec.full_y), (0, 0));
  }
}
