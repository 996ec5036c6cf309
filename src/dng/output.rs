// SPDX-License-Identifier: LGPL-2.1

//! DNG writer session.
//!
//! One session owns one open container. The full tag block is staged at
//! open time from the caller's [`ImageSpec`]; scanlines then stream out
//! one strip per row until `close()` finalizes the directory.

use std::fs::{File, OpenOptions};
use std::path::Path;

use log::error;

use crate::cfa::{self, CFA_PLANE_COLOR_RGB};
use crate::formats::tiff::{CompressionMethod, Orientation, PhotometricInterpretation, PlanarConfiguration, SampleFormat, ScanlineWriter};
use crate::imagespec::{ImageSpec, PixelFormat};
use crate::normalize;
use crate::tags::{DngTag, TiffCommonTag};
use crate::{RawOutError, Result};

use super::{active_area, DNG_VERSION_V1_1};

pub const IDENTITY_MATRIX: [f32; 9] = [
  1.0, 0.0, 0.0, //
  0.0, 1.0, 0.0, //
  0.0, 0.0, 1.0, //
];

const DEFAULT_AS_SHOT_NEUTRAL: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
  /// Truncate the target and write a fresh container.
  #[default]
  Create,
  /// Chain a new raw directory onto an existing container.
  AppendSubimage,
}

/// Writer session for DNG mosaic output.
///
/// The session always stores single-plane unsigned 16 bit CFA data;
/// channel count and sample type requested by the caller are overridden
/// at open time.
pub struct DngOutput {
  spec: ImageSpec,
  container: Option<ScanlineWriter<File>>,
  scratch: Vec<u8>,
}

impl Default for DngOutput {
  fn default() -> Self {
    Self::new()
  }
}

impl DngOutput {
  pub fn new() -> Self {
    Self {
      spec: ImageSpec::new(0, 0, 1, PixelFormat::U16),
      container: None,
      scratch: Vec::new(),
    }
  }

  pub fn format_name(&self) -> &'static str {
    "dng"
  }

  /// Optional feature flags. Only the display window is honored.
  pub fn supports(&self, feature: &str) -> bool {
    feature == "displaywindow"
  }

  pub fn extensions() -> &'static [&'static str] {
    &["dng"]
  }

  #[cfg(feature = "rawmeta")]
  pub fn library_version() -> String {
    format!("rawmeta {}", env!("CARGO_PKG_VERSION"))
  }

  #[cfg(not(feature = "rawmeta"))]
  pub fn library_version() -> String {
    format!("rawout {}", env!("CARGO_PKG_VERSION"))
  }

  /// Open a container at `path` and stage the complete tag block.
  ///
  /// On failure the error names the path and the session stays unopened.
  pub fn open(&mut self, path: impl AsRef<Path>, spec: &ImageSpec, mode: OpenMode) -> Result<()> {
    let path = path.as_ref();

    let file = match mode {
      OpenMode::Create => File::create(path),
      OpenMode::AppendSubimage => OpenOptions::new().read(true).write(true).open(path),
    }
    .map_err(|err| RawOutError::Open(path.to_path_buf(), err.to_string()))?;

    let mut container = match mode {
      OpenMode::Create => ScanlineWriter::new(file, spec.height),
      OpenMode::AppendSubimage => ScanlineWriter::append(file, spec.height),
    }
    .map_err(|err| RawOutError::Open(path.to_path_buf(), err.to_string()))?;

    let mut spec = spec.clone();
    // The format stores a single-plane CFA mosaic, whatever was asked for.
    spec.nchannels = 1;
    spec.set_format(PixelFormat::U16);

    container.add_tag(DngTag::DNGVersion, DNG_VERSION_V1_1);
    container.add_tag(TiffCommonTag::NewSubFileType, 0_u32);
    container.add_tag(TiffCommonTag::Compression, CompressionMethod::None);
    container.add_tag(TiffCommonTag::Make, "");
    container.add_tag(TiffCommonTag::Model, "");

    container.add_tag(TiffCommonTag::ImageWidth, spec.width as u32);
    container.add_tag(TiffCommonTag::ImageLength, spec.height as u32);
    container.add_tag(TiffCommonTag::BitsPerSample, 16_u16);
    // One strip per row so scanlines can stream out as they arrive
    container.add_tag(TiffCommonTag::RowsPerStrip, 1_u32);
    container.add_tag(TiffCommonTag::Orientation, Orientation::TopLeft);
    container.add_tag(TiffCommonTag::PhotometricInt, PhotometricInterpretation::CFA);
    container.add_tag(TiffCommonTag::SamplesPerPixel, 1_u16);
    container.add_tag(TiffCommonTag::PlanarConfig, PlanarConfiguration::Chunky);
    container.add_tag(TiffCommonTag::SampleFormat, SampleFormat::Uint);

    container.add_tag(TiffCommonTag::CFARepeatPatternDim, [2_u16, 2]);
    let pattern = cfa::encode_pattern(spec.get_string_attribute("raw:FilterPattern").unwrap_or(""));
    container.add_tag(TiffCommonTag::CFAPattern, pattern);

    // Replaces the empty make staged above
    container.add_tag(TiffCommonTag::Make, "DNG");
    container.add_tag(DngTag::UniqueCameraModel, "DNG");

    // ColorMatrix1 is mandatory, ColorMatrix2 only written when supplied
    let matrix1 = spec.get_matrix3("raw:ColorMatrix1").unwrap_or(IDENTITY_MATRIX);
    container.add_tag(DngTag::ColorMatrix1, matrix1);
    if let Some(matrix2) = spec.get_matrix3("raw:ColorMatrix2") {
      container.add_tag(DngTag::ColorMatrix2, matrix2);
    }

    let neutral = spec.get_color3("raw:asShotNeutral").unwrap_or(DEFAULT_AS_SHOT_NEUTRAL);
    container.add_tag(DngTag::AsShotNeutral, neutral);

    container.add_tag(DngTag::CFALayout, 1_u16); // Rectangular layout
    container.add_tag(DngTag::CFAPlaneColor, CFA_PLANE_COLOR_RGB);

    container.add_tag(DngTag::ActiveArea, active_area(&spec));

    self.spec = spec;
    self.container = Some(container);
    Ok(())
  }

  /// Write one scanline. `_z` exists for API parity with volumetric
  /// formats and is ignored.
  ///
  /// `data` holds `width` samples in the caller's `format`, `xstride`
  /// bytes apart (`None` for contiguous). The row is normalized into the
  /// session scratch buffer before it is handed to the container.
  pub fn write_scanline(&mut self, y: usize, _z: usize, format: PixelFormat, data: &[u8], xstride: Option<usize>) -> Result<()> {
    let container = self
      .container
      .as_mut()
      .ok_or_else(|| RawOutError::General("write_scanline() called without an open container".to_string()))?;
    if y >= self.spec.height {
      return Err(RawOutError::General(format!(
        "scanline {} is out of range for an image of height {}",
        y, self.spec.height
      )));
    }

    let xstride = self.spec.auto_stride(xstride, format);
    normalize::native_scanline(format, data, xstride, self.spec.width, &mut self.scratch)?;
    container.write_scanline(y, &self.scratch)?;
    Ok(())
  }

  /// Finalize the directory and release the container handle.
  ///
  /// Idempotent: closing an already closed (or never opened) session is
  /// a no-op that reports success.
  pub fn close(&mut self) -> Result<()> {
    if let Some(container) = self.container.take() {
      container.finish()?;
    }
    Ok(())
  }

  pub fn is_open(&self) -> bool {
    self.container.is_some()
  }
}

impl Drop for DngOutput {
  fn drop(&mut self) {
    if let Err(err) = self.close() {
      error!("failed to finalize DNG output: {}", err);
    }
  }
}
