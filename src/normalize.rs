// SPDX-License-Identifier: LGPL-2.1

//! Conversion of caller scanlines into the native storage sample type.
//!
//! DNG mosaic data is stored as unsigned 16 bit samples. Whatever format
//! and stride the caller hands in, one row comes out as `width` u16
//! samples in machine byte order, staged in a buffer the session owns.

use crate::imagespec::PixelFormat;
use crate::{RawOutError, Result};

/// Convert one scanline into native u16 samples.
///
/// `xstride` is the byte distance between consecutive samples in `data`.
/// The result is staged in `scratch`, which is cleared but never shrunk,
/// so rows of equal length reuse the allocation.
pub fn native_scanline(format: PixelFormat, data: &[u8], xstride: usize, width: usize, scratch: &mut Vec<u8>) -> Result<()> {
  if width == 0 {
    scratch.clear();
    return Ok(());
  }
  let needed = (width - 1) * xstride + format.bytes_per_sample();
  if data.len() < needed {
    return Err(RawOutError::General(format!(
      "scanline buffer too small: got {} bytes, need {}",
      data.len(),
      needed
    )));
  }

  scratch.clear();
  scratch.reserve(width * 2);

  match format {
    // Already in native layout, just stage the bytes.
    PixelFormat::U16 if xstride == 2 => scratch.extend_from_slice(&data[..width * 2]),
    PixelFormat::U16 => {
      for sample in 0..width {
        let off = sample * xstride;
        scratch.extend_from_slice(&data[off..off + 2]);
      }
    }
    PixelFormat::U8 => {
      for sample in 0..width {
        let value = data[sample * xstride] as u16 * 257;
        scratch.extend_from_slice(&value.to_ne_bytes());
      }
    }
    PixelFormat::F32 => {
      for sample in 0..width {
        let off = sample * xstride;
        let value = f32::from_ne_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]]);
        let value = (value.clamp(0.0, 1.0) * f32::from(u16::MAX) + 0.5) as u16;
        scratch.extend_from_slice(&value.to_ne_bytes());
      }
    }
  }
  Ok(())
}
