// SPDX-License-Identifier: LGPL-2.1

pub mod output;

pub use output::{DngOutput, OpenMode};

use crate::imagespec::ImageSpec;

pub const DNG_VERSION_V1_0: [u8; 4] = [1, 0, 0, 0];
pub const DNG_VERSION_V1_1: [u8; 4] = [1, 1, 0, 0];
pub const DNG_VERSION_V1_2: [u8; 4] = [1, 2, 0, 0];
pub const DNG_VERSION_V1_3: [u8; 4] = [1, 3, 0, 0];
pub const DNG_VERSION_V1_4: [u8; 4] = [1, 4, 0, 0];
pub const DNG_VERSION_V1_5: [u8; 4] = [1, 5, 0, 0];
pub const DNG_VERSION_V1_6: [u8; 4] = [1, 6, 0, 0];

/// Compute the ActiveArea tag from the spec's full window.
///
/// DNG ActiveArea is:
///  Top, Left, Bottom, Right
/// so the vertical coordinates come first.
pub fn active_area(spec: &ImageSpec) -> [u32; 4] {
  [
    spec.full_y as u32,                       // top
    spec.full_x as u32,                       // left
    (spec.full_y + spec.full_height) as u32,  // bottom coord
    (spec.full_x + spec.full_width) as u32,   // right coord
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::imagespec::PixelFormat;

  #[test]
  fn active_area_spans_the_full_window() {
    let mut spec = ImageSpec::new(100, 80, 1, PixelFormat::U16);
    spec.full_x = 4;
    spec.full_y = 10;
    spec.full_width = 92;
    spec.full_height = 60;

    let area = active_area(&spec);
    assert_eq!(area, [10, 4, 70, 96]);
    assert_eq!(area[2] - area[0], spec.full_height as u32);
    assert_eq!(area[3] - area[1], spec.full_width as u32);
  }
}
