// SPDX-License-Identifier: LGPL-2.1

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
  Big,
  Little,
}

impl Default for Endian {
  fn default() -> Self {
    Self::Little
  }
}

impl Endian {
  /// Byte order this machine uses for multi-byte values.
  pub fn native() -> Self {
    #[cfg(target_endian = "little")]
    {
      Self::Little
    }
    #[cfg(not(target_endian = "little"))]
    {
      Self::Big
    }
  }

  /// TIFF byte-order mark for this order ('II' or 'MM').
  pub fn order_mark(&self) -> [u8; 2] {
    match self {
      Self::Little => [0x49, 0x49],
      Self::Big => [0x4d, 0x4d],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn native_matches_target() {
    if cfg!(target_endian = "little") {
      assert_eq!(Endian::native(), Endian::Little);
      assert_eq!(Endian::native().order_mark(), *b"II");
    } else {
      assert_eq!(Endian::native(), Endian::Big);
      assert_eq!(Endian::native().order_mark(), *b"MM");
    }
  }
}
