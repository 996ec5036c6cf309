// SPDX-License-Identifier: MIT

use std::ffi::CString;
use std::fmt::Display;
use std::io::Write;

use byteorder::{NativeEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};

use super::{Result, TiffError};

/// Type to represent tiff values of type `RATIONAL`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<Rational> for f32 {
  fn from(v: Rational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

/// Type to represent tiff values of type `SRATIONAL`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<SRational> for f32 {
  fn from(v: SRational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

/// Typed payload of a directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  /// 8-bit unsigned integer
  Byte(Vec<u8>),
  /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
  Ascii(TiffAscii),
  /// 16-bit unsigned integer
  Short(Vec<u16>),
  /// 32-bit unsigned integer
  Long(Vec<u32>),
  /// Fraction stored as two 32-bit unsigned integers
  Rational(Vec<Rational>),
  /// 8-bit byte that may contain anything, depending on the field
  Undefined(Vec<u8>),
  /// Fraction stored as two 32-bit signed integers
  SRational(Vec<SRational>),
  /// 32-bit IEEE floating point
  Float(Vec<f32>),
  /// Any other type, kept as raw bytes
  Unknown(u16, Vec<u8>),
}

impl Value {
  pub fn as_string(&self) -> Option<&String> {
    match self {
      Self::Ascii(v) => Some(v.first()),
      _ => None,
    }
  }

  pub fn get_u32(&self, idx: usize) -> Option<u32> {
    match self {
      Self::Byte(v) => v.get(idx).copied().map(u32::from),
      Self::Short(v) => v.get(idx).copied().map(u32::from),
      Self::Long(v) => v.get(idx).copied(),
      Self::Undefined(v) => v.get(idx).copied().map(u32::from),
      _ => None,
    }
  }

  pub fn get_f32(&self, idx: usize) -> Option<f32> {
    match self {
      Self::Byte(v) => v.get(idx).map(|v| *v as f32),
      Self::Short(v) => v.get(idx).map(|v| *v as f32),
      Self::Long(v) => v.get(idx).map(|v| *v as f32),
      Self::Rational(v) => v.get(idx).copied().map(Into::into),
      Self::SRational(v) => v.get(idx).copied().map(Into::into),
      Self::Float(v) => v.get(idx).copied(),
      _ => None,
    }
  }

  pub fn count(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::Ascii(v) => v.count(),
      Self::Short(v) => v.len(),
      Self::Long(v) => v.len(),
      Self::Rational(v) => v.len(),
      Self::Undefined(v) => v.len(),
      Self::SRational(v) => v.len(),
      Self::Float(v) => v.len(),
      Self::Unknown(_, v) => v.len(),
    }
  }

  pub fn byte_size(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::Ascii(v) => v.count(),
      Self::Short(v) => v.len() * 2,
      Self::Long(v) => v.len() * 4,
      Self::Rational(v) => v.len() * 8,
      Self::Undefined(v) => v.len(),
      Self::SRational(v) => v.len() * 8,
      Self::Float(v) => v.len() * 4,
      Self::Unknown(_, v) => v.len(),
    }
  }

  pub fn value_type(&self) -> u16 {
    match self {
      Self::Byte(_) => 1,
      Self::Ascii(_) => 2,
      Self::Short(_) => 3,
      Self::Long(_) => 4,
      Self::Rational(_) => 5,
      Self::Undefined(_) => 7,
      Self::SRational(_) => 10,
      Self::Float(_) => 11,
      Self::Unknown(t, _) => *t,
    }
  }

  /// Pack a value of at most 4 bytes into the entry's inline data word.
  pub fn as_embedded(&self) -> Result<u32> {
    fn pack_bytes(v: &[u8]) -> u32 {
      (*v.first().unwrap_or(&0) as u32)
        | ((*v.get(1).unwrap_or(&0) as u32) << 8)
        | ((*v.get(2).unwrap_or(&0) as u32) << 16)
        | ((*v.get(3).unwrap_or(&0) as u32) << 24)
    }

    if self.count() == 0 {
      return Err(TiffError::General("entry has count == 0".into()));
    }
    if self.byte_size() > 4 {
      return Err(TiffError::Overflow("value must be written out-of-line".into()));
    }
    match self {
      Self::Byte(v) => Ok(pack_bytes(v)),
      Self::Ascii(v) => Ok(pack_bytes(&v.as_vec_with_nul())),
      Self::Short(v) => Ok((v[0] as u32) | ((*v.get(1).unwrap_or(&0) as u32) << 16)),
      Self::Long(v) => Ok(v[0]),
      Self::Undefined(v) => Ok(pack_bytes(v)),
      Self::Float(v) => Ok(v[0].to_bits()),
      Self::Unknown(_, v) => Ok(pack_bytes(v)),
      Self::Rational(_) | Self::SRational(_) => unreachable!("rationals are 8 bytes each"),
    }
  }

  pub fn write(&self, w: &mut dyn Write) -> Result<()> {
    match self {
      Self::Byte(val) => w.write_all(val)?,
      Self::Ascii(val) => w.write_all(&val.as_vec_with_nul())?,
      Self::Short(val) => {
        for x in val {
          w.write_u16::<NativeEndian>(*x)?;
        }
      }
      Self::Long(val) => {
        for x in val {
          w.write_u32::<NativeEndian>(*x)?;
        }
      }
      Self::Rational(val) => {
        for x in val {
          w.write_u32::<NativeEndian>(x.n)?;
          w.write_u32::<NativeEndian>(x.d)?;
        }
      }
      Self::Undefined(val) => w.write_all(val)?,
      Self::SRational(val) => {
        for x in val {
          w.write_i32::<NativeEndian>(x.n)?;
          w.write_i32::<NativeEndian>(x.d)?;
        }
      }
      Self::Float(val) => {
        for x in val {
          w.write_f32::<NativeEndian>(*x)?;
        }
      }
      Self::Unknown(_, val) => w.write_all(val)?,
    }
    Ok(())
  }
}

/// ASCII tag payload, stored with a trailing NUL on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TiffAscii {
  strings: Vec<String>,
}

impl TiffAscii {
  pub fn new<T: AsRef<str>>(value: T) -> Self {
    Self {
      strings: vec![String::from(value.as_ref())],
    }
  }

  pub fn first(&self) -> &String {
    &self.strings[0]
  }

  pub fn count(&self) -> usize {
    self.strings.iter().map(|s| s.len() + 1).sum::<usize>()
  }

  pub fn as_vec_with_nul(&self) -> Vec<u8> {
    let mut out = Vec::new();
    for s in &self.strings {
      match CString::new(s.as_bytes()) {
        Ok(cstr) => out.extend_from_slice(cstr.to_bytes_with_nul()),
        // Interior NULs terminate the string early
        Err(err) => {
          out.extend_from_slice(&s.as_bytes()[..err.nul_position()]);
          out.push(0);
        }
      }
    }
    out
  }

  pub fn new_from_raw(raw: &[u8]) -> Self {
    let nul_pos = raw.iter().position(|&c| c == b'\0').unwrap_or(raw.len());
    let s = std::str::from_utf8(&raw[..nul_pos]).unwrap_or("!!!INVALID UTF8!!!");
    Self {
      strings: vec![String::from(s)],
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Ascii(TiffAscii::new(value))
  }
}

impl From<&String> for Value {
  fn from(value: &String) -> Self {
    Value::Ascii(TiffAscii::new(value))
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Ascii(TiffAscii::new(&value))
  }
}

impl From<u8> for Value {
  fn from(value: u8) -> Self {
    Value::Byte(vec![value])
  }
}

impl From<u16> for Value {
  fn from(value: u16) -> Self {
    Value::Short(vec![value])
  }
}

impl From<u32> for Value {
  fn from(value: u32) -> Self {
    Value::Long(vec![value])
  }
}

impl From<f32> for Value {
  fn from(value: f32) -> Self {
    Value::Float(vec![value])
  }
}

impl From<Rational> for Value {
  fn from(value: Rational) -> Self {
    Value::Rational(vec![value])
  }
}

impl From<SRational> for Value {
  fn from(value: SRational) -> Self {
    Value::SRational(vec![value])
  }
}

impl From<&[u8]> for Value {
  fn from(value: &[u8]) -> Self {
    Value::Byte(value.into())
  }
}

impl From<&[u16]> for Value {
  fn from(value: &[u16]) -> Self {
    Value::Short(value.into())
  }
}

impl From<&[u32]> for Value {
  fn from(value: &[u32]) -> Self {
    Value::Long(value.into())
  }
}

impl From<&[f32]> for Value {
  fn from(value: &[f32]) -> Self {
    Value::Float(value.into())
  }
}

impl From<&Vec<u32>> for Value {
  fn from(value: &Vec<u32>) -> Self {
    Value::Long(value.clone())
  }
}

impl<const N: usize> From<[u8; N]> for Value {
  fn from(value: [u8; N]) -> Self {
    Value::Byte(value.into())
  }
}

impl<const N: usize> From<[u16; N]> for Value {
  fn from(value: [u16; N]) -> Self {
    Value::Short(value.into())
  }
}

impl<const N: usize> From<[u32; N]> for Value {
  fn from(value: [u32; N]) -> Self {
    Value::Long(value.into())
  }
}

impl<const N: usize> From<[f32; N]> for Value {
  fn from(value: [f32; N]) -> Self {
    Value::Float(value.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_packing() {
    assert_eq!(Value::Short(vec![16]).as_embedded().unwrap(), 16);
    assert_eq!(Value::Short(vec![1, 2]).as_embedded().unwrap(), 1 | (2 << 16));
    assert_eq!(Value::Byte(vec![1, 1, 0, 0]).as_embedded().unwrap(), 0x0101);
    assert_eq!(Value::Long(vec![0xdead]).as_embedded().unwrap(), 0xdead);
  }

  #[test]
  fn oversized_values_refuse_embedding() {
    assert!(Value::Long(vec![1, 2]).as_embedded().is_err());
    assert!(Value::Float(vec![1.0; 9]).as_embedded().is_err());
    assert!(Value::Rational(vec![Rational::new(1, 1)]).as_embedded().is_err());
  }

  #[test]
  fn ascii_has_trailing_nul() {
    let v = TiffAscii::new("DNG");
    assert_eq!(v.count(), 4);
    assert_eq!(v.as_vec_with_nul(), b"DNG\0");
    // Empty string still carries the NUL
    assert_eq!(TiffAscii::new("").as_vec_with_nul(), b"\0");
  }

  #[test]
  fn byte_sizes() {
    assert_eq!(Value::Float(vec![0.0; 9]).byte_size(), 36);
    assert_eq!(Value::Short(vec![2, 2]).byte_size(), 4);
    assert_eq!(Value::from([0_u32; 4]).byte_size(), 16);
  }
}
