// SPDX-License-Identifier: MIT

use std::io::{Read, Seek};

use log::debug;
use serde::{Deserialize, Serialize};

use super::reader::{EndianReader, ReadByteOrder};
use super::value::{Rational, SRational, TiffAscii, Value};
use super::Result;

const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_UNDEFINED: u16 = 7;
const TYPE_SRATIONAL: u16 = 10;
const TYPE_FLOAT: u16 = 11;

// Byte size shift per entry type, indexed by type id 0..13
const DATASHIFTS: [u8; 14] = [0, 0, 0, 1, 2, 3, 0, 0, 1, 2, 3, 2, 3, 2];

/// One directory entry: tag id plus typed value.
///
/// `embedded` carries the inline data word for the writer and the resolved
/// data offset for the reader. It is only `None` while an IFD is being
/// assembled for writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub tag: u16,
  pub value: Value,
  pub embedded: Option<u32>,
}

impl std::ops::Deref for Entry {
  type Target = Value;

  fn deref(&self) -> &Self::Target {
    &self.value
  }
}

impl Entry {
  pub fn value_type(&self) -> u16 {
    self.value.value_type()
  }

  pub fn count(&self) -> u32 {
    self.value.count() as u32
  }

  /// Parse a single entry. The tag id itself has already been consumed
  /// from the stream.
  pub fn parse<R: Read + Seek>(reader: &mut EndianReader<R>, tag: u16) -> Result<Entry> {
    let pos = reader.position()? - 2;

    let typ = reader.read_u16()?;
    let count = reader.read_u32()?;

    debug!("Tag: {:#x}, Typ: {:#x}, count: {}", tag, typ, count);

    // Unknown types are treated as byte data
    let compat_typ = if typ == 0 || typ > 12 { TYPE_UNDEFINED } else { typ };

    let bytesize: usize = (count as usize) << DATASHIFTS[compat_typ as usize];
    let offset: u32 = if bytesize <= 4 { reader.position()? } else { reader.read_u32()? };

    reader.goto(offset)?;
    let value = match typ {
      TYPE_BYTE => {
        let mut v = vec![0; count as usize];
        reader.read_u8_into(&mut v)?;
        Value::Byte(v)
      }
      TYPE_ASCII => {
        let mut v = vec![0; count as usize];
        reader.read_u8_into(&mut v)?;
        Value::Ascii(TiffAscii::new_from_raw(&v))
      }
      TYPE_SHORT => {
        let mut v = vec![0; count as usize];
        reader.read_u16_into(&mut v)?;
        Value::Short(v)
      }
      TYPE_LONG => {
        let mut v = vec![0; count as usize];
        reader.read_u32_into(&mut v)?;
        Value::Long(v)
      }
      TYPE_RATIONAL => {
        let mut tmp = vec![0; count as usize * 2]; // Rational is 2x u32
        reader.read_u32_into(&mut tmp)?;
        Value::Rational(tmp.chunks_exact(2).map(|c| Rational::new(c[0], c[1])).collect())
      }
      TYPE_UNDEFINED => {
        let mut v = vec![0; count as usize];
        reader.read_u8_into(&mut v)?;
        Value::Undefined(v)
      }
      TYPE_SRATIONAL => {
        let mut tmp = vec![0; count as usize * 2]; // SRational is 2x i32
        reader.read_i32_into(&mut tmp)?;
        Value::SRational(tmp.chunks_exact(2).map(|c| SRational::new(c[0], c[1])).collect())
      }
      TYPE_FLOAT => {
        let mut v = vec![0.0; count as usize];
        reader.read_f32_into(&mut v)?;
        Value::Float(v)
      }
      x => {
        let mut v = vec![0; bytesize];
        reader.read_u8_into(&mut v)?;
        Value::Unknown(x, v)
      }
    };
    reader.goto(pos + 12)?; // Size of IFD entry
    Ok(Entry {
      tag,
      value,
      embedded: Some(offset),
    })
  }
}
