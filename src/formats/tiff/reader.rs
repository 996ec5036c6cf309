// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};

use super::{Entry, Result, TiffError, TIFF_MAGIC};
use crate::bits::Endian;
use crate::tags::TiffTag;

/// Single image file directory parsed from the container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IFD {
  pub offset: u32,
  pub next_ifd: u32,
  pub entries: BTreeMap<u16, Entry>,
  pub endian: Endian,
}

impl IFD {
  pub fn new<R: Read + Seek>(reader: &mut R, offset: u32, endian: Endian) -> Result<IFD> {
    reader.seek(SeekFrom::Start(offset as u64))?;
    let mut reader = EndianReader::new(reader, endian);
    let entry_count = reader.read_u16()?;
    let mut entries = BTreeMap::new();
    let mut next_pos = reader.position()?;
    for _ in 0..entry_count {
      reader.goto(next_pos)?;
      next_pos += 12;
      let tag = reader.read_u16()?;
      let entry = Entry::parse(&mut reader, tag)?;
      entries.insert(tag, entry);
    }
    reader.goto(next_pos)?;
    let next_ifd = reader.read_u32()?;
    Ok(IFD {
      offset,
      next_ifd,
      entries,
      endian,
    })
  }

  pub fn entry_count(&self) -> usize {
    self.entries.len()
  }

  pub fn get_entry<T: TiffTag>(&self, tag: T) -> Option<&Entry> {
    self.entries.get(&tag.into())
  }

  pub fn has_entry<T: TiffTag>(&self, tag: T) -> bool {
    self.get_entry(tag).is_some()
  }
}

/// Reader for the TIFF tag structure, used to verify written containers.
///
/// This parses the IFD chain and typed entries only; it makes no attempt
/// to interpret image data beyond the tags that locate it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenericTiffReader {
  chain: Vec<IFD>,
  endian: Endian,
}

impl GenericTiffReader {
  pub fn new<R: Read + Seek>(file: &mut R) -> Result<Self> {
    file.seek(SeekFrom::Start(0))?;
    let endian = match file.read_u16::<LittleEndian>()? {
      0x4949 => Endian::Little,
      0x4d4d => Endian::Big,
      x => {
        return Err(TiffError::General(format!("TIFF: don't know marker 0x{:x}", x)));
      }
    };
    let magic = match endian {
      Endian::Little => file.read_u16::<LittleEndian>()?,
      Endian::Big => file.read_u16::<BigEndian>()?,
    };
    if magic != TIFF_MAGIC {
      return Err(TiffError::General(format!("Invalid magic marker for TIFF: {}", magic)));
    }
    let mut next_ifd = match endian {
      Endian::Little => file.read_u32::<LittleEndian>()?,
      Endian::Big => file.read_u32::<BigEndian>()?,
    };
    if next_ifd == 0 {
      return Err(TiffError::General("Invalid TIFF header, contains no root IFD".to_string()));
    }

    let mut chain = Vec::new();
    while next_ifd != 0 {
      let ifd = IFD::new(file, next_ifd, endian)?;
      if ifd.entries.is_empty() {
        return Err(TiffError::General("TIFF is invalid, IFD must contain at least one entry".to_string()));
      }
      next_ifd = ifd.next_ifd;
      chain.push(ifd);
    }
    Ok(Self { chain, endian })
  }

  pub fn new_with_buffer<T: AsRef<[u8]>>(buffer: T) -> Result<Self> {
    let mut cursor = std::io::Cursor::new(buffer.as_ref());
    Self::new(&mut cursor)
  }

  pub fn root_ifd(&self) -> &IFD {
    &self.chain[0]
  }

  pub fn chains(&self) -> &[IFD] {
    &self.chain
  }

  pub fn get_endian(&self) -> Endian {
    self.endian
  }

  pub fn get_entry<T: TiffTag>(&self, tag: T) -> Option<&Entry> {
    self.chain.iter().find_map(|ifd| ifd.get_entry(tag))
  }

  pub fn has_entry<T: TiffTag>(&self, tag: T) -> bool {
    self.get_entry(tag).is_some()
  }
}

pub trait ReadByteOrder {
  fn read_u16(&mut self) -> std::io::Result<u16>;
  fn read_u32(&mut self) -> std::io::Result<u32>;
  fn read_u8_into(&mut self, dst: &mut [u8]) -> std::io::Result<()>;
  fn read_u16_into(&mut self, dst: &mut [u16]) -> std::io::Result<()>;
  fn read_u32_into(&mut self, dst: &mut [u32]) -> std::io::Result<()>;
  fn read_i32_into(&mut self, dst: &mut [i32]) -> std::io::Result<()>;
  fn read_f32_into(&mut self, dst: &mut [f32]) -> std::io::Result<()>;
}

pub struct EndianReader<'a, R: Read + Seek + 'a> {
  endian: Endian,
  inner: &'a mut R,
}

impl<'a, R: Read + Seek + 'a> EndianReader<'a, R> {
  pub fn new(inner: &'a mut R, endian: Endian) -> Self {
    Self { endian, inner }
  }

  pub fn position(&mut self) -> Result<u32> {
    Ok(self.inner.stream_position().map(|v| v as u32)?)
  }

  pub fn goto(&mut self, offset: u32) -> Result<()> {
    self.inner.seek(SeekFrom::Start(offset as u64))?;
    Ok(())
  }
}

impl<'a, R: Read + Seek + 'a> ReadByteOrder for EndianReader<'a, R> {
  fn read_u16(&mut self) -> std::io::Result<u16> {
    match self.endian {
      Endian::Little => self.inner.read_u16::<LittleEndian>(),
      Endian::Big => self.inner.read_u16::<BigEndian>(),
    }
  }

  fn read_u32(&mut self) -> std::io::Result<u32> {
    match self.endian {
      Endian::Little => self.inner.read_u32::<LittleEndian>(),
      Endian::Big => self.inner.read_u32::<BigEndian>(),
    }
  }

  fn read_u8_into(&mut self, dst: &mut [u8]) -> std::io::Result<()> {
    self.inner.read_exact(dst)
  }

  fn read_u16_into(&mut self, dst: &mut [u16]) -> std::io::Result<()> {
    match self.endian {
      Endian::Little => self.inner.read_u16_into::<LittleEndian>(dst),
      Endian::Big => self.inner.read_u16_into::<BigEndian>(dst),
    }
  }

  fn read_u32_into(&mut self, dst: &mut [u32]) -> std::io::Result<()> {
    match self.endian {
      Endian::Little => self.inner.read_u32_into::<LittleEndian>(dst),
      Endian::Big => self.inner.read_u32_into::<BigEndian>(dst),
    }
  }

  fn read_i32_into(&mut self, dst: &mut [i32]) -> std::io::Result<()> {
    match self.endian {
      Endian::Little => self.inner.read_i32_into::<LittleEndian>(dst),
      Endian::Big => self.inner.read_i32_into::<BigEndian>(dst),
    }
  }

  fn read_f32_into(&mut self, dst: &mut [f32]) -> std::io::Result<()> {
    match self.endian {
      Endian::Little => self.inner.read_f32_into::<LittleEndian>(dst),
      Endian::Big => self.inner.read_f32_into::<BigEndian>(dst),
    }
  }
}
