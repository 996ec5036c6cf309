// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};

use super::{Entry, Result, TiffError, Value, TIFF_MAGIC};
use crate::bits::Endian;
use crate::tags::TiffTag;

/// Low-level TIFF stream writer.
///
/// Owns the output stream, emits the byte-order header and remembers the
/// location of the IFD pointer that `build()` patches once the directory
/// has been serialized.
pub struct TiffWriter<W> {
  pub(crate) writer: W,
  ifd_location: u64,
}

impl<W> TiffWriter<W>
where
  W: Write + Seek,
{
  /// Start a fresh container: writes the byte-order mark, magic and a
  /// zeroed root IFD pointer.
  pub fn new(writer: W) -> Result<Self> {
    let mut tmp = Self { writer, ifd_location: 0 };
    tmp.write_header()?;
    Ok(tmp)
  }

  /// Attach to an existing container to chain another directory onto it.
  ///
  /// Walks the IFD chain to the final next-IFD pointer, then positions the
  /// stream at the end. The file must use this machine's byte order.
  pub fn append(mut writer: W) -> Result<Self>
  where
    W: Read,
  {
    writer.seek(SeekFrom::Start(0))?;
    let mut order = [0_u8; 2];
    writer.read_exact(&mut order)?;
    if order != Endian::native().order_mark() {
      return Err(TiffError::FormatMismatch("can only append to a container in native byte order".to_string()));
    }
    let magic = writer.read_u16::<NativeEndian>()?;
    if magic != TIFF_MAGIC {
      return Err(TiffError::General(format!("Invalid magic marker for TIFF: {}", magic)));
    }

    let mut ifd_location = writer.stream_position()?;
    let mut next_ifd = writer.read_u32::<NativeEndian>()?;
    while next_ifd != 0 {
      writer.seek(SeekFrom::Start(next_ifd as u64))?;
      let entry_count = writer.read_u16::<NativeEndian>()?;
      writer.seek(SeekFrom::Start(next_ifd as u64 + 2 + entry_count as u64 * 12))?;
      ifd_location = writer.stream_position()?;
      next_ifd = writer.read_u32::<NativeEndian>()?;
    }
    writer.seek(SeekFrom::End(0))?;
    Ok(Self { writer, ifd_location })
  }

  fn write_header(&mut self) -> Result<()> {
    self.writer.write_all(&Endian::native().order_mark())?;
    self.writer.write_u16::<NativeEndian>(TIFF_MAGIC)?;
    self.ifd_location = self.writer.stream_position()?;
    self.writer.write_u32::<NativeEndian>(0_u32)?;

    Ok(())
  }

  pub(crate) fn pad_word_boundary(&mut self) -> Result<()> {
    if self.position()? % 4 != 0 {
      let padding = [0, 0, 0];
      let padd_len = 4 - (self.position()? % 4);
      self.writer.write_all(&padding[..padd_len as usize])?;
    }
    Ok(())
  }

  pub fn position(&mut self) -> Result<u32> {
    let pos = self.writer.stream_position()?;
    u32::try_from(pos).map_err(|_| TiffError::Overflow("container exceeds 4 GiB".to_string()))
  }

  /// Write raw data at the current position, returns its offset.
  pub fn write_data(&mut self, data: &[u8]) -> Result<u32> {
    self.pad_word_boundary()?;
    let offset = self.position()?;
    self.writer.write_all(data)?;
    Ok(offset)
  }

  /// Serialize the directory, patch the pending IFD pointer to it and
  /// flush the stream. Returns the directory offset.
  pub fn build(&mut self, ifd: DirectoryWriter) -> Result<u32> {
    let offset = ifd.build(self)?;
    self.writer.seek(SeekFrom::Start(self.ifd_location))?;
    self.writer.write_u32::<NativeEndian>(offset)?;
    self.writer.flush()?;
    Ok(offset)
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

/// Staged set of directory entries, serialized on `build()`.
#[derive(Default)]
pub struct DirectoryWriter {
  // BTreeMap ensures tags are written in ascending order
  entries: BTreeMap<u16, Entry>,
  next_ifd: u32,
}

impl DirectoryWriter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn entry_count(&self) -> u16 {
    self.entries.len() as u16
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Stage a tag. Staging the same tag again replaces the earlier value.
  pub fn add_tag<T: TiffTag, V: Into<Value>>(&mut self, tag: T, value: V) {
    let tag: u16 = tag.into();
    self.entries.insert(
      tag,
      Entry {
        tag,
        value: value.into(),
        embedded: None,
      },
    );
  }

  pub fn add_value<T: TiffTag>(&mut self, tag: T, value: Value) {
    let tag: u16 = tag.into();
    self.entries.insert(tag, Entry { tag, value, embedded: None });
  }

  pub fn build<W>(mut self, tiff: &mut TiffWriter<W>) -> Result<u32>
  where
    W: Write + Seek,
  {
    if self.entries.is_empty() {
      return Err(TiffError::General("IFD is empty, not allowed by TIFF specification".to_string()));
    }

    for entry in self.entries.values_mut() {
      if entry.value.byte_size() > 4 {
        tiff.pad_word_boundary()?;
        let offset = tiff.position()?;
        entry.value.write(&mut tiff.writer)?;
        entry.embedded = Some(offset);
      } else {
        entry.embedded = Some(entry.value.as_embedded()?);
      }
    }

    tiff.pad_word_boundary()?;
    let offset = tiff.position()?;

    tiff.writer.write_u16::<NativeEndian>(self.entry_count())?;
    for (tag, entry) in self.entries {
      tiff.writer.write_u16::<NativeEndian>(tag)?;
      tiff.writer.write_u16::<NativeEndian>(entry.value_type())?;
      tiff.writer.write_u32::<NativeEndian>(entry.count())?;
      tiff.writer.write_u32::<NativeEndian>(entry.embedded.unwrap_or(0))?;
    }
    tiff.writer.write_u32::<NativeEndian>(self.next_ifd)?; // Next IFD

    Ok(offset)
  }
}

/// Scanline-at-a-time container session.
///
/// Tags are staged up front, each scanline becomes its own strip, and
/// `finish()` emits the strip location tags together with the directory.
pub struct ScanlineWriter<W>
where
  W: Write + Seek,
{
  tiff: TiffWriter<W>,
  ifd: DirectoryWriter,
  strip_offsets: Vec<u32>,
  strip_sizes: Vec<u32>,
}

impl<W> ScanlineWriter<W>
where
  W: Write + Seek,
{
  /// Fresh container with `rows` scanline slots.
  pub fn new(writer: W, rows: usize) -> Result<Self> {
    Ok(Self {
      tiff: TiffWriter::new(writer)?,
      ifd: DirectoryWriter::new(),
      strip_offsets: vec![0; rows],
      strip_sizes: vec![0; rows],
    })
  }

  /// Chain a new directory with `rows` scanline slots onto an existing
  /// container.
  pub fn append(writer: W, rows: usize) -> Result<Self>
  where
    W: Read,
  {
    Ok(Self {
      tiff: TiffWriter::append(writer)?,
      ifd: DirectoryWriter::new(),
      strip_offsets: vec![0; rows],
      strip_sizes: vec![0; rows],
    })
  }

  pub fn add_tag<T: TiffTag, V: Into<Value>>(&mut self, tag: T, value: V) {
    self.ifd.add_tag(tag, value);
  }

  pub fn add_value<T: TiffTag>(&mut self, tag: T, value: Value) {
    self.ifd.add_value(tag, value);
  }

  /// Write one strip of data for the given row.
  pub fn write_scanline(&mut self, row: usize, data: &[u8]) -> Result<()> {
    if row >= self.strip_offsets.len() {
      return Err(TiffError::Overflow(format!(
        "scanline {} exceeds the {} rows the container was opened with",
        row,
        self.strip_offsets.len()
      )));
    }
    let offset = self.tiff.write_data(data)?;
    self.strip_offsets[row] = offset;
    self.strip_sizes[row] = data.len() as u32;
    Ok(())
  }

  /// Emit strip tags and the directory, patch the IFD chain and flush.
  pub fn finish(mut self) -> Result<()> {
    use crate::tags::TiffCommonTag;

    if !self.strip_offsets.is_empty() {
      self.ifd.add_value(TiffCommonTag::StripOffsets, Value::Long(self.strip_offsets));
      self.ifd.add_value(TiffCommonTag::StripByteCounts, Value::Long(self.strip_sizes));
    }
    self.tiff.build(self.ifd)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::formats::tiff::GenericTiffReader;
  use crate::tags::TiffCommonTag;

  #[test]
  fn write_tiff_file_basic() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut output = Cursor::new(Vec::new());
    let mut tiff = TiffWriter::new(&mut output)?;

    let mut dir = DirectoryWriter::new();
    dir.add_tag(TiffCommonTag::ImageWidth, 64_u32);
    dir.add_tag(TiffCommonTag::ImageLength, 32_u32);
    dir.add_tag(TiffCommonTag::BitsPerSample, 16_u16);
    dir.add_tag(TiffCommonTag::Artist, "AT");
    dir.add_tag(TiffCommonTag::CFAPattern, [0_u8, 1, 1, 2]);
    tiff.build(dir)?;

    let reader = GenericTiffReader::new(&mut output)?;
    assert_eq!(reader.get_endian(), Endian::native());
    let root = reader.root_ifd();
    assert_eq!(root.entry_count(), 5);
    assert_eq!(root.get_entry(TiffCommonTag::ImageWidth).unwrap().value.get_u32(0), Some(64));
    assert_eq!(root.get_entry(TiffCommonTag::Artist).unwrap().value.as_string().map(String::as_str), Some("AT"));
    assert_eq!(root.get_entry(TiffCommonTag::CFAPattern).unwrap().value, Value::Byte(vec![0, 1, 1, 2]));
    Ok(())
  }

  #[test]
  fn empty_directory_is_rejected() {
    let mut output = Cursor::new(Vec::new());
    let mut tiff = TiffWriter::new(&mut output).unwrap();
    assert!(tiff.build(DirectoryWriter::new()).is_err());
  }

  #[test]
  fn replacing_a_staged_tag() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut output = Cursor::new(Vec::new());
    let mut tiff = TiffWriter::new(&mut output)?;

    let mut dir = DirectoryWriter::new();
    dir.add_tag(TiffCommonTag::Make, "");
    dir.add_tag(TiffCommonTag::Make, "DNG");
    tiff.build(dir)?;

    let reader = GenericTiffReader::new(&mut output)?;
    assert_eq!(reader.root_ifd().entry_count(), 1);
    assert_eq!(
      reader.root_ifd().get_entry(TiffCommonTag::Make).unwrap().value.as_string().map(String::as_str),
      Some("DNG")
    );
    Ok(())
  }

  #[test]
  fn scanlines_become_strips() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut output = Cursor::new(Vec::new());
    let mut container = ScanlineWriter::new(&mut output, 2)?;
    container.add_tag(TiffCommonTag::ImageWidth, 2_u32);
    container.add_tag(TiffCommonTag::ImageLength, 2_u32);
    container.add_tag(TiffCommonTag::RowsPerStrip, 1_u32);
    container.write_scanline(0, &[0xaa, 0xbb, 0xcc, 0xdd])?;
    container.write_scanline(1, &[0x11, 0x22, 0x33, 0x44])?;
    assert!(container.write_scanline(2, &[0]).is_err());
    container.finish()?;

    let buffer = output.into_inner();
    let reader = GenericTiffReader::new_with_buffer(&buffer)?;
    let root = reader.root_ifd();
    let offsets = &root.get_entry(TiffCommonTag::StripOffsets).unwrap().value;
    let sizes = &root.get_entry(TiffCommonTag::StripByteCounts).unwrap().value;
    assert_eq!(sizes.get_u32(0), Some(4));
    assert_eq!(sizes.get_u32(1), Some(4));
    let first = offsets.get_u32(0).unwrap() as usize;
    assert_eq!(&buffer[first..first + 4], &[0xaa, 0xbb, 0xcc, 0xdd]);
    let second = offsets.get_u32(1).unwrap() as usize;
    assert_eq!(&buffer[second..second + 4], &[0x11, 0x22, 0x33, 0x44]);
    Ok(())
  }

  #[test]
  fn append_rejects_foreign_byte_order() {
    // Header of a valid TIFF in the opposite byte order of this machine
    let foreign = match Endian::native() {
      Endian::Little => Endian::Big,
      Endian::Big => Endian::Little,
    };
    let mut data = foreign.order_mark().to_vec();
    match foreign {
      Endian::Little => data.extend_from_slice(&42_u16.to_le_bytes()),
      Endian::Big => data.extend_from_slice(&42_u16.to_be_bytes()),
    }
    data.extend_from_slice(&[0, 0, 0, 0]);

    let err = ScanlineWriter::append(Cursor::new(data), 1).err().unwrap();
    assert!(matches!(err, TiffError::FormatMismatch(_)));
  }

  #[test]
  fn append_chains_a_second_directory() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut output = Cursor::new(Vec::new());

    let mut first = ScanlineWriter::new(&mut output, 1)?;
    first.add_tag(TiffCommonTag::ImageWidth, 1_u32);
    first.write_scanline(0, &[1, 0])?;
    first.finish()?;

    let mut second = ScanlineWriter::append(&mut output, 1)?;
    second.add_tag(TiffCommonTag::ImageWidth, 1_u32);
    second.write_scanline(0, &[2, 0])?;
    second.finish()?;

    let reader = GenericTiffReader::new(&mut output)?;
    assert_eq!(reader.chains().len(), 2);
    assert!(reader.chains()[1].has_entry(TiffCommonTag::StripOffsets));
    Ok(())
  }
}
