// SPDX-License-Identifier: LGPL-2.1

/// Marker for enums usable as TIFF tag identifiers.
pub trait TiffTag: Into<u16> + Copy {}

macro_rules! tiff_tag_enum {
  {
    $( #[$enum_attr:meta] )*
    $name:ident {
      $( $(#[$tag_attr:meta])* $tag:ident = $val:expr, )*
    }
  } => {
    $( #[$enum_attr] )*
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(u16)]
    pub enum $name {
      $( $(#[$tag_attr])* $tag = $val, )*
    }

    impl From<$name> for u16 {
      fn from(value: $name) -> Self {
        value as u16
      }
    }

    impl TiffTag for $name {}
  };
}

tiff_tag_enum! {
  /// Baseline and TIFF-EP tags
  TiffCommonTag {
    NewSubFileType = 254,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInt = 262,
    Make = 271,
    Model = 272,
    StripOffsets = 273,
    Orientation = 274,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    PlanarConfig = 284,
    Software = 305,
    Artist = 315,
    SampleFormat = 339,
    CFARepeatPatternDim = 33421,
    CFAPattern = 33422,
  }
}

tiff_tag_enum! {
  /// Tags defined by the DNG specification
  DngTag {
    DNGVersion = 50706,
    DNGBackwardVersion = 50707,
    UniqueCameraModel = 50708,
    CFAPlaneColor = 50710,
    CFALayout = 50711,
    BlackLevel = 50714,
    WhiteLevel = 50717,
    ColorMatrix1 = 50721,
    ColorMatrix2 = 50722,
    AsShotNeutral = 50728,
    ActiveArea = 50829,
  }
}
