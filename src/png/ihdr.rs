use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Grayscale = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Palette = 3,
  /// Greyscale + Alpha
  GrayscaleAlpha = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Grayscale => 1,
      Self::RGB => 3,
      Self::Palette => 1,
      Self::GrayscaleAlpha => 2,
      Self::RGBA => 4,
    }
  }

  /// The bit depths that are legal with this color type.
  #[inline]
  #[must_use]
  pub const fn allowed_bit_depths(self) -> &'static [u8] {
    match self {
      Self::Grayscale => &[1, 2, 4, 8, 16],
      Self::RGB => &[8, 16],
      Self::Palette => &[1, 2, 4, 8],
      Self::GrayscaleAlpha => &[8, 16],
      Self::RGBA => &[8, 16],
    }
  }

  /// If the bit depth is legal with this color type.
  #[inline]
  #[must_use]
  pub fn allows_bit_depth(self, bit_depth: u8) -> bool {
    self.allowed_bit_depths().contains(&bit_depth)
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Grayscale,
      2 => PngColorType::RGB,
      3 => PngColorType::Palette,
      4 => PngColorType::GrayscaleAlpha,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::UnrecognizedEnumValue),
    })
  }
}

/// How the image data is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CompressionMethod {
  /// Zlib (deflate) compression with a window of at most 32k.
  ///
  /// This is the only method PNG defines.
  Deflate = 0,
}
impl TryFrom<u8> for CompressionMethod {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Deflate),
      _ => Err(PngError::UnrecognizedEnumValue),
    }
  }
}

/// How the scanlines are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterMethod {
  /// Each scanline picks one of the five [filter types](FilterType).
  ///
  /// This is the only method PNG defines.
  Adaptive = 0,
}
impl TryFrom<u8> for FilterMethod {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Adaptive),
      _ => Err(PngError::UnrecognizedEnumValue),
    }
  }
}

/// How the scanlines are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum InterlaceMethod {
  /// Scanlines are stored top to bottom.
  None = 0,
  /// The image is stored as seven reduced images.
  ///
  /// Please don't make new interlaced images, they're terrible.
  Adam7 = 1,
}
impl TryFrom<u8> for InterlaceMethod {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::None),
      1 => Ok(Self::Adam7),
      _ => Err(PngError::UnrecognizedEnumValue),
    }
  }
}

/// `IHDR`: Image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PngHeader {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per channel
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  /// always deflate
  pub compression_method: CompressionMethod,
  /// always adaptive
  pub filter_method: FilterMethod,
  /// if the image data is stored interlaced.
  pub interlace_method: InterlaceMethod,
}
impl PngHeader {
  /// The exact size of `IHDR` chunk data.
  pub const LEN: usize = 13;

  /// The largest width or height PNG allows.
  pub const MAX_DIMENSION: u32 = (1 << 31) - 1;

  /// Bits per pixel.
  #[inline]
  #[must_use]
  pub const fn bits_per_pixel(&self) -> usize {
    (self.bit_depth as usize) * self.color_type.channel_count()
  }

  /// Bytes of pixel data per (non-interlaced) scanline, not counting the
  /// filter type byte.
  ///
  /// When pixels are less than 8 bits it's possible to end up with partial
  /// bytes on the end, so this rounds up.
  #[inline]
  pub fn bytes_per_scanline(&self) -> PngResult<usize> {
    let bits = self.bits_per_pixel().checked_mul(self.width as usize).ok_or(PngError::CheckedMath)?;
    Ok(bits / 8 + usize::from(bits % 8 != 0))
  }

  /// Bytes per filtered scanline: one filter type byte plus the pixel data.
  #[inline]
  pub fn bytes_per_filterline(&self) -> PngResult<usize> {
    self.bytes_per_scanline()?.checked_add(1).ok_or(PngError::CheckedMath)
  }

  /// The number of decompressed bytes a non-interlaced image should have.
  #[inline]
  pub fn filtered_len(&self) -> PngResult<usize> {
    self.bytes_per_filterline()?.checked_mul(self.height as usize).ok_or(PngError::CheckedMath)
  }

  /// Total number of pixels.
  #[inline]
  pub fn pixel_count(&self) -> PngResult<usize> {
    (self.width as usize).checked_mul(self.height as usize).ok_or(PngError::CheckedMath)
  }
}
impl TryFrom<&[u8]> for PngHeader {
  type Error = PngError;
  /// Parses `IHDR` chunk data.
  fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression, filter, interlace] => {
        let width = u32_be([w0, w1, w2, w3]);
        let height = u32_be([h0, h1, h2, h3]);
        if width == 0 || height == 0 {
          return Err(PngError::WidthOrHeightZero);
        }
        if width > Self::MAX_DIMENSION || height > Self::MAX_DIMENSION {
          return Err(PngError::DimensionsTooLarge);
        }
        let color_type = PngColorType::try_from(color_type)?;
        if !color_type.allows_bit_depth(bit_depth) {
          return Err(PngError::InvalidBitDepth { color_type, bit_depth });
        }
        Ok(Self {
          width,
          height,
          bit_depth,
          color_type,
          compression_method: CompressionMethod::try_from(compression)?,
          filter_method: FilterMethod::try_from(filter)?,
          interlace_method: InterlaceMethod::try_from(interlace)?,
        })
      }
      _ => Err(PngError::InvalidHeaderLength),
    }
  }
}

/// Parses `IHDR` chunk data into a header.
///
/// ## Failure
/// * [`PngError::InvalidHeaderLength`] unless there's exactly 13 bytes.
/// * [`PngError::WidthOrHeightZero`] or [`PngError::DimensionsTooLarge`] for
///   bad dimensions.
/// * [`PngError::UnrecognizedEnumValue`] if the color type, compression
///   method, filter method, or interlace method isn't defined.
/// * [`PngError::InvalidBitDepth`] if the bit depth isn't allowed with the
///   color type.
#[inline]
pub fn parse_header(data: &[u8]) -> PngResult<PngHeader> {
  PngHeader::try_from(data)
}

#[cfg(test)]
fn ihdr_bytes(width: u32, height: u32, bit_depth: u8, color_type: u8) -> [u8; 13] {
  let mut out = [0_u8; 13];
  out[0..4].copy_from_slice(&width.to_be_bytes());
  out[4..8].copy_from_slice(&height.to_be_bytes());
  out[8] = bit_depth;
  out[9] = color_type;
  out
}

#[test]
fn test_parse_header_fields() {
  let header = parse_header(&ihdr_bytes(96, 64, 8, 6)).unwrap();
  assert_eq!(
    header,
    PngHeader {
      width: 96,
      height: 64,
      bit_depth: 8,
      color_type: PngColorType::RGBA,
      compression_method: CompressionMethod::Deflate,
      filter_method: FilterMethod::Adaptive,
      interlace_method: InterlaceMethod::None,
    }
  );
  assert_eq!(header.bytes_per_filterline(), Ok(96 * 4 + 1));
  assert_eq!(header.filtered_len(), Ok((96 * 4 + 1) * 64));
  assert_eq!(header.pixel_count(), Ok(96 * 64));
}

#[test]
fn test_parse_header_bit_depth_matrix() {
  for color_type in [0_u8, 2, 3, 4, 6] {
    let ct = PngColorType::try_from(color_type).unwrap();
    for bit_depth in 0..=u8::MAX {
      let res = parse_header(&ihdr_bytes(1, 1, bit_depth, color_type));
      if ct.allowed_bit_depths().contains(&bit_depth) {
        assert!(res.is_ok(), "{ct:?} {bit_depth}");
      } else {
        assert_eq!(res, Err(PngError::InvalidBitDepth { color_type: ct, bit_depth }));
      }
    }
  }
}

#[test]
fn test_parse_header_bad_lengths() {
  let full = ihdr_bytes(1, 1, 8, 2);
  assert_eq!(parse_header(&full[..12]), Err(PngError::InvalidHeaderLength));
  let mut long = [0_u8; 14];
  long[..13].copy_from_slice(&full);
  assert_eq!(parse_header(&long), Err(PngError::InvalidHeaderLength));
  assert_eq!(parse_header(&[]), Err(PngError::InvalidHeaderLength));
}

#[test]
fn test_parse_header_bad_enums() {
  for color_type in [1_u8, 5, 7, 255] {
    let res = parse_header(&ihdr_bytes(1, 1, 8, color_type));
    assert_eq!(res, Err(PngError::UnrecognizedEnumValue));
  }
  for (index, bad) in [(10, 1_u8), (11, 1), (12, 2)] {
    let mut data = ihdr_bytes(1, 1, 8, 2);
    data[index] = bad;
    assert_eq!(parse_header(&data), Err(PngError::UnrecognizedEnumValue), "{index}");
  }
  let mut adam7 = ihdr_bytes(1, 1, 8, 2);
  adam7[12] = 1;
  assert_eq!(parse_header(&adam7).unwrap().interlace_method, InterlaceMethod::Adam7);
}

#[test]
fn test_parse_header_bad_dimensions() {
  assert_eq!(parse_header(&ihdr_bytes(0, 1, 8, 2)), Err(PngError::WidthOrHeightZero));
  assert_eq!(parse_header(&ihdr_bytes(1, 0, 8, 2)), Err(PngError::WidthOrHeightZero));
  assert_eq!(parse_header(&ihdr_bytes(1 << 31, 1, 8, 2)), Err(PngError::DimensionsTooLarge));
}

#[test]
fn test_sub_byte_scanline_rounds_up() {
  let header = parse_header(&ihdr_bytes(9, 1, 1, 0)).unwrap();
  assert_eq!(header.bytes_per_scanline(), Ok(2));
  let header = parse_header(&ihdr_bytes(3, 1, 4, 3)).unwrap();
  assert_eq!(header.bytes_per_scanline(), Ok(2));
}
