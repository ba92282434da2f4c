use super::*;

/// The four byte type code of a PNG chunk.
///
/// Each byte is meant to be an ascii letter, and bit 5 of each byte (the ascii
/// lowercase bit) is a property flag:
///
/// | byte | lowercase means |
/// |:-:|:-|
/// | 0 | ancillary (safe to ignore if unknown) |
/// | 1 | private (not defined by the PNG standard) |
/// | 2 | reserved, should always be uppercase |
/// | 3 | safe to copy when editing an image |
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ChunkType(pub AsciiArray<4>);
#[allow(nonstandard_style)]
impl ChunkType {
  /// Image header
  pub const IHDR: Self = Self(AsciiArray(*b"IHDR"));
  /// Palette
  pub const PLTE: Self = Self(AsciiArray(*b"PLTE"));
  /// Image data
  pub const IDAT: Self = Self(AsciiArray(*b"IDAT"));
  /// Image end
  pub const IEND: Self = Self(AsciiArray(*b"IEND"));

  const ANCILLARY_BIT: u32 = 1 << 29;
  const PRIVATE_BIT: u32 = 1 << 21;
  const RESERVED_BIT: u32 = 1 << 13;
  const SAFE_TO_COPY_BIT: u32 = 1 << 5;

  /// Makes a chunk type from its bytes.
  #[inline]
  #[must_use]
  pub const fn new(bytes: [u8; 4]) -> Self {
    Self(AsciiArray(bytes))
  }

  /// The type code bytes.
  #[inline]
  #[must_use]
  pub const fn to_bytes(self) -> [u8; 4] {
    self.0 .0
  }

  /// The type code as a big-endian `u32`.
  #[inline]
  #[must_use]
  pub const fn to_u32(self) -> u32 {
    u32::from_be_bytes(self.0 .0)
  }

  /// If a decoder must understand this chunk type to decode the image.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.to_u32() & Self::ANCILLARY_BIT) == 0
  }

  /// If this chunk type is registered in the PNG standard.
  #[inline]
  #[must_use]
  pub const fn is_public(self) -> bool {
    (self.to_u32() & Self::PRIVATE_BIT) == 0
  }

  /// If the reserved bit is set, which no current chunk type should have.
  #[inline]
  #[must_use]
  pub const fn is_reserved_bit_set(self) -> bool {
    (self.to_u32() & Self::RESERVED_BIT) != 0
  }

  /// If an editor that doesn't understand this chunk may copy it anyway.
  #[inline]
  #[must_use]
  pub const fn is_safe_to_copy(self) -> bool {
    (self.to_u32() & Self::SAFE_TO_COPY_BIT) != 0
  }

  /// Classifies the chunk type.
  #[inline]
  #[must_use]
  pub const fn kind(self) -> ChunkKind {
    match &self.0 .0 {
      b"IHDR" => ChunkKind::Header,
      b"PLTE" => ChunkKind::Palette,
      b"IDAT" => ChunkKind::ImageData,
      b"IEND" => ChunkKind::End,
      _ => ChunkKind::Opaque(self),
    }
  }
}
impl core::fmt::Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(&self.0, f)
  }
}
impl core::fmt::Display for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Display::fmt(&self.0, f)
  }
}
impl From<[u8; 4]> for ChunkType {
  #[inline]
  #[must_use]
  fn from(bytes: [u8; 4]) -> Self {
    Self::new(bytes)
  }
}

/// The chunk types that the decoder acts on.
///
/// Anything else is `Opaque`, and gets skipped or rejected based on
/// [`is_critical`](ChunkType::is_critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkKind {
  /// `IHDR`
  Header,
  /// `PLTE`
  Palette,
  /// `IDAT`
  ImageData,
  /// `IEND`
  End,
  /// Any other chunk type.
  Opaque(ChunkType),
}

#[test]
fn test_chunk_type_kind() {
  assert_eq!(ChunkType::IHDR.kind(), ChunkKind::Header);
  assert_eq!(ChunkType::PLTE.kind(), ChunkKind::Palette);
  assert_eq!(ChunkType::IDAT.kind(), ChunkKind::ImageData);
  assert_eq!(ChunkType::IEND.kind(), ChunkKind::End);
  let text = ChunkType::new(*b"tEXt");
  assert_eq!(text.kind(), ChunkKind::Opaque(text));
  assert_eq!(ChunkType::IHDR.to_u32(), 0x4948_4452);
}

#[test]
fn test_chunk_type_property_bits() {
  for critical in [ChunkType::IHDR, ChunkType::PLTE, ChunkType::IDAT, ChunkType::IEND] {
    assert!(critical.is_critical(), "{critical:?}");
    assert!(critical.is_public(), "{critical:?}");
    assert!(!critical.is_safe_to_copy(), "{critical:?}");
  }
  let text = ChunkType::new(*b"tEXt");
  assert!(!text.is_critical());
  assert!(text.is_public());
  assert!(!text.is_reserved_bit_set());
  assert!(text.is_safe_to_copy());
  let private = ChunkType::new(*b"prvt");
  assert!(!private.is_critical());
  assert!(!private.is_public());
  assert!(private.is_reserved_bit_set());
  // criticality only looks at the first byte
  assert!(ChunkType::new(*b"Abcd").is_critical());
  assert!(!ChunkType::new(*b"aBCD").is_critical());
}
