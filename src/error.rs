use crate::png::{ChunkType, PngColorType};

/// An error from decoding PNG data.
///
/// Every error is terminal for the decode call that produced it. Decoding is
/// deterministic, so retrying the same input will just fail the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The first 8 bytes of the stream aren't the PNG signature.
  MagicMismatch,

  /// The byte source ran out in the middle of a chunk.
  Truncated,

  /// The byte source ran out cleanly between chunks, but no `IEND` chunk was
  /// seen yet.
  MissingEndChunk,

  /// The first chunk wasn't `IHDR`, or a critical chunk appeared somewhere it
  /// isn't allowed (such as a second `IHDR`).
  ChunkOrderViolation,

  /// A chunk type that we don't know, and which is marked as critical.
  UnknownCriticalChunk(ChunkType),

  /// A chunk declared a length over the `2^31 - 1` maximum.
  ChunkTooLong,

  /// The CRC stored after a chunk doesn't match the chunk's contents.
  CrcMismatch {
    /// The chunk with the bad checksum.
    chunk_type: ChunkType,
    /// The CRC value stored in the data stream.
    declared: u32,
    /// The CRC value computed from the chunk's type and data.
    actual: u32,
  },

  /// The `IHDR` data isn't exactly 13 bytes.
  InvalidHeaderLength,

  /// The header's bit depth isn't allowed for the header's color type.
  InvalidBitDepth {
    /// The declared color type.
    color_type: PngColorType,
    /// The declared bit depth.
    bit_depth: u8,
  },

  /// A header field (color type, compression method, filter method, or
  /// interlace method) has a value that the format doesn't define.
  UnrecognizedEnumValue,

  /// The declared width and/or height of this image is 0.
  WidthOrHeightZero,

  /// The image is too large.
  ///
  /// Either a dimension is over the format's `2^31 - 1` limit, or it's over
  /// the `max_dimension` set in the
  /// [`DecodeOptions`](crate::png::DecodeOptions).
  DimensionsTooLarge,

  /// The header is legal, but its bit depth and color type don't map to a
  /// pixel format that this crate reconstructs.
  UnsupportedPixelFormat,

  /// The header is legal, but the image is Adam7 interlaced.
  InterlaceUnsupported,

  /// The stream ended properly but never had any `IDAT` data.
  MissingImageData,

  /// The decompressor rejected the compressed image data.
  Decompression,

  /// The decompressed data is too short for the image's dimensions.
  NotEnoughImageData,

  /// A scanline started with a filter type byte that isn't 0 through 4.
  UnrecognizedFilterAlgorithm(u8),

  /// The allocator couldn't give us enough space.
  Alloc,

  /// A checked math operation failed.
  CheckedMath,

  /// The byte source reported an I/O error.
  #[cfg(feature = "std")]
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  Io(std::io::ErrorKind),
}

/// Shorthand for a result with a [`PngError`].
pub type PngResult<T> = Result<T, PngError>;

impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for PngError {
  #[inline]
  fn from(e: std::io::Error) -> Self {
    match e.kind() {
      std::io::ErrorKind::UnexpectedEof => Self::Truncated,
      kind => Self::Io(kind),
    }
  }
}

impl core::fmt::Display for PngError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::MagicMismatch => write!(f, "invalid magic header"),
      Self::Truncated => write!(f, "data stream truncated"),
      Self::MissingEndChunk => write!(f, "missing IEND chunk"),
      Self::ChunkOrderViolation => write!(f, "chunk order violation"),
      Self::UnknownCriticalChunk(ty) => write!(f, "unknown critical chunk `{ty}`"),
      Self::ChunkTooLong => write!(f, "chunk length over 2^31-1"),
      Self::CrcMismatch { chunk_type, declared, actual } => {
        write!(f, "`{chunk_type}` CRC mismatch: declared {declared:#010X}, actual {actual:#010X}")
      }
      Self::InvalidHeaderLength => write!(f, "invalid header length"),
      Self::InvalidBitDepth { color_type, bit_depth } => {
        write!(f, "bit depth {bit_depth} is invalid for color type {color_type:?}")
      }
      Self::UnrecognizedEnumValue => write!(f, "unrecognized header enum value"),
      Self::WidthOrHeightZero => write!(f, "width or height is zero"),
      Self::DimensionsTooLarge => write!(f, "image dimensions too large"),
      Self::UnsupportedPixelFormat => write!(f, "unsupported pixel format"),
      Self::InterlaceUnsupported => write!(f, "interlaced images are unsupported"),
      Self::MissingImageData => write!(f, "no IDAT data"),
      Self::Decompression => write!(f, "zlib decompression failed"),
      Self::NotEnoughImageData => write!(f, "not enough decompressed image data"),
      Self::UnrecognizedFilterAlgorithm(x) => write!(f, "unrecognized filter algorithm {x}"),
      Self::Alloc => write!(f, "allocation failure"),
      Self::CheckedMath => write!(f, "checked math overflow"),
      #[cfg(feature = "std")]
      Self::Io(kind) => write!(f, "i/o error: {kind:?}"),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for PngError {}
