use alloc::vec::Vec;

use super::*;

/// Where the decoder is within the chunk stream.
///
/// Reaching `IEND` ends the chunk loop, so there's no state after this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
  ExpectHeader,
  Accumulating { header: PngHeader, seen_palette: bool, seen_idat: bool },
}

/// A decoded PNG image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PngImage {
  header: PngHeader,
  pixels: PixelStorage,
}
impl PngImage {
  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.header.width
  }
  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.header.height
  }
  /// The format of the pixel data.
  #[inline]
  #[must_use]
  pub const fn pixel_format(&self) -> PixelFormat {
    self.pixels.format()
  }
  /// The image's header.
  #[inline]
  #[must_use]
  pub const fn header(&self) -> &PngHeader {
    &self.header
  }
  /// The pixels, row-major.
  #[inline]
  #[must_use]
  pub const fn pixels(&self) -> &PixelStorage {
    &self.pixels
  }
  /// Takes the pixels.
  #[inline]
  #[must_use]
  pub fn into_pixels(self) -> PixelStorage {
    self.pixels
  }
  /// Converts the image into a [`Bitmap`] of any pixel type that can be made
  /// from sRGB RGBA.
  ///
  /// ## Failure
  /// * [`PngError::Alloc`] if the new pixel buffer can't be allocated.
  #[inline]
  pub fn to_bitmap<P>(&self) -> PngResult<Bitmap<P>>
  where
    P: From<pixel_formats::r8g8b8a8_Srgb>,
  {
    Bitmap::try_from_storage(self.header.width, self.header.height, &self.pixels)
  }
}

/// Decodes PNG data streams.
///
/// The decoder is generic over the [`Decompressor`] used for the image data.
/// With the `miniz_oxide` feature there's a default of [`ZlibDecompressor`].
///
/// ```no_run
/// # #[cfg(feature = "miniz_oxide")]
/// # fn main() -> pngread::PngResult<()> {
/// use pngread::png::{DecodeOptions, PngDecoder};
/// let bytes: &[u8] = unimplemented!();
/// let mut decoder = PngDecoder::new().with_options(DecodeOptions::new().with_crc_checks(false));
/// let image = decoder.decode(bytes)?;
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "miniz_oxide"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone)]
pub struct PngDecoder<D> {
  options: DecodeOptions,
  decompressor: D,
}
#[cfg(feature = "miniz_oxide")]
impl PngDecoder<ZlibDecompressor> {
  /// A decoder with default options, using [`ZlibDecompressor`].
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { options: DecodeOptions::new(), decompressor: ZlibDecompressor::new() }
  }
}
#[cfg(feature = "miniz_oxide")]
impl Default for PngDecoder<ZlibDecompressor> {
  #[inline]
  #[must_use]
  fn default() -> Self {
    Self::new()
  }
}
impl<D: Decompressor> PngDecoder<D> {
  /// A decoder with default options, using the decompressor given.
  #[inline]
  #[must_use]
  pub const fn with_decompressor(decompressor: D) -> Self {
    Self { options: DecodeOptions::new(), decompressor }
  }

  /// Replaces the decoder's options.
  #[inline]
  #[must_use]
  pub fn with_options(self, options: DecodeOptions) -> Self {
    Self { options, ..self }
  }

  /// The decoder's options.
  #[inline]
  #[must_use]
  pub const fn options(&self) -> &DecodeOptions {
    &self.options
  }

  /// Decodes one PNG data stream from the source.
  ///
  /// Reading stops at the `IEND` chunk, anything after it is left in the
  /// source.
  ///
  /// ## Failure
  /// * Any [`PngError`]. Every error stops the decode, and no partial image is
  ///   returned.
  pub fn decode<S: ByteSource>(&mut self, mut src: S) -> PngResult<PngImage> {
    let mut magic = [0_u8; 8];
    if src.read_bytes(&mut magic)? != magic.len() || !is_png_header_correct(&magic) {
      return Err(PngError::MagicMismatch);
    }

    let mut compressed: Vec<u8> = Vec::new();
    let mut state = DecodeState::ExpectHeader;
    let mut chunks = ChunkReader::new(&mut src).with_crc_checks(self.options.check_crc);
    let header = loop {
      let chunk = chunks.read_chunk()?.ok_or(PngError::MissingEndChunk)?;
      state = match (state, chunk.chunk_type().kind()) {
        (DecodeState::ExpectHeader, ChunkKind::Header) => {
          let header = parse_header(chunk.data())?;
          log::debug!("{header:?}");
          self.check_header_support(&header)?;
          DecodeState::Accumulating { header, seen_palette: false, seen_idat: false }
        }
        (DecodeState::ExpectHeader, _) => return Err(PngError::ChunkOrderViolation),
        (DecodeState::Accumulating { .. }, ChunkKind::Header) => {
          return Err(PngError::ChunkOrderViolation)
        }
        (DecodeState::Accumulating { header, seen_palette, seen_idat }, ChunkKind::Palette) => {
          if seen_palette || seen_idat {
            return Err(PngError::ChunkOrderViolation);
          }
          log::debug!("ignoring `PLTE` with {} bytes", chunk.data().len());
          DecodeState::Accumulating { header, seen_palette: true, seen_idat }
        }
        (DecodeState::Accumulating { header, seen_palette, .. }, ChunkKind::ImageData) => {
          let data = chunk.data();
          compressed.try_reserve(data.len())?;
          compressed.extend_from_slice(data);
          DecodeState::Accumulating { header, seen_palette, seen_idat: true }
        }
        (DecodeState::Accumulating { header, .. }, ChunkKind::End) => break header,
        (DecodeState::Accumulating { .. }, ChunkKind::Opaque(chunk_type)) => {
          if chunk_type.is_critical() {
            return Err(PngError::UnknownCriticalChunk(chunk_type));
          }
          log::debug!("skipping ancillary chunk `{chunk_type}` ({} bytes)", chunk.data().len());
          state
        }
      };
    };

    if compressed.is_empty() {
      return Err(PngError::MissingImageData);
    }
    // parsing already rejects anything else, but the decompressor and the
    // reconstructor only understand these two.
    if header.compression_method != CompressionMethod::Deflate
      || header.filter_method != FilterMethod::Adaptive
    {
      return Err(PngError::UnrecognizedEnumValue);
    }
    let filtered = self.decompressor.decompress(&compressed, header.filtered_len()?)?;
    drop(compressed);
    log::trace!("decompressed {} bytes of filtered data", filtered.len());
    let pixels = reconstruct(&filtered, &header)?;
    Ok(PngImage { header, pixels })
  }

  /// Rejects images that would fail later, so that no data gets decompressed
  /// for them.
  fn check_header_support(&self, header: &PngHeader) -> PngResult<()> {
    if header.width > self.options.max_dimension || header.height > self.options.max_dimension {
      return Err(PngError::DimensionsTooLarge);
    }
    PixelFormat::resolve(header.bit_depth, header.color_type)?;
    if header.interlace_method != InterlaceMethod::None {
      return Err(PngError::InterlaceUnsupported);
    }
    Ok(())
  }
}

/// Reads just the header of a PNG data stream.
///
/// The signature must be correct and the first chunk must be `IHDR`. Nothing
/// past the header chunk is read, and the header isn't checked against any
/// [`DecodeOptions`].
pub fn png_read_header<S: ByteSource>(mut src: S) -> PngResult<PngHeader> {
  let mut magic = [0_u8; 8];
  if src.read_bytes(&mut magic)? != magic.len() || !is_png_header_correct(&magic) {
    return Err(PngError::MagicMismatch);
  }
  let chunk = ChunkReader::new(src).read_chunk()?.ok_or(PngError::MissingEndChunk)?;
  match chunk.chunk_type().kind() {
    ChunkKind::Header => parse_header(chunk.data()),
    _ => Err(PngError::ChunkOrderViolation),
  }
}

/// Decodes PNG bytes with the default options and [`ZlibDecompressor`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[inline]
pub fn png_decode(bytes: &[u8]) -> PngResult<PngImage> {
  PngDecoder::new().decode(bytes)
}

#[cfg(feature = "miniz_oxide")]
impl<P> Bitmap<P>
where
  P: From<pixel_formats::r8g8b8a8_Srgb>,
{
  /// Decodes PNG bytes into a bitmap.
  ///
  /// ## Failure
  /// * Anything [`png_decode`] can fail with.
  #[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
  pub fn try_from_png_bytes(bytes: &[u8]) -> PngResult<Self> {
    png_decode(bytes)?.to_bitmap()
  }
}
