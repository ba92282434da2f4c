//! Module for pixel formats.
//!
//! There's two main factors with a pixel format:
//! * **Channels:** generally one or more of red, green, blue, and alpha. Some
//!   formats only use gray, marked as "Y" in format names. Other channel
//!   combinations also exist.
//! * **Bit Depth:** how many bits per channel.
//!
//! PNG allows for fifteen combinations of the two, which are all checked by
//! the header parser. Pixel reconstruction resolves the header down to one of
//! the formats in [`PixelFormat`], which are the only formats that a
//! [`PixelStorage`](crate::PixelStorage) can hold.

use bytemuck::{Pod, Zeroable};
use pixel_formats::r8g8b8a8_Srgb;

use crate::{
  png::PngColorType,
  PngError, PngResult,
};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl From<RGB8> for r8g8b8a8_Srgb {
  #[inline]
  #[must_use]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    r8g8b8a8_Srgb { r, g, b, a: 0xFF }
  }
}
impl From<RGBA8> for r8g8b8a8_Srgb {
  #[inline]
  #[must_use]
  fn from(RGBA8 { r, g, b, a }: RGBA8) -> Self {
    r8g8b8a8_Srgb { r, g, b, a }
  }
}

/// The in-memory pixel formats that decoded PNG data can be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PixelFormat {
  /// [`RGB8`] pixels, from 8-bit RGB images.
  RGB8,
  /// [`RGBA8`] pixels, from 8-bit RGBA images.
  RGBA8,
}
impl PixelFormat {
  /// Resolves a header's bit depth and color type into a pixel format.
  ///
  /// ## Failure
  /// * [`PngError::UnsupportedPixelFormat`] for anything other than 8-bit RGB
  ///   or 8-bit RGBA. This is separate from header legality: a 16-bit RGB
  ///   image has a perfectly legal header, it just doesn't resolve here.
  #[inline]
  pub const fn resolve(bit_depth: u8, color_type: PngColorType) -> PngResult<Self> {
    match (bit_depth, color_type) {
      (8, PngColorType::RGB) => Ok(Self::RGB8),
      (8, PngColorType::RGBA) => Ok(Self::RGBA8),
      _ => Err(PngError::UnsupportedPixelFormat),
    }
  }

  /// Bytes per pixel.
  ///
  /// This is also the byte distance to the "left" neighbor used by the
  /// unfiltering process.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> usize {
    match self {
      Self::RGB8 => core::mem::size_of::<RGB8>(),
      Self::RGBA8 => core::mem::size_of::<RGBA8>(),
    }
  }
}

#[test]
fn test_pixel_format_resolve() {
  assert_eq!(PixelFormat::resolve(8, PngColorType::RGB), Ok(PixelFormat::RGB8));
  assert_eq!(PixelFormat::resolve(8, PngColorType::RGBA), Ok(PixelFormat::RGBA8));
  assert_eq!(PixelFormat::RGB8.bytes_per_pixel(), 3);
  assert_eq!(PixelFormat::RGBA8.bytes_per_pixel(), 4);
  for (bit_depth, color_type) in [
    (16, PngColorType::RGB),
    (16, PngColorType::RGBA),
    (8, PngColorType::Palette),
    (8, PngColorType::Grayscale),
    (8, PngColorType::GrayscaleAlpha),
    (1, PngColorType::Grayscale),
  ] {
    assert_eq!(
      PixelFormat::resolve(bit_depth, color_type),
      Err(PngError::UnsupportedPixelFormat),
      "{bit_depth} {color_type:?}"
    );
  }
}
