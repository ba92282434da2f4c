#![forbid(unsafe_code)]

//! Provides heap-allocated image types.

use alloc::vec::Vec;

use pixel_formats::r8g8b8a8_Srgb;

use crate::{PixelFormat, PngError, PngResult, RGB8, RGBA8};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// This is how the image containers convert 2d coordinates into index values
/// within their payload vectors, and it's the order in which the decoder
/// writes pixels.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// Decoded pixels, tagged by their [`PixelFormat`].
///
/// Pixels are stored row-major: left to right, then top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PixelStorage {
  /// 8-bit RGB pixels.
  RGB8(Vec<RGB8>),
  /// 8-bit RGBA pixels.
  RGBA8(Vec<RGBA8>),
}
impl PixelStorage {
  /// Makes empty storage of the given format with room for `pixel_count`
  /// pixels.
  ///
  /// ## Failure
  /// * [`PngError::Alloc`] if the space can't be reserved.
  pub fn try_new(format: PixelFormat, pixel_count: usize) -> PngResult<Self> {
    Ok(match format {
      PixelFormat::RGB8 => {
        let mut v = Vec::new();
        v.try_reserve_exact(pixel_count)?;
        Self::RGB8(v)
      }
      PixelFormat::RGBA8 => {
        let mut v = Vec::new();
        v.try_reserve_exact(pixel_count)?;
        Self::RGBA8(v)
      }
    })
  }

  /// The format of the stored pixels.
  #[inline]
  #[must_use]
  pub const fn format(&self) -> PixelFormat {
    match self {
      Self::RGB8(_) => PixelFormat::RGB8,
      Self::RGBA8(_) => PixelFormat::RGBA8,
    }
  }

  /// The number of pixels stored.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::RGB8(v) => v.len(),
      Self::RGBA8(v) => v.len(),
    }
  }

  /// If there's no pixels stored.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The pixels as bytes, in their stored channel order.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::RGB8(v) => bytemuck::cast_slice(v.as_slice()),
      Self::RGBA8(v) => bytemuck::cast_slice(v.as_slice()),
    }
  }

  /// Gets the pixel at `index` converted to sRGB RGBA (opaque for RGB data).
  #[inline]
  #[must_use]
  pub fn get_rgba(&self, index: usize) -> Option<r8g8b8a8_Srgb> {
    match self {
      Self::RGB8(v) => v.get(index).copied().map(r8g8b8a8_Srgb::from),
      Self::RGBA8(v) => v.get(index).copied().map(r8g8b8a8_Srgb::from),
    }
  }

  /// Appends one reconstructed scanline of bytes as pixels.
  ///
  /// The row's length must be a whole number of pixels.
  pub(crate) fn push_row(&mut self, row: &[u8]) -> PngResult<()> {
    match self {
      Self::RGB8(v) => {
        let pixels: &[RGB8] =
          bytemuck::try_cast_slice(row).map_err(|_| PngError::NotEnoughImageData)?;
        v.try_reserve(pixels.len())?;
        v.extend_from_slice(pixels);
      }
      Self::RGBA8(v) => {
        let pixels: &[RGBA8] =
          bytemuck::try_cast_slice(row).map_err(|_| PngError::NotEnoughImageData)?;
        v.try_reserve(pixels.len())?;
        v.extend_from_slice(pixels);
      }
    }
    Ok(())
  }
}

/// A direct-color image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P = r8g8b8a8_Srgb> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      let i = xy_width_to_index(x, y, self.width);
      self.pixels.get_mut(i)
    } else {
      None
    }
  }
}
impl<P> Bitmap<P>
where
  P: From<r8g8b8a8_Srgb>,
{
  /// Converts stored pixels into a bitmap of any pixel type that can be made
  /// from sRGB RGBA.
  ///
  /// ## Failure
  /// * [`PngError::Alloc`] if the space can't be reserved.
  pub fn try_from_storage(width: u32, height: u32, storage: &PixelStorage) -> PngResult<Self> {
    let mut pixels: Vec<P> = Vec::new();
    pixels.try_reserve_exact(storage.len())?;
    match storage {
      PixelStorage::RGB8(v) => {
        pixels.extend(v.iter().copied().map(|p| P::from(r8g8b8a8_Srgb::from(p))))
      }
      PixelStorage::RGBA8(v) => {
        pixels.extend(v.iter().copied().map(|p| P::from(r8g8b8a8_Srgb::from(p))))
      }
    }
    Ok(Self { width, height, pixels })
  }
}

#[test]
fn test_pixel_storage_push_row() {
  let mut s = PixelStorage::try_new(PixelFormat::RGB8, 2).unwrap();
  assert!(s.is_empty());
  s.push_row(&[1, 2, 3, 4, 5, 6]).unwrap();
  assert_eq!(s.len(), 2);
  assert_eq!(
    s,
    PixelStorage::RGB8(alloc::vec![RGB8 { r: 1, g: 2, b: 3 }, RGB8 { r: 4, g: 5, b: 6 }])
  );
  assert_eq!(s.get_rgba(1).map(|p| [p.r, p.g, p.b, p.a]), Some([4, 5, 6, 255]));
  assert_eq!(s.as_bytes(), &[1, 2, 3, 4, 5, 6]);
  // partial pixels are an error
  assert_eq!(s.push_row(&[1, 2]), Err(PngError::NotEnoughImageData));
}

#[test]
fn test_bitmap_from_rgba_storage() {
  let s = PixelStorage::RGBA8(alloc::vec![
    RGBA8 { r: 0, g: 0, b: 0, a: 0 },
    RGBA8 { r: 9, g: 8, b: 7, a: 6 },
  ]);
  let mut bitmap: Bitmap = Bitmap::try_from_storage(2, 1, &s).unwrap();
  assert_eq!(bitmap.get(1, 0).map(|p| [p.r, p.g, p.b, p.a]), Some([9, 8, 7, 6]));
  assert!(bitmap.get(2, 0).is_none());
  bitmap.get_mut(0, 0).unwrap().a = 200;
  assert_eq!(bitmap.get(0, 0).map(|p| p.a), Some(200));
  assert!(bitmap.get_mut(0, 1).is_none());
  assert_eq!(xy_width_to_index(16, 24, 96), 96 * 24 + 16);
}
