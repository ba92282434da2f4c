//! Scanline filtering works on **bytes**, not on pixels, regardless of the
//! bit depth or color type of the image.
//!
//! All filter arithmetic is wrapping `u8` arithmetic, which is what makes each
//! filter exactly invertible.

use alloc::vec::Vec;

use super::*;

/// The per-scanline filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// The bytes are unaltered.
  None = 0,
  /// Each byte is stored as the difference from the byte one pixel to the left.
  Sub = 1,
  /// Each byte is stored as the difference from the byte above.
  Up = 2,
  /// Each byte is stored as the difference from the average of the left and
  /// above bytes.
  Average = 3,
  /// Each byte is stored as the difference from the [`paeth_predict`] of the
  /// left, above, and upper left bytes.
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      _ => return Err(PngError::UnrecognizedFilterAlgorithm(value)),
    })
  }
}

/// The Paeth predictor.
///
/// `a` is the byte to the left, `b` is the byte above, and `c` is the byte to
/// the upper left. Whichever of the three is closest to `a + b - c` is
/// returned, with ties going to `a`, then `b`, then `c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // Ties go a, then b, then c. Keep the tests in this order.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses the filtering of one scanline.
///
/// * `filter` is the line's filter type.
/// * `bpp` is the byte distance to the corresponding byte of the pixel to the
///   left (the bytes per pixel, but at least 1).
/// * `prior` is the previous *unfiltered* line, or all zeroes for the first
///   line of an image.
/// * `filtered` is this line's data, without the filter type byte.
/// * `raw` gets the unfiltered data.
///
/// ## Panics
/// * If `prior`, `filtered`, and `raw` aren't all the same length.
pub fn unfilter_line(
  filter: FilterType, bpp: usize, prior: &[u8], filtered: &[u8], raw: &mut [u8],
) {
  assert_eq!(prior.len(), filtered.len());
  assert_eq!(raw.len(), filtered.len());
  let bpp = bpp.max(1);
  // bytes of the first pixel have no left neighbor, so they use zero for `a`
  // and `c`.
  let lead = bpp.min(raw.len());
  match filter {
    FilterType::None => raw.copy_from_slice(filtered),
    FilterType::Sub => {
      raw[..lead].copy_from_slice(&filtered[..lead]);
      for i in lead..raw.len() {
        raw[i] = filtered[i].wrapping_add(raw[i - bpp]);
      }
    }
    FilterType::Up => {
      raw.iter_mut().zip(filtered.iter().copied()).zip(prior.iter().copied()).for_each(
        |((r, x), b)| {
          *r = x.wrapping_add(b);
        },
      );
    }
    FilterType::Average => {
      raw[..lead].iter_mut().zip(filtered.iter().copied()).zip(prior.iter().copied()).for_each(
        |((r, x), b)| {
          *r = x.wrapping_add(b / 2);
        },
      );
      for i in lead..raw.len() {
        let a = raw[i - bpp] as u16;
        let b = prior[i] as u16;
        raw[i] = filtered[i].wrapping_add(((a + b) / 2) as u8);
      }
    }
    FilterType::Paeth => {
      raw[..lead].iter_mut().zip(filtered.iter().copied()).zip(prior.iter().copied()).for_each(
        |((r, x), b)| {
          *r = x.wrapping_add(paeth_predict(0, b, 0));
        },
      );
      for i in lead..raw.len() {
        raw[i] = filtered[i].wrapping_add(paeth_predict(raw[i - bpp], prior[i], prior[i - bpp]));
      }
    }
  }
}

/// Unfilters the decompressed data of an image into pixels.
///
/// The `filtered` data must hold `height` lines of one filter type byte
/// followed by the line's bytes. Any extra data past that is ignored.
///
/// ## Failure
/// * [`PngError::UnsupportedPixelFormat`] if the header's bit depth and color
///   type don't resolve to a [`PixelFormat`].
/// * [`PngError::InterlaceUnsupported`] for interlaced images.
/// * [`PngError::NotEnoughImageData`] if `filtered` is too short.
/// * [`PngError::UnrecognizedFilterAlgorithm`] if a line has a bad filter type.
/// * [`PngError::Alloc`] if the pixel or line buffers can't be allocated.
pub fn reconstruct(filtered: &[u8], header: &PngHeader) -> PngResult<PixelStorage> {
  let format = PixelFormat::resolve(header.bit_depth, header.color_type)?;
  if header.interlace_method != InterlaceMethod::None {
    return Err(PngError::InterlaceUnsupported);
  }
  let bpp = format.bytes_per_pixel();
  let line_len = header.bytes_per_scanline()?;
  let stride = line_len + 1;
  let needed = header.filtered_len()?;
  if filtered.len() < needed {
    return Err(PngError::NotEnoughImageData);
  }
  if filtered.len() > needed {
    log::trace!("ignoring {} bytes past the end of the image data", filtered.len() - needed);
  }

  let mut pixels = PixelStorage::try_new(format, header.pixel_count()?)?;
  let mut current: Vec<u8> = Vec::new();
  current.try_reserve_exact(line_len)?;
  current.resize(line_len, 0);
  // The line "above" the first line is implied to be all zeroes.
  let mut prior: Vec<u8> = Vec::new();
  prior.try_reserve_exact(line_len)?;
  prior.resize(line_len, 0);

  for (y, line) in filtered[..needed].chunks_exact(stride).enumerate() {
    let (tag, line_data) = line.split_at(1);
    let filter = FilterType::try_from(tag[0])?;
    log::trace!("line {y}: {filter:?}");
    unfilter_line(filter, bpp, &prior, line_data, &mut current);
    pixels.push_row(&current)?;
    core::mem::swap(&mut current, &mut prior);
  }
  debug_assert_eq!(Ok(pixels.len()), header.pixel_count());
  Ok(pixels)
}

#[test]
fn test_filter_type_try_from() {
  assert_eq!(FilterType::try_from(0_u8), Ok(FilterType::None));
  assert_eq!(FilterType::try_from(4_u8), Ok(FilterType::Paeth));
  for x in 5..=u8::MAX {
    assert_eq!(FilterType::try_from(x), Err(PngError::UnrecognizedFilterAlgorithm(x)));
  }
}

#[test]
fn test_paeth_predict_tie_breaks() {
  // all three tied (a == b == c): a wins
  assert_eq!(paeth_predict(7, 7, 7), 7);
  // p = a + b - c. With c == b, p == a, so pa == 0 always wins.
  assert_eq!(paeth_predict(10, 20, 20), 10);
  // a == b, c smaller: p = 2a - c, pa == pb, a wins over b.
  assert_eq!(paeth_predict(50, 50, 40), 50);
  // a, b, c = 0, 4, 2: p = 2, pa = 2, pb = 2, pc = 0: c strictly wins.
  assert_eq!(paeth_predict(0, 4, 2), 2);
  // a, b, c = 10, 0, 5: p = 5, pa = 5, pb = 5, pc = 0: c strictly wins.
  assert_eq!(paeth_predict(10, 0, 5), 5);
  // a, b, c = 0, 10, 0: p = 10, pa = 10, pb = 0: b wins.
  assert_eq!(paeth_predict(0, 10, 0), 10);
  // a, b, c = 2, 1, 3: p = 0, pa = 2, pb = 1, pc = 3 -> b
  assert_eq!(paeth_predict(2, 1, 3), 1);
  // a, b, c = 4, 1, 1: p = 4, pa = 0 -> a
  assert_eq!(paeth_predict(4, 1, 1), 4);
  // a, b, c = 6, 4, 5: p = 5, pa = 1, pb = 1, pc = 0 -> c
  assert_eq!(paeth_predict(6, 4, 5), 5);
  // a, b, c = 3, 5, 5: p = 3, pa = 0 -> a
  assert_eq!(paeth_predict(3, 5, 5), 3);
  // a, b, c = 5, 3, 4: p = 4, pa = 1, pb = 1, pc = 0 -> c
  assert_eq!(paeth_predict(5, 3, 4), 4);
  // a, b, c = 0, 2, 1: p = 1, pa = 1, pb = 1, pc = 0 -> c
  assert_eq!(paeth_predict(0, 2, 1), 1);
  // pb == pc, both below pa: b wins over c.
  // a, b, c = 5, 2, 4: p = 3, pa = 2, pb = 1, pc = 1 -> b
  assert_eq!(paeth_predict(5, 2, 4), 2);
  // a, b, c = 0, 3, 9: p = -6, pa = 6, pb = 9, pc = 15 -> a
  assert_eq!(paeth_predict(0, 3, 9), 0);
  // a, b, c = 9, 1, 5: p = 5, pa = 4, pb = 4, pc = 0 -> c
  assert_eq!(paeth_predict(9, 1, 5), 5);
  // a, b, c = 255, 0, 128: p = 127, pa = 128, pb = 127, pc = 1 -> c
  assert_eq!(paeth_predict(255, 0, 128), 128);
}

#[test]
fn test_unfilter_line_first_line_rules() {
  let zero = [0_u8; 6];
  let filtered = [1_u8, 2, 3, 4, 5, 6];
  let mut raw = [0_u8; 6];
  unfilter_line(FilterType::Sub, 3, &zero, &filtered, &mut raw);
  assert_eq!(raw, [1, 2, 3, 5, 7, 9]);
  unfilter_line(FilterType::Up, 3, &zero, &filtered, &mut raw);
  assert_eq!(raw, filtered);
  unfilter_line(FilterType::Average, 3, &zero, &filtered, &mut raw);
  assert_eq!(raw, [1, 2, 3, 4 + 0, 5 + 1, 6 + 1]);
  // with nothing above, paeth always picks the left byte
  unfilter_line(FilterType::Paeth, 3, &zero, &filtered, &mut raw);
  assert_eq!(raw, [1, 2, 3, 5, 7, 9]);
}

#[test]
fn test_unfilter_line_wraps() {
  let prior = [200_u8, 100];
  let filtered = [100_u8, 250];
  let mut raw = [0_u8; 2];
  unfilter_line(FilterType::Up, 1, &prior, &filtered, &mut raw);
  assert_eq!(raw, [44, 94]);
  unfilter_line(FilterType::Sub, 1, &prior, &filtered, &mut raw);
  assert_eq!(raw, [100, 94]);
  // average uses the 9-bit sum: (255 + 255) / 2 == 255
  unfilter_line(FilterType::Average, 1, &[0, 255], &[255, 1], &mut raw);
  assert_eq!(raw, [255, 0]);
}

#[test]
fn test_reconstruct_rejects_bad_filter_tag() {
  let header = parse_header(&[0, 0, 0, 1, 0, 0, 0, 2, 8, 2, 0, 0, 0]).unwrap();
  let filtered = [0_u8, 1, 2, 3, 5, 1, 2, 3];
  assert_eq!(reconstruct(&filtered, &header), Err(PngError::UnrecognizedFilterAlgorithm(5)));
  assert_eq!(reconstruct(&filtered[..7], &header), Err(PngError::NotEnoughImageData));
}

#[test]
fn test_reconstruct_uses_previous_line() {
  // 1x3 RGB: red, then "up" adds nothing (still red), then "up" adds 1 each.
  let header = parse_header(&[0, 0, 0, 1, 0, 0, 0, 3, 8, 2, 0, 0, 0]).unwrap();
  let filtered = [0_u8, 255, 0, 0, 2, 0, 0, 0, 2, 1, 1, 1];
  let pixels = reconstruct(&filtered, &header).unwrap();
  assert_eq!(
    pixels,
    PixelStorage::RGB8(alloc::vec![
      RGB8 { r: 255, g: 0, b: 0 },
      RGB8 { r: 255, g: 0, b: 0 },
      RGB8 { r: 0, g: 1, b: 1 },
    ])
  );
}
