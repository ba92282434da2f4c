use alloc::vec::Vec;

use super::*;

/// Turns the compressed image data into filtered image data.
///
/// The decoder collects every `IDAT` chunk's data into one buffer, then calls
/// this once. Errors are passed back out of the decode as-is.
pub trait Decompressor {
  /// Decompresses a full Zlib data stream.
  ///
  /// `expected_len` is how many bytes the header says the output should be.
  /// Implementations may return less (the decoder will then report
  /// [`PngError::NotEnoughImageData`]) but shouldn't return more.
  fn decompress(&mut self, compressed: &[u8], expected_len: usize) -> PngResult<Vec<u8>>;
}

impl<D: Decompressor + ?Sized> Decompressor for &mut D {
  #[inline]
  fn decompress(&mut self, compressed: &[u8], expected_len: usize) -> PngResult<Vec<u8>> {
    (**self).decompress(compressed, expected_len)
  }
}

/// A [`Decompressor`] using the `miniz_oxide` crate.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZlibDecompressor {
  check_adler32: bool,
}
#[cfg(feature = "miniz_oxide")]
impl ZlibDecompressor {
  /// A decompressor that skips the Adler-32 check.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { check_adler32: false }
  }

  /// Sets if the Zlib stream's Adler-32 checksum is verified.
  #[inline]
  #[must_use]
  pub const fn checking_adler32(self, check_adler32: bool) -> Self {
    Self { check_adler32 }
  }
}
#[cfg(feature = "miniz_oxide")]
impl Decompressor for ZlibDecompressor {
  /// Inflates into a buffer that grows as output is actually produced.
  ///
  /// The buffer starts near the compressed size and doubles up to
  /// `expected_len`, so a header that claims a huge image can't make us
  /// allocate more than the data really inflates to.
  fn decompress(&mut self, compressed: &[u8], expected_len: usize) -> PngResult<Vec<u8>> {
    use alloc::boxed::Box;
    use miniz_oxide::inflate::{
      core::{decompress, inflate_flags::*, DecompressorOxide},
      TINFLStatus,
    };

    let mut flags = TINFL_FLAG_PARSE_ZLIB_HEADER | TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF;
    if !self.check_adler32 {
      flags |= TINFL_FLAG_IGNORE_ADLER32;
    }
    let mut state = Box::<DecompressorOxide>::default();
    let mut out: Vec<u8> = Vec::new();
    let start_len = compressed.len().saturating_mul(4).max(1).min(expected_len);
    out.try_reserve_exact(start_len)?;
    out.resize(start_len, 0);
    let mut input = compressed;
    let mut out_pos = 0;
    loop {
      let (status, in_used, written) = decompress(&mut state, input, &mut out, out_pos, flags);
      out_pos += written;
      input = input.get(in_used..).unwrap_or(&[]);
      match status {
        TINFLStatus::Done => {
          if out_pos < expected_len {
            log::warn!("zlib data ended early: got {out_pos} of {expected_len} bytes");
          }
          out.truncate(out_pos);
          return Ok(out);
        }
        TINFLStatus::HasMoreOutput if out.len() >= expected_len => {
          // the buffer is full, so we already have every byte that's going to
          // be used.
          log::warn!("zlib data continues past the expected {expected_len} bytes");
          out.truncate(expected_len);
          return Ok(out);
        }
        TINFLStatus::HasMoreOutput => {
          let new_len = out.len().saturating_mul(2).min(expected_len);
          out.try_reserve_exact(new_len - out.len())?;
          out.resize(new_len, 0);
        }
        status => {
          log::debug!("zlib decompression failed: {status:?}");
          return Err(PngError::Decompression);
        }
      }
    }
  }
}

#[test]
#[cfg(feature = "miniz_oxide")]
fn test_zlib_decompressor() {
  let data: Vec<u8> = (0..200_u8).collect();
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&data, 6);
  let mut z = ZlibDecompressor::new().checking_adler32(true);
  assert_eq!(z.decompress(&compressed, 200), Ok(data.clone()));
  // asking for less keeps just that much
  assert_eq!(z.decompress(&compressed, 10), Ok(data[..10].to_vec()));
  // asking for more gives back what there is
  assert_eq!(z.decompress(&compressed, 300), Ok(data));
  assert_eq!(z.decompress(&[1, 2, 3, 4], 10), Err(PngError::Decompression));
}

#[test]
#[cfg(feature = "miniz_oxide")]
fn test_zlib_decompressor_allocates_by_output() {
  let data = [7_u8; 5];
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&data, 6);
  // an expected size no allocator could ever give us up front
  let huge = isize::MAX as usize;
  let out = ZlibDecompressor::new().decompress(&compressed, huge).unwrap();
  assert_eq!(out, data);
  assert!(out.capacity() < 1024, "{}", out.capacity());
  // growing past the first guess still gives back everything
  let big: Vec<u8> = (0..100_000_u32).map(|x| (x % 251) as u8).collect();
  let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&big, 6);
  assert_eq!(ZlibDecompressor::new().decompress(&compressed, huge), Ok(big));
}
