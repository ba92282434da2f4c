//! Sources of bytes for the decoder to read from.
//!
//! The decoder only ever reads forward, except for [`peek_bytes`] which is
//! used to sniff the PNG signature without consuming it.
//!
//! * `&[u8]` is a source that advances the slice as bytes are read.
//! * [`IoSource`] adapts any `std::io::Read + Seek` value (requires the `std`
//!   feature).
//!
//! [`peek_bytes`]: ByteSource::peek_bytes

use crate::PngResult;

/// A sequential byte source.
pub trait ByteSource {
  /// Reads bytes into `buf`, returning how many bytes were read.
  ///
  /// A return value less than `buf.len()` means that the source has reached
  /// its end. Implementations should keep reading until either the buffer is
  /// full or the end is reached, so that a short count is never spurious.
  fn read_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize>;

  /// Like [`read_bytes`](ByteSource::read_bytes), but the read position isn't
  /// advanced.
  fn peek_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize>;
}

impl ByteSource for &[u8] {
  #[inline]
  fn read_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    let count = self.peek_bytes(buf)?;
    let bytes: &[u8] = *self;
    *self = &bytes[count..];
    Ok(count)
  }

  #[inline]
  fn peek_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    let count = buf.len().min(self.len());
    buf[..count].copy_from_slice(&self[..count]);
    Ok(count)
  }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
  #[inline]
  fn read_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    (**self).read_bytes(buf)
  }

  #[inline]
  fn peek_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    (**self).peek_bytes(buf)
  }
}

/// Adapts a `std::io` reader into a [`ByteSource`].
///
/// Peeking is done by reading and then seeking backwards by however many bytes
/// were read.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug, Clone, Default)]
pub struct IoSource<R>(pub R);

#[cfg(feature = "std")]
impl<R> IoSource<R> {
  /// Unwraps the inner reader.
  #[inline]
  pub fn into_inner(self) -> R {
    self.0
  }
}

#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> ByteSource for IoSource<R> {
  fn read_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    let mut total = 0;
    while total < buf.len() {
      match self.0.read(&mut buf[total..]) {
        Ok(0) => break,
        Ok(n) => total += n,
        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
        Err(e) => return Err(e.into()),
      }
    }
    Ok(total)
  }

  fn peek_bytes(&mut self, buf: &mut [u8]) -> PngResult<usize> {
    let count = self.read_bytes(buf)?;
    // `count` is never more than the buffer length, which always fits in i64
    self.0.seek(std::io::SeekFrom::Current(-(count as i64)))?;
    Ok(count)
  }
}

#[test]
fn test_slice_source_read_and_peek() {
  let data = [1_u8, 2, 3, 4, 5];
  let mut src: &[u8] = &data;
  let mut buf = [0_u8; 2];
  assert_eq!(src.peek_bytes(&mut buf), Ok(2));
  assert_eq!(buf, [1, 2]);
  assert_eq!(src.read_bytes(&mut buf), Ok(2));
  assert_eq!(src.read_bytes(&mut buf), Ok(2));
  assert_eq!(buf, [3, 4]);
  assert_eq!(src.read_bytes(&mut buf), Ok(1));
  assert_eq!(buf[0], 5);
  assert_eq!(src.read_bytes(&mut buf), Ok(0));
}

#[test]
#[cfg(feature = "std")]
fn test_io_source_peek_does_not_advance() {
  let mut src = IoSource(std::io::Cursor::new(alloc::vec![10_u8, 20, 30]));
  let mut buf = [0_u8; 2];
  assert_eq!(src.peek_bytes(&mut buf), Ok(2));
  assert_eq!(src.read_bytes(&mut buf), Ok(2));
  assert_eq!(buf, [10, 20]);
  let mut big = [0_u8; 8];
  assert_eq!(src.read_bytes(&mut big), Ok(1));
  assert_eq!(big[0], 30);
}
