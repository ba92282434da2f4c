use alloc::vec::Vec;

use super::*;

/// The largest chunk length that PNG allows.
pub const MAX_CHUNK_LEN: u32 = (1 << 31) - 1;

const READ_BLOCK: usize = 64 * 1024;

/// A chunk read from a PNG data stream.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PngChunk {
  chunk_type: ChunkType,
  data: Vec<u8>,
  declared_crc: u32,
}
impl PngChunk {
  /// The chunk's type code.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }
  /// The chunk's data.
  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }
  /// Takes the chunk's data buffer.
  #[inline]
  #[must_use]
  pub fn into_data(self) -> Vec<u8> {
    self.data
  }
  /// The CRC value that was stored after the chunk.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// Computes the CRC that the chunk *should* have.
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    chunk_crc(self.chunk_type, &self.data)
  }
}
impl core::fmt::Debug for PngChunk {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}

/// Reads successive chunks out of a [`ByteSource`].
///
/// The reader doesn't look at the PNG signature, the source should already be
/// positioned past it.
#[derive(Debug, Clone)]
pub struct ChunkReader<S> {
  src: S,
  check_crc: bool,
}
impl<S: ByteSource> ChunkReader<S> {
  /// Makes a reader that checks CRCs.
  #[inline]
  pub fn new(src: S) -> Self {
    Self { src, check_crc: true }
  }

  /// Sets if CRCs are checked.
  ///
  /// When CRCs aren't checked a mismatch is logged as a warning.
  #[inline]
  pub fn with_crc_checks(self, check_crc: bool) -> Self {
    Self { check_crc, ..self }
  }

  /// Unwraps the byte source.
  #[inline]
  pub fn into_inner(self) -> S {
    self.src
  }

  /// Reads exactly `N` bytes.
  ///
  /// * `Ok(None)`: the source had no bytes at all.
  /// * `Err(Truncated)`: the source had some bytes, but not enough.
  fn read_array<const N: usize>(&mut self) -> PngResult<Option<[u8; N]>> {
    let mut a = [0_u8; N];
    match self.src.read_bytes(&mut a)? {
      0 => Ok(None),
      n if n == N => Ok(Some(a)),
      _ => Err(PngError::Truncated),
    }
  }

  /// Reads the next chunk.
  ///
  /// Gives `Ok(None)` if the source ends exactly where a chunk would start.
  ///
  /// ## Failure
  /// * [`PngError::Truncated`] if the source ends partway through a chunk.
  /// * [`PngError::ChunkTooLong`] if the length is over [`MAX_CHUNK_LEN`].
  /// * [`PngError::Alloc`] if the data buffer can't be allocated.
  /// * [`PngError::CrcMismatch`] if checking CRCs and they don't match.
  pub fn read_chunk(&mut self) -> PngResult<Option<PngChunk>> {
    let len: u32 = match self.read_array::<4>()? {
      Some(len_bytes) => u32_be(len_bytes),
      None => return Ok(None),
    };
    if len > MAX_CHUNK_LEN {
      return Err(PngError::ChunkTooLong);
    }
    let chunk_type = ChunkType::new(self.read_array::<4>()?.ok_or(PngError::Truncated)?);
    let len = len as usize;
    // The buffer grows as bytes actually arrive, so that a hostile length
    // can't make us allocate far more than the source really holds.
    let mut data: Vec<u8> = Vec::new();
    data.try_reserve_exact(len.min(READ_BLOCK))?;
    while data.len() < len {
      let start = data.len();
      let end = len.min(start + READ_BLOCK);
      data.try_reserve_exact(end - start)?;
      data.resize(end, 0);
      if self.src.read_bytes(&mut data[start..])? != end - start {
        return Err(PngError::Truncated);
      }
    }
    let declared_crc = u32_be(self.read_array::<4>()?.ok_or(PngError::Truncated)?);
    let chunk = PngChunk { chunk_type, data, declared_crc };
    log::trace!("read chunk: {chunk:?}");

    let actual = chunk.compute_actual_crc();
    if actual != declared_crc {
      if self.check_crc {
        return Err(PngError::CrcMismatch { chunk_type, declared: declared_crc, actual });
      }
      log::warn!(
        "`{chunk_type}` CRC mismatch ignored: declared {declared_crc:#010X}, actual {actual:#010X}"
      );
    }
    Ok(Some(chunk))
  }
}
impl<S: ByteSource> Iterator for ChunkReader<S> {
  type Item = PngResult<PngChunk>;
  /// Reads chunks until the source ends or there's an error.
  ///
  /// An error is given once, and then the iterator might keep going from
  /// wherever the source was left.
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.read_chunk().transpose()
  }
}

#[cfg(test)]
fn raw_chunk(ty: &[u8; 4], data: &[u8], crc: u32) -> Vec<u8> {
  let mut v = Vec::new();
  v.extend_from_slice(&(data.len() as u32).to_be_bytes());
  v.extend_from_slice(ty);
  v.extend_from_slice(data);
  v.extend_from_slice(&crc.to_be_bytes());
  v
}

#[test]
fn test_read_chunk_then_end_of_source() {
  let crc = chunk_crc(ChunkType::new(*b"tEXt"), b"abc");
  let bytes = raw_chunk(b"tEXt", b"abc", crc);
  let mut reader = ChunkReader::new(&bytes[..]);
  let chunk = reader.read_chunk().unwrap().unwrap();
  assert_eq!(chunk.chunk_type(), ChunkType::new(*b"tEXt"));
  assert_eq!(chunk.data(), b"abc");
  assert_eq!(chunk.declared_crc(), crc);
  assert_eq!(chunk.into_data(), b"abc".to_vec());
  assert_eq!(reader.read_chunk(), Ok(None));
  assert!(reader.into_inner().is_empty());
}

#[test]
fn test_read_chunk_truncated() {
  let bytes = raw_chunk(b"IDAT", &[1, 2, 3, 4], chunk_crc(ChunkType::IDAT, &[1, 2, 3, 4]));
  // cut off at every possible point past the start
  for cut in 1..bytes.len() {
    let mut reader = ChunkReader::new(&bytes[..cut]);
    assert_eq!(reader.read_chunk(), Err(PngError::Truncated), "cut: {cut}");
  }
}

#[test]
fn test_read_chunk_too_long() {
  let mut bytes = Vec::new();
  bytes.extend_from_slice(&u32::MAX.to_be_bytes());
  bytes.extend_from_slice(b"IDAT");
  let mut reader = ChunkReader::new(&bytes[..]);
  assert_eq!(reader.read_chunk(), Err(PngError::ChunkTooLong));
}

#[test]
fn test_read_chunk_crc_mismatch() {
  let good = chunk_crc(ChunkType::IEND, &[]);
  let bytes = raw_chunk(b"IEND", &[], good ^ 1);
  let mut reader = ChunkReader::new(&bytes[..]);
  assert_eq!(
    reader.read_chunk(),
    Err(PngError::CrcMismatch { chunk_type: ChunkType::IEND, declared: good ^ 1, actual: good })
  );
  let mut lenient = ChunkReader::new(&bytes[..]).with_crc_checks(false);
  assert_eq!(lenient.read_chunk().unwrap().unwrap().chunk_type(), ChunkType::IEND);
}
