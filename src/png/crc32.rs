use super::*;

/// The reversed form of the CRC-32 polynomial used by PNG (and zlib, and
/// ethernet, and so on).
const POLYNOMIAL: u32 = 0xEDB8_8320;

const CRC_TABLE: [u32; 256] = {
  let mut table = [0_u32; 256];
  let mut i = 0;
  while i < table.len() {
    table[i] = table_entry(i as u32);
    i += 1;
  }
  table
};

/// The CRC remainder of a single byte value.
const fn table_entry(byte: u32) -> u32 {
  let mut c = byte;
  let mut bit = 0;
  while bit < 8 {
    c = if (c & 1) != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
    bit += 1;
  }
  c
}

/// The CRC-32 that PNG uses, over any sequence of bytes.
#[inline]
#[must_use]
pub fn png_crc(iter: impl Iterator<Item = u8>) -> u32 {
  !iter.fold(u32::MAX, |crc, byte| CRC_TABLE[usize::from(crc as u8 ^ byte)] ^ (crc >> 8))
}

/// The CRC of a chunk, which covers the type code and the data (but not the
/// length).
#[inline]
#[must_use]
pub fn chunk_crc(chunk_type: ChunkType, data: &[u8]) -> u32 {
  png_crc(chunk_type.to_bytes().into_iter().chain(data.iter().copied()))
}

#[test]
fn test_png_crc() {
  assert_eq!(png_crc(b"123456789".iter().copied()), 0xCBF4_3926);
  // the IEND chunk is always the same 12 bytes, so its CRC is well known.
  assert_eq!(chunk_crc(ChunkType::IEND, &[]), 0xAE42_6082);
}
