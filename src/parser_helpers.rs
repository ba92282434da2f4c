#![forbid(unsafe_code)]

//! Just has shorthands for the big-endian int parsing that PNG needs.

#[inline]
#[must_use]
pub fn u32_be(bytes: [u8; 4]) -> u32 {
  u32::from_be_bytes(bytes)
}

#[test]
fn test_u32_be() {
  assert_eq!(u32_be([0, 0, 1, 0]), 256);
  assert_eq!(u32_be([0x89, 0x50, 0x4E, 0x47]), 0x8950_4E47);
}
