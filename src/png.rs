#![forbid(unsafe_code)]

//! Module for decoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Automatic Decoding
//!
//! Call [`png_decode`] with the PNG bytes, or build a [`PngDecoder`] if you
//! want to set [`DecodeOptions`], supply your own [`Decompressor`], or read
//! from some other [`ByteSource`](crate::ByteSource).
//!
//! The default decompressor needs the `miniz_oxide` crate feature.
//!
//! ## How Decoding Works
//!
//! The information in a PNG is stored in "chunks". Each chunk is a big-endian
//! `u32` length, a four byte type code, that many bytes of data, and then a
//! CRC-32 of the type and data.
//!
//! 1) The first 8 bytes must be the PNG signature.
//! 2) The first chunk must be the header ([`PngHeader`], `IHDR`). It gives the
//!    dimensions, bit depth, color type, and interlacing of the image.
//! 3) One or more image data (`IDAT`) chunks follow, possibly with other
//!    chunks mixed in around them. All of the image data chunks together form
//!    a single Zlib data stream.
//! 4) The end chunk (`IEND`) finishes the image. Nothing after it is read.
//!
//! Chunk types with an uppercase first letter are "critical": a decoder that
//! doesn't understand one of these must stop. Chunk types with a lowercase
//! first letter are "ancillary", and can be skipped.
//!
//! Once the end chunk is found the image data is decompressed, giving
//! *filtered* data. Each scanline of filtered data has one extra byte on the
//! front saying which filter was used for that line, and the line is then
//! unfiltered against the line above it (see [`unfilter_line`]).
//!
//! ## Checksums
//!
//! Chunk CRCs are checked by default. This can be turned off with
//! [`DecodeOptions::with_crc_checks`], in which case mismatches are only logged
//! as a warning.

use crate::*;

mod chunk_type;
pub use chunk_type::*;

mod chunk;
pub use chunk::*;

mod crc32;
pub use crc32::*;

mod ihdr;
pub use ihdr::*;

mod options;
pub use options::*;

mod inflate;
pub use inflate::*;

mod unfilter;
pub use unfilter::*;

mod decode;
pub use decode::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Checks if the PNG's initial 8 bytes are correct.
///
/// * If this is the case, the rest of the bytes are very likely PNG data.
/// * If this is *not* the case, the rest of the bytes are very likely *not* PNG
///   data.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// Peeks at the source to see if it starts with the PNG signature.
///
/// The source's read position is not changed.
pub fn png_sniff<S: ByteSource>(src: &mut S) -> PngResult<bool> {
  let mut magic = [0_u8; 8];
  let count = src.peek_bytes(&mut magic)?;
  Ok(count == magic.len() && is_png_header_correct(&magic))
}

#[cfg(test)]
mod tests;
