use alloc::vec::Vec;

use super::*;

/// Passes the "compressed" data through untouched, so that tests can write
/// filtered data directly into `IDAT` chunks.
struct Passthrough;
impl Decompressor for Passthrough {
  fn decompress(&mut self, compressed: &[u8], _expected_len: usize) -> PngResult<Vec<u8>> {
    Ok(compressed.to_vec())
  }
}

/// Never gets called by a decode that fails early.
struct Unreachable;
impl Decompressor for Unreachable {
  fn decompress(&mut self, _: &[u8], _: usize) -> PngResult<Vec<u8>> {
    panic!("the decompressor should not be called");
  }
}

fn push_chunk(out: &mut Vec<u8>, ty: &[u8; 4], data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc(ChunkType::new(*ty), data).to_be_bytes());
}

fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> [u8; 13] {
  let mut out = [0_u8; 13];
  out[0..4].copy_from_slice(&width.to_be_bytes());
  out[4..8].copy_from_slice(&height.to_be_bytes());
  out[8] = bit_depth;
  out[9] = color_type;
  out[12] = interlace;
  out
}

/// Signature plus each chunk in order.
fn png_from(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  for (ty, data) in chunks {
    push_chunk(&mut out, ty, data);
  }
  out
}

fn decode_passthrough(bytes: &[u8]) -> PngResult<PngImage> {
  PngDecoder::with_decompressor(Passthrough).decode(bytes)
}

const RED_1X1: [u8; 4] = [0, 255, 0, 0];

#[test]
fn test_is_png_header_correct() {
  assert!(is_png_header_correct(&PNG_SIGNATURE));
  assert!(is_png_header_correct(&[137, 80, 78, 71, 13, 10, 26, 10, 0, 0]));
  assert!(!is_png_header_correct(&PNG_SIGNATURE[..7]));
  assert!(!is_png_header_correct(b"GIF89a.."));
}

#[test]
fn test_png_sniff_does_not_consume() {
  let bytes = png_from(&[]);
  let mut src: &[u8] = &bytes;
  assert_eq!(png_sniff(&mut src), Ok(true));
  assert_eq!(src.len(), 8);
  let mut short: &[u8] = &bytes[..5];
  assert_eq!(png_sniff(&mut short), Ok(false));
}

#[test]
fn test_decode_1x1_rgb() {
  let bytes = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  let image = decode_passthrough(&bytes).unwrap();
  assert_eq!(image.width(), 1);
  assert_eq!(image.height(), 1);
  assert_eq!(image.pixel_format(), PixelFormat::RGB8);
  assert_eq!(image.header().color_type, PngColorType::RGB);
  assert_eq!(image.header().bit_depth, 8);
  assert_eq!(image.pixels(), &PixelStorage::RGB8(alloc::vec![RGB8 { r: 255, g: 0, b: 0 }]));
  let bitmap: Bitmap = image.to_bitmap().unwrap();
  assert_eq!(bitmap.get(0, 0).map(|p| [p.r, p.g, p.b, p.a]), Some([255, 0, 0, 255]));
}

#[test]
fn test_decode_joins_split_idat_and_skips_ancillary() {
  // 2x1 RGBA, sub filtered: the second pixel adds 1 to each channel
  let filtered = [1_u8, 10, 20, 30, 40, 1, 1, 1, 1];
  let bytes = png_from(&[
    (b"IHDR", &ihdr(2, 1, 8, 6, 0)),
    (b"tEXt", b"Comment\0hello"),
    (b"IDAT", &filtered[..3]),
    (b"gAMA", &[0, 0, 177, 143]),
    (b"IDAT", &filtered[3..]),
    (b"IEND", &[]),
  ]);
  let image = decode_passthrough(&bytes).unwrap();
  assert_eq!(
    image.into_pixels(),
    PixelStorage::RGBA8(alloc::vec![
      RGBA8 { r: 10, g: 20, b: 30, a: 40 },
      RGBA8 { r: 11, g: 21, b: 31, a: 41 },
    ])
  );
}

#[test]
fn test_decode_stops_at_iend() {
  let mut bytes = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  // garbage after the end is never looked at
  bytes.extend_from_slice(b"garbage");
  let mut src: &[u8] = &bytes;
  assert!(PngDecoder::with_decompressor(Passthrough).decode(&mut src).is_ok());
  assert_eq!(src, b"garbage");
}

#[test]
fn test_decode_order_violations() {
  let header = ihdr(1, 1, 8, 2, 0);
  // not starting with IHDR
  for first in [b"IDAT", b"IEND", b"PLTE", b"tEXt"] {
    let bytes = png_from(&[(first, &RED_1X1), (b"IHDR", &header), (b"IEND", &[])]);
    assert_eq!(decode_passthrough(&bytes), Err(PngError::ChunkOrderViolation), "{first:?}");
  }
  // second IHDR
  let bytes = png_from(&[(b"IHDR", &header), (b"IHDR", &header), (b"IEND", &[])]);
  assert_eq!(decode_passthrough(&bytes), Err(PngError::ChunkOrderViolation));
  // PLTE after IDAT
  let bytes = png_from(&[
    (b"IHDR", &header),
    (b"IDAT", &RED_1X1),
    (b"PLTE", &[0, 0, 0]),
    (b"IEND", &[]),
  ]);
  assert_eq!(decode_passthrough(&bytes), Err(PngError::ChunkOrderViolation));
  // two PLTE
  let bytes = png_from(&[
    (b"IHDR", &header),
    (b"PLTE", &[0, 0, 0]),
    (b"PLTE", &[0, 0, 0]),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  assert_eq!(decode_passthrough(&bytes), Err(PngError::ChunkOrderViolation));
  // one suggested palette before the data is fine
  let bytes = png_from(&[
    (b"IHDR", &header),
    (b"PLTE", &[0, 0, 0]),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  assert!(decode_passthrough(&bytes).is_ok());
}

#[test]
fn test_decode_unknown_critical_chunk() {
  let bytes = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"ABCD", &[1, 2, 3]),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  assert_eq!(
    decode_passthrough(&bytes),
    Err(PngError::UnknownCriticalChunk(ChunkType::new(*b"ABCD")))
  );
}

#[test]
fn test_decode_stream_end_errors() {
  let full = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  // ends on a chunk boundary, before IEND
  assert_eq!(decode_passthrough(&full[..full.len() - 12]), Err(PngError::MissingEndChunk));
  // ends inside the IEND chunk
  assert_eq!(decode_passthrough(&full[..full.len() - 3]), Err(PngError::Truncated));
  // no IDAT at all
  let bytes = png_from(&[(b"IHDR", &ihdr(1, 1, 8, 2, 0)), (b"IEND", &[])]);
  assert_eq!(decode_passthrough(&bytes), Err(PngError::MissingImageData));
}

#[test]
fn test_decode_magic_mismatch() {
  assert_eq!(decode_passthrough(&[]), Err(PngError::MagicMismatch));
  assert_eq!(decode_passthrough(&PNG_SIGNATURE[..7]), Err(PngError::MagicMismatch));
  let mut bytes = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  bytes[1] = b'p';
  assert_eq!(decode_passthrough(&bytes), Err(PngError::MagicMismatch));
}

#[test]
fn test_decode_rejects_before_decompressing() {
  let data = [0_u8; 16];
  let cases: [([u8; 13], PngError); 5] = [
    (ihdr(1, 1, 16, 2, 0), PngError::UnsupportedPixelFormat),
    (ihdr(1, 1, 8, 3, 0), PngError::UnsupportedPixelFormat),
    (ihdr(1, 1, 8, 0, 0), PngError::UnsupportedPixelFormat),
    (ihdr(1, 1, 8, 2, 1), PngError::InterlaceUnsupported),
    (ihdr(20_000, 1, 8, 2, 0), PngError::DimensionsTooLarge),
  ];
  for (header, expected) in cases {
    let bytes = png_from(&[(b"IHDR", &header), (b"IDAT", &data), (b"IEND", &[])]);
    assert_eq!(PngDecoder::with_decompressor(Unreachable).decode(&bytes[..]), Err(expected));
  }
  // the limit is configurable
  let bytes =
    png_from(&[(b"IHDR", &ihdr(3, 1, 8, 2, 0)), (b"IDAT", &data), (b"IEND", &[])]);
  let mut decoder = PngDecoder::with_decompressor(Unreachable)
    .with_options(DecodeOptions::new().with_max_dimension(2));
  assert_eq!(decoder.options().max_dimension, 2);
  assert!(decoder.options().check_crc);
  assert_eq!(decoder.decode(&bytes[..]), Err(PngError::DimensionsTooLarge));
}

#[test]
fn test_decode_crc_option() {
  let mut bytes = png_from(&[
    (b"IHDR", &ihdr(1, 1, 8, 2, 0)),
    (b"IDAT", &RED_1X1),
    (b"IEND", &[]),
  ]);
  // the IDAT crc is the 4 bytes just before the 12 byte IEND chunk
  let crc_at = bytes.len() - 12 - 4;
  bytes[crc_at] ^= 0xFF;
  assert!(matches!(
    decode_passthrough(&bytes),
    Err(PngError::CrcMismatch { chunk_type, .. }) if chunk_type == ChunkType::IDAT
  ));
  let mut lenient = PngDecoder::with_decompressor(Passthrough)
    .with_options(DecodeOptions::new().with_crc_checks(false));
  assert!(lenient.decode(&bytes[..]).is_ok());
}

#[test]
fn test_decode_not_enough_data() {
  let bytes = png_from(&[
    (b"IHDR", &ihdr(2, 2, 8, 2, 0)),
    (b"IDAT", &[0, 1, 2, 3, 4, 5, 6]),
    (b"IEND", &[]),
  ]);
  assert_eq!(decode_passthrough(&bytes), Err(PngError::NotEnoughImageData));
}

#[test]
fn test_png_read_header() {
  let bytes = png_from(&[(b"IHDR", &ihdr(7, 9, 8, 6, 0))]);
  let header = png_read_header(&bytes[..]).unwrap();
  assert_eq!((header.width, header.height), (7, 9));
  assert_eq!(header.color_type, PngColorType::RGBA);
  let bytes = png_from(&[(b"IDAT", &[])]);
  assert_eq!(png_read_header(&bytes[..]), Err(PngError::ChunkOrderViolation));
}
