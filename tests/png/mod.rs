use pngread::{
  png::{
    chunk_crc, paeth_predict, png_decode, unfilter_line, ChunkReader, ChunkType, DecodeOptions,
    FilterType, PngDecoder, PNG_SIGNATURE, ZlibDecompressor,
  },
  Bitmap, PixelFormat, PixelStorage, PngError, RGB8, RGBA8,
};
use walkdir::WalkDir;

/// Builds PNG data streams in memory.
struct PngBuilder {
  bytes: Vec<u8>,
}
impl PngBuilder {
  fn new() -> Self {
    Self { bytes: PNG_SIGNATURE.to_vec() }
  }

  fn chunk(mut self, ty: &[u8; 4], data: &[u8]) -> Self {
    self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    self.bytes.extend_from_slice(ty);
    self.bytes.extend_from_slice(data);
    self.bytes.extend_from_slice(&chunk_crc(ChunkType::new(*ty), data).to_be_bytes());
    self
  }

  fn ihdr(self, width: u32, height: u32, bit_depth: u8, color_type: u8) -> Self {
    let mut data = Vec::new();
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[bit_depth, color_type, 0, 0, 0]);
    self.chunk(b"IHDR", &data)
  }

  /// Compresses the filtered data, then splits it over `parts` chunks.
  fn idat(mut self, filtered: &[u8], parts: usize) -> Self {
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(filtered, 6);
    let part_len = (compressed.len() / parts).max(1);
    for part in compressed.chunks(part_len) {
      self = self.chunk(b"IDAT", part);
    }
    self
  }

  fn iend(self) -> Self {
    self.chunk(b"IEND", &[])
  }

  fn finish(self) -> Vec<u8> {
    self.bytes
  }
}

/// Applies a filter to one line of raw bytes.
fn filter_line(filter: FilterType, bpp: usize, prior: &[u8], raw: &[u8]) -> Vec<u8> {
  (0..raw.len())
    .map(|i| {
      let a = if i >= bpp { raw[i - bpp] } else { 0 };
      let b = prior[i];
      let c = if i >= bpp { prior[i - bpp] } else { 0 };
      let predicted = match filter {
        FilterType::None => 0,
        FilterType::Sub => a,
        FilterType::Up => b,
        FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
        FilterType::Paeth => paeth_predict(a, b, c),
      };
      raw[i].wrapping_sub(predicted)
    })
    .collect()
}

/// Filters whole-image raw bytes, using filter type `line % 5` for each line.
fn filter_image(raw: &[u8], line_len: usize, bpp: usize) -> Vec<u8> {
  let mut out = Vec::new();
  let mut prior = vec![0_u8; line_len];
  for (y, line) in raw.chunks_exact(line_len).enumerate() {
    let filter = FilterType::try_from((y % 5) as u8).unwrap();
    out.push(filter as u8);
    out.extend(filter_line(filter, bpp, &prior, line));
    prior.copy_from_slice(line);
  }
  out
}

fn test_pattern_rgba(x: u32, y: u32) -> [u8; 4] {
  if (x, y) == (16, 24) {
    [255, 255, 255, 255]
  } else {
    [(x * 2) as u8, (y * 3) as u8, (x ^ y) as u8, (x + y) as u8]
  }
}

fn rgba_96x64_png() -> Vec<u8> {
  let (width, height) = (96_u32, 64_u32);
  let mut raw = Vec::new();
  for y in 0..height {
    for x in 0..width {
      raw.extend_from_slice(&test_pattern_rgba(x, y));
    }
  }
  let filtered = filter_image(&raw, width as usize * 4, 4);
  PngBuilder::new()
    .ihdr(width, height, 8, 6)
    .chunk(b"tEXt", b"Title\0test pattern")
    .idat(&filtered, 4)
    .iend()
    .finish()
}

#[test]
fn test_decode_1x1_red_rgb() {
  let png = PngBuilder::new().ihdr(1, 1, 8, 2).idat(&[0, 255, 0, 0], 1).iend().finish();
  let image = png_decode(&png).unwrap();
  assert_eq!((image.width(), image.height()), (1, 1));
  assert_eq!(image.pixels(), &PixelStorage::RGB8(vec![RGB8 { r: 255, g: 0, b: 0 }]));
}

#[test]
fn test_decode_96x64_rgba_all_filters() {
  let png = rgba_96x64_png();
  let image = png_decode(&png).unwrap();
  assert_eq!((image.width(), image.height()), (96, 64));
  assert_eq!(image.pixel_format(), PixelFormat::RGBA8);
  let pixels = match image.pixels() {
    PixelStorage::RGBA8(pixels) => pixels,
    other => panic!("wrong storage: {:?}", other.format()),
  };
  assert_eq!(pixels.len(), 96 * 64);
  assert_eq!(pixels[0], RGBA8 { r: 0, g: 0, b: 0, a: 0 });
  assert_eq!(pixels[96 * 24 + 16], RGBA8 { r: 255, g: 255, b: 255, a: 255 });
  for (i, p) in pixels.iter().enumerate() {
    let (x, y) = ((i % 96) as u32, (i / 96) as u32);
    assert_eq!([p.r, p.g, p.b, p.a], test_pattern_rgba(x, y), "({x},{y})");
  }

  let bitmap: Bitmap = Bitmap::try_from_png_bytes(&png).unwrap();
  let white = bitmap.get(16, 24).unwrap();
  assert_eq!([white.r, white.g, white.b, white.a], [255; 4]);
}

#[test]
fn test_decode_rgb_all_filters() {
  let (width, height) = (13_u32, 11_u32);
  let raw = super::rand_bytes((width * height * 3) as usize);
  let filtered = filter_image(&raw, width as usize * 3, 3);
  let png = PngBuilder::new().ihdr(width, height, 8, 2).idat(&filtered, 2).iend().finish();
  let image = png_decode(&png).unwrap();
  assert_eq!(image.pixels().as_bytes(), &raw[..]);
}

#[test]
fn test_unfilter_line_undoes_filter_line() {
  for bpp in [3, 4] {
    for _ in 0..20 {
      let prior = super::rand_bytes(bpp * 17);
      let raw = super::rand_bytes(bpp * 17);
      for tag in 0..5_u8 {
        let filter = FilterType::try_from(tag).unwrap();
        let filtered = filter_line(filter, bpp, &prior, &raw);
        let mut out = vec![0; raw.len()];
        unfilter_line(filter, bpp, &prior, &filtered, &mut out);
        assert_eq!(out, raw, "{filter:?} bpp {bpp}");
      }
    }
  }
}

#[test]
fn test_decode_bad_filter_type() {
  let png = PngBuilder::new().ihdr(1, 2, 8, 2).idat(&[0, 1, 2, 3, 5, 1, 2, 3], 1).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::UnrecognizedFilterAlgorithm(5)));
}

#[test]
fn test_decode_unsupported_formats() {
  // 16-bit RGB, 1x1
  let png = PngBuilder::new().ihdr(1, 1, 16, 2).idat(&[0; 7], 1).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::UnsupportedPixelFormat));
  // 8-bit palette, with a palette
  let png = PngBuilder::new()
    .ihdr(1, 1, 8, 3)
    .chunk(b"PLTE", &[255, 0, 0])
    .idat(&[0, 0], 1)
    .iend()
    .finish();
  assert_eq!(png_decode(&png), Err(PngError::UnsupportedPixelFormat));
  // illegal pairs are caught by the header
  let png = PngBuilder::new().ihdr(1, 1, 4, 2).idat(&[0; 2], 1).iend().finish();
  assert!(matches!(png_decode(&png), Err(PngError::InvalidBitDepth { bit_depth: 4, .. })));
}

#[test]
fn test_decode_stream_structure_errors() {
  let good = rgba_96x64_png();
  assert!(png_decode(&good).is_ok());
  // every strict prefix fails, and never panics
  for cut in [0, 7, 8, 20, 33, good.len() / 2, good.len() - 12, good.len() - 1] {
    let res = png_decode(&good[..cut]);
    assert!(res.is_err(), "cut: {cut}");
  }
  assert_eq!(png_decode(&good[..good.len() - 12]), Err(PngError::MissingEndChunk));
  assert_eq!(png_decode(&good[..good.len() - 1]), Err(PngError::Truncated));
  assert_eq!(png_decode(&good[..7]), Err(PngError::MagicMismatch));

  let png = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"zzZz", &[]).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::MissingImageData));
  let png = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"BLOB", &[]).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::UnknownCriticalChunk(ChunkType::new(*b"BLOB"))));
  let png = PngBuilder::new().idat(&[0, 255, 0, 0], 1).ihdr(1, 1, 8, 2).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::ChunkOrderViolation));
}

#[test]
fn test_decode_crc_checking() {
  let mut png = PngBuilder::new().ihdr(1, 1, 8, 2).idat(&[0, 255, 0, 0], 1).iend().finish();
  // flip a bit in the IHDR's CRC
  png[8 + 4 + 4 + 13] ^= 0x01;
  assert!(matches!(png_decode(&png), Err(PngError::CrcMismatch { .. })));
  let mut decoder = PngDecoder::new().with_options(DecodeOptions::new().with_crc_checks(false));
  assert!(decoder.decode(&png[..]).is_ok());
}

#[test]
fn test_decode_adler32_checking() {
  let filtered = [0_u8, 255, 0, 0];
  let mut compressed = miniz_oxide::deflate::compress_to_vec_zlib(&filtered, 6);
  let last = compressed.len() - 1;
  compressed[last] ^= 0xFF;
  let png = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"IDAT", &compressed).iend().finish();
  // by default the adler-32 isn't looked at
  assert!(png_decode(&png).is_ok());
  let mut strict = PngDecoder::with_decompressor(ZlibDecompressor::new().checking_adler32(true));
  assert_eq!(strict.decode(&png[..]), Err(PngError::Decompression));
}

#[test]
fn test_decode_huge_header_tiny_data() {
  // the header claims about 1.1 GB of filtered data, but the zlib stream only
  // holds a few bytes. This has to fail quickly, without that allocation.
  let png = PngBuilder::new().ihdr(17_000, 17_000, 8, 6).idat(&[0; 5], 1).iend().finish();
  assert!(png.len() < 100);
  assert_eq!(png_decode(&png), Err(PngError::NotEnoughImageData));
}

#[test]
fn test_decode_bad_zlib_data() {
  let png = PngBuilder::new().ihdr(1, 1, 8, 2).chunk(b"IDAT", &[1, 2, 3, 4, 5]).iend().finish();
  assert_eq!(png_decode(&png), Err(PngError::Decompression));
}

#[test]
fn test_chunk_reader_walks_stream() {
  let png = rgba_96x64_png();
  let types: Vec<ChunkType> =
    ChunkReader::new(&png[8..]).map(|res| res.unwrap().chunk_type()).collect();
  assert_eq!(types.first(), Some(&ChunkType::IHDR));
  assert_eq!(types.get(1), Some(&ChunkType::new(*b"tEXt")));
  assert_eq!(types.last(), Some(&ChunkType::IEND));
  assert!(types.iter().filter(|t| **t == ChunkType::IDAT).count() >= 2);
}

#[test]
#[cfg(feature = "std")]
fn test_decode_from_io_source() {
  use pngread::IoSource;
  let png = rgba_96x64_png();
  let mut src = IoSource(std::io::Cursor::new(png.clone()));
  assert_eq!(pngread::png::png_sniff(&mut src), Ok(true));
  let from_io = PngDecoder::new().decode(&mut src).unwrap();
  assert_eq!(from_io, png_decode(&png).unwrap());
  assert_eq!(src.into_inner().position(), png.len() as u64);
}

#[test]
fn test_decode_no_panics() {
  // iter ALL files in the test folder, even non-png files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = png_decode(&v);
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = png_decode(&v);
    let mut with_magic = PNG_SIGNATURE.to_vec();
    with_magic.extend_from_slice(&v);
    let _ = png_decode(&with_magic);
  }
  // damage one byte at a time of a real image, with CRCs off so that the
  // damage actually reaches the header and the pixel data.
  let good = rgba_96x64_png();
  let mut decoder = PngDecoder::new().with_options(DecodeOptions::new().with_crc_checks(false));
  for r in super::rand_bytes(400).chunks_exact(4) {
    let mut bad = good.clone();
    let at = u16::from_le_bytes([r[0], r[1]]) as usize % bad.len();
    bad[at] ^= r[2] | 1;
    let _ = decoder.decode(&bad[..]);
  }
}
