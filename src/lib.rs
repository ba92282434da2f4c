#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for decoding PNG data into pixel buffers.
//!
//! The decoder reads chunks from a [`ByteSource`], validates the chunk order
//! and the image header, inflates the image data, and then reverses the
//! per-scanline filtering to produce pixels.
//!
//! Only 8-bit RGB and 8-bit RGBA non-interlaced images are reconstructed into
//! pixels. Every other legal header is still parsed and validated, but the
//! decode stops with [`PngError::UnsupportedPixelFormat`] (or
//! [`PngError::InterlaceUnsupported`]) before any decompression work happens.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "miniz_oxide")]
//! # fn main() -> pngread::PngResult<()> {
//! let bytes: &[u8] = unimplemented!("png data from somewhere");
//! let image = pngread::png::png_decode(bytes)?;
//! println!("{}x{} {:?}", image.width(), image.height(), image.pixel_format());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "miniz_oxide"))]
//! # fn main() {}
//! ```

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub mod ascii_array;
pub use ascii_array::*;

mod error;
pub use error::*;

pub mod image;
pub use image::*;

pub mod pixels;
pub use pixels::*;

mod parser_helpers;
pub(crate) use parser_helpers::*;

pub mod source;
pub use source::*;

pub mod png;
