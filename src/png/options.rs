/// Settings for a decode.
///
/// ```
/// # use pngread::png::DecodeOptions;
/// let opts = DecodeOptions::new().with_crc_checks(false).with_max_dimension(4096);
/// assert!(!opts.check_crc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// If chunk CRCs should be checked.
  ///
  /// When this is off, CRC mismatches are still computed and logged as a
  /// warning, but the decode continues.
  pub check_crc: bool,

  /// The largest width or height that the decoder will accept.
  ///
  /// This keeps hostile headers from causing huge allocations.
  pub max_dimension: u32,
}
impl DecodeOptions {
  /// The default largest dimension.
  pub const DEFAULT_MAX_DIMENSION: u32 = 17_000;

  /// The default options: CRCs are checked, dimensions up to
  /// [`DEFAULT_MAX_DIMENSION`](Self::DEFAULT_MAX_DIMENSION).
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { check_crc: true, max_dimension: Self::DEFAULT_MAX_DIMENSION }
  }

  /// Sets if CRCs are checked.
  #[inline]
  #[must_use]
  pub const fn with_crc_checks(self, check_crc: bool) -> Self {
    Self { check_crc, ..self }
  }

  /// Sets the largest allowed width or height.
  #[inline]
  #[must_use]
  pub const fn with_max_dimension(self, max_dimension: u32) -> Self {
    Self { max_dimension, ..self }
  }
}
impl Default for DecodeOptions {
  #[inline]
  #[must_use]
  fn default() -> Self {
    Self::new()
  }
}
