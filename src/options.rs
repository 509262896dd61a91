//! Encoder configuration.
//!
//! Builder methods are lenient: out-of-range values are dropped with a warning and the
//! automatic choice is used instead. Use `Version::try_from`, `Mask::try_from` or
//! `str::parse::<QrCodeEcc>` first when invalid input should be an error.

use core::convert::TryFrom;
use core::fmt;
use std::sync::Arc;

use log::warn;

use crate::error_correction::QrCodeEcc;
use crate::mask::Mask;
use crate::version::Version;

/// Maps a character to its double-byte Shift JIS value.
///
/// The mapping tables are large and not bundled; callers plug in their own.
#[derive(Clone)]
pub struct KanjiEncoder(Arc<dyn Fn(char) -> Option<u16> + Send + Sync>);

impl KanjiEncoder {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(char) -> Option<u16> + Send + Sync + 'static,
    {
        KanjiEncoder(Arc::new(f))
    }

    pub fn encode(&self, c: char) -> Option<u16> {
        (self.0)(c)
    }
}

impl fmt::Debug for KanjiEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KanjiEncoder(..)")
    }
}

/// Options for [`QrCode::create`](crate::qrcode::QrCode::create).
#[derive(Clone, Debug, Default)]
pub struct QrOptions {
    /// Fixed version, or `None` for the smallest that fits.
    pub version: Option<Version>,
    pub error_correction_level: QrCodeEcc,
    /// Fixed mask, or `None` to pick the lowest penalty.
    pub mask_pattern: Option<Mask>,
    pub kanji_encoder: Option<KanjiEncoder>,
    /// Encode forced Kanji segments as bytes when no encoder is set.
    pub kanji_byte_fallback: bool,
}

impl QrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Version::try_from(version)
            .map_err(|e| warn!("{}, selecting version automatically", e))
            .ok();
        self
    }

    pub fn with_error_correction_level(mut self, level: QrCodeEcc) -> Self {
        self.error_correction_level = level;
        self
    }

    /// Accepts `l`, `low`, `m`, `medium`, `q`, `quartile`, `h` or `high` in any case;
    /// anything else selects [`QrCodeEcc::Medium`].
    pub fn with_error_correction_str(mut self, level: &str) -> Self {
        self.error_correction_level = QrCodeEcc::from_str_or(level, QrCodeEcc::Medium);
        self
    }

    pub fn with_mask_pattern(mut self, mask: u32) -> Self {
        self.mask_pattern = Mask::try_from(mask)
            .map_err(|e| warn!("{}, selecting mask automatically", e))
            .ok();
        self
    }

    pub fn kanji_encoder(mut self, encoder: KanjiEncoder) -> Self {
        self.kanji_encoder = Some(encoder);
        self
    }

    pub fn kanji_byte_fallback(mut self, fallback: bool) -> Self {
        self.kanji_byte_fallback = fallback;
        self
    }
}
