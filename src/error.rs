//! Errors produced while encoding or rendering a QR code.

use crate::mode::Mode;

/// Every failure the encoder and the bundled renderers can report.
///
/// Input problems (`EmptyInput`, `DataTooBig`, `VersionTooSmall`, `IncompatibleMode`,
/// `InvalidKanji`) come back straight to the caller with no partial result. The
/// `EncoderNotInitialized`, `PathNotFound` and `GaloisDomain` variants signal a broken
/// internal invariant rather than bad input.
#[derive(thiserror::Error, Debug)]
pub enum QrError {
    #[error("No input text")]
    EmptyInput,

    #[error("The amount of data is too big to be stored in a QR Code")]
    DataTooBig,

    /// The explicitly requested version cannot hold the data.
    #[error(
        "The chosen QR Code version ({requested}) cannot contain this amount of data. \
         Minimum version required to store current data is: {minimum}"
    )]
    VersionTooSmall { requested: u8, minimum: u8 },

    #[error("Unknown EC Level: {0}")]
    InvalidEcLevel(String),

    #[error("Unknown mode: {0}")]
    InvalidMode(String),

    #[error("Invalid QR Code version: {0}")]
    InvalidVersion(u32),

    #[error("Invalid mask pattern: {0}")]
    InvalidMask(u32),

    /// A forced mode cannot represent the segment content.
    #[error("\"{data}\" cannot be encoded with mode {mode}. Suggested mode is: {suggested}")]
    IncompatibleMode { data: String, mode: Mode, suggested: Mode },

    #[error("Invalid SJIS character: {0}. Make sure your charset is UTF-8")]
    InvalidKanji(char),

    #[error("Kanji mode requested but no Shift JIS encoder is configured")]
    KanjiEncoderMissing,

    #[error("Reed-Solomon encoder not initialized")]
    EncoderNotInitialized,

    #[error("Could not find a path from {from} to {to}")]
    PathNotFound { from: &'static str, to: &'static str },

    #[error("log({0}) is undefined in GF(256)")]
    GaloisDomain(u8),

    #[error("Invalid hex color: {0}")]
    InvalidColor(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
