//! # qrkit
//!
//! A Rust library for encoding QR codes, with optimal segmentation and simple renderers.
//!
//! `qrkit` encodes text or binary data into QR Code Model 2 symbols. It supports versions
//! 1 to 40, four error correction levels and the numeric, alphanumeric, byte and Kanji
//! modes. Text is split into the mix of modes that yields the shortest bit stream, the
//! smallest fitting version is chosen and the mask with the lowest penalty is applied.
//!
//! ## Features
//!
//! - Optimal segmentation of mixed content (e.g. `ABC0123456789012345DEF`).
//! - Caller-provided segments with forced modes, including raw bytes.
//! - Pluggable Shift JIS mapping for Kanji mode.
//! - Render to Unicode half blocks, ANSI terminal cells, SVG, RGBA images or PNG.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrkit = "0.1"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qrkit::{helper, QrCode, QrOptions, RendererOptions};
//!
//! let options = QrOptions::new().with_error_correction_str("H");
//! let qr = QrCode::create("https://example.com", &options).unwrap();
//!
//! println!("version {}, mask {}", qr.version(), qr.mask());
//! println!("{}", helper::to_utf8_string(&qr, &RendererOptions::default()));
//! ```
//!
//! Mixed segments, one of them forced to byte mode:
//!
//! ```rust
//! use qrkit::{Mode, QrCode, QrOptions, SegmentInput};
//!
//! let segments = vec![
//!     SegmentInput::text("ABCDEFG").with_mode(Mode::Alphanumeric),
//!     SegmentInput::bytes(vec![0xde, 0xad, 0xbe, 0xef]),
//! ];
//! let qr = QrCode::create(segments, &QrOptions::new()).unwrap();
//! assert_eq!(qr.segments().len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol construction and the encoding pipeline.
//! - [`segmentation`]: Splitting input into segments.
//! - [`helper`]: Renderers for the finished symbol.
//!
//! Logging goes through the [`log`] facade; install any logger to see the chosen
//! version, mask and segments.

#![forbid(unsafe_code)]

pub mod bit_buffer;
pub mod bit_matrix;
pub mod error;
pub mod error_correction;
pub mod format_info;
pub mod galois_field;
pub mod helper;
pub mod mask;
pub mod mode;
pub mod options;
pub mod patterns;
pub mod polynomial;
pub mod qrcode;
pub mod reed_solomon;
pub mod segment;
pub mod segmentation;
pub mod version;

pub use crate::bit_matrix::BitMatrix;
pub use crate::error::QrError;
pub use crate::error_correction::QrCodeEcc;
pub use crate::helper::{RendererOptions, Rgba};
pub use crate::mask::Mask;
pub use crate::mode::Mode;
pub use crate::options::{KanjiEncoder, QrOptions};
pub use crate::qrcode::{QrCode, QrData};
pub use crate::segment::Segment;
pub use crate::segmentation::{SegmentContent, SegmentInput, Segmenter};
pub use crate::version::Version;
