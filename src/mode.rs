use core::fmt;
use core::str::FromStr;

use log::warn;

use crate::error::QrError;
use crate::segment;
use crate::version::Version;

/// Data encoding mode of a segment.
///
/// `Mixed` never appears in a symbol; it only selects the raw-bit capacity used when
/// several segments share one symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Mixed,
}

impl Mode {
    /// The 4-bit mode indicator. `Mixed` has none and returns 0.
    pub fn bit(self) -> u8 {
        use Mode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
            Mixed => 0,
        }
    }

    /// Width of the character count indicator at `ver`.
    pub fn char_count_bits(self, ver: Version) -> u8 {
        use Mode::*;
        let widths = match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
            Mixed => [0, 0, 0],
        };
        widths[usize::from((ver.value() + 7) / 17)]
    }

    /// The most compact mode able to encode all of `data`.
    ///
    /// Kanji is reported whenever every character belongs to the Kanji class, whether
    /// or not a Shift JIS encoder is available.
    pub fn best_for_data(data: &str) -> Mode {
        if segment::is_numeric(data) {
            Mode::Numeric
        } else if segment::is_alphanumeric(data) {
            Mode::Alphanumeric
        } else if segment::is_kanji(data) {
            Mode::Kanji
        } else {
            Mode::Byte
        }
    }

    /// Parses a mode name, falling back to `default` on anything unrecognized.
    pub fn from_name_or(name: &str, default: Mode) -> Mode {
        name.parse().unwrap_or_else(|_| {
            warn!("unknown mode {:?}, using {}", name, default);
            default
        })
    }
}

impl FromStr for Mode {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "numeric" => Ok(Mode::Numeric),
            "alphanumeric" => Ok(Mode::Alphanumeric),
            "kanji" => Ok(Mode::Kanji),
            "byte" => Ok(Mode::Byte),
            _ => Err(QrError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Numeric => "Numeric",
            Mode::Alphanumeric => "Alphanumeric",
            Mode::Byte => "Byte",
            Mode::Kanji => "Kanji",
            Mode::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}
