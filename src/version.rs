//! Version numbers, symbol capacities and the version information field.

use core::convert::TryFrom;
use core::fmt;

use crate::error::QrError;
use crate::error_correction::{self, QrCodeEcc};
use crate::format_info::{bch_digit, bch_remainder};
use crate::mode::Mode;
use crate::segment::Segment;

const G18: u32 = (1 << 12) | (1 << 11) | (1 << 10) | (1 << 9) | (1 << 8) | (1 << 5) | (1 << 2) | 1;

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use `Version::try_from`
    /// for unchecked input.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the symbol in modules.
    pub const fn symbol_size(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// Every version from 1 to 40, ascending.
    pub fn all() -> impl Iterator<Item = Version> {
        (Version::MIN.0..=Version::MAX.0).map(Version)
    }

    /// Total codewords (data plus error correction) the symbol holds.
    pub fn total_codewords(self) -> usize {
        self.raw_data_modules() / 8
    }

    /// Data codewords left once error correction is subtracted.
    pub fn data_codewords(self, ecl: QrCodeEcc) -> usize {
        self.total_codewords() - error_correction::total_codewords_count(self, ecl)
    }

    fn raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    /// The 18-bit BCH-protected version information, present from version 7 up.
    pub fn encoded_bits(self) -> Option<u32> {
        if self.0 < 7 {
            return None;
        }
        let data = u32::from(self.0);
        Some((data << 12) | bch_remainder(data << 12, G18, bch_digit(G18)))
    }
}

impl TryFrom<u32> for Version {
    type Error = QrError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (u32::from(Version::MIN.0)..=u32::from(Version::MAX.0)).contains(&value) {
            Ok(Version(value as u8))
        } else {
            Err(QrError::InvalidVersion(value))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many units of `mode` fit in the symbol.
///
/// Units are digits, characters, bytes or Kanji; for [`Mode::Mixed`] the result is the
/// raw number of data bits, with no indicator overhead removed.
pub fn capacity(version: Version, ecl: QrCodeEcc, mode: Mode) -> usize {
    let data_bits = version.data_codewords(ecl) * 8;
    if mode == Mode::Mixed {
        return data_bits;
    }

    let usable_bits = data_bits - reserved_bits(mode, version);
    match mode {
        Mode::Numeric => usable_bits * 3 / 10,
        Mode::Alphanumeric => usable_bits * 2 / 11,
        Mode::Kanji => usable_bits / 13,
        Mode::Byte | Mode::Mixed => usable_bits / 8,
    }
}

fn reserved_bits(mode: Mode, version: Version) -> usize {
    4 + usize::from(mode.char_count_bits(version))
}

/// Bits `segments` occupy at `version`, headers included.
pub fn total_bits(segments: &[Segment], version: Version) -> usize {
    segments
        .iter()
        .map(|seg| reserved_bits(seg.mode(), version) + seg.bit_length())
        .sum()
}

/// Smallest version able to hold `segments`, or `None` when even version 40 is too small.
///
/// A lone segment is checked against its mode capacity; several segments are summed
/// per version since the count indicator widths change with the version.
pub fn best_version_for_data(segments: &[Segment], ecl: QrCodeEcc) -> Option<Version> {
    match segments {
        [] => Some(Version::MIN),
        [seg] => best_version_for_length(seg.mode(), seg.char_count(), ecl),
        _ => Version::all().find(|&v| total_bits(segments, v) <= capacity(v, ecl, Mode::Mixed)),
    }
}

fn best_version_for_length(mode: Mode, length: usize, ecl: QrCodeEcc) -> Option<Version> {
    Version::all().find(|&v| length <= capacity(v, ecl, mode))
}
