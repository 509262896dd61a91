//! Mode-tagged data segments and the character classes behind them.

use crate::bit_buffer::BitBuffer;
use crate::error::QrError;
use crate::mode::Mode;
use crate::options::KanjiEncoder;

/// The 45 characters of alphanumeric mode, in code order.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// A run of data encoded in a single mode.
///
/// Constructors validate the content, so [`write`](Segment::write) cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Numeric(String),
    Alphanumeric(String),
    Byte(Vec<u8>),
    /// Kanji text with its double-byte Shift JIS values.
    Kanji { text: String, sjis: Vec<u16> },
}

impl Segment {
    /// Creates a numeric segment. Fails unless `text` holds only the digits 0-9.
    pub fn numeric(text: &str) -> Result<Self, QrError> {
        if !text.chars().all(|c| c.is_ascii_digit()) {
            return Err(incompatible(text, Mode::Numeric));
        }
        Ok(Segment::Numeric(text.to_string()))
    }

    /// Creates an alphanumeric segment over [`ALPHANUMERIC_CHARSET`].
    pub fn alphanumeric(text: &str) -> Result<Self, QrError> {
        if !text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c)) {
            return Err(incompatible(text, Mode::Alphanumeric));
        }
        Ok(Segment::Alphanumeric(text.to_string()))
    }

    pub fn byte(data: impl Into<Vec<u8>>) -> Self {
        Segment::Byte(data.into())
    }

    /// Creates a Kanji segment, mapping every character through `encoder`.
    ///
    /// Characters the encoder cannot map, or whose Shift JIS value falls outside
    /// 0x8140-0x9FFC and 0xE040-0xEBBF, fail with [`QrError::InvalidKanji`].
    pub fn kanji(text: &str, encoder: &KanjiEncoder) -> Result<Self, QrError> {
        let sjis = text
            .chars()
            .map(|c| match encoder.encode(c) {
                Some(value) if kanji_offset(value).is_some() => Ok(value),
                _ => Err(QrError::InvalidKanji(c)),
            })
            .collect::<Result<Vec<u16>, QrError>>()?;
        Ok(Segment::Kanji {
            text: text.to_string(),
            sjis,
        })
    }

    pub fn mode(&self) -> Mode {
        match self {
            Segment::Numeric(_) => Mode::Numeric,
            Segment::Alphanumeric(_) => Mode::Alphanumeric,
            Segment::Byte(_) => Mode::Byte,
            Segment::Kanji { .. } => Mode::Kanji,
        }
    }

    /// The value written into the character count indicator.
    pub fn char_count(&self) -> usize {
        match self {
            Segment::Numeric(text) | Segment::Alphanumeric(text) => text.len(),
            Segment::Byte(data) => data.len(),
            Segment::Kanji { sjis, .. } => sjis.len(),
        }
    }

    pub fn bit_length(&self) -> usize {
        Segment::bits_for(self.mode(), self.char_count())
    }

    /// Data bits taken by `len` units of `mode`, headers excluded.
    pub fn bits_for(mode: Mode, len: usize) -> usize {
        match mode {
            Mode::Numeric => 10 * (len / 3) + if len % 3 != 0 { (len % 3) * 3 + 1 } else { 0 },
            Mode::Alphanumeric => 11 * (len / 2) + 6 * (len % 2),
            Mode::Byte => 8 * len,
            Mode::Kanji => 13 * len,
            Mode::Mixed => 0,
        }
    }

    /// Appends the data bits, without mode indicator or character count.
    pub fn write(&self, bb: &mut BitBuffer) {
        match self {
            Segment::Numeric(text) => {
                let mut accumdata: u32 = 0;
                let mut accumcount: u8 = 0;
                for b in text.bytes() {
                    accumdata = accumdata * 10 + u32::from(b - b'0');
                    accumcount += 1;
                    if accumcount == 3 {
                        bb.put(accumdata, 10);
                        accumdata = 0;
                        accumcount = 0;
                    }
                }
                if accumcount > 0 {
                    bb.put(accumdata, accumcount * 3 + 1);
                }
            }
            Segment::Alphanumeric(text) => {
                let mut accumdata: u32 = 0;
                let mut accumcount: u8 = 0;
                for c in text.chars() {
                    let i = ALPHANUMERIC_CHARSET.find(c).unwrap_or(0) as u32;
                    accumdata = accumdata * 45 + i;
                    accumcount += 1;
                    if accumcount == 2 {
                        bb.put(accumdata, 11);
                        accumdata = 0;
                        accumcount = 0;
                    }
                }
                if accumcount > 0 {
                    bb.put(accumdata, 6);
                }
            }
            Segment::Byte(data) => {
                for &b in data {
                    bb.put(u32::from(b), 8);
                }
            }
            Segment::Kanji { sjis, .. } => {
                for &value in sjis {
                    let v = value - kanji_offset(value).unwrap_or(0);
                    let packed = u32::from(v >> 8) * 0xC0 + u32::from(v & 0xff);
                    bb.put(packed, 13);
                }
            }
        }
    }
}

fn incompatible(text: &str, mode: Mode) -> QrError {
    QrError::IncompatibleMode {
        data: text.to_string(),
        mode,
        suggested: Mode::best_for_data(text),
    }
}

fn kanji_offset(value: u16) -> Option<u16> {
    match value {
        0x8140..=0x9FFC => Some(0x8140),
        0xE040..=0xEBBF => Some(0xC140),
        _ => None,
    }
}

pub fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
}

pub fn is_kanji(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_kanji_char)
}

/// Characters treated as Kanji candidates when splitting text.
pub fn is_kanji_char(c: char) -> bool {
    matches!(
        c,
        '\u{3000}'..='\u{303F}'
            | '\u{3040}'..='\u{309F}'
            | '\u{30A0}'..='\u{30FF}'
            | '\u{FF00}'..='\u{FFEF}'
            | '\u{4E00}'..='\u{9FAF}'
            | '\u{2605}'..='\u{2606}'
            | '\u{2190}'..='\u{2195}'
            | '\u{203B}'
            | '\u{2010}'
            | '\u{2015}'
            | '\u{2018}'
            | '\u{2019}'
            | '\u{2025}'
            | '\u{2026}'
            | '\u{201C}'
            | '\u{201D}'
            | '\u{2225}'
            | '\u{2260}'
            | '\u{0391}'..='\u{0451}'
            | '\u{00A7}'
            | '\u{00A8}'
            | '\u{00B1}'
            | '\u{00B4}'
            | '\u{00D7}'
            | '\u{00F7}'
    )
}
