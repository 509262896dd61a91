/// QR code symbol construction.
///
/// This module turns segments into a finished module matrix: it assembles the bit stream,
/// adds Reed-Solomon error correction, lays out the function patterns, places the data
/// and applies the mask.
use log::debug;

use crate::bit_buffer::BitBuffer;
use crate::bit_matrix::BitMatrix;
use crate::error::QrError;
use crate::error_correction::{self, QrCodeEcc};
use crate::format_info;
use crate::mask::{self, Mask};
use crate::options::QrOptions;
use crate::patterns;
use crate::reed_solomon::ReedSolomonEncoder;
use crate::segment::Segment;
use crate::segmentation::{SegmentInput, Segmenter};
use crate::version::{self, Version};

/// Input accepted by [`QrCode::create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QrData {
    /// Text split into segments automatically.
    Text(String),
    /// Caller-provided segments, kept in order.
    Segments(Vec<SegmentInput>),
}

impl From<&str> for QrData {
    fn from(text: &str) -> Self {
        QrData::Text(text.to_string())
    }
}

impl From<String> for QrData {
    fn from(text: String) -> Self {
        QrData::Text(text)
    }
}

impl From<Vec<SegmentInput>> for QrData {
    fn from(segments: Vec<SegmentInput>) -> Self {
        QrData::Segments(segments)
    }
}

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Supports QR Code Model 2 versions 1 to 40, all four error correction levels and the
/// numeric, alphanumeric, byte and Kanji modes. Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use qrkit::{QrCode, QrCodeEcc, QrOptions};
///
/// let options = QrOptions::new().with_error_correction_level(QrCodeEcc::Low);
/// let qr = QrCode::create("Hello, World!", &options).unwrap();
///
/// println!("Version: {}", qr.version().value());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    modules: BitMatrix,
    version: Version,
    ecl: QrCodeEcc,
    mask: Mask,
    segments: Vec<Segment>,
}

impl QrCode {
    /// Encodes `data` into a symbol.
    ///
    /// Text is segmented for the smallest fitting version (or the requested one). The
    /// version is the smallest that holds the segments unless `options` fixes it, and
    /// the mask is the lowest-penalty one unless `options` fixes it.
    ///
    /// # Errors
    ///
    /// - [`QrError::EmptyInput`] when there is nothing to encode.
    /// - [`QrError::DataTooBig`] when no version can hold the data.
    /// - [`QrError::VersionTooSmall`] when the requested version is too small.
    /// - [`QrError::IncompatibleMode`], [`QrError::InvalidKanji`] and
    ///   [`QrError::KanjiEncoderMissing`] for segments that cannot be encoded.
    pub fn create(data: impl Into<QrData>, options: &QrOptions) -> Result<Self, QrError> {
        let ecl = options.error_correction_level;
        let segmenter = Segmenter::from_options(options);

        let data: QrData = data.into();
        let segments = match data {
            QrData::Text(text) => {
                if text.is_empty() {
                    return Err(QrError::EmptyInput);
                }
                let estimated = match options.version {
                    Some(ver) => Some(ver),
                    None => version::best_version_for_data(&segmenter.raw_split(&text)?, ecl),
                };
                segmenter.from_string(&text, estimated.unwrap_or(Version::MAX))?
            }
            QrData::Segments(inputs) => segmenter.from_array(&inputs)?,
        };
        if segments.is_empty() {
            return Err(QrError::EmptyInput);
        }

        let best = version::best_version_for_data(&segments, ecl).ok_or(QrError::DataTooBig)?;
        let ver = match options.version {
            None => best,
            Some(requested) if requested < best => {
                return Err(QrError::VersionTooSmall {
                    requested: requested.value(),
                    minimum: best.value(),
                });
            }
            Some(requested) => requested,
        };
        debug!("version {} ({}), {} segment(s)", ver, ecl, segments.len());

        let codewords = create_data(ver, ecl, &segments)?;

        let mut modules = BitMatrix::new(ver.symbol_size());
        setup_finder_pattern(&mut modules, ver);
        setup_timing_pattern(&mut modules);
        setup_alignment_pattern(&mut modules, ver);
        // placeholder bits, so the format area is reserved before data placement
        setup_format_info(&mut modules, ecl, Mask::new(0));
        setup_version_info(&mut modules, ver);
        setup_data(&mut modules, &codewords);

        let mask = match options.mask_pattern {
            Some(mask) => mask,
            None => {
                let (mask, penalty) =
                    mask::best_mask(&mut modules, |matrix, mask| setup_format_info(matrix, ecl, mask));
                debug!("mask {} selected, penalty {}", mask, penalty);
                mask
            }
        };
        mask.apply(&mut modules);
        setup_format_info(&mut modules, ecl, mask);

        Ok(QrCode {
            modules,
            version: ver,
            ecl,
            mask,
            segments,
        })
    }

    /// Encodes text with automatic version and mask at the given level.
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self, QrError> {
        QrCode::create(text, &QrOptions::new().with_error_correction_level(ecl))
    }

    /// Encodes binary data as a single byte segment.
    pub fn encode_binary(data: &[u8], ecl: QrCodeEcc) -> Result<Self, QrError> {
        QrCode::create(
            vec![SegmentInput::bytes(data)],
            &QrOptions::new().with_error_correction_level(ecl),
        )
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Width and height in modules, between 21 and 177.
    pub fn size(&self) -> usize {
        self.modules.size()
    }

    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// The segments actually encoded, after optimization and merging.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn modules(&self) -> &BitMatrix {
        &self.modules
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `false` (light) for out-of-bounds coordinates.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size() as i32;
        range.contains(&x) && range.contains(&y) && self.modules.get(y as usize, x as usize)
    }
}

/// Builds the final codeword sequence: segment headers and data, terminator, padding,
/// then error correction.
fn create_data(ver: Version, ecl: QrCodeEcc, segments: &[Segment]) -> Result<Vec<u8>, QrError> {
    let mut bb = BitBuffer::new();
    for seg in segments {
        let mode = seg.mode();
        bb.put(u32::from(mode.bit()), 4);
        bb.put(seg.char_count() as u32, mode.char_count_bits(ver));
        seg.write(&mut bb);
    }

    let data_bits = ver.data_codewords(ecl) * 8;
    if bb.len_in_bits() + 4 <= data_bits {
        bb.put(0, 4);
    }
    while bb.len_in_bits() % 8 != 0 {
        bb.put_bit(false);
    }

    let remaining_bytes = data_bits.saturating_sub(bb.len_in_bits()) / 8;
    for i in 0..remaining_bytes {
        bb.put(if i % 2 == 1 { 0x11 } else { 0xEC }, 8);
    }

    create_codewords(&bb, ver, ecl)
}

/// Splits data into blocks, computes each block's EC codewords and interleaves both.
fn create_codewords(bb: &BitBuffer, ver: Version, ecl: QrCodeEcc) -> Result<Vec<u8>, QrError> {
    let total_codewords = ver.total_codewords();
    let data_total_codewords = ver.data_codewords(ecl);
    let numblocks = error_correction::blocks_count(ver, ecl);

    let blocks_in_group2 = total_codewords % numblocks;
    let blocks_in_group1 = numblocks - blocks_in_group2;
    let data_in_group1 = data_total_codewords / numblocks;
    let ec_count = total_codewords / numblocks - data_in_group1;

    let rs = ReedSolomonEncoder::new(ec_count);
    let data = bb.as_bytes();
    let mut dc_data: Vec<&[u8]> = Vec::with_capacity(numblocks);
    let mut ec_data: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
    let mut offset = 0;

    for b in 0..numblocks {
        let datlen = if b < blocks_in_group1 { data_in_group1 } else { data_in_group1 + 1 };
        let block = &data[offset..offset + datlen];
        ec_data.push(rs.encode(block)?);
        dc_data.push(block);
        offset += datlen;
    }

    let mut result = Vec::with_capacity(total_codewords);
    for i in 0..=data_in_group1 {
        for block in &dc_data {
            if let Some(&codeword) = block.get(i) {
                result.push(codeword);
            }
        }
    }
    for i in 0..ec_count {
        for block in &ec_data {
            result.push(block[i]);
        }
    }
    Ok(result)
}

/// Draws the three finder patterns with their light separators.
fn setup_finder_pattern(matrix: &mut BitMatrix, ver: Version) {
    let size = matrix.size() as i32;
    for (row, col) in patterns::finder_positions(ver) {
        let (cy, cx) = (row as i32 + 3, col as i32 + 3);
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let (r, c) = (cy + dy, cx + dx);
                if !(0..size).contains(&r) || !(0..size).contains(&c) {
                    continue;
                }
                let dist: i32 = dx.abs().max(dy.abs());
                matrix.set(r as usize, c as usize, dist != 2 && dist != 4, true);
            }
        }
    }
}

fn setup_timing_pattern(matrix: &mut BitMatrix) {
    let size = matrix.size();
    for r in 8..size - 8 {
        let value = r % 2 == 0;
        matrix.set(r, 6, value, true);
        matrix.set(6, r, value, true);
    }
}

fn setup_alignment_pattern(matrix: &mut BitMatrix, ver: Version) {
    for (row, col) in patterns::alignment_positions(ver) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let dist: i32 = dx.abs().max(dy.abs());
                matrix.set(
                    (row as i32 + dy) as usize,
                    (col as i32 + dx) as usize,
                    dist != 1,
                    true,
                );
            }
        }
    }
}

/// Writes the two 6×3 version blocks. Does nothing below version 7.
fn setup_version_info(matrix: &mut BitMatrix, ver: Version) {
    let Some(bits) = ver.encoded_bits() else {
        return;
    };
    let size = matrix.size();
    for i in 0..18 {
        let bit = get_bit(bits, i);
        let a = size - 11 + i % 3;
        let b = i / 3;
        matrix.set(b, a, bit, true);
        matrix.set(a, b, bit, true);
    }
}

/// Writes both copies of the format bits and the fixed dark module.
fn setup_format_info(matrix: &mut BitMatrix, ecl: QrCodeEcc, mask: Mask) {
    let bits = format_info::encoded_bits(ecl, mask);
    let size = matrix.size();

    for i in 0..6 {
        matrix.set(i, 8, get_bit(bits, i), true);
    }
    matrix.set(7, 8, get_bit(bits, 6), true);
    matrix.set(8, 8, get_bit(bits, 7), true);
    matrix.set(8, 7, get_bit(bits, 8), true);
    for i in 9..15 {
        matrix.set(8, 14 - i, get_bit(bits, i), true);
    }

    for i in 0..8 {
        matrix.set(8, size - 1 - i, get_bit(bits, i), true);
    }
    for i in 8..15 {
        matrix.set(size - 15 + i, 8, get_bit(bits, i), true);
    }
    matrix.set(size - 8, 8, true, true);
}

/// Places codewords in the zig-zag column pairs, skipping reserved modules.
///
/// Modules left over once the data runs out stay light.
fn setup_data(matrix: &mut BitMatrix, data: &[u8]) {
    let size = matrix.size() as i32;
    let mut i: usize = 0;
    let mut right: i32 = size - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..size {
            for j in 0..2 {
                let col = (right - j) as usize;
                let upward: bool = ((right + 1) & 2) == 0;
                let row = (if upward { size - 1 - vert } else { vert }) as usize;
                if matrix.is_reserved(row, col) {
                    continue;
                }
                let dark = i < data.len() * 8 && get_bit(u32::from(data[i >> 3]), 7 - (i & 7));
                matrix.set(row, col, dark, false);
                i += 1;
            }
        }
        right -= 2;
    }
}

fn get_bit(x: u32, i: usize) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_patterns(ver: Version) -> BitMatrix {
        let mut m = BitMatrix::new(ver.symbol_size());
        setup_finder_pattern(&mut m, ver);
        setup_timing_pattern(&mut m);
        setup_alignment_pattern(&mut m, ver);
        setup_format_info(&mut m, QrCodeEcc::Medium, Mask::new(0));
        setup_version_info(&mut m, ver);
        m
    }

    fn free_modules(m: &BitMatrix) -> usize {
        let size = m.size();
        (0..size * size).filter(|i| !m.is_reserved(i / size, i % size)).count()
    }

    #[test]
    fn test_finder_pattern() {
        let m = function_patterns(Version::new(1));
        let row = |r: usize| -> Vec<bool> { (0..8).map(|c| m.get(r, c)).collect() };
        assert_eq!(row(0), vec![true, true, true, true, true, true, true, false]);
        assert_eq!(row(1), vec![true, false, false, false, false, false, true, false]);
        assert_eq!(row(3), vec![true, false, true, true, true, false, true, false]);
        assert!(m.is_reserved(7, 7));
        assert!(!m.get(7, 7));
        assert!(m.get(20, 0) && m.get(0, 20));
    }

    #[test]
    fn test_timing_pattern() {
        let m = function_patterns(Version::new(2));
        for i in 8..m.size() - 8 {
            assert_eq!(m.get(6, i), i % 2 == 0);
            assert_eq!(m.get(i, 6), i % 2 == 0);
            assert!(m.is_reserved(6, i));
        }
    }

    #[test]
    fn test_alignment_pattern() {
        let m = function_patterns(Version::new(2));
        assert!(m.get(18, 18));
        assert!(!m.get(17, 18));
        assert!(m.get(16, 16));
        assert!(m.is_reserved(20, 20));
        assert!(!m.is_reserved(21, 21));
    }

    #[test]
    fn test_format_info_placement() {
        // M, mask 0 -> 0x5412 = 101010000010010
        let m = function_patterns(Version::new(1));
        let bits = 0x5412u32;
        let vertical: Vec<bool> = [0, 1, 2, 3, 4, 5, 7, 8, 13, 14, 15, 16, 17, 18, 19, 20]
            .iter()
            .map(|&r| m.get(r, 8))
            .collect();
        let mut expected: Vec<bool> = (0..8).map(|i| get_bit(bits, i)).collect();
        expected.push(true); // dark module at (size - 8, 8)
        expected.extend((8..15).map(|i| get_bit(bits, i)));
        assert_eq!(vertical, expected);

        let horizontal: Vec<bool> = (0..15)
            .map(|i| {
                let col = if i < 8 { 20 - i } else if i == 8 { 7 } else { 14 - i };
                m.get(8, col)
            })
            .collect();
        assert_eq!(horizontal, (0..15).map(|i| get_bit(bits, i)).collect::<Vec<bool>>());
    }

    #[test]
    fn test_version_info_placement() {
        let ver = Version::new(7);
        let m = function_patterns(ver);
        let bits = 0x07C94u32;
        for i in 0..18 {
            assert_eq!(m.get(i / 3, 34 + i % 3), get_bit(bits, i));
            assert_eq!(m.get(34 + i % 3, i / 3), get_bit(bits, i));
        }
        let small = function_patterns(Version::new(6));
        assert!(!small.is_reserved(0, small.size() - 11));
    }

    #[test]
    fn test_free_modules_hold_all_codewords() {
        for v in [1, 2, 6, 7, 14, 21, 32, 40] {
            let ver = Version::new(v);
            let free = free_modules(&function_patterns(ver));
            let needed = ver.total_codewords() * 8;
            assert!(free >= needed && free - needed < 8, "version {}", v);
        }
        assert_eq!(free_modules(&function_patterns(Version::new(1))), 208);
    }

    #[test]
    fn test_create_data_hello_world() {
        let segs = vec![Segment::alphanumeric("HELLO WORLD").unwrap()];
        let codewords = create_data(Version::new(1), QrCodeEcc::Medium, &segs).unwrap();
        assert_eq!(
            codewords,
            vec![
                32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17, 196, 35, 39,
                119, 235, 215, 231, 226, 93, 23,
            ]
        );
    }

    #[test]
    fn test_create_codewords_interleaves_blocks() {
        // 5-Q: two blocks of 15 data codewords, then two of 16
        let ver = Version::new(5);
        let mut bb = BitBuffer::new();
        for b in 0..62u32 {
            bb.put(b, 8);
        }
        let out = create_codewords(&bb, ver, QrCodeEcc::Quartile).unwrap();
        assert_eq!(out.len(), 134);
        assert_eq!(&out[..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        assert_eq!(&out[56..62], &[14, 29, 44, 60, 45, 61]);

        let rs = ReedSolomonEncoder::new(18);
        let first_ec = rs.encode(&(0..15).collect::<Vec<u8>>()).unwrap();
        assert_eq!(out[62], first_ec[0]);
        assert_eq!(out[66], first_ec[1]);
    }

    #[test]
    fn test_setup_data_fills_free_modules_in_order() {
        let ver = Version::new(1);
        let mut m = function_patterns(ver);
        setup_data(&mut m, &[0xFF]);
        // first byte runs up the two rightmost columns
        for row in [20, 19, 18, 17] {
            assert!(m.get(row, 20) && m.get(row, 19));
        }
        assert!(!m.get(16, 20));
        // light past the end of the data
        assert!(!m.get(9, 0));
    }

    #[test]
    fn test_create_errors() {
        assert!(matches!(QrCode::create("", &QrOptions::new()), Err(QrError::EmptyInput)));
        assert!(matches!(
            QrCode::create(Vec::<SegmentInput>::new(), &QrOptions::new()),
            Err(QrError::EmptyInput)
        ));
        let too_big = "a".repeat(2954);
        assert!(matches!(
            QrCode::create(too_big.as_str(), &QrOptions::new().with_error_correction_str("L")),
            Err(QrError::DataTooBig)
        ));
    }

    #[test]
    fn test_get_module_bounds() {
        let qr = QrCode::encode_text("HELLO", QrCodeEcc::Low).unwrap();
        assert_eq!(qr.size(), 21);
        assert!(qr.get_module(0, 0));
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, 21));
        assert_eq!(qr.segments().len(), 1);
    }

    #[test]
    fn test_fixed_mask_is_used() {
        let opts = QrOptions::new().with_mask_pattern(3);
        let qr = QrCode::create("mask", &opts).unwrap();
        assert_eq!(qr.mask(), Mask::new(3));
        let binary = QrCode::encode_binary(&[0, 1, 2], QrCodeEcc::High).unwrap();
        assert_eq!(binary.segments(), &[Segment::byte(vec![0u8, 1, 2])]);
    }
}
