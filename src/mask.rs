//! Mask patterns and the penalty rules used to choose between them.

use core::convert::TryFrom;
use core::fmt;

use log::trace;

use crate::bit_matrix::BitMatrix;
use crate::error::QrError;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Mask> {
        (0..8).map(Mask)
    }

    /// Whether the module at `(i, j)` (row, column) is flipped.
    pub fn mask_at(self, i: usize, j: usize) -> bool {
        match self.0 {
            0 => (i + j) % 2 == 0,
            1 => i % 2 == 0,
            2 => j % 3 == 0,
            3 => (i + j) % 3 == 0,
            4 => (i / 2 + j / 3) % 2 == 0,
            5 => (i * j) % 2 + (i * j) % 3 == 0,
            6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
            7 => ((i * j) % 3 + (i + j) % 2) % 2 == 0,
            _ => unreachable!(),
        }
    }

    /// XORs the pattern into every non-reserved module. Applying twice restores the matrix.
    pub fn apply(self, data: &mut BitMatrix) {
        let size = data.size();
        for col in 0..size {
            for row in 0..size {
                if data.is_reserved(row, col) {
                    continue;
                }
                data.xor(row, col, self.mask_at(row, col));
            }
        }
    }
}

impl TryFrom<u32> for Mask {
    type Error = QrError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value <= 7 {
            Ok(Mask(value as u8))
        } else {
            Err(QrError::InvalidMask(value))
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runs of five or more same-colored modules in a row or column.
pub fn penalty_n1(data: &BitMatrix) -> u32 {
    let size = data.size();
    let mut points = 0;
    let score = |count: u32| {
        if count >= 5 {
            PENALTY_N1 + (count - 5)
        } else {
            0
        }
    };

    for row in 0..size {
        let mut same_count_col = 0;
        let mut same_count_row = 0;
        let mut last_col = None;
        let mut last_row = None;

        for col in 0..size {
            let module = data.get(row, col);
            if Some(module) == last_col {
                same_count_col += 1;
            } else {
                points += score(same_count_col);
                last_col = Some(module);
                same_count_col = 1;
            }

            let module = data.get(col, row);
            if Some(module) == last_row {
                same_count_row += 1;
            } else {
                points += score(same_count_row);
                last_row = Some(module);
                same_count_row = 1;
            }
        }

        points += score(same_count_col);
        points += score(same_count_row);
    }

    points
}

/// 2×2 blocks of one color, overlapping.
pub fn penalty_n2(data: &BitMatrix) -> u32 {
    let size = data.size();
    let mut points = 0;

    for row in 0..size.saturating_sub(1) {
        for col in 0..size - 1 {
            let dark = [
                data.get(row, col),
                data.get(row, col + 1),
                data.get(row + 1, col),
                data.get(row + 1, col + 1),
            ]
            .iter()
            .filter(|&&bit| bit)
            .count();
            if dark == 4 || dark == 0 {
                points += 1;
            }
        }
    }

    points * PENALTY_N2
}

/// Finder-like 1:1:3:1:1 sequences with four light modules on one side.
pub fn penalty_n3(data: &BitMatrix) -> u32 {
    let size = data.size();
    let mut points = 0;

    for row in 0..size {
        let mut bits_col: u16 = 0;
        let mut bits_row: u16 = 0;
        for col in 0..size {
            bits_col = ((bits_col << 1) & 0x7FF) | u16::from(data.get(row, col));
            if col >= 10 && (bits_col == 0x5D0 || bits_col == 0x05D) {
                points += 1;
            }

            bits_row = ((bits_row << 1) & 0x7FF) | u16::from(data.get(col, row));
            if col >= 10 && (bits_row == 0x5D0 || bits_row == 0x05D) {
                points += 1;
            }
        }
    }

    points * PENALTY_N3
}

/// Deviation of the dark module ratio from 50%, in whole 5% steps.
pub fn penalty_n4(data: &BitMatrix) -> u32 {
    let dark = data.dark_count();
    let total = data.size() * data.size();
    if total == 0 {
        return 0;
    }
    // floor(|dark * 100 / total - 50| / 5), kept exact in integers
    let steps = (dark * 100).abs_diff(total * 50) / (total * 5);
    steps as u32 * PENALTY_N4
}

pub fn penalty(data: &BitMatrix) -> u32 {
    penalty_n1(data) + penalty_n2(data) + penalty_n3(data) + penalty_n4(data)
}

/// Tries every mask and returns the one with the lowest penalty.
///
/// `setup_format` writes the trial format bits before scoring. The matrix is left
/// unmasked; only the format area keeps the last trial's bits. Ties go to the lower
/// mask number.
pub fn best_mask<F>(data: &mut BitMatrix, mut setup_format: F) -> (Mask, u32)
where
    F: FnMut(&mut BitMatrix, Mask),
{
    let mut best = Mask(0);
    let mut lower_penalty = u32::MAX;

    for mask in Mask::all() {
        setup_format(data, mask);
        mask.apply(data);
        let score = penalty(data);
        mask.apply(data);
        trace!("mask {} penalty {}", mask, score);

        if score < lower_penalty {
            lower_penalty = score;
            best = mask;
        }
    }

    (best, lower_penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(size: usize, bits: &[u8]) -> BitMatrix {
        assert_eq!(bits.len(), size * size);
        let mut bm = BitMatrix::new(size);
        for (i, &b) in bits.iter().enumerate() {
            bm.set(i / size, i % size, b == 1, false);
        }
        bm
    }

    fn masked_zero(mask: u8) -> BitMatrix {
        let mut bm = BitMatrix::new(6);
        Mask::new(mask).apply(&mut bm);
        bm
    }

    fn as_bits(bm: &BitMatrix) -> Vec<u8> {
        bm.data().iter().map(|&b| u8::from(b)).collect()
    }

    #[test]
    fn test_try_from() {
        assert_eq!(Mask::try_from(7).unwrap(), Mask::new(7));
        assert!(matches!(Mask::try_from(8), Err(QrError::InvalidMask(8))));
    }

    #[test]
    fn test_patterns_on_zero_matrix() {
        let expected: [Vec<u8>; 8] = [
            [1, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 1].repeat(3),
            [1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0].repeat(3),
            [1, 0, 0].repeat(12),
            vec![
                1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0,
                0, 1, 0, 1, 0, 0, 1, 0,
            ],
            vec![
                1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0,
                0, 0, 1, 1, 1, 0, 0, 0,
            ],
            vec![
                1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1,
                0, 0, 1, 0, 0, 0, 0, 0,
            ],
            vec![
                1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 1,
                0, 1, 1, 0, 0, 0, 1, 1,
            ],
            vec![
                1, 0, 1, 0, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 1, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 0,
                0, 0, 0, 1, 1, 1, 0, 0,
            ],
        ];
        for (p, bits) in expected.iter().enumerate() {
            assert_eq!(&as_bits(&masked_zero(p as u8)), bits, "mask {}", p);
        }
    }

    #[test]
    fn test_apply_twice_restores() {
        let mut bm = matrix(3, &[1, 0, 1, 1, 1, 0, 0, 0, 1]);
        bm.set(1, 1, true, true);
        let original = bm.clone();
        for mask in Mask::all() {
            mask.apply(&mut bm);
            assert!(bm.get(1, 1));
            mask.apply(&mut bm);
            assert_eq!(bm, original);
        }
    }

    #[test]
    fn test_penalty_n1() {
        #[rustfmt::skip]
        let bm = matrix(11, &[
            1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1,
            1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1,
            0, 1, 1, 1, 0, 0, 1, 1, 1, 1, 1,
            1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1,
            1, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0,
            1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1,
            1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1,
            1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1,
            1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1,
            0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1,
        ]);
        assert_eq!(penalty_n1(&bm), 59);

        assert_eq!(penalty_n1(&masked_zero(0)), 0);
        assert_eq!(penalty_n1(&masked_zero(1)), 24);
        assert_eq!(penalty_n1(&masked_zero(2)), 24);
        assert_eq!(penalty_n1(&masked_zero(5)), 20);
    }

    #[test]
    fn test_penalty_n2() {
        #[rustfmt::skip]
        let bm = matrix(8, &[
            1, 1, 1, 1, 1, 1, 1, 1,
            1, 1, 1, 0, 0, 0, 1, 1,
            0, 1, 1, 1, 0, 0, 1, 1,
            1, 0, 0, 0, 1, 1, 0, 1,
            0, 0, 0, 0, 0, 0, 0, 0,
            1, 0, 1, 1, 0, 0, 0, 0,
            1, 1, 1, 1, 1, 0, 0, 0,
            1, 1, 0, 0, 1, 0, 1, 1,
        ]);
        assert_eq!(penalty_n2(&bm), 45);

        assert_eq!(penalty_n2(&masked_zero(0)), 0);
        assert_eq!(penalty_n2(&masked_zero(2)), 30);
        assert_eq!(penalty_n2(&masked_zero(4)), 36);
    }

    #[test]
    fn test_penalty_n3() {
        #[rustfmt::skip]
        let bm = matrix(11, &[
            0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 1,
            0, 0, 0, 0, 1, 0, 1, 1, 1, 0, 1,
            0, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1,
            0, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1,
            1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0,
            1, 0, 1, 0, 0, 0, 1, 1, 1, 1, 1,
            0, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1,
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1,
            1, 0, 1, 1, 0, 0, 0, 1, 1, 1, 0,
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
        ]);
        assert_eq!(penalty_n3(&bm), 160);

        #[rustfmt::skip]
        let bm = matrix(11, &[
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
            1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0,
            1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1,
            1, 0, 1, 0, 0, 0, 1, 1, 1, 1, 0,
            0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 1,
            1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1,
            0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1,
            1, 0, 1, 1, 0, 0, 0, 1, 1, 1, 0,
            1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1,
        ]);
        assert_eq!(penalty_n3(&bm), 280);
    }

    #[test]
    fn test_penalty_n4() {
        let half = matrix(10, &[1, 0].repeat(50));
        assert_eq!(penalty_n4(&half), 0);

        let mut bits = vec![0u8; 100];
        bits[..22].fill(1);
        assert_eq!(penalty_n4(&matrix(10, &bits)), 50);

        let mut bits = vec![0u8; 441];
        bits[..190].fill(1);
        assert_eq!(penalty_n4(&matrix(21, &bits)), 10);
    }

    #[test]
    fn test_penalty_n4_dark_heavy() {
        let dark = |n: usize| {
            let mut bits = vec![0u8; 100];
            bits[..n].fill(1);
            penalty_n4(&matrix(10, &bits))
        };
        assert_eq!(dark(54), 0);
        assert_eq!(dark(55), 10);
        assert_eq!(dark(56), 10);
        assert_eq!(dark(60), 20);
        assert_eq!(dark(78), 50);
        // symmetric around one half
        assert_eq!(dark(45), 10);
        assert_eq!(dark(46), 0);
        assert_eq!(dark(100), 100);
    }

    #[test]
    fn test_best_mask_leaves_matrix_unmasked() {
        let mut bm = matrix(6, &[1, 1, 0, 0, 1, 0].repeat(6));
        let original = bm.clone();
        let mut calls = Vec::new();
        let (mask, score) = best_mask(&mut bm, |_, m| calls.push(m.value()));
        assert_eq!(calls, (0..8).collect::<Vec<u8>>());
        assert_eq!(bm, original);

        let scores: Vec<u32> = Mask::all()
            .map(|m| {
                let mut trial = original.clone();
                m.apply(&mut trial);
                penalty(&trial)
            })
            .collect();
        let min = *scores.iter().min().unwrap();
        assert_eq!(score, min);
        assert_eq!(usize::from(mask.value()), scores.iter().position(|&s| s == min).unwrap());
    }
}
