//! BCH coding of the format information field.

use crate::error_correction::QrCodeEcc;
use crate::mask::Mask;

const G15: u32 = (1 << 10) | (1 << 8) | (1 << 5) | (1 << 4) | (1 << 2) | (1 << 1) | 1;
const G15_MASK: u32 = (1 << 14) | (1 << 12) | (1 << 10) | (1 << 4) | (1 << 1);

/// Position of the highest set bit, counting from 1. Zero for zero.
pub fn bch_digit(mut data: u32) -> u32 {
    let mut digit = 0;
    while data != 0 {
        digit += 1;
        data >>= 1;
    }
    digit
}

/// Remainder of `data` divided by `generator` in GF(2) polynomial arithmetic.
pub fn bch_remainder(mut data: u32, generator: u32, generator_digit: u32) -> u32 {
    while bch_digit(data) >= generator_digit {
        data ^= generator << (bch_digit(data) - generator_digit);
    }
    data
}

/// The 15 format bits for an error correction level and mask, already XOR-masked.
pub fn encoded_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = (u32::from(ecl.format_bits()) << 3) | u32::from(mask.value());
    let rem = bch_remainder(data << 10, G15, bch_digit(G15));
    ((data << 10) | rem) ^ G15_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bch_digit() {
        assert_eq!(bch_digit(0), 0);
        assert_eq!(bch_digit(1), 1);
        assert_eq!(bch_digit(0b1000), 4);
        assert_eq!(bch_digit(G15), 11);
    }

    #[test]
    fn test_encoded_bits() {
        assert_eq!(encoded_bits(QrCodeEcc::Medium, Mask::new(0)), 0x5412);
        assert_eq!(encoded_bits(QrCodeEcc::Low, Mask::new(0)), 0x77C4);
        assert_eq!(encoded_bits(QrCodeEcc::High, Mask::new(5)), 0x0255);
    }

    #[test]
    fn test_encoded_bits_are_distinct() {
        let mut seen = Vec::new();
        for ecl in [QrCodeEcc::Low, QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            for m in 0..8 {
                let bits = encoded_bits(ecl, Mask::new(m));
                assert!(bits < 1 << 15);
                assert!(!seen.contains(&bits));
                seen.push(bits);
            }
        }
    }
}
