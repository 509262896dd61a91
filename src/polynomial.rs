//! Polynomials over GF(256), coefficients ordered from the highest degree down.

use crate::galois_field as gf;

/// Multiplies two polynomials.
pub fn mul(p1: &[u8], p2: &[u8]) -> Vec<u8> {
    if p1.is_empty() || p2.is_empty() {
        return Vec::new();
    }
    let mut coeff = vec![0u8; p1.len() + p2.len() - 1];
    for (i, &a) in p1.iter().enumerate() {
        for (j, &b) in p2.iter().enumerate() {
            coeff[i + j] ^= gf::mul(a, b);
        }
    }
    coeff
}

/// Returns the remainder of `dividend / divisor`.
///
/// Leading zero coefficients are stripped as the division proceeds, so the
/// remainder can be shorter than `divisor.len() - 1`.
pub fn modulo(dividend: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result: Vec<u8> = dividend.to_vec();
    if divisor.is_empty() {
        return result;
    }
    let mut start: usize = 0;
    while result.len() - start >= divisor.len() {
        let coeff = result[start];
        for (r, &d) in result[start..].iter_mut().zip(divisor) {
            *r ^= gf::mul(d, coeff);
        }
        while start < result.len() && result[start] == 0 {
            start += 1;
        }
    }
    result.split_off(start)
}

/// Builds the Reed-Solomon generator polynomial (x - 2^0)(x - 2^1)...(x - 2^(degree-1)).
pub fn generate_ec_polynomial(degree: usize) -> Vec<u8> {
    let mut poly = vec![1u8];
    for i in 0..degree {
        poly = mul(&poly, &[1, gf::exp(i)]);
    }
    poly
}
