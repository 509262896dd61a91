//! Arithmetic over GF(256) with the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
//!
//! The exponent table is doubled to 512 entries so `mul` can index `log(x) + log(y)`
//! without reducing modulo 255.

use once_cell::sync::Lazy;

use crate::error::QrError;

struct Tables {
    exp: [u8; 512],
    log: [u8; 256],
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    for i in 0..255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11d;
        }
    }
    for i in 255..512 {
        exp[i] = exp[i - 255];
    }
    Tables { exp, log }
});

/// Returns 2^n in the field. Valid for `n < 512`.
pub fn exp(n: usize) -> u8 {
    TABLES.exp[n]
}

/// Returns the discrete logarithm of `n`. Zero has none.
pub fn log(n: u8) -> Result<u8, QrError> {
    if n < 1 {
        return Err(QrError::GaloisDomain(n));
    }
    Ok(TABLES.log[usize::from(n)])
}

/// Multiplies two field elements.
pub fn mul(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        return 0;
    }
    let tables = &*TABLES;
    tables.exp[usize::from(tables.log[usize::from(x)]) + usize::from(tables.log[usize::from(y)])]
}
