use crate::error::QrError;
use crate::polynomial;

/// Computes the error correction codewords for one data block.
///
/// The generator polynomial is built once, when the encoder is given a non-zero degree.
#[derive(Clone, Debug, Default)]
pub struct ReedSolomonEncoder {
    gen_poly: Option<Vec<u8>>,
    degree: usize,
}

impl ReedSolomonEncoder {
    /// Creates an encoder producing `degree` EC codewords per block.
    ///
    /// A degree of zero leaves the encoder uninitialized; call [`initialize`](Self::initialize)
    /// before encoding.
    pub fn new(degree: usize) -> Self {
        let mut result = Self { gen_poly: None, degree };
        if degree > 0 {
            result.initialize(degree);
        }
        result
    }

    pub fn initialize(&mut self, degree: usize) {
        self.degree = degree;
        self.gen_poly = Some(polynomial::generate_ec_polynomial(degree));
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns exactly `degree` EC codewords for `data`.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, QrError> {
        let gen_poly = self.gen_poly.as_ref().ok_or(QrError::EncoderNotInitialized)?;

        let mut padded = Vec::with_capacity(data.len() + self.degree);
        padded.extend_from_slice(data);
        padded.resize(data.len() + self.degree, 0);

        let remainder = polynomial::modulo(&padded, gen_poly);

        // The remainder loses its leading zero coefficients during division
        let start = self.degree - remainder.len();
        if start > 0 {
            let mut buff = vec![0u8; self.degree];
            buff[start..].copy_from_slice(&remainder);
            return Ok(buff);
        }
        Ok(remainder)
    }
}
