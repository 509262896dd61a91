/// An append-only sequence of bits, packed MSB-first into bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bit at `index`.
    pub fn get(&self, index: usize) -> bool {
        let bufindex = index / 8;
        ((self.data[bufindex] >> (7 - index % 8)) & 1) == 1
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn put(&mut self, val: u32, len: u8) {
        debug_assert!(len <= 32);
        for i in (0..len).rev() {
            self.put_bit(((val >> i) & 1) == 1);
        }
    }

    pub fn put_bit(&mut self, bit: bool) {
        let bufindex = self.length / 8;
        if self.data.len() <= bufindex {
            self.data.push(0);
        }
        if bit {
            self.data[bufindex] |= 0x80 >> (self.length % 8);
        }
        self.length += 1;
    }

    pub fn len_in_bits(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The packed bytes; a trailing partial byte is zero-padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
