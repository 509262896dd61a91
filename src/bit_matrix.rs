/// Square grid of modules plus a parallel flag array marking function-pattern cells.
///
/// Cells are addressed `(row, col)` and stored row-major in owned flat buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    data: Vec<bool>,
    reserved: Vec<bool>,
}

impl BitMatrix {
    /// Creates an all-light `size`×`size` matrix with nothing reserved.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![false; size * size],
            reserved: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sets a module value; `reserved` marks the cell as part of a function pattern.
    pub fn set(&mut self, row: usize, col: usize, value: bool, reserved: bool) {
        let index = row * self.size + col;
        self.data[index] = value;
        if reserved {
            self.reserved[index] = true;
        }
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[row * self.size + col]
    }

    pub fn xor(&mut self, row: usize, col: usize, value: bool) {
        self.data[row * self.size + col] ^= value;
    }

    pub fn is_reserved(&self, row: usize, col: usize) -> bool {
        self.reserved[row * self.size + col]
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.data.iter().filter(|&&bit| bit).count()
    }

    /// Row-major module values.
    pub fn data(&self) -> &[bool] {
        &self.data
    }
}
