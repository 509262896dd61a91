//! Where the finder and alignment patterns sit for a given version.

use crate::version::Version;

/// Top-left corners `(row, col)` of the three finder patterns.
pub fn finder_positions(version: Version) -> [(usize, usize); 3] {
    let size = version.symbol_size();
    [(0, 0), (size - 7, 0), (0, size - 7)]
}

/// Row/column coordinates of alignment pattern centers, ascending. Empty for version 1.
pub fn alignment_row_col_coords(version: Version) -> Vec<usize> {
    let ver = usize::from(version.value());
    if ver == 1 {
        return Vec::new();
    }

    let pos_count = ver / 7 + 2;
    let size = version.symbol_size();
    // version 32 is the one irregular spacing
    let interval = if size == 145 {
        26
    } else {
        ((size - 13) + (2 * pos_count - 2) - 1) / (2 * pos_count - 2) * 2
    };

    let mut positions = vec![size - 7];
    for i in 1..pos_count - 1 {
        positions.push(positions[i - 1] - interval);
    }
    positions.push(6);
    positions.reverse();
    positions
}

/// Centers `(row, col)` of every alignment pattern, skipping the three finder corners.
pub fn alignment_positions(version: Version) -> Vec<(usize, usize)> {
    let coords = alignment_row_col_coords(version);
    let last = coords.len().saturating_sub(1);
    let mut result = Vec::with_capacity(coords.len() * coords.len());

    for (i, &row) in coords.iter().enumerate() {
        for (j, &col) in coords.iter().enumerate() {
            if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                continue;
            }
            result.push((row, col));
        }
    }
    result
}
