//! Grid layout planning for sprite sheets
//!
//! A fixed square-ish heuristic, not a space-minimizing packer: perfect
//! squares get a square grid, everything else gets `floor(sqrt(n))` columns
//! and as many rows as needed.

/// Sheet dimensions measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

impl GridSize {
    /// Total number of cells in the grid.
    pub fn cells(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Plan the grid for `count` tiles.
///
/// `count` must be positive; a zero count yields an empty 0x0 grid.
///
/// # Examples
///
/// ```
/// use spritepack::layout::plan_grid;
///
/// let grid = plan_grid(10);
/// assert_eq!((grid.columns, grid.rows), (3, 4));
/// ```
pub fn plan_grid(count: u32) -> GridSize {
    if count == 0 {
        return GridSize { columns: 0, rows: 0 };
    }

    let root = integer_sqrt(count);
    if root * root == count {
        GridSize { columns: root, rows: root }
    } else {
        GridSize { columns: root, rows: count.div_ceil(root) }
    }
}

/// floor(sqrt(n)), exact for every u32.
fn integer_sqrt(n: u32) -> u32 {
    let mut root = (n as f64).sqrt() as u32;
    // Correct any off-by-one from the float estimate
    while (root as u64) * (root as u64) > n as u64 {
        root -= 1;
    }
    while ((root + 1) as u64) * ((root + 1) as u64) <= n as u64 {
        root += 1;
    }
    root
}
