//! The 1024×1024 tile grid as a packed bitmap.
//!
//! Each row occupies 16 `u64` words. Cell `x` of a row lives in word `x / 64`
//! at bit `x % 64` (least significant bit first), so whole-word operations
//! cover 64 cells at once when scanning for runs.

use std::fmt;

use static_assertions::const_assert_eq;

/// Side length of the map grid in tiles.
pub const GRID_SIZE: usize = 1024;

/// Total number of cells in the grid.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS_PER_ROW: usize = GRID_SIZE / WORD_BITS;

const_assert_eq!(GRID_SIZE % WORD_BITS, 0);
const_assert_eq!(WORDS_PER_ROW * GRID_SIZE * WORD_BITS, GRID_CELLS);

/// A 1024×1024 boolean grid, one bit per cell.
///
/// Built fresh for each encode or decode call and never persisted directly.
#[derive(Clone, PartialEq, Eq)]
pub struct TileGrid {
    words: Vec<u64>,
}

impl TileGrid {
    /// Creates a grid with every cell clear.
    pub fn new() -> Self {
        Self {
            words: vec![0; GRID_CELLS / WORD_BITS],
        }
    }

    /// Returns whether the cell at `(x, y)` is set.
    ///
    /// Both coordinates must be in `0..1024`.
    pub fn get(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < GRID_SIZE && y < GRID_SIZE, "cell ({x}, {y}) outside grid");
        let word = self.words[y * WORDS_PER_ROW + x / WORD_BITS];
        (word >> (x % WORD_BITS)) & 1 == 1
    }

    /// Sets or clears the cell at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < GRID_SIZE && y < GRID_SIZE, "cell ({x}, {y}) outside grid");
        let word = &mut self.words[y * WORDS_PER_ROW + x / WORD_BITS];
        let mask = 1u64 << (x % WORD_BITS);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Sets or clears cells `start..end` of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the span or row lies outside the grid.
    pub fn set_span(&mut self, y: usize, start: usize, end: usize, value: bool) {
        assert!(
            y < GRID_SIZE && start <= end && end <= GRID_SIZE,
            "span {start}..{end} of row {y} outside grid"
        );
        let base = y * WORDS_PER_ROW;
        let mut x = start;
        while x < end {
            let bit = x % WORD_BITS;
            let take = (WORD_BITS - bit).min(end - x);
            let mask = if take == WORD_BITS {
                u64::MAX
            } else {
                ((1u64 << take) - 1) << bit
            };
            let word = &mut self.words[base + x / WORD_BITS];
            if value {
                *word |= mask;
            } else {
                *word &= !mask;
            }
            x += take;
        }
    }

    /// Sets cells `start..end` of row `y`.
    pub fn fill_span(&mut self, y: usize, start: usize, end: usize) {
        self.set_span(y, start, end, true);
    }

    /// Returns the first column at or after `x` whose value differs from the
    /// cell at `(x, y)`, or 1024 if the run reaches the end of the row.
    pub fn run_end(&self, y: usize, x: usize) -> usize {
        let value = self.get(x, y);
        let row = self.row_words(y);
        let mut x = x;
        while x < GRID_SIZE {
            let word = if value {
                !row[x / WORD_BITS]
            } else {
                row[x / WORD_BITS]
            };
            let ahead = word >> (x % WORD_BITS);
            if ahead != 0 {
                return x + ahead.trailing_zeros() as usize;
            }
            x = (x / WORD_BITS + 1) * WORD_BITS;
        }
        GRID_SIZE
    }

    /// Returns `true` if every cell in `start..end` of row `y` is set.
    pub fn span_is_full(&self, y: usize, start: usize, end: usize) -> bool {
        start >= end || (self.get(start, y) && self.run_end(y, start) >= end)
    }

    /// Returns `true` if no cell in row `y` is set.
    pub fn row_is_empty(&self, y: usize) -> bool {
        self.row_words(y).iter().all(|&w| w == 0)
    }

    /// Copies row `src` over row `dst`.
    pub fn copy_row(&mut self, src: usize, dst: usize) {
        let from = src * WORDS_PER_ROW;
        self.words
            .copy_within(from..from + WORDS_PER_ROW, dst * WORDS_PER_ROW);
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no cell is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    fn row_words(&self, y: usize) -> &[u64] {
        let start = y * WORDS_PER_ROW;
        &self.words[start..start + WORDS_PER_ROW]
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileGrid")
            .field("cells", &self.count())
            .finish()
    }
}
