//! Rectangles over the tile grid: rasterization and decomposition.

use serde::{Deserialize, Serialize};

use crate::grid::{GRID_SIZE, TileGrid};

/// An axis-aligned rectangle of tiles.
///
/// Covers columns `x..x + width` and rows `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
}

impl TileRect {
    /// The rectangle covering the whole grid.
    pub const FULL: TileRect = TileRect {
        x: 0,
        y: 0,
        width: GRID_SIZE as u16,
        height: GRID_SIZE as u16,
    };

    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    pub fn right(&self) -> usize {
        usize::from(self.x) + usize::from(self.width)
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> usize {
        usize::from(self.y) + usize::from(self.height)
    }

    /// Number of cells covered.
    pub fn area(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns `true` if the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (usize::from(self.x)..self.right()).contains(&x)
            && (usize::from(self.y)..self.bottom()).contains(&y)
    }

    /// Returns `true` if the rectangle lies entirely inside the grid.
    pub fn is_inside_grid(&self) -> bool {
        self.right() <= GRID_SIZE && self.bottom() <= GRID_SIZE
    }
}

/// Marks every cell covered by any of `rects`.
///
/// Overlapping rectangles are fine. Parts of a rectangle outside the grid are
/// dropped with a warning.
pub fn rasterize(rects: &[TileRect]) -> TileGrid {
    let mut grid = TileGrid::new();
    for rect in rects {
        if !rect.is_inside_grid() {
            tracing::warn!(?rect, "rectangle clipped to the 1024x1024 grid");
        }
        let left = usize::from(rect.x).min(GRID_SIZE);
        let right = rect.right().min(GRID_SIZE);
        let bottom = rect.bottom().min(GRID_SIZE);
        for y in usize::from(rect.y)..bottom {
            grid.set_span(y, left, right, true);
        }
    }
    grid
}

/// Splits a grid into rectangles whose union is exactly its set cells.
///
/// Scans in row-major order. At each set cell not yet covered, the rectangle
/// grows right while the row stays set, then down while every cell under that
/// width stays set. The result is lossless but not minimal, and comes out
/// ordered by top-left corner.
pub fn decompose(grid: &TileGrid) -> Vec<TileRect> {
    let mut work = grid.clone();
    let mut rects = Vec::new();
    for y in 0..GRID_SIZE {
        let mut x = 0;
        while x < GRID_SIZE {
            if !work.get(x, y) {
                x = work.run_end(y, x);
                continue;
            }
            let right = work.run_end(y, x);
            let mut bottom = y + 1;
            while bottom < GRID_SIZE && work.span_is_full(bottom, x, right) {
                bottom += 1;
            }
            for row in y..bottom {
                work.set_span(row, x, right, false);
            }
            // Every bound is at most 1024, so the narrowing is lossless.
            rects.push(TileRect::new(
                x as u16,
                y as u16,
                (right - x) as u16,
                (bottom - y) as u16,
            ));
            x = right;
        }
    }
    rects
}
