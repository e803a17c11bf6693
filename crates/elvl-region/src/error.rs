//! Decode error types.

/// Errors that can occur while decoding a region.
///
/// Every variant aborts the whole decode; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer than 8 bytes remain where a chunk tag and length are expected.
    #[error("truncated chunk header at offset {offset}: {remaining} bytes remain, need 8")]
    TruncatedHeader {
        /// Offset of the incomplete header.
        offset: usize,
        /// Bytes left in the body.
        remaining: usize,
    },

    /// A chunk (or its padding) extends past the end of the super-chunk body.
    #[error("chunk data runs to offset {consumed}, past super-chunk length {declared}")]
    TrailingOrOverrunData {
        /// Offset the chunk would end at.
        consumed: usize,
        /// Length of the super-chunk body.
        declared: usize,
    },

    /// A run would place more than 1024 cells in a row.
    #[error("run of {count} cells at x = {x} overflows row {row}")]
    RunOverflow {
        /// Row being filled.
        row: usize,
        /// Column the run starts at.
        x: usize,
        /// Length of the run.
        count: usize,
    },

    /// An empty-rows instruction appeared in the middle of a row.
    #[error("empty rows in the middle of row {row} (x = {x})")]
    MisplacedEmptyRows {
        /// Row being filled.
        row: usize,
        /// Current column.
        x: usize,
    },

    /// A repeat instruction appeared in the middle of a row.
    #[error("row repeat in the middle of row {row} (x = {x})")]
    MisplacedRepeat {
        /// Row being filled.
        row: usize,
        /// Current column.
        x: usize,
    },

    /// A repeat instruction appeared before any row was produced.
    #[error("row repeat before the first row")]
    RepeatOnFirstRow,

    /// The tile data ended before all 1024 rows were produced.
    #[error("tile data holds {rows} complete rows, need 1024")]
    IncompleteGrid {
        /// Rows produced when the data ran out.
        rows: usize,
    },

    /// A two-byte instruction was cut off by the end of the tile data.
    #[error("two-byte tile instruction cut off at offset {offset}")]
    TruncatedInstruction {
        /// Offset of the instruction's first byte.
        offset: usize,
    },

    /// An instruction would produce rows past the bottom of the grid.
    #[error("{count} more rows at row {row} run past the bottom of the grid")]
    GridOverflow {
        /// Row the instruction starts at.
        row: usize,
        /// Rows the instruction would add.
        count: usize,
    },

    /// The outer super-chunk is not a region.
    #[error("expected a REGN super-chunk, found tag {tag:?}")]
    NotARegion {
        /// Tag that was found, as text.
        tag: String,
    },
}
