//! Run-length coding of the tile grid (`rTIL` payloads).
//!
//! ## Instruction layout
//!
//! The top three bits of an instruction's first byte select its kind. Short
//! forms hold a count of 1..=32 in the low five bits; long forms hold 1..=1024
//! in the low two bits of the first byte and all of the second. Counts are
//! stored minus one.
//!
//! | Bits | Count | Meaning |
//! |------|-------|---------|
//! | `000n nnnn` | 1..=32 | empty cells in the current row |
//! | `0010 00nn nnnn nnnn` | 1..=1024 | empty cells in the current row |
//! | `010n nnnn` | 1..=32 | present cells in the current row |
//! | `0110 00nn nnnn nnnn` | 1..=1024 | present cells in the current row |
//! | `100n nnnn` | 1..=32 | fully empty rows |
//! | `1010 00nn nnnn nnnn` | 1..=1024 | fully empty rows |
//! | `110n nnnn` | 1..=32 | repeat the previous row |
//! | `1110 00nn nnnn nnnn` | 1..=1024 | repeat the previous row |
//!
//! Counts up to 32 always use the short form and larger counts the long
//! form; a count is never split across instructions.

use std::fmt;

use elvl_bytes::{BitField, ByteBuffer, ByteReader, CursorWrite};

use crate::error::DecodeError;
use crate::grid::{GRID_SIZE, TileGrid};

/// Largest count a one-byte instruction can hold.
pub const SHORT_MAX: u16 = 32;

/// Largest count any instruction can hold.
pub const LONG_MAX: u16 = 1024;

/// One tile-data instruction. Counts are in `1..=1024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RleOp {
    /// Skip `n` cells of the current row.
    EmptyRun(u16),
    /// Fill `n` cells of the current row.
    PresentRun(u16),
    /// Emit `n` rows with no cells set.
    EmptyRows(u16),
    /// Copy the previous row `n` times.
    RepeatRow(u16),
}

impl RleOp {
    /// The instruction's count.
    pub fn count(self) -> u16 {
        match self {
            Self::EmptyRun(n) | Self::PresentRun(n) | Self::EmptyRows(n) | Self::RepeatRow(n) => n,
        }
    }

    /// Returns `true` if the instruction needs the two-byte form.
    pub fn is_long(self) -> bool {
        self.count() > SHORT_MAX
    }

    /// Encoded size in bytes.
    pub fn encoded_len(self) -> usize {
        if self.is_long() { 2 } else { 1 }
    }

    fn kind(self) -> u8 {
        match self {
            Self::EmptyRun(_) => 0,
            Self::PresentRun(_) => 1,
            Self::EmptyRows(_) => 2,
            Self::RepeatRow(_) => 3,
        }
    }

    fn from_kind(kind: u64, count: u16) -> Self {
        match kind {
            0 => Self::EmptyRun(count),
            1 => Self::PresentRun(count),
            2 => Self::EmptyRows(count),
            _ => Self::RepeatRow(count),
        }
    }

    /// Writes the instruction at the cursor.
    pub fn write_to<W: CursorWrite>(self, out: &mut W) {
        let count = self.count();
        debug_assert!((1..=LONG_MAX).contains(&count), "count {count} out of range");
        let stored = count - 1;
        if self.is_long() {
            out.put_u8((self.kind() << 6) | 0x20 | (stored >> 8) as u8);
            out.put_u8((stored & 0xFF) as u8);
        } else {
            out.put_u8((self.kind() << 6) | stored as u8);
        }
    }

    /// Reads one instruction at the cursor.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.position();
        let first = reader.read_u8();
        let selector = first.bits(0, 2);
        let count = if selector & 1 == 1 {
            if reader.is_at_end() {
                return Err(DecodeError::TruncatedInstruction { offset });
            }
            let second = reader.read_u8();
            ((first.bits(6, 7) << 8) | u64::from(second)) + 1
        } else {
            first.bits(3, 7) + 1
        };
        // At most 10 bits plus one.
        Ok(Self::from_kind(selector >> 1, count as u16))
    }
}

impl fmt::Display for RleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = ByteBuffer::with_len(self.encoded_len());
        self.write_to(&mut buf);
        write!(f, "{self:?} [")?;
        for (i, byte) in buf.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:08b}")?;
        }
        f.write_str("]")
    }
}

/// Pending row-level instruction while encoding.
///
/// Only one kind accumulates at a time; switching kinds flushes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    EmptyRows(u16),
    Repeat(u16),
}

struct TileEncoder {
    ops: Vec<RleOp>,
    pending: Pending,
    last_row: Option<Vec<RleOp>>,
}

impl TileEncoder {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            pending: Pending::Idle,
            last_row: None,
        }
    }

    fn flush(&mut self) {
        match std::mem::replace(&mut self.pending, Pending::Idle) {
            Pending::Idle => {}
            Pending::EmptyRows(n) => self.ops.push(RleOp::EmptyRows(n)),
            Pending::Repeat(n) => self.ops.push(RleOp::RepeatRow(n)),
        }
    }

    fn empty_row(&mut self) {
        let pending = self.pending;
        self.pending = match pending {
            Pending::EmptyRows(n) => Pending::EmptyRows(n + 1),
            _ => {
                self.flush();
                Pending::EmptyRows(1)
            }
        };
        // A repeat never reaches back across an empty row.
        self.last_row = None;
    }

    fn row(&mut self, row: Vec<RleOp>) {
        if let Pending::EmptyRows(_) = self.pending {
            self.flush();
        }
        if self.last_row.as_ref() == Some(&row) {
            self.pending = match self.pending {
                Pending::Repeat(n) => Pending::Repeat(n + 1),
                _ => Pending::Repeat(1),
            };
            return;
        }
        self.flush();
        self.ops.extend_from_slice(&row);
        self.last_row = Some(row);
    }

    fn finish(mut self) -> Vec<RleOp> {
        self.flush();
        self.ops
    }
}

fn encode_row(grid: &TileGrid, y: usize) -> Vec<RleOp> {
    let mut row = Vec::new();
    let mut x = 0;
    while x < GRID_SIZE {
        let end = grid.run_end(y, x);
        let count = (end - x) as u16;
        row.push(if grid.get(x, y) {
            RleOp::PresentRun(count)
        } else {
            RleOp::EmptyRun(count)
        });
        x = end;
    }
    row
}

/// Converts a grid into its instruction sequence.
pub fn grid_to_ops(grid: &TileGrid) -> Vec<RleOp> {
    let mut encoder = TileEncoder::new();
    for y in 0..GRID_SIZE {
        if grid.row_is_empty(y) {
            encoder.empty_row();
        } else {
            encoder.row(encode_row(grid, y));
        }
    }
    encoder.finish()
}

/// Serializes instructions into a buffer sized up front.
pub fn ops_to_bytes(ops: &[RleOp]) -> Vec<u8> {
    let len = ops.iter().map(|op| op.encoded_len()).sum();
    let mut buf = ByteBuffer::with_len(len);
    for op in ops {
        op.write_to(&mut buf);
    }
    buf.into_inner()
}

/// Parses a payload into instructions without interpreting them.
pub fn bytes_to_ops(payload: &[u8]) -> Result<Vec<RleOp>, DecodeError> {
    let mut reader = ByteReader::new(payload);
    let mut ops = Vec::new();
    while !reader.is_at_end() {
        ops.push(RleOp::read_from(&mut reader)?);
    }
    Ok(ops)
}

/// Compresses a grid into an `rTIL` payload (without chunk padding).
pub fn compress(grid: &TileGrid) -> Vec<u8> {
    let bytes = ops_to_bytes(&grid_to_ops(grid));
    tracing::debug!(cells = grid.count(), bytes = bytes.len(), "compressed tile grid");
    bytes
}

/// Expands an `rTIL` payload into a grid.
///
/// The payload must produce exactly 1024 complete rows.
pub fn decompress(payload: &[u8]) -> Result<TileGrid, DecodeError> {
    let mut grid = TileGrid::new();
    let mut reader = ByteReader::new(payload);
    let (mut x, mut y) = (0usize, 0usize);

    while !reader.is_at_end() {
        let offset = reader.position();
        let op = RleOp::read_from(&mut reader)?;
        tracing::trace!(offset, x, y, %op, "tile instruction");
        let count = usize::from(op.count());

        match op {
            RleOp::EmptyRun(_) | RleOp::PresentRun(_) => {
                if y >= GRID_SIZE {
                    return Err(DecodeError::GridOverflow { row: y, count: 1 });
                }
                if x + count > GRID_SIZE {
                    return Err(DecodeError::RunOverflow { row: y, x, count });
                }
                if let RleOp::PresentRun(_) = op {
                    grid.fill_span(y, x, x + count);
                }
                x += count;
                if x == GRID_SIZE {
                    x = 0;
                    y += 1;
                }
            }
            RleOp::EmptyRows(_) => {
                if x != 0 {
                    return Err(DecodeError::MisplacedEmptyRows { row: y, x });
                }
                if y + count > GRID_SIZE {
                    return Err(DecodeError::GridOverflow { row: y, count });
                }
                y += count;
            }
            RleOp::RepeatRow(_) => {
                if x != 0 {
                    return Err(DecodeError::MisplacedRepeat { row: y, x });
                }
                if y == 0 {
                    return Err(DecodeError::RepeatOnFirstRow);
                }
                if y + count > GRID_SIZE {
                    return Err(DecodeError::GridOverflow { row: y, count });
                }
                for row in y..y + count {
                    grid.copy_row(y - 1, row);
                }
                y += count;
            }
        }
    }

    if y != GRID_SIZE {
        return Err(DecodeError::IncompleteGrid { rows: y });
    }
    Ok(grid)
}
