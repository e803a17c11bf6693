//! Byte cursor buffers for the eLVL map format.
//!
//! Two narrow interfaces sit over the same storage:
//!
//! - [`CursorWrite`] and [`ByteReader`] move a cursor forward through the
//!   bytes, one field after another.
//! - [`IndexedBytes`] reads and writes at absolute offsets and never touches
//!   the cursor.
//!
//! Buffers never grow on their own. Callers size them up front, and any access
//! past the end is a bug that panics immediately.

pub mod bits;
pub mod buffer;
pub mod latin1;
pub mod reader;

pub use bits::BitField;
pub use buffer::{ByteBuffer, CursorWrite, IndexedBytes};
pub use latin1::{decode_latin1, encode_latin1, is_latin1};
pub use reader::ByteReader;
