//! Fixed-size byte buffer with a write cursor and absolute-offset access.

use crate::latin1::{decode_latin1, is_latin1, latin1_byte};
use crate::reader::ByteReader;

macro_rules! put_ints {
    ($($be:ident, $le:ident => $ty:ty;)*) => {$(
        #[doc = concat!("Writes a big-endian `", stringify!($ty), "` and advances the cursor.")]
        fn $be(&mut self, value: $ty) {
            self.put_bytes(&value.to_be_bytes());
        }

        #[doc = concat!("Writes a little-endian `", stringify!($ty), "` and advances the cursor.")]
        fn $le(&mut self, value: $ty) {
            self.put_bytes(&value.to_le_bytes());
        }
    )*};
}

macro_rules! indexed_ints {
    ($($get:ident, $set:ident, $from:ident, $to:ident => $ty:ty;)*) => {$(
        #[doc = concat!("Reads a `", stringify!($ty), "` at `index` (", stringify!($from), ").")]
        fn $get(&self, index: usize) -> $ty {
            let mut out = [0u8; size_of::<$ty>()];
            out.copy_from_slice(self.bytes_at(index, size_of::<$ty>()));
            <$ty>::$from(out)
        }

        #[doc = concat!("Writes a `", stringify!($ty), "` at `index` (", stringify!($to), ").")]
        fn $set(&mut self, index: usize, value: $ty) {
            self.bytes_at_mut(index, size_of::<$ty>())
                .copy_from_slice(&value.$to());
        }
    )*};
}

/// Sequential writes at a cursor that only moves forward.
pub trait CursorWrite {
    /// Copies `bytes` at the cursor and advances past them.
    ///
    /// # Panics
    ///
    /// Panics if the bytes do not fit before the end of the buffer.
    fn put_bytes(&mut self, bytes: &[u8]);

    /// Writes one byte.
    fn put_u8(&mut self, value: u8) {
        self.put_bytes(&[value]);
    }

    /// Writes `count` zero bytes.
    fn put_zeros(&mut self, count: usize) {
        for _ in 0..count {
            self.put_u8(0);
        }
    }

    put_ints! {
        put_u16, put_u16_le => u16;
        put_i16, put_i16_le => i16;
        put_u32, put_u32_le => u32;
        put_i32, put_i32_le => i32;
        put_u64, put_u64_le => u64;
        put_i64, put_i64_le => i64;
    }

    /// Writes `text` one byte per character.
    fn put_latin1(&mut self, text: &str) {
        if !is_latin1(text) {
            tracing::warn!(text, "characters above U+00FF written as '?'");
        }
        for c in text.chars() {
            self.put_u8(latin1_byte(c));
        }
    }

    /// Writes `text` into a field of exactly `width` bytes.
    ///
    /// Longer text is cut at `width` characters; shorter text is followed by
    /// zero bytes up to `width`.
    fn put_padded_latin1(&mut self, text: &str, width: usize) {
        let mut written = 0;
        for c in text.chars().take(width) {
            self.put_u8(latin1_byte(c));
            written += 1;
        }
        self.put_zeros(width - written);
    }
}

/// Random access at absolute offsets. None of these methods move a cursor.
pub trait IndexedBytes {
    /// Borrows `len` bytes starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the end of the storage.
    fn bytes_at(&self, index: usize, len: usize) -> &[u8];

    /// Mutably borrows `len` bytes starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the end of the storage.
    fn bytes_at_mut(&mut self, index: usize, len: usize) -> &mut [u8];

    /// Reads the byte at `index`.
    fn u8_at(&self, index: usize) -> u8 {
        self.bytes_at(index, 1)[0]
    }

    /// Writes the byte at `index`.
    fn set_u8_at(&mut self, index: usize, value: u8) {
        self.bytes_at_mut(index, 1)[0] = value;
    }

    indexed_ints! {
        u16_at, set_u16_at, from_be_bytes, to_be_bytes => u16;
        u16_le_at, set_u16_le_at, from_le_bytes, to_le_bytes => u16;
        i16_at, set_i16_at, from_be_bytes, to_be_bytes => i16;
        i16_le_at, set_i16_le_at, from_le_bytes, to_le_bytes => i16;
        u32_at, set_u32_at, from_be_bytes, to_be_bytes => u32;
        u32_le_at, set_u32_le_at, from_le_bytes, to_le_bytes => u32;
        i32_at, set_i32_at, from_be_bytes, to_be_bytes => i32;
        i32_le_at, set_i32_le_at, from_le_bytes, to_le_bytes => i32;
        i64_at, set_i64_at, from_be_bytes, to_be_bytes => i64;
        i64_le_at, set_i64_le_at, from_le_bytes, to_le_bytes => i64;
    }

    /// Reads `len` bytes at `index` as single-byte text.
    fn latin1_at(&self, index: usize, len: usize) -> String {
        decode_latin1(self.bytes_at(index, len))
    }

    /// Reads NUL-terminated text at `index`, looking at most `max_len` bytes
    /// ahead.
    fn cstr_at(&self, index: usize, max_len: usize) -> String {
        let field = self.bytes_at(index, max_len);
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        decode_latin1(&field[..end])
    }
}

/// A byte buffer of fixed length with a write cursor.
///
/// The length is chosen at construction and only changes through
/// [`resize`](Self::resize). Writing past the end panics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
    position: usize,
}

impl ByteBuffer {
    /// Creates a zero-filled buffer of `len` bytes with the cursor at 0.
    pub fn with_len(len: usize) -> Self {
        Self {
            data: vec![0; len],
            position: 0,
        }
    }

    /// Wraps existing bytes with the cursor at 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor to an absolute offset (may equal the length).
    ///
    /// # Panics
    ///
    /// Panics if `position` is past the end of the buffer.
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.data.len(),
            "position {position} past end of {}-byte buffer",
            self.data.len()
        );
        self.position = position;
    }

    /// Bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Grows (zero-filled) or shrinks the buffer to `len` bytes.
    ///
    /// The cursor is clamped to the new length.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, 0);
        self.position = self.position.min(len);
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// A read cursor over the whole buffer, starting at offset 0.
    pub fn reader(&self) -> ByteReader<'_> {
        ByteReader::new(&self.data)
    }

    /// Consumes the buffer and returns its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl CursorWrite for ByteBuffer {
    fn put_bytes(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        assert!(
            end <= self.data.len(),
            "write of {} bytes at offset {} overruns {}-byte buffer",
            bytes.len(),
            self.position,
            self.data.len()
        );
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }
}

impl IndexedBytes for ByteBuffer {
    fn bytes_at(&self, index: usize, len: usize) -> &[u8] {
        assert!(
            index + len <= self.data.len(),
            "access of {len} bytes at offset {index} overruns {}-byte buffer",
            self.data.len()
        );
        &self.data[index..index + len]
    }

    fn bytes_at_mut(&mut self, index: usize, len: usize) -> &mut [u8] {
        assert!(
            index + len <= self.data.len(),
            "access of {len} bytes at offset {index} overruns {}-byte buffer",
            self.data.len()
        );
        &mut self.data[index..index + len]
    }
}
