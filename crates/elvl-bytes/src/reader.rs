//! Sequential reads over a borrowed byte slice.

use crate::latin1::decode_latin1;

macro_rules! read_ints {
    ($($be:ident, $le:ident => $ty:ty;)*) => {$(
        #[doc = concat!("Reads a big-endian `", stringify!($ty), "` and advances the cursor.")]
        pub fn $be(&mut self) -> $ty {
            <$ty>::from_be_bytes(self.array())
        }

        #[doc = concat!("Reads a little-endian `", stringify!($ty), "` and advances the cursor.")]
        pub fn $le(&mut self) -> $ty {
            <$ty>::from_le_bytes(self.array())
        }
    )*};
}

/// A read cursor over a byte slice.
///
/// Reads past the end panic. Check [`remaining`](Self::remaining) first when
/// the input is untrusted.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current cursor offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor to an absolute offset (may equal the length).
    ///
    /// # Panics
    ///
    /// Panics if `position` is past the end of the slice.
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.data.len(),
            "position {position} past end of {}-byte slice",
            self.data.len()
        );
        self.position = position;
    }

    /// Bytes left between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns `true` once the cursor has reached the end.
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// The whole underlying slice.
    pub fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the next `len` bytes and advances past them.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> &'a [u8] {
        assert!(
            len <= self.remaining(),
            "read of {len} bytes at offset {} overruns {}-byte slice",
            self.position,
            self.data.len()
        );
        let start = self.position;
        self.position += len;
        &self.data[start..self.position]
    }

    /// Advances the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) {
        self.take(len);
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    read_ints! {
        read_u16, read_u16_le => u16;
        read_i16, read_i16_le => i16;
        read_u32, read_u32_le => u32;
        read_i32, read_i32_le => i32;
        read_u64, read_u64_le => u64;
        read_i64, read_i64_le => i64;
    }

    /// Reads exactly `len` bytes as single-byte text.
    pub fn read_latin1(&mut self, len: usize) -> String {
        decode_latin1(self.take(len))
    }

    /// Reads a fixed-width field holding NUL-terminated text.
    ///
    /// The cursor always advances by `width`; the text stops at the first NUL
    /// or at the end of the field.
    pub fn read_cstr(&mut self, width: usize) -> String {
        let field = self.take(width);
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        decode_latin1(&field[..end])
    }

    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endianness() {
        let data = [0x12, 0x34, 0x12, 0x34];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u16(), 0x1234);
        assert_eq!(reader.read_u16_le(), 0x3412);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_signed_reads_are_twos_complement() {
        let data = [0xFF, 0xFE, 0xFE, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_i16(), -2);
        assert_eq!(reader.read_i32_le(), -2);
    }

    #[test]
    fn test_sixty_four_bit_reads() {
        let data = 0x0102_0304_0506_0708u64.to_le_bytes();
        assert_eq!(ByteReader::new(&data).read_u64_le(), 0x0102_0304_0506_0708);
        assert_eq!(ByteReader::new(&data).read_i64(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_cstr_consumes_full_field() {
        let mut field = [0u8; 16];
        field[..4].copy_from_slice(b"base");
        let mut data = field.to_vec();
        data.push(0x7F);

        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_cstr(16), "base");
        assert_eq!(reader.position(), 16);
        assert_eq!(reader.read_u8(), 0x7F);
    }

    #[test]
    fn test_cstr_without_terminator_uses_whole_field() {
        let mut reader = ByteReader::new(b"abcd");
        assert_eq!(reader.read_cstr(4), "abcd");
    }

    #[test]
    fn test_skip_and_take() {
        let data = *b"rNAMxyz";
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.take(4), b"rNAM");
        reader.skip(2);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_seek_back_and_reread() {
        let data = [0x20, 0x00, 0x00, 0x00, 0xFF];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u32_le(), 32);
        reader.set_position(0);
        assert_eq!(reader.read_u16(), 0x2000);
        reader.set_position(data.len());
        assert!(reader.is_at_end());
    }

    #[test]
    #[should_panic(expected = "past end")]
    fn test_seek_past_end_panics() {
        ByteReader::new(&[1, 2, 3]).set_position(4);
    }

    #[test]
    #[should_panic(expected = "overruns")]
    fn test_overrun_panics() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        reader.read_u32_le();
    }
}
