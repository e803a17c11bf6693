//! Bit-field extraction over fixed-width unsigned integers.
//!
//! Bits are numbered from the most significant end: in a `u8`, bit 0 is
//! `0x80` and bit 7 is `0x01`. A field `first..=last` therefore reads the way
//! the bits are written out in a format table (`010n nnnn`).

/// An unsigned integer whose bits can be sliced into fields.
pub trait BitField: Copy {
    /// Width of the integer in bits.
    const WIDTH: u32;

    /// Widens the value to `u64` without sign extension.
    fn widen(self) -> u64;

    /// Extracts the inclusive field `first..=last`, counted from the most
    /// significant bit, right-aligned in the result.
    ///
    /// # Panics
    ///
    /// Panics if `first > last` or `last >= Self::WIDTH`.
    fn bits(self, first: u32, last: u32) -> u64 {
        assert!(
            first <= last && last < Self::WIDTH,
            "bit field {first}..={last} out of range for a {}-bit value",
            Self::WIDTH
        );
        let count = last - first + 1;
        let shift = Self::WIDTH - 1 - last;
        let mask = if count == 64 {
            u64::MAX
        } else {
            (1u64 << count) - 1
        };
        (self.widen() >> shift) & mask
    }
}

macro_rules! impl_bit_field {
    ($($ty:ty),*) => {$(
        impl BitField for $ty {
            const WIDTH: u32 = <$ty>::BITS;

            #[inline]
            fn widen(self) -> u64 {
                u64::from(self)
            }
        }
    )*};
}

impl_bit_field!(u8, u16, u32, u64);
