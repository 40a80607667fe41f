//! Element types storable in a [`GuardedStack`](super::stack::GuardedStack)
//!
//! An element must be plain data: copyable, hashable into the data checksum
//! byte by byte, and able to carry the poison pattern written into reserved
//! slots.

use super::checksum::Adler32;
use super::POISON_WORD;
use std::fmt;

/// A value that can live in a guarded stack buffer
pub trait StackValue: Copy + PartialEq + fmt::Debug {
    /// Pattern written into every reserved slot
    const POISON: Self;

    /// Feed the value's in-memory representation into a checksum
    fn digest(&self, sum: &mut Adler32);

    /// Hex rendering used by corruption dumps for reserved slots
    fn to_hex(&self) -> String;
}

macro_rules! impl_stack_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl StackValue for $t {
                // Truncated or widened to the element width
                const POISON: Self = POISON_WORD as $t;

                fn digest(&self, sum: &mut Adler32) {
                    sum.update(&self.to_le_bytes());
                }

                fn to_hex(&self) -> String {
                    format!("{:#x}", self)
                }
            }
        )*
    };
}

impl_stack_value!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_patterns() {
        assert_eq!(<u32 as StackValue>::POISON, 0xDEAD_BEEF);
        assert_eq!(<i32 as StackValue>::POISON, 0xDEAD_BEEFu32 as i32);
        assert_eq!(<u8 as StackValue>::POISON, 0xEF);
        assert_eq!(<u64 as StackValue>::POISON, 0xDEAD_BEEF);
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(<i32 as StackValue>::POISON.to_hex(), "0xdeadbeef");
        assert_eq!(255u8.to_hex(), "0xff");
    }
}
