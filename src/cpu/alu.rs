//! 8-bit ALU operations and flag computation.
//!
//! Results are computed wide, truncated to 8 bits, and the flags derived
//! from both the wide and truncated values.

use super::registers::Flags;

/// The truncated result of an ALU operation and the flags it defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

impl AluResult {
    fn new(value: u8, carry: bool, overflow: bool) -> Self {
        Self {
            value,
            flags: Flags {
                zero: value == 0,
                negative: value & 0x80 != 0,
                carry,
                overflow,
            },
        }
    }
}

/// `a + b`. C is the unsigned carry out; V is set when two operands of the
/// same sign produce a result of the other sign.
pub fn add(a: u8, b: u8) -> AluResult {
    let wide = a as u16 + b as u16;
    let value = wide as u8;
    let overflow = (a ^ value) & (b ^ value) & 0x80 != 0;
    AluResult::new(value, wide > 0xFF, overflow)
}

/// `a - b`. C is the borrow (set iff `a < b`); V is set when operands of
/// different sign produce a result whose sign differs from `a`.
pub fn sub(a: u8, b: u8) -> AluResult {
    let value = a.wrapping_sub(b);
    let overflow = (a ^ b) & (a ^ value) & 0x80 != 0;
    AluResult::new(value, a < b, overflow)
}

/// `a * b`. C and V are both set iff the full product exceeds 255.
pub fn mul(a: u8, b: u8) -> AluResult {
    let wide = a as u16 * b as u16;
    let out_of_range = wide > 0xFF;
    AluResult::new(wide as u8, out_of_range, out_of_range)
}

/// `a + 1`, flags as for [`add`].
#[inline]
pub fn inc(a: u8) -> AluResult {
    add(a, 1)
}

/// `a - 1`, flags as for [`sub`].
#[inline]
pub fn dec(a: u8) -> AluResult {
    sub(a, 1)
}

/// Flags of `a - b`; the caller discards the value.
#[inline]
pub fn compare(a: u8, b: u8) -> Flags {
    sub(a, b).flags
}
