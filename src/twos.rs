//! Two's-complement encode/decode
//!
//! Bridges between mathematical signed integers and fixed-width 32-bit
//! two's-complement bit patterns, and decomposes such patterns into
//! sign and magnitude for the multiply/divide unit.

use crate::bits::{self, Bit, Bits};

/// A 32-bit two's-complement encoding together with its pretty hex
/// form and a range flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeI32 {
    /// 32-bit two's-complement pattern, LSB-first
    pub bits: Bits,
    /// Trimmed `0x`-prefixed hex form of the pattern
    pub hex: String,
    /// Set iff the value lies outside `[-2^31, 2^31 - 1]`
    pub overflow: bool,
}

/// A sign bit plus an unsigned magnitude with no embedded sign. The
/// magnitude is trimmed of leading zeros but never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignMag32 {
    pub sign: Bit,
    pub mag: Bits,
}

/// Encode a signed integer into 32-bit two's-complement. Values
/// outside the signed 32-bit range wrap into 32 bits and set the
/// overflow flag.
pub fn encode_twos_i32(value: i64) -> EncodeI32 {
    let overflow = value < i64::from(i32::MIN) || value > i64::from(i32::MAX);
    let pattern = bits::from_u32(value as u32);
    let hex = bits::to_hex_string(&pattern, true);
    EncodeI32 {
        bits: pattern,
        hex,
        overflow,
    }
}

/// Interpret a bit vector as a signed 32-bit value. Narrower inputs
/// are sign-extended, wider ones truncated to bits [31:0]. The return
/// type is i64 so INT_MIN decodes without wrapping.
pub fn decode_twos_i32(b: &[Bit]) -> i64 {
    let w = ensure_i32_width(b);
    if w[31] == 0 {
        sum_of_set_bits(&w)
    } else {
        -sum_of_set_bits(&bits::twos_negate(&w))
    }
}

/// Decompose a 32-bit two's-complement vector into sign and magnitude.
/// A negative value is two's-negated to recover its magnitude.
pub fn decode_i32_to_sign_and_magnitude(b: &[Bit]) -> SignMag32 {
    let w = ensure_i32_width(b);
    let sign = w[31];
    let mag = if sign == 0 {
        bits::trim_leading(&w)
    } else {
        bits::trim_leading(&bits::twos_negate(&w))
    };
    SignMag32 { sign, mag }
}

/// Rebuild a 32-bit two's-complement vector from sign and magnitude:
/// zero-extend the magnitude to 32 bits, then two's-negate if the sign
/// bit is set.
pub fn encode_i32_from_sign_and_magnitude(sign: Bit, magnitude: &[Bit]) -> Bits {
    let mag32 = bits::zero_extend(magnitude, 32);
    if sign == 0 {
        mag32
    } else {
        bits::twos_negate(&mag32)
    }
}

fn ensure_i32_width(b: &[Bit]) -> Bits {
    match b.len() {
        0 => vec![0; 32],
        n if n < 32 => bits::sign_extend(b, 32),
        32 => b.to_vec(),
        _ => bits::slice(b, 31, 0),
    }
}

fn sum_of_set_bits(b: &[Bit]) -> i64 {
    b.iter()
        .enumerate()
        .filter(|(_, bit)| **bit == 1)
        .map(|(i, _)| 1i64 << i)
        .sum()
}
