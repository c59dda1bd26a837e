//! Multiply/divide unit
//!
//! Signed 32×32→64 shift-and-add multiplication and signed 32/32
//! restoring division, both driven step by step on bit vectors. Each
//! operation records a textual trace of its per-step register state so
//! the serial algorithms can be observed from the outside.
//!
//! The RISC-V special cases are defined results, not errors:
//! divide-by-zero yields quotient −1 and the unmodified dividend as
//! remainder, and INT_MIN / −1 yields the dividend back with the
//! overflow flag set.

use std::cmp::Ordering;

use crate::bits::{self, Bit, Bits};
use crate::twos;

/// Multiply selectors from the M extension. Only the signed MUL data
/// path is modelled; the high-half selectors share it until they grow
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    Mul,
    Mulh,
    Mulhu,
    Mulhsu,
}

/// Divide selectors from the M extension. Only signed `Div` is
/// implemented; the others are acknowledged stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivOp {
    Div,
    Divu,
    Rem,
    Remu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulResult {
    /// Low 32 bits of the signed 64-bit product
    pub lo: Bits,
    /// High 32 bits of the signed 64-bit product
    pub hi: Bits,
    /// Set iff the 64-bit signed product does not fit in signed 32
    /// bits
    pub overflow: bool,
    pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivResult {
    /// 32-bit quotient, truncated toward zero
    pub q: Bits,
    /// 32-bit remainder; its sign matches the dividend when non-zero
    pub r: Bits,
    /// Set only for the INT_MIN / −1 case
    pub overflow: bool,
    pub trace: Vec<String>,
}

/// Multiply two 32-bit values. Operands are zero-extended to 32 bits,
/// decomposed to sign/magnitude, and the magnitudes run through a
/// 32-step shift-add. The trace holds a snapshot before every step
/// plus one after the last, 33 entries in all.
pub fn mul(op: MulOp, rs1: &[Bit], rs2: &[Bit]) -> MulResult {
    match op {
        MulOp::Mul | MulOp::Mulh | MulOp::Mulhu | MulOp::Mulhsu => mul_signed(rs1, rs2),
    }
}

fn mul_signed(rs1: &[Bit], rs2: &[Bit]) -> MulResult {
    let rs1_32 = bits::zero_extend(rs1, 32);
    let rs2_32 = bits::zero_extend(rs2, 32);

    let sm1 = twos::decode_i32_to_sign_and_magnitude(&rs1_32);
    let sm2 = twos::decode_i32_to_sign_and_magnitude(&rs2_32);
    let sign_res = sm1.sign ^ sm2.sign;

    let multiplicand = bits::zero_extend(&sm1.mag, 32);

    // 64-bit working register: the low half starts as the multiplier
    // magnitude and the high half accumulates partial sums.
    let mut p = bits::zero_extend(&sm2.mag, 64);

    let mut trace = Vec::with_capacity(33);
    let snapshot = |p: &[Bit], step: usize, trace: &mut Vec<String>| {
        trace.push(format!(
            "step {step}: acc={} mul={}",
            bits::to_hex_string(&p[32..64], true),
            bits::to_hex_string(&p[0..32], true),
        ));
    };

    for step in 0..32 {
        snapshot(&p, step, &mut trace);
        if p[0] == 1 {
            // Add the multiplicand into the high half; the carry out
            // of bit 63 is discarded.
            let (sum, _carry) = bits::add_unsigned(&p[32..64], &multiplicand, 32);
            p[32..64].copy_from_slice(&sum);
        }
        bits::shift_right_logical_1(&mut p);
    }
    snapshot(&p, 32, &mut trace);

    let signed_prod = if sign_res == 0 {
        p
    } else {
        bits::twos_negate(&p)
    };

    let lo = signed_prod[0..32].to_vec();
    let hi = signed_prod[32..64].to_vec();

    // The product fits in 32 bits iff the high half is the
    // sign-extension of the low half.
    let sign32 = lo[31];
    let overflow = hi.iter().any(|bit| *bit != sign32);

    MulResult {
        lo,
        hi,
        overflow,
        trace,
    }
}

/// Divide one 32-bit value by another. Only `DivOp::Div` runs the
/// restoring divider; the remaining selectors return zero results.
pub fn div(op: DivOp, rs1: &[Bit], rs2: &[Bit]) -> DivResult {
    let dividend = bits::zero_extend(rs1, 32);
    let divisor = bits::zero_extend(rs2, 32);
    match op {
        DivOp::Div => div_signed(&dividend, &divisor),
        DivOp::Divu | DivOp::Rem | DivOp::Remu => DivResult {
            q: vec![0; 32],
            r: vec![0; 32],
            overflow: false,
            trace: Vec::new(),
        },
    }
}

fn div_signed(dividend: &[Bit], divisor: &[Bit]) -> DivResult {
    let sm1 = twos::decode_i32_to_sign_and_magnitude(dividend);
    let sm2 = twos::decode_i32_to_sign_and_magnitude(divisor);

    let mag1 = bits::zero_extend(&sm1.mag, 32);
    let mag2 = bits::zero_extend(&sm2.mag, 32);

    if bits::all_zero(&mag2) {
        return DivResult {
            q: vec![1; 32],
            r: dividend.to_vec(),
            overflow: false,
            trace: vec!["divide-by-zero: q=-1, r=dividend".to_string()],
        };
    }

    if is_int_min(dividend) && bits::all_ones(divisor) {
        return DivResult {
            q: dividend.to_vec(),
            r: vec![0; 32],
            overflow: true,
            trace: vec!["INT_MIN / -1 special case".to_string()],
        };
    }

    let sign_q = sm1.sign ^ sm2.sign;
    let (q_abs, r_abs, trace) = div_unsigned(&mag1, &mag2);

    let q = if sign_q == 0 {
        q_abs
    } else {
        bits::twos_negate(&q_abs)
    };
    let r = if sm1.sign == 0 {
        r_abs
    } else {
        bits::twos_negate(&r_abs)
    };

    DivResult {
        q,
        r,
        overflow: false,
        trace,
    }
}

/// 32 iterations of restoring division on the magnitudes. The
/// remainder register shifts the dividend in one bit at a time from
/// the top; whenever it reaches the divisor the divisor is subtracted
/// and the matching quotient bit set.
fn div_unsigned(dividend: &[Bit], divisor: &[Bit]) -> (Bits, Bits, Vec<String>) {
    let mut r: Bits = vec![0; 32];
    let mut q: Bits = vec![0; 32];
    let mut trace = Vec::with_capacity(32);

    for i in (0..32).rev() {
        bits::shift_left_logical_1(&mut r);
        r[0] = dividend[i];
        if bits::compare_unsigned(&r, divisor) != Ordering::Less {
            let (diff, _borrow) = bits::sub_unsigned(&r, divisor, 32);
            r = diff;
            q[i] = 1;
        }
        trace.push(format!(
            "step {}: R={} Q={}",
            31 - i,
            bits::to_hex_string(&r, true),
            bits::to_hex_string(&q, true),
        ));
    }

    (q, r, trace)
}

fn is_int_min(b: &[Bit]) -> bool {
    b.len() == 32 && b[31] == 1 && bits::all_zero(&b[..31])
}
