//! IEEE-754 binary32 floating-point unit
//!
//! Add, subtract and multiply built from scratch on bit vectors:
//! significand alignment by repeated single-position shifts, magnitude
//! add-or-subtract, post-normalization, and classification-based
//! handling of zeros, infinities and NaNs. Rounding is truncating
//! (bits below the 23-bit fraction are discarded) and subnormal
//! results flush to zero with the underflow flag set. The `inexact`
//! flag is reserved and never set.

use std::cmp::Ordering;

use crate::bits::{self, Bit, Bits};

/// A binary32 pattern split into its three fields. The exponent is
/// biased and the fraction carries no implicit leading 1; both are
/// stored LSB-first like every other bit vector in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct F32Fields {
    pub sign: Bit,
    /// 8 exponent bits
    pub exponent: Bits,
    /// 23 fraction bits
    pub fraction: Bits,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FpuFlags {
    /// Result saturated to ±inf
    pub overflow: bool,
    /// Result flushed to ±0
    pub underflow: bool,
    /// NaN operand or 0 × inf
    pub invalid: bool,
    /// Reserved; never set
    pub inexact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpuResult {
    /// 32-bit binary32 pattern
    pub bits: Bits,
    pub flags: FpuFlags,
    /// Human-readable record of the path taken, in execution order
    pub trace: Vec<String>,
}

impl FpuResult {
    fn new() -> Self {
        Self {
            bits: vec![0; 32],
            flags: FpuFlags::default(),
            trace: Vec::new(),
        }
    }
}

/// Split a 32-bit pattern into sign, exponent and fraction. Narrower
/// input is zero-extended to 32 bits first.
pub fn unpack_f32(pattern: &[Bit]) -> F32Fields {
    let b32 = bits::zero_extend(pattern, 32);
    F32Fields {
        sign: b32[31],
        exponent: bits::slice(&b32, 30, 23),
        fraction: bits::slice(&b32, 22, 0),
    }
}

/// Reassemble a 32-bit pattern from its fields
pub fn pack_f32(f: &F32Fields) -> Bits {
    let mut b32 = vec![0; 32];
    for (i, bit) in f.fraction.iter().take(23).enumerate() {
        b32[i] = *bit;
    }
    for (i, bit) in f.exponent.iter().take(8).enumerate() {
        b32[23 + i] = *bit;
    }
    b32[31] = f.sign;
    b32
}

/// The canonical quiet NaN pattern 0x7fc00000
fn quiet_nan() -> Bits {
    let mut fraction = vec![0; 23];
    fraction[22] = 1;
    pack_f32(&F32Fields {
        sign: 0,
        exponent: vec![1; 8],
        fraction,
    })
}

fn inf_with_sign(sign: Bit) -> Bits {
    pack_f32(&F32Fields {
        sign,
        exponent: vec![1; 8],
        fraction: vec![0; 23],
    })
}

fn zero_with_sign(sign: Bit) -> Bits {
    pack_f32(&F32Fields {
        sign,
        exponent: vec![0; 8],
        fraction: vec![0; 23],
    })
}

fn is_zero(f: &F32Fields) -> bool {
    bits::all_zero(&f.exponent) && bits::all_zero(&f.fraction)
}

fn is_inf(f: &F32Fields) -> bool {
    bits::all_ones(&f.exponent) && bits::all_zero(&f.fraction)
}

fn is_nan(f: &F32Fields) -> bool {
    bits::all_ones(&f.exponent) && !bits::all_zero(&f.fraction)
}

/// 24-bit significand: the 23 fraction bits plus a leading bit at
/// position 23
fn significand(fraction: &[Bit], leading_one: Bit) -> Bits {
    let mut sig = bits::zero_extend(fraction, 24);
    sig[23] = leading_one;
    sig
}

fn one_at_width(width: usize) -> Bits {
    let mut one = vec![0; width];
    one[0] = 1;
    one
}

/// Add two binary32 values
pub fn fadd_f32(a: &[Bit], b: &[Bit]) -> FpuResult {
    let mut out = FpuResult::new();
    out.trace.push("fadd_f32 start".to_string());

    let a32 = bits::zero_extend(a, 32);
    let b32 = bits::zero_extend(b, 32);
    let fa = unpack_f32(&a32);
    let fb = unpack_f32(&b32);

    if is_zero(&fa) {
        out.bits = b32;
        out.trace.push("a is zero → return b".to_string());
        return out;
    }
    if is_zero(&fb) {
        out.bits = a32;
        out.trace.push("b is zero → return a".to_string());
        return out;
    }

    let sig_a = significand(&fa.fraction, 1);
    let sig_b = significand(&fb.fraction, 1);

    // The operand with the larger exponent is "big"; ties go to a
    let (exp_big, exp_small, sig_big, sig_small, sign_big, sign_small) =
        if bits::compare_unsigned(&fa.exponent, &fb.exponent) != Ordering::Less {
            (fa.exponent, fb.exponent, sig_a, sig_b, fa.sign, fb.sign)
        } else {
            (fb.exponent, fa.exponent, sig_b, sig_a, fb.sign, fa.sign)
        };

    // Align the smaller operand: shift its significand right one
    // position per exponent step until the exponents meet, bailing out
    // if the working exponent borrows past zero
    let one_exp = one_at_width(8);
    let mut exp_tmp = exp_big.clone();
    let mut sig_small_aligned = sig_small;
    while bits::compare_unsigned(&exp_tmp, &exp_small) == Ordering::Greater {
        bits::shift_right_logical_1(&mut sig_small_aligned);
        let (next, borrow) = bits::sub_unsigned(&exp_tmp, &one_exp, 8);
        exp_tmp = next;
        if borrow == 1 {
            break;
        }
    }

    if sign_big == sign_small {
        let (mut sig_sum, carry) = bits::add_unsigned(&sig_big, &sig_small_aligned, 24);
        let mut exp_res = exp_big;
        if carry == 1 {
            // Carry out of bit 23: renormalize and bump the exponent.
            // Exponent overflow is ignored on this path.
            bits::shift_right_logical_1(&mut sig_sum);
            let (bumped, _carry) = bits::add_unsigned(&exp_res, &one_exp, 8);
            exp_res = bumped;
        }
        out.bits = pack_f32(&F32Fields {
            sign: sign_big,
            exponent: exp_res,
            fraction: sig_sum[..23].to_vec(),
        });
        out.trace.push("fadd_f32 normal same-sign add".to_string());
        return out;
    }

    // Different signs: subtract the smaller aligned magnitude from the
    // larger; the result takes the sign of the larger
    let mut sig_large = sig_big;
    let mut sig_small_local = sig_small_aligned;
    let mut result_sign = sign_big;
    match bits::compare_unsigned(&sig_large, &sig_small_local) {
        Ordering::Less => {
            std::mem::swap(&mut sig_large, &mut sig_small_local);
            result_sign = sign_small;
        }
        Ordering::Equal => {
            out.bits = zero_with_sign(0);
            out.trace
                .push("fadd_f32 different-sign: exact zero".to_string());
            return out;
        }
        Ordering::Greater => {}
    }

    let (mut sig_diff, _borrow) = bits::sub_unsigned(&sig_large, &sig_small_local, 24);
    let mut exp_res = exp_big;

    if bits::all_zero(&sig_diff) {
        out.bits = zero_with_sign(0);
        out.trace
            .push("fadd_f32 different-sign: diff zero".to_string());
        return out;
    }

    // Normalize: shift left until bit 23 is set, decrementing the
    // exponent each step; a borrow past zero means the underflow
    // region, where the loop stops with whatever is left
    while sig_diff[23] == 0 && !bits::all_zero(&sig_diff) {
        bits::shift_left_logical_1(&mut sig_diff);
        let (next, borrow) = bits::sub_unsigned(&exp_res, &one_exp, 8);
        exp_res = next;
        if borrow == 1 {
            break;
        }
    }

    out.bits = pack_f32(&F32Fields {
        sign: result_sign,
        exponent: exp_res,
        fraction: sig_diff[..23].to_vec(),
    });
    out.trace.push("fadd_f32 different-sign subtract".to_string());
    out
}

/// Subtract two binary32 values: `a - b` is `a + (-b)`
pub fn fsub_f32(a: &[Bit], b: &[Bit]) -> FpuResult {
    let mut b_neg = bits::zero_extend(b, 32);
    b_neg[31] ^= 1;
    fadd_f32(a, &b_neg)
}

/// Multiply two binary32 values
pub fn fmul_f32(a: &[Bit], b: &[Bit]) -> FpuResult {
    let mut out = FpuResult::new();
    out.trace.push("fmul_f32 start".to_string());

    let a32 = bits::zero_extend(a, 32);
    let b32 = bits::zero_extend(b, 32);
    let fa = unpack_f32(&a32);
    let fb = unpack_f32(&b32);

    let sign_res = fa.sign ^ fb.sign;

    if is_nan(&fa) || is_nan(&fb) {
        out.bits = quiet_nan();
        out.flags.invalid = true;
        out.trace.push("fmul_f32: NaN operand".to_string());
        return out;
    }

    if (is_inf(&fa) && is_zero(&fb)) || (is_inf(&fb) && is_zero(&fa)) {
        out.bits = quiet_nan();
        out.flags.invalid = true;
        out.trace.push("fmul_f32: 0 * inf invalid".to_string());
        return out;
    }

    if is_inf(&fa) || is_inf(&fb) {
        out.bits = inf_with_sign(sign_res);
        out.trace.push("fmul_f32: inf result".to_string());
        return out;
    }

    if is_zero(&fa) || is_zero(&fb) {
        out.bits = zero_with_sign(sign_res);
        out.trace.push("fmul_f32: zero result".to_string());
        return out;
    }

    // Overflow pre-check on a 9-bit sum of the biased exponents:
    // unbiased E_res = (expA - 127) + (expB - 127) > 127 iff
    // expA + expB > 381
    let exp_a9 = bits::zero_extend(&fa.exponent, 9);
    let exp_b9 = bits::zero_extend(&fb.exponent, 9);
    let (exp_sum9, _carry9) = bits::add_unsigned(&exp_a9, &exp_b9, 9);
    let threshold = bits::pad_left(&bits::from_u32(382), 9, 0);
    if bits::compare_unsigned(&exp_sum9, &threshold) != Ordering::Less {
        out.flags.overflow = true;
        out.bits = inf_with_sign(sign_res);
        out.trace
            .push("fmul_f32: pre-check exponent overflow".to_string());
        return out;
    }

    // Biased result exponent: expA + expB - 127, in 8 bits
    let (exp_sum, _carry) = bits::add_unsigned(&fa.exponent, &fb.exponent, 8);
    let bias = bits::pad_left(&bits::from_u32(127), 8, 0);
    let (exp_tmp, borrow_bias) = bits::sub_unsigned(&exp_sum, &bias, 8);
    if borrow_bias == 1 {
        out.flags.underflow = true;
        out.bits = zero_with_sign(sign_res);
        out.trace
            .push("fmul_f32: exponent underflow before normalization".to_string());
        return out;
    }

    // 24-bit significands; the implicit leading 1 only applies to
    // normalized operands
    let sig_a = significand(&fa.fraction, Bit::from(!bits::all_zero(&fa.exponent)));
    let sig_b = significand(&fb.fraction, Bit::from(!bits::all_zero(&fb.exponent)));

    // 24-step shift-add: walk the multiplier from LSB to MSB, adding
    // the (left-shifting) multiplicand into a 48-bit product register
    let mut prod: Bits = vec![0; 48];
    let mut multiplicand = bits::zero_extend(&sig_a, 48);
    let mut multiplier = sig_b;
    for _ in 0..24 {
        if multiplier[0] == 1 {
            let (sum, _carry) = bits::add_unsigned(&prod, &multiplicand, 48);
            prod = sum;
        }
        bits::shift_right_logical_1(&mut multiplier);
        bits::shift_left_logical_1(&mut multiplicand);
    }
    out.trace
        .push("fmul_f32: after significand multiply".to_string());

    // The product of two [1, 2) significands lies in [2^46, 2^48); if
    // bit 47 is set the significand comes from bits 24..=47 and the
    // exponent goes up by one
    let high = prod[47] == 1;
    let mut exp_res = exp_tmp;
    if high {
        let (bumped, carry_e) = bits::add_unsigned(&exp_res, &one_at_width(8), 8);
        exp_res = bumped;
        if carry_e == 1 {
            out.flags.overflow = true;
            out.bits = inf_with_sign(sign_res);
            out.trace
                .push("fmul_f32: exponent overflow after normalization".to_string());
            return out;
        }
    }

    let shift = if high { 24 } else { 23 };
    let sig_res = bits::slice(&prod, shift + 23, shift);

    if bits::all_zero(&exp_res) {
        out.flags.underflow = true;
        out.bits = zero_with_sign(sign_res);
        out.trace.push("fmul_f32: underflow to zero".to_string());
        return out;
    }
    if bits::all_ones(&exp_res) {
        out.flags.overflow = true;
        out.bits = inf_with_sign(sign_res);
        out.trace.push("fmul_f32: overflow to inf".to_string());
        return out;
    }

    out.bits = pack_f32(&F32Fields {
        sign: sign_res,
        exponent: exp_res,
        fraction: sig_res[..23].to_vec(),
    });
    out.trace.push("fmul_f32: normal finite result".to_string());
    out
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::bits::{from_hex_string, to_hex_string};

    fn hex(s: &str) -> Bits {
        from_hex_string(s).unwrap()
    }

    #[test]
    fn check_unpack_pack_round_trip() {
        for pattern in [
            "0x40700000",
            "0x3fc00000",
            "0x0",
            "0x80000000",
            "0x7f800000",
            "0xff800000",
            "0x7fc00000",
            "0x1",
            "0x007fffff",
            "0xdeadbeef",
        ] {
            let b = bits::zero_extend(&hex(pattern), 32);
            let rebuilt = pack_f32(&unpack_f32(&b));
            assert_eq!(rebuilt, b, "pattern {pattern}");
        }
    }

    #[test]
    fn check_unpack_fields() {
        // 1.5 = sign 0, exponent 127, fraction 0x400000
        let f = unpack_f32(&hex("0x3fc00000"));
        assert_eq!(f.sign, 0);
        assert_eq!(bits::to_u32(&f.exponent), 127);
        assert_eq!(bits::to_u32(&f.fraction), 0x400000);
    }

    #[test]
    fn check_results_are_32_bits_wide() {
        let a = vec![0; 32];
        let b = vec![0; 32];
        assert_eq!(fadd_f32(&a, &b).bits.len(), 32);
        assert_eq!(fsub_f32(&a, &b).bits.len(), 32);
        assert_eq!(fmul_f32(&a, &b).bits.len(), 32);
    }

    #[test]
    fn check_add_zero_shortcuts() {
        let x = hex("0x40100000");
        let zero = vec![0; 32];
        let a_zero = fadd_f32(&zero, &x);
        assert_eq!(to_hex_string(&a_zero.bits, true), "0x40100000");
        assert!(a_zero.trace[1].contains("a is zero"));
        let b_zero = fadd_f32(&x, &zero);
        assert_eq!(to_hex_string(&b_zero.bits, true), "0x40100000");
        assert!(b_zero.trace[1].contains("b is zero"));
    }

    #[test]
    fn check_add_1p5_plus_2p25() {
        let res = fadd_f32(&hex("0x3fc00000"), &hex("0x40100000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x40700000");
        assert_eq!(res.flags, FpuFlags::default());
        assert_eq!(res.trace.last().unwrap(), "fadd_f32 normal same-sign add");
    }

    #[test]
    fn check_sub_2p25_minus_1p5() {
        let res = fsub_f32(&hex("0x40100000"), &hex("0x3fc00000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x3f400000");
        assert_eq!(res.flags, FpuFlags::default());
        assert_eq!(res.trace.last().unwrap(), "fadd_f32 different-sign subtract");
    }

    #[test]
    fn check_add_cancels_to_exact_zero() {
        let res = fadd_f32(&hex("0x3fc00000"), &hex("0xbfc00000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x0");
        assert_eq!(res.trace.last().unwrap(), "fadd_f32 different-sign: exact zero");
    }

    #[test]
    fn check_mul_1p5_times_2() {
        let res = fmul_f32(&hex("0x3fc00000"), &hex("0x40000000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x40400000");
        assert_eq!(res.flags, FpuFlags::default());
        assert_eq!(res.trace.last().unwrap(), "fmul_f32: normal finite result");
    }

    #[test]
    fn check_mul_overflow_to_inf() {
        // ~1e38 * 10.0
        let res = fmul_f32(&hex("0x7e967699"), &hex("0x41200000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x7f800000");
        assert!(res.flags.overflow);
        assert!(!res.flags.invalid);
    }

    #[test]
    fn check_mul_underflow_flushes_to_zero() {
        // ~1e-38 * 1e-2
        let res = fmul_f32(&hex("0x006ce3ee"), &hex("0x3c23d70a"));
        assert!(res.flags.underflow);
        assert!(!res.flags.overflow);
        assert_eq!(bits::to_u32(&res.bits) & 0x7fff_ffff, 0);
    }

    #[test]
    fn check_mul_nan_operand() {
        let res = fmul_f32(&hex("0x7fc00001"), &hex("0x3fc00000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x7fc00000");
        assert!(res.flags.invalid);
        assert!(res.trace.last().unwrap().contains("NaN operand"));
    }

    #[test]
    fn check_mul_zero_times_inf_is_invalid() {
        let res = fmul_f32(&hex("0x7f800000"), &[0; 32]);
        assert_eq!(to_hex_string(&res.bits, true), "0x7fc00000");
        assert!(res.flags.invalid);
        let swapped = fmul_f32(&[0; 32], &hex("0xff800000"));
        assert!(swapped.flags.invalid);
    }

    #[test]
    fn check_mul_inf_carries_sign() {
        let res = fmul_f32(&hex("0xff800000"), &hex("0x40000000"));
        assert_eq!(to_hex_string(&res.bits, true), "0xff800000");
        assert!(!res.flags.overflow);
        let pos = fmul_f32(&hex("0xff800000"), &hex("0xc0000000"));
        assert_eq!(to_hex_string(&pos.bits, true), "0x7f800000");
    }

    #[test]
    fn check_mul_zero_carries_sign() {
        let res = fmul_f32(&hex("0x80000000"), &hex("0x40000000"));
        assert_eq!(to_hex_string(&res.bits, true), "0x80000000");
        let pos = fmul_f32(&hex("0x80000000"), &hex("0xc0000000"));
        assert_eq!(to_hex_string(&pos.bits, true), "0x0");
    }

    #[test]
    fn check_mul_matches_host_floats() {
        let cases = [
            (1.5f32, 2.0f32),
            (2.25, 4.0),
            (-1.5, 2.0),
            (0.75, 0.5),
            (3.0, 7.0),
            (1024.0, 0.0078125),
        ];
        for (x, y) in cases {
            let a = bits::from_u32(x.to_bits());
            let b = bits::from_u32(y.to_bits());
            let res = fmul_f32(&a, &b);
            assert_eq!(
                bits::to_u32(&res.bits),
                (x * y).to_bits(),
                "{x} * {y}"
            );
        }
    }

    #[test]
    fn check_add_matches_host_floats_on_exact_cases() {
        let cases = [
            (1.5f32, 2.25f32),
            (2.0, 2.0),
            (0.5, 0.25),
            (4.0, -1.0),
            (-2.5, 1.25),
        ];
        for (x, y) in cases {
            let a = bits::from_u32(x.to_bits());
            let b = bits::from_u32(y.to_bits());
            let res = fadd_f32(&a, &b);
            assert_eq!(
                bits::to_u32(&res.bits),
                (x + y).to_bits(),
                "{x} + {y}"
            );
        }
    }

    #[test]
    fn check_inexact_never_set() {
        let res = fmul_f32(&hex("0x3f99999a"), &hex("0x3f99999a"));
        assert!(!res.flags.inexact);
    }
}
