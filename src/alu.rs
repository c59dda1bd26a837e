//! 32-bit arithmetic logic unit
//!
//! Add and subtract run through the shared ripple-carry adder in
//! [`crate::bits`] and derive the four N/Z/C/V status flags. The shift
//! selectors are deliberate passthroughs: the real shifts live in
//! [`crate::shifter`], and keeping the selectors here forces every
//! dispatch site to acknowledge them.

use crate::bits::{self, Bit, Bits};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Sll,
    Srl,
    Sra,
}

/// Status flags derived from a 32-bit add or subtract
///
/// `n` is the MSB of the result, `z` is set iff every result bit is
/// zero, `c` is the carry out of the top adder position (for
/// subtraction, 1 means no borrow), and `v` is signed overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluFlags {
    pub n: Bit,
    pub z: Bit,
    pub c: Bit,
    pub v: Bit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AluResult {
    pub result: Bits,
    pub flags: AluFlags,
}

/// Run one ALU operation. Both operands are zero-extended to 32 bits
/// first.
pub fn execute(a: &[Bit], b: &[Bit], op: AluOp) -> AluResult {
    let a32 = bits::zero_extend(a, 32);
    let b32 = bits::zero_extend(b, 32);
    match op {
        AluOp::Add => add_sub(&a32, &b32, false),
        AluOp::Sub => add_sub(&a32, &b32, true),
        // Passthrough: shifts are handled by the barrel shifter
        AluOp::Sll | AluOp::Srl | AluOp::Sra => AluResult {
            flags: AluFlags {
                n: a32[31],
                z: zero_flag(&a32),
                c: 0,
                v: 0,
            },
            result: a32,
        },
    }
}

fn add_sub(a32: &[Bit], b32: &[Bit], subtract: bool) -> AluResult {
    let rhs = if subtract {
        bits::twos_negate(b32)
    } else {
        b32.to_vec()
    };
    let (result, carry) = bits::add_unsigned(a32, &rhs, 32);

    let sign_a = a32[31];
    let sign_b = b32[31];
    let sign_r = result[31];
    // Standard sign-compare overflow rule: adding same-sign operands
    // must not change the sign; subtracting different-sign operands
    // must keep the sign of a.
    let v = if subtract {
        sign_a != sign_b && sign_r != sign_a
    } else {
        sign_a == sign_b && sign_r != sign_a
    };

    AluResult {
        flags: AluFlags {
            n: sign_r,
            z: zero_flag(&result),
            c: carry,
            v: Bit::from(v),
        },
        result,
    }
}

fn zero_flag(result: &[Bit]) -> Bit {
    Bit::from(bits::all_zero(result))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::bits::{from_hex_string, from_u32, to_hex_string};

    fn hex(s: &str) -> Bits {
        from_hex_string(s).unwrap()
    }

    #[test]
    fn check_add_positive_overflow() {
        let res = execute(&hex("0x7fffffff"), &hex("0x1"), AluOp::Add);
        assert_eq!(to_hex_string(&res.result, true), "0x80000000");
        assert_eq!(
            res.flags,
            AluFlags {
                n: 1,
                z: 0,
                c: 0,
                v: 1
            }
        );
    }

    #[test]
    fn check_sub_negative_overflow() {
        let res = execute(&hex("0x80000000"), &hex("0x1"), AluOp::Sub);
        assert_eq!(to_hex_string(&res.result, true), "0x7fffffff");
        // c = 1 means no borrow
        assert_eq!(
            res.flags,
            AluFlags {
                n: 0,
                z: 0,
                c: 1,
                v: 1
            }
        );
    }

    #[test]
    fn check_add_minus_one_plus_minus_one() {
        let res = execute(&hex("0xffffffff"), &hex("0xffffffff"), AluOp::Add);
        assert_eq!(to_hex_string(&res.result, true), "0xfffffffe");
        assert_eq!(
            res.flags,
            AluFlags {
                n: 1,
                z: 0,
                c: 1,
                v: 0
            }
        );
    }

    #[test]
    fn check_add_to_exact_zero() {
        let res = execute(&hex("0xd"), &hex("0xfffffff3"), AluOp::Add);
        assert_eq!(to_hex_string(&res.result, true), "0x0");
        assert_eq!(
            res.flags,
            AluFlags {
                n: 0,
                z: 1,
                c: 1,
                v: 0
            }
        );
    }

    #[test]
    fn check_sub_equals_add_of_negation() {
        for (a, b) in [
            (5u32, 3u32),
            (3, 5),
            (0, 0),
            (0x8000_0000, 1),
            (0xffff_ffff, 0x7fff_ffff),
            (0x1234_5678, 0x9abc_def0),
        ] {
            let av = from_u32(a);
            let bv = from_u32(b);
            let sub = execute(&av, &bv, AluOp::Sub);
            let add = execute(&av, &bits::twos_negate(&bv), AluOp::Add);
            assert_eq!(sub.result, add.result, "a={a:#x} b={b:#x}");
        }
    }

    #[test]
    fn check_shift_selectors_pass_through() {
        let a = hex("0x80000001");
        for op in [AluOp::Sll, AluOp::Srl, AluOp::Sra] {
            let res = execute(&a, &hex("0x4"), op);
            assert_eq!(to_hex_string(&res.result, true), "0x80000001");
            assert_eq!(
                res.flags,
                AluFlags {
                    n: 1,
                    z: 0,
                    c: 0,
                    v: 0
                }
            );
        }
    }

    #[test]
    fn check_operands_zero_extended() {
        // Narrow operands behave as their 32-bit zero-extension
        let res = execute(&hex("0xd"), &hex("0x3"), AluOp::Add);
        assert_eq!(res.result.len(), 32);
        assert_eq!(to_hex_string(&res.result, true), "0x10");
    }
}
