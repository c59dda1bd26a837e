//! Instruction encoders
//!
//! Builders for the supported RV32I subset, used by the tests and the
//! demo binaries to assemble programs without hand-packing fields.
//! Register operands are plain numbers (`1` for x1); offsets and
//! immediates are signed and wrapped into their natural field widths.

use super::opcodes::*;
use crate::utils::{extract_field, interpret_i32_as_unsigned};

/// Make an I-type instruction. Only produces a valid encoding if the
/// arguments are in range.
pub fn itype(imm: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (imm & 0xfff) << 20 | rs1 << 15 | funct3 << 12 | rd << 7 | opcode
}

/// Make an R- or S-type instruction. The two layouts share field
/// positions; the meaning of `a` and `b` differs:
///
/// R-type: a = funct7, b = rd
/// S-type: a = imm[11:5], b = imm[4:0]
pub fn rstype(a: u32, rs2: u32, rs1: u32, funct3: u32, b: u32, opcode: u32) -> u32 {
    a << 25 | rs2 << 20 | rs1 << 15 | funct3 << 12 | b << 7 | opcode
}

/// Make a U-type instruction from a 20-bit upper immediate
pub fn utype(imm20: u32, rd: u32, opcode: u32) -> u32 {
    (imm20 & 0xfffff) << 12 | rd << 7 | opcode
}

/// The shift-by-immediate instructions use the I-type layout with the
/// shift amount in the low 5 immediate bits and `upper` (zero, or
/// 0b0100000 for srai) above it.
fn shift_imm_field(shamt: u32, upper: u32) -> u32 {
    upper << 5 | extract_field(shamt, 4, 0)
}

fn regimm(funct3: u32, rd: u32, rs1: u32, imm: i32) -> u32 {
    itype(interpret_i32_as_unsigned(imm), rs1, funct3, rd, OP_IMM)
}

fn regreg(funct7: u32, funct3: u32, rd: u32, rs1: u32, rs2: u32) -> u32 {
    rstype(funct7, rs2, rs1, funct3, rd, OP)
}

pub fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    regimm(FUNCT3_ADDI, rd, rs1, imm)
}

pub fn andi(rd: u32, rs1: u32, imm: i32) -> u32 {
    regimm(FUNCT3_ANDI, rd, rs1, imm)
}

pub fn ori(rd: u32, rs1: u32, imm: i32) -> u32 {
    regimm(FUNCT3_ORI, rd, rs1, imm)
}

pub fn xori(rd: u32, rs1: u32, imm: i32) -> u32 {
    regimm(FUNCT3_XORI, rd, rs1, imm)
}

pub fn slli(rd: u32, rs1: u32, shamt: u32) -> u32 {
    itype(shift_imm_field(shamt, 0), rs1, FUNCT3_SLLI, rd, OP_IMM)
}

pub fn srli(rd: u32, rs1: u32, shamt: u32) -> u32 {
    itype(shift_imm_field(shamt, 0), rs1, FUNCT3_SRLI, rd, OP_IMM)
}

pub fn srai(rd: u32, rs1: u32, shamt: u32) -> u32 {
    itype(shift_imm_field(shamt, FUNCT7_SRA), rs1, FUNCT3_SRAI, rd, OP_IMM)
}

pub fn add(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_ADD, rd, rs1, rs2)
}

pub fn sub(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_SUB, FUNCT3_SUB, rd, rs1, rs2)
}

pub fn and(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_AND, rd, rs1, rs2)
}

pub fn or(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_OR, rd, rs1, rs2)
}

pub fn xor(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_XOR, rd, rs1, rs2)
}

pub fn sll(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_SLL, rd, rs1, rs2)
}

pub fn srl(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_BASE, FUNCT3_SRL, rd, rs1, rs2)
}

pub fn sra(rd: u32, rs1: u32, rs2: u32) -> u32 {
    regreg(FUNCT7_SRA, FUNCT3_SRA, rd, rs1, rs2)
}

pub fn lw(rd: u32, rs1: u32, offset: i32) -> u32 {
    itype(interpret_i32_as_unsigned(offset), rs1, FUNCT3_W, rd, OP_LOAD)
}

pub fn sw(rs2: u32, rs1: u32, offset: i32) -> u32 {
    let imm = interpret_i32_as_unsigned(offset);
    let imm11_5 = extract_field(imm, 11, 5);
    let imm4_0 = extract_field(imm, 4, 0);
    rstype(imm11_5, rs2, rs1, FUNCT3_W, imm4_0, OP_STORE)
}

fn branch(funct3: u32, rs1: u32, rs2: u32, offset: i32) -> u32 {
    let imm = interpret_i32_as_unsigned(offset);
    let imm12 = extract_field(imm, 12, 12);
    let imm11 = extract_field(imm, 11, 11);
    let imm10_5 = extract_field(imm, 10, 5);
    let imm4_1 = extract_field(imm, 4, 1);
    imm12 << 31
        | imm10_5 << 25
        | rs2 << 20
        | rs1 << 15
        | funct3 << 12
        | imm4_1 << 8
        | imm11 << 7
        | OP_BRANCH
}

pub fn beq(rs1: u32, rs2: u32, offset: i32) -> u32 {
    branch(FUNCT3_BEQ, rs1, rs2, offset)
}

pub fn bne(rs1: u32, rs2: u32, offset: i32) -> u32 {
    branch(FUNCT3_BNE, rs1, rs2, offset)
}

pub fn jal(rd: u32, offset: i32) -> u32 {
    let imm = interpret_i32_as_unsigned(offset);
    let imm20 = extract_field(imm, 20, 20);
    let imm19_12 = extract_field(imm, 19, 12);
    let imm11 = extract_field(imm, 11, 11);
    let imm10_1 = extract_field(imm, 10, 1);
    imm20 << 31 | imm10_1 << 21 | imm11 << 20 | imm19_12 << 12 | rd << 7 | OP_JAL
}

pub fn jalr(rd: u32, rs1: u32, offset: i32) -> u32 {
    itype(interpret_i32_as_unsigned(offset), rs1, 0, rd, OP_JALR)
}

pub fn lui(rd: u32, imm20: u32) -> u32 {
    utype(imm20, rd, OP_LUI)
}

pub fn auipc(rd: u32, imm20: u32) -> u32 {
    utype(imm20, rd, OP_AUIPC)
}
