//! Instruction word decoding
//!
//! A fetched 32-bit word is converted into the [`Instr`] enum, which
//! holds the instruction fields in an easily accessible form ready for
//! execution. Field positions follow the RV32I base encoding:
//! `opcode = bits[6:0]`, `rd = bits[11:7]`, `funct3 = bits[14:12]`,
//! `rs1 = bits[19:15]`, `rs2 = bits[24:20]`, `funct7 = bits[31:25]`.
//!
//! Every opcode/funct combination outside the supported subset decodes
//! to [`Instr::Hint`], which executes as a no-op that advances the PC
//! by 4.

pub mod encode;
pub mod opcodes;

use self::opcodes::*;
use crate::utils::extract_field;

fn opcode(instr: u32) -> u32 {
    extract_field(instr, 6, 0)
}

fn funct3(instr: u32) -> u32 {
    extract_field(instr, 14, 12)
}

fn funct7(instr: u32) -> u32 {
    extract_field(instr, 31, 25)
}

fn rd(instr: u32) -> u8 {
    extract_field(instr, 11, 7) as u8
}

fn rs1(instr: u32) -> u8 {
    extract_field(instr, 19, 15) as u8
}

fn rs2(instr: u32) -> u8 {
    extract_field(instr, 24, 20) as u8
}

/// 12-bit I-type immediate (not yet sign-extended)
fn imm_itype(instr: u32) -> u16 {
    extract_field(instr, 31, 20) as u16
}

/// 12-bit S-type immediate, reassembled from its two fields
fn imm_stype(instr: u32) -> u16 {
    let imm11_5 = extract_field(instr, 31, 25);
    let imm4_0 = extract_field(instr, 11, 7);
    (imm11_5 << 5 | imm4_0) as u16
}

/// 13-bit B-type branch offset (bit 0 always zero)
fn imm_btype(instr: u32) -> u16 {
    let imm12 = extract_field(instr, 31, 31);
    let imm11 = extract_field(instr, 7, 7);
    let imm10_5 = extract_field(instr, 30, 25);
    let imm4_1 = extract_field(instr, 11, 8);
    (imm12 << 12 | imm11 << 11 | imm10_5 << 5 | imm4_1 << 1) as u16
}

/// 21-bit J-type jump offset (bit 0 always zero)
fn imm_jtype(instr: u32) -> u32 {
    let imm20 = extract_field(instr, 31, 31);
    let imm19_12 = extract_field(instr, 19, 12);
    let imm11 = extract_field(instr, 20, 20);
    let imm10_1 = extract_field(instr, 30, 21);
    imm20 << 20 | imm19_12 << 12 | imm11 << 11 | imm10_1 << 1
}

/// 20-bit upper immediate for LUI/AUIPC
fn u_immediate(instr: u32) -> u32 {
    extract_field(instr, 31, 12)
}

/// Register-immediate mnemonics of the supported subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegImm {
    Addi,
    Andi,
    Ori,
    Xori,
    Slli,
    Srli,
    Srai,
}

/// Register-register mnemonics of the supported subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegReg {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Sll,
    Srl,
    Sra,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Load u_immediate into bits [31:12] of dest, low bits zero
    Lui { dest: u8, u_immediate: u32 },
    /// dest = pc + (u_immediate << 12)
    Auipc { dest: u8, u_immediate: u32 },
    /// dest = pc + 4; pc += sign-extended 21-bit offset
    Jal { dest: u8, offset: u32 },
    /// dest = pc + 4; pc = (base + sign-extended offset) & !1
    Jalr { dest: u8, base: u8, offset: u16 },
    /// Branch by the sign-extended 13-bit offset when src1 == src2
    Beq { src1: u8, src2: u8, offset: u16 },
    /// Branch by the sign-extended 13-bit offset when src1 != src2
    Bne { src1: u8, src2: u8, offset: u16 },
    /// dest = mem32(base + sign-extended offset)
    Lw { dest: u8, base: u8, offset: u16 },
    /// mem32(base + sign-extended offset) = src
    Sw { src: u8, base: u8, offset: u16 },
    RegImm {
        mnemonic: RegImm,
        dest: u8,
        src: u8,
        i_immediate: u16,
    },
    RegReg {
        mnemonic: RegReg,
        dest: u8,
        src1: u8,
        src2: u8,
    },
    /// Any encoding the supported subset does not name. Executes as a
    /// no-op that advances the PC by 4.
    Hint,
}

/// Decode one instruction word
pub fn decode(instr: u32) -> Instr {
    match opcode(instr) {
        OP_LUI => Instr::Lui {
            dest: rd(instr),
            u_immediate: u_immediate(instr),
        },
        OP_AUIPC => Instr::Auipc {
            dest: rd(instr),
            u_immediate: u_immediate(instr),
        },
        OP_JAL => Instr::Jal {
            dest: rd(instr),
            offset: imm_jtype(instr),
        },
        OP_JALR if funct3(instr) == 0 => Instr::Jalr {
            dest: rd(instr),
            base: rs1(instr),
            offset: imm_itype(instr),
        },
        OP_BRANCH => {
            let (src1, src2, offset) = (rs1(instr), rs2(instr), imm_btype(instr));
            match funct3(instr) {
                FUNCT3_BEQ => Instr::Beq { src1, src2, offset },
                FUNCT3_BNE => Instr::Bne { src1, src2, offset },
                _ => Instr::Hint,
            }
        }
        OP_LOAD if funct3(instr) == FUNCT3_W => Instr::Lw {
            dest: rd(instr),
            base: rs1(instr),
            offset: imm_itype(instr),
        },
        OP_STORE if funct3(instr) == FUNCT3_W => Instr::Sw {
            src: rs2(instr),
            base: rs1(instr),
            offset: imm_stype(instr),
        },
        OP_IMM => {
            let mnemonic = match funct3(instr) {
                FUNCT3_ADDI => Some(RegImm::Addi),
                FUNCT3_ANDI => Some(RegImm::Andi),
                FUNCT3_ORI => Some(RegImm::Ori),
                FUNCT3_XORI => Some(RegImm::Xori),
                FUNCT3_SLLI if funct7(instr) == FUNCT7_BASE => Some(RegImm::Slli),
                FUNCT3_SRLI if funct7(instr) == FUNCT7_BASE => Some(RegImm::Srli),
                FUNCT3_SRAI if funct7(instr) == FUNCT7_SRA => Some(RegImm::Srai),
                _ => None,
            };
            match mnemonic {
                Some(mnemonic) => Instr::RegImm {
                    mnemonic,
                    dest: rd(instr),
                    src: rs1(instr),
                    i_immediate: imm_itype(instr),
                },
                None => Instr::Hint,
            }
        }
        OP => {
            let mnemonic = match funct3(instr) {
                FUNCT3_ADD if funct7(instr) == FUNCT7_BASE => Some(RegReg::Add),
                FUNCT3_SUB if funct7(instr) == FUNCT7_SUB => Some(RegReg::Sub),
                FUNCT3_AND => Some(RegReg::And),
                FUNCT3_OR => Some(RegReg::Or),
                FUNCT3_XOR => Some(RegReg::Xor),
                FUNCT3_SLL if funct7(instr) == FUNCT7_BASE => Some(RegReg::Sll),
                FUNCT3_SRL if funct7(instr) == FUNCT7_BASE => Some(RegReg::Srl),
                FUNCT3_SRA if funct7(instr) == FUNCT7_SRA => Some(RegReg::Sra),
                _ => None,
            };
            match mnemonic {
                Some(mnemonic) => Instr::RegReg {
                    mnemonic,
                    dest: rd(instr),
                    src1: rs1(instr),
                    src2: rs2(instr),
                },
                None => Instr::Hint,
            }
        }
        _ => Instr::Hint,
    }
}
