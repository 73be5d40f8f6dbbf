//! R-type: base integer arithmetic plus the M extension (opcode `0x33`).

use super::{ExecOutcome, read_reg, write_reg};
use crate::decode::{funct3, funct7, rd, rs1, rs2};
use crate::error::VmError;

pub(super) fn execute(word: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    let rd = rd(word);
    let a = read_reg(regs, rs1(word));
    let b = read_reg(regs, rs2(word));
    let result = match (funct3(word), funct7(word)) {
        (0x0, 0x00) => a.wrapping_add(b),
        (0x0, 0x20) => a.wrapping_sub(b),
        (0x1, 0x00) => a.wrapping_shl(b as u32 & 0x1f),
        (0x2, 0x00) => i32::from(a < b),
        (0x3, 0x00) => i32::from((a as u32) < (b as u32)),
        (0x4, 0x00) => a ^ b,
        (0x5, 0x00) => ((a as u32).wrapping_shr(b as u32 & 0x1f)) as i32,
        (0x5, 0x20) => a.wrapping_shr(b as u32 & 0x1f),
        (0x6, 0x00) => a | b,
        (0x7, 0x00) => a & b,
        // M extension
        (0x0, 0x01) => a.wrapping_mul(b),
        (0x1, 0x01) => (((a as i64) * (b as i64)) >> 32) as i32,
        (0x2, 0x01) => (((a as i64) * (b as u32 as i64)) >> 32) as i32,
        (0x3, 0x01) => (((a as u32 as u64) * (b as u32 as u64)) >> 32) as i32,
        (0x4, 0x01) => div(a, b),
        (0x5, 0x01) => divu(a, b),
        (0x6, 0x01) => rem(a, b),
        (0x7, 0x01) => remu(a, b),
        _ => return Err(VmError::InternalCore),
    };
    write_reg(regs, rd, result);
    Ok(ExecOutcome::normal())
}

fn div(a: i32, b: i32) -> i32 {
    if b == 0 {
        -1
    } else if a == i32::MIN && b == -1 {
        i32::MIN
    } else {
        a.wrapping_div(b)
    }
}

fn divu(a: i32, b: i32) -> i32 {
    if b == 0 {
        -1
    } else {
        ((a as u32) / (b as u32)) as i32
    }
}

fn rem(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else if a == i32::MIN && b == -1 {
        0
    } else {
        a.wrapping_rem(b)
    }
}

fn remu(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else {
        ((a as u32) % (b as u32)) as i32
    }
}
