//! I-type: immediate arithmetic/logical/shift instructions (opcode `0x13`).

use super::{ExecOutcome, read_reg, write_reg};
use crate::decode::{funct3, funct7, imm_i, rd, rs1};
use crate::error::VmError;

pub(super) fn execute(word: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    let rd = rd(word);
    let a = read_reg(regs, rs1(word));
    let imm = imm_i(word);
    let f3 = funct3(word);
    let result = match f3 {
        0x0 => a.wrapping_add(imm),
        0x2 => i32::from(a < imm),
        0x3 => i32::from((a as u32) < (imm as u32)),
        0x4 => a ^ imm,
        0x6 => a | imm,
        0x7 => a & imm,
        0x1 => {
            if funct7(word) != 0x00 {
                return Err(VmError::InternalCore);
            }
            a.wrapping_shl(imm as u32 & 0x1f)
        }
        0x5 => match funct7(word) {
            0x00 => ((a as u32).wrapping_shr(imm as u32 & 0x1f)) as i32,
            0x20 => a.wrapping_shr(imm as u32 & 0x1f),
            _ => return Err(VmError::InternalCore),
        },
        _ => return Err(VmError::InternalCore),
    };
    write_reg(regs, rd, result);
    Ok(ExecOutcome::normal())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addi_and_andi() {
        let mut regs = [0i32; 32];
        regs[6] = 5;
        execute(crate::decode::encode::addi(5, 6, -2), &mut regs).unwrap();
        assert_eq!(regs[5], 3);
        execute(crate::decode::encode::andi(7, 5, 0x1), &mut regs).unwrap();
        assert_eq!(regs[7], 1);
    }

    #[test]
    fn writes_to_x0_are_discarded() {
        let mut regs = [0i32; 32];
        regs[6] = 5;
        execute(crate::decode::encode::addi(0, 6, 1), &mut regs).unwrap();
        assert_eq!(regs[0], 0);
    }
}
