//! B-type: conditional branches (opcode `0x63`).

use super::{ExecOutcome, read_reg};
use crate::decode::{funct3, imm_b, rs1, rs2};
use crate::error::VmError;

pub(super) fn execute(word: u32, pc: u32, regs: &[i32; 32]) -> Result<ExecOutcome, VmError> {
    let a = read_reg(regs, rs1(word));
    let b = read_reg(regs, rs2(word));
    let taken = match funct3(word) {
        0x0 => a == b,
        0x1 => a != b,
        0x4 => a < b,
        0x5 => a >= b,
        0x6 => (a as u32) < (b as u32),
        0x7 => (a as u32) >= (b as u32),
        _ => return Err(VmError::InternalCore),
    };
    if taken {
        Ok(ExecOutcome::branch_to(pc.wrapping_add(imm_b(word) as u32)))
    } else {
        Ok(ExecOutcome::normal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beq_taken_and_not_taken() {
        let mut regs = [0i32; 32];
        regs[5] = 1;
        regs[6] = 1;
        let outcome = execute(crate::decode::encode::beq(5, 6, 16), 0x8000_0000, &regs).unwrap();
        assert_eq!(outcome.new_pc, Some(0x8000_0010));

        regs[6] = 2;
        let outcome = execute(crate::decode::encode::beq(5, 6, 16), 0x8000_0000, &regs).unwrap();
        assert_eq!(outcome.new_pc, None);
    }
}
