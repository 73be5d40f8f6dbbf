//! `JAL`/`JALR` (opcodes `0x6f`/`0x67`) and `LUI`/`AUIPC` (opcodes `0x37`/`0x17`).

use super::{ExecOutcome, read_reg, write_reg};
use crate::decode::{imm_i, imm_j, imm_u, rd, rs1};
use crate::error::VmError;

pub(super) fn execute_jal(word: u32, pc: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    let rd = rd(word);
    write_reg(regs, rd, pc.wrapping_add(4) as i32);
    Ok(ExecOutcome::branch_to(pc.wrapping_add(imm_j(word) as u32)))
}

pub(super) fn execute_jalr(word: u32, pc: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    let rd = rd(word);
    let base = read_reg(regs, rs1(word));
    // rs1 is read before rd is written, so `jalr ra, ra, 0` (a common return sequence) is correct.
    let target = (base.wrapping_add(imm_i(word)) as u32) & !1;
    write_reg(regs, rd, pc.wrapping_add(4) as i32);
    Ok(ExecOutcome::branch_to(target))
}

pub(super) fn execute_lui(word: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    write_reg(regs, rd(word), imm_u(word));
    Ok(ExecOutcome::normal())
}

pub(super) fn execute_auipc(word: u32, pc: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    write_reg(regs, rd(word), pc.wrapping_add(imm_u(word) as u32) as i32);
    Ok(ExecOutcome::normal())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jal_links_and_branches() {
        let mut regs = [0i32; 32];
        let outcome = execute_jal(crate::decode::encode::jal(1, 16), 0x8000_0000, &mut regs).unwrap();
        assert_eq!(regs[1], 0x8000_0004);
        assert_eq!(outcome.new_pc, Some(0x8000_0010));
    }

    #[test]
    fn jalr_masks_low_bit_and_links() {
        let mut regs = [0i32; 32];
        regs[1] = 0x8000_0101u32 as i32; // odd target, must be cleared
        let outcome = execute_jalr(crate::decode::encode::jalr(5, 1, 0), 0x8000_0000, &mut regs).unwrap();
        assert_eq!(outcome.new_pc, Some(0x8000_0100));
        assert_eq!(regs[5], 0x8000_0004);
    }

    #[test]
    fn lui_and_auipc() {
        let mut regs = [0i32; 32];
        execute_lui(crate::decode::encode::lui(5, 0x1000), &mut regs).unwrap();
        assert_eq!(regs[5], 0x1000);
        execute_auipc(crate::decode::encode::auipc(6, 0x1000), 0x8000_0000, &mut regs).unwrap();
        assert_eq!(regs[6], 0x8000_1000u32 as i32);
    }
}
