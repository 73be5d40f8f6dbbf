//! `ECALL`/`EBREAK`/CSR instructions (opcode `0x73`).
//!
//! CSR ops decode and read/write a constant zero rather than faulting —
//! see SPEC_FULL.md §9 for why: there is no CSR state to back them, but
//! rejecting them outright would break guest startup code that probes
//! `mhartid`/`misa`-equivalent CSRs even when it never uses the result.

use super::{ExecOutcome, write_reg};
use crate::decode::{funct3, imm_i, rd};
use crate::error::VmError;

pub(super) fn execute(word: u32, regs: &mut [i32; 32]) -> Result<ExecOutcome, VmError> {
    let f3 = funct3(word);
    if f3 == 0x0 {
        return match imm_i(word) & 0xfff {
            0x000 => Ok(ExecOutcome::ecall()),
            0x001 => {
                log::debug!("ebreak: this VM exposes no debugger, treating as a fault");
                Err(VmError::InternalCore)
            }
            _ => Err(VmError::InternalCore),
        };
    }
    // CSRRW/CSRRS/CSRRC/CSRRWI/CSRRSI/CSRRCI: no CSR state backs any of
    // these, so every read returns 0 and every write is discarded.
    match f3 {
        0x1..=0x3 | 0x5..=0x7 => {
            write_reg(regs, rd(word), 0);
            Ok(ExecOutcome::normal())
        }
        _ => Err(VmError::InternalCore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecall_surfaces_syscall() {
        let mut regs = [0i32; 32];
        let outcome = execute(crate::decode::encode::ecall(), &mut regs).unwrap();
        assert!(outcome.syscall);
    }

    #[test]
    fn ebreak_is_a_fault() {
        let mut regs = [0i32; 32];
        assert_eq!(execute(crate::decode::encode::ebreak(), &mut regs), Err(VmError::InternalCore));
    }

    #[test]
    fn csrrw_reads_zero() {
        let mut regs = [0i32; 32];
        let word = 0x73 | (5u32 << 7) | (0x1 << 12) | (6u32 << 15);
        execute(word, &mut regs).unwrap();
        assert_eq!(regs[5], 0);
    }
}
