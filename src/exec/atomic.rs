//! A-extension atomics (opcode `0x2f`): `LR.W`, `SC.W`, and the `AMO*.W` family.
//!
//! This VM is single-hart and single-threaded, so there is no real
//! contention to arbitrate: `LR.W` is a plain load, `SC.W` always succeeds,
//! and every `AMO*.W` is a load-modify-store with no other hart able to
//! observe the intermediate state. `aq`/`rl` bits (word bits 26/25) are
//! accepted and ignored.

use super::{ExecOutcome, read_reg, write_reg};
use crate::decode::{funct3, funct5, rd, rs1, rs2};
use crate::error::VmError;
use crate::memory::{AddressSpace, Width};

pub(super) fn execute(word: u32, regs: &mut [i32; 32], mem: &mut AddressSpace<'_>) -> Result<ExecOutcome, VmError> {
    if funct3(word) != 0x2 {
        return Err(VmError::InternalCore);
    }
    let rd = rd(word);
    let addr = read_reg(regs, rs1(word)) as u32;

    match funct5(word) {
        0x02 => {
            // LR.W
            let value = mem.load(addr, Width::I32)?;
            write_reg(regs, rd, value);
        }
        0x03 => {
            // SC.W always succeeds here; rd receives 0 (success).
            let value = read_reg(regs, rs2(word));
            mem.store(addr, value, Width::I32)?;
            write_reg(regs, rd, 0);
        }
        funct5 => {
            let old = mem.load(addr, Width::I32)?;
            let operand = read_reg(regs, rs2(word));
            let new = match funct5 {
                0x00 => old.wrapping_add(operand),      // AMOADD.W
                0x01 => operand,                        // AMOSWAP.W
                0x04 => old ^ operand,                   // AMOXOR.W
                0x08 => old | operand,                   // AMOOR.W
                0x0c => old & operand,                   // AMOAND.W
                0x10 => old.min(operand),                // AMOMIN.W
                0x14 => old.max(operand),                // AMOMAX.W
                0x18 => ((old as u32).min(operand as u32)) as i32, // AMOMINU.W
                0x1c => ((old as u32).max(operand as u32)) as i32, // AMOMAXU.W
                _ => return Err(VmError::InternalCore),
            };
            mem.store(addr, new, Width::I32)?;
            write_reg(regs, rd, old);
        }
    }
    Ok(ExecOutcome::normal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BASE;

    fn amo_word(funct5: u32, rd: u8, rs1: u8, rs2: u8) -> u32 {
        0x2f | ((rd as u32) << 7) | (0x2 << 12) | ((rs1 as u32) << 15) | ((rs2 as u32) << 20) | (funct5 << 27)
    }

    #[test]
    fn amoadd_reads_old_value_and_stores_sum() {
        let mut mem = AddressSpace::new(16);
        mem.store(BASE, 10, Width::I32).unwrap();
        let mut regs = [0i32; 32];
        regs[6] = BASE as i32;
        regs[7] = 5;
        execute(amo_word(0x00, 5, 6, 7), &mut regs, &mut mem).unwrap();
        assert_eq!(regs[5], 10);
        assert_eq!(mem.load(BASE, Width::I32).unwrap(), 15);
    }

    #[test]
    fn lr_then_sc_always_succeeds() {
        let mut mem = AddressSpace::new(16);
        mem.store(BASE, 1, Width::I32).unwrap();
        let mut regs = [0i32; 32];
        regs[6] = BASE as i32;
        execute(amo_word(0x02, 5, 6, 0), &mut regs, &mut mem).unwrap();
        assert_eq!(regs[5], 1);
        regs[7] = 99;
        execute(amo_word(0x03, 5, 6, 7), &mut regs, &mut mem).unwrap();
        assert_eq!(regs[5], 0);
        assert_eq!(mem.load(BASE, Width::I32).unwrap(), 99);
    }

    #[test]
    fn amo_out_of_bounds_is_mem_rd() {
        let mut mem = AddressSpace::new(4);
        let mut regs = [0i32; 32];
        regs[6] = BASE as i32 + 100;
        assert_eq!(execute(amo_word(0x00, 5, 6, 7), &mut regs, &mut mem), Err(VmError::MemRd));
    }
}
