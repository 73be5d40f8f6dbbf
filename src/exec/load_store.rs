//! Loads and stores (opcodes `0x03`/`0x23`).

use super::{ExecOutcome, read_reg, write_reg};
use crate::decode::{funct3, imm_i, imm_s, rd, rs1, rs2};
use crate::error::VmError;
use crate::memory::{AddressSpace, Width};

pub(super) fn execute_load(
    word: u32,
    regs: &mut [i32; 32],
    mem: &AddressSpace<'_>,
) -> Result<ExecOutcome, VmError> {
    let rd = rd(word);
    let base = read_reg(regs, rs1(word));
    let addr = base.wrapping_add(imm_i(word)) as u32;
    let width = match funct3(word) {
        0x0 => Width::I8,
        0x1 => Width::I16,
        0x2 => Width::I32,
        0x4 => Width::U8,
        0x5 => Width::U16,
        _ => return Err(VmError::InternalCore),
    };
    let value = mem.load(addr, width)?;
    write_reg(regs, rd, value);
    Ok(ExecOutcome::normal())
}

pub(super) fn execute_store(
    word: u32,
    regs: &[i32; 32],
    mem: &mut AddressSpace<'_>,
) -> Result<ExecOutcome, VmError> {
    let base = read_reg(regs, rs1(word));
    let value = read_reg(regs, rs2(word));
    let addr = base.wrapping_add(imm_s(word)) as u32;
    let width = match funct3(word) {
        0x0 => Width::U8,
        0x1 => Width::U16,
        0x2 => Width::I32,
        _ => return Err(VmError::InternalCore),
    };
    mem.store(addr, value, width)?;
    Ok(ExecOutcome::normal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BASE;

    #[test]
    fn store_then_load_byte_sign_extends() {
        let mut mem = AddressSpace::new(16);
        let mut regs = [0i32; 32];
        regs[6] = BASE as i32;
        regs[7] = -1i32;
        execute_store(crate::decode::encode::sb(6, 7, 0), &regs, &mut mem).unwrap();
        execute_load(crate::decode::encode::lb(5, 6, 0), &mut regs, &mem).unwrap();
        assert_eq!(regs[5], -1);
        execute_load(crate::decode::encode::lbu(5, 6, 0), &mut regs, &mem).unwrap();
        assert_eq!(regs[5], 0xff);
    }

    #[test]
    fn load_out_of_bounds_is_mem_rd() {
        let mem = AddressSpace::new(4);
        let mut regs = [0i32; 32];
        regs[6] = BASE as i32 + 100;
        assert_eq!(
            execute_load(crate::decode::encode::lw(5, 6, 0), &mut regs, &mem),
            Err(VmError::MemRd)
        );
    }
}
