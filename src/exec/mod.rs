//! Decode-execute fusion for RV32IMA: bit fields are pulled out of the
//! instruction word and executed in the same match arm, with no
//! intermediate boxed/enum instruction value — the style this crate's
//! sibling RV32 decoders use for their hot path.

use crate::error::VmError;
use crate::memory::AddressSpace;

mod atomic;
mod branch;
mod immediate;
mod jump;
mod load_store;
mod rtype;
mod system;

/// Outcome of executing one instruction, consumed by [`crate::state::Vm::run`].
pub struct ExecOutcome {
    /// New PC, or `None` to mean "PC += 4" (every instruction here is 4 bytes;
    /// there are no compressed encodings in this ISA subset).
    pub new_pc: Option<u32>,
    /// Whether the guest executed `ecall`.
    pub syscall: bool,
}

impl ExecOutcome {
    fn normal() -> Self {
        ExecOutcome { new_pc: None, syscall: false }
    }

    fn branch_to(pc: u32) -> Self {
        ExecOutcome { new_pc: Some(pc), syscall: false }
    }

    fn ecall() -> Self {
        ExecOutcome { new_pc: None, syscall: true }
    }
}

/// Read a register; `x0` always reads as zero regardless of what was stored there.
#[inline]
pub(crate) fn read_reg(regs: &[i32; 32], num: u8) -> i32 {
    if num == 0 { 0 } else { regs[num as usize] }
}

/// Write a register; writes to `x0` are silently discarded.
#[inline]
pub(crate) fn write_reg(regs: &mut [i32; 32], num: u8, value: i32) {
    if num != 0 {
        regs[num as usize] = value;
    }
}

/// Decode and execute the instruction at `word` (already fetched from `pc`).
///
/// Returns `Err(VmError::InternalCore)` for any encoding this VM doesn't
/// support (unknown opcode, unknown funct3/funct7 combination) — the
/// "other fault" outcome from the decoder contract. Memory faults surface
/// as `Err(VmError::MemRd)`/`Err(VmError::MemWr)` directly, already
/// distinguished by [`AddressSpace`].
pub fn decode_execute(
    word: u32,
    pc: u32,
    regs: &mut [i32; 32],
    mem: &mut AddressSpace<'_>,
) -> Result<ExecOutcome, VmError> {
    let opcode = crate::decode::opcode(word);
    match opcode {
        0x33 => rtype::execute(word, regs),
        0x13 => immediate::execute(word, regs),
        0x03 => load_store::execute_load(word, regs, mem),
        0x23 => load_store::execute_store(word, regs, mem),
        0x63 => branch::execute(word, pc, regs),
        0x6f => jump::execute_jal(word, pc, regs),
        0x67 => jump::execute_jalr(word, pc, regs),
        0x37 => jump::execute_lui(word, regs),
        0x17 => jump::execute_auipc(word, pc, regs),
        0x73 => system::execute(word, regs),
        0x0f => Ok(ExecOutcome::normal()), // FENCE/FENCE.I: no-op, single-hart
        0x2f => atomic::execute(word, regs, mem),
        _ => {
            log::debug!("unknown opcode 0x{opcode:02x} at pc=0x{pc:08x}");
            Err(VmError::InternalCore)
        }
    }
}
