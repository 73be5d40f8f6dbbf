//! Guest-pointer marshaling: safe conversion of guest addresses, handed to
//! the host through a [`crate::Event::Syscall`], into host-side slices.
//!
//! Every helper here validates before returning. On failure the VM is
//! marked in error (via the same sticky error path the run loop uses) and
//! an empty slice is returned — callers that naively use the result observe
//! an empty value, never a dangling pointer. The slices this module hands
//! out borrow `&self`/`&mut self` of the `Vm`, so the borrow checker — not a
//! runtime generation counter — rejects any attempt to hold one across a
//! subsequent `run`/`attach_extram` call (SPEC_FULL.md §4.3, DESIGN NOTES
//! "Raw guest pointers → borrowed slices").

use crate::error::VmError;
use crate::event::Arg;
use crate::state::Vm;

/// Which register a handle names: `a0`/`a1`/`a2`.
fn reg_index(arg: Arg) -> usize {
    match arg {
        Arg::Arg0 => 10,
        Arg::Arg1 => 11,
        Arg::Ret => 12,
    }
}

impl<'ext> Vm<'ext> {
    /// Raise `err` through the VM's sticky error path (first error wins).
    fn mark_error(&mut self, err: VmError) {
        log::debug!("marshaling failure: {err}");
        self.set_error_pub(err);
    }

    /// Read a syscall argument register's current value.
    pub fn arg_getval(&self, arg: Arg) -> u32 {
        self.regs()[reg_index(arg)] as u32
    }

    /// Write a syscall argument register.
    pub fn arg_setval(&mut self, arg: Arg, val: u32) {
        self.set_reg(reg_index(arg), val as i32);
    }

    /// Read a guest pointer argument as a NUL-terminated string, excluding
    /// the terminator. On failure, returns an empty slice and marks the VM
    /// `MEM_RD`.
    pub fn arg_getcstr(&mut self, arg: Arg) -> &[u8] {
        let addr = self.arg_getval(arg);
        if self.address_space().get_cstr(addr).is_err() {
            self.mark_error(VmError::MemRd);
            return &self.garbage[..0];
        }
        self.address_space().get_cstr(addr).unwrap_or(&[])
    }

    /// Read a (pointer, length) argument pair as a slice, where both the
    /// pointer and the length come from the guest.
    pub fn arg_getslice(&mut self, ptr_arg: Arg, len_arg: Arg) -> &[u8] {
        let ptr = self.arg_getval(ptr_arg);
        let len = self.arg_getval(len_arg) as usize;
        self.getslice_inner(ptr, len)
    }

    /// Read a guest pointer argument as a slice of host-supplied length
    /// (`len` is not guest-controlled, unlike [`Vm::arg_getslice`]).
    pub fn arg_getslice_fixed(&mut self, ptr_arg: Arg, len: usize) -> &[u8] {
        let ptr = self.arg_getval(ptr_arg);
        self.getslice_inner(ptr, len)
    }

    fn getslice_inner(&mut self, ptr: u32, len: usize) -> &[u8] {
        if self.address_space().get_slice(ptr, len).is_err() {
            self.mark_error(VmError::MemRd);
            return &self.garbage[..0];
        }
        self.address_space().get_slice(ptr, len).unwrap_or(&[])
    }
}
