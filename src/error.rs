//! The VM's closed error taxonomy.
//!
//! Unlike a general-purpose emulator error type, `VmError` is deliberately
//! closed: every fault the VM can ever report is one of these nine kinds.
//! Manual `Display` rather than a derive keeps this usable from `no_std`
//! guests without pulling in a proc-macro dependency.

use core::fmt;

/// A VM fault or host-API misuse, as surfaced through [`crate::Event::Err`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// No error. Never itself reported through `Event::Err`.
    None,
    /// `run` was called while the VM was not `PAUSED`.
    NotReady,
    /// A load fell outside every attached memory region.
    MemRd,
    /// A store fell outside every attached memory region.
    MemWr,
    /// Reserved for a future reserved-range syscall code that needs rejecting
    /// outright. Currently unreachable: this VM surfaces every reserved code
    /// it doesn't special-case (including unrecognized ones) as an ordinary
    /// `Syscall` event instead, matching `uvm32_run`'s `switch (a7)` default case.
    BadSyscall,
    /// The guest executed `budget` instructions without reaching any suspension point.
    Hung,
    /// The decoder reported a fault that isn't a load/store fault (bad opcode,
    /// misaligned PC, `STACKPROTECT` past the end of RAM, a clobbered canary, `EBREAK`).
    InternalCore,
    /// The run loop finished in a status the state machine doesn't define.
    InternalState,
    /// An invalid `Arg` handle was passed to a marshaling helper.
    Args,
}

impl VmError {
    /// True for every variant except `None`.
    pub fn is_error(self) -> bool {
        !matches!(self, VmError::None)
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            VmError::None => "no error",
            VmError::NotReady => "vm is not in the paused state",
            VmError::MemRd => "load out of bounds",
            VmError::MemWr => "store out of bounds",
            VmError::BadSyscall => "unrecognized reserved syscall code",
            VmError::Hung => "instruction budget exhausted with no suspension",
            VmError::InternalCore => "decoder fault",
            VmError::InternalState => "run loop exited in an undefined state",
            VmError::Args => "invalid argument handle",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_not_an_error() {
        assert!(!VmError::None.is_error());
        assert!(VmError::Hung.is_error());
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(alloc::format!("{}", VmError::MemRd), "load out of bounds");
    }
}
