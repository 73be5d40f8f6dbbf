//! The event the host sees after every [`crate::Vm::run`] call.

use crate::error::VmError;

/// Opaque handle to one of the three registers exposed across the syscall boundary.
///
/// These name register slots, not values — `arg_getval`/`arg_setval` read and
/// write through the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// `a0`.
    Arg0,
    /// `a1`.
    Arg1,
    /// `a2`, the syscall return-value register.
    Ret,
}

/// Why the VM returned control to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The guest is still paused on its last syscall (returned again without
    /// a fresh `run`, or used to report a fault). Carries the sticky error.
    Err { code: VmError },
    /// The guest issued `ecall` with a non-reserved code in `a7`.
    Syscall { code: u32 },
    /// The guest issued the reserved `HALT` syscall.
    End,
}

impl Default for Event {
    fn default() -> Self {
        Event::Err { code: VmError::None }
    }
}

impl Event {
    /// True if this event carries an error.
    pub fn is_err(&self) -> bool {
        matches!(self, Event::Err { code } if code.is_error())
    }
}
