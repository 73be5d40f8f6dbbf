//! Embeddable RV32IMA (machine-mode only) virtual machine.
//!
//! A host drives the VM cooperatively: each call to [`Vm::run`] executes at
//! most `budget` guest instructions and returns control to the host either
//! because the guest issued a syscall, halted, exhausted its budget, or
//! committed a fault. See [`Vm`] for the host API and [`Event`] for what
//! comes back out of `run`.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod decode;
pub mod error;
pub mod event;
mod exec;
pub mod marshal;
pub mod memory;
pub mod state;
pub mod syscall;

pub use error::VmError;
pub use event::{Arg, Event};
pub use memory::AddressSpace;
pub use state::{Status, Vm};

/// Initialize logging for a host binary embedding this VM.
///
/// Reads the `RUST_LOG` environment variable for filtering. Guests and
/// `no_std` embedders never need this — the `log` facade works without a
/// backend attached.
#[cfg(feature = "std")]
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
