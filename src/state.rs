//! The VM itself: registers, program counter, status, and the metered
//! `run` loop that drives the host/guest handoff described in SPEC_FULL.md §4.4.

use crate::error::VmError;
use crate::event::Event;
use crate::exec;
use crate::memory::{AddressSpace, BASE};
use crate::syscall::{self, Reserved};

/// Where the VM is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ready for (or between) `run` calls.
    Paused,
    /// Inside a `run` call's step loop. Never observed by a host — `run`
    /// always leaves the VM in one of the other three states before returning.
    Running,
    /// A fault or host-API misuse occurred; sticky until `clear_error`.
    Error,
    /// The guest issued `HALT`. Terminal.
    Ended,
}

/// Canary byte value written by `STACKPROTECT`, per SPEC_FULL.md §4.3.
const STACK_CANARY_VALUE: u8 = 0x42;

/// An embeddable RV32IMA virtual machine.
///
/// `'ext` is the lifetime of an optionally-attached external-RAM buffer (see
/// [`Vm::attach_extram`]). A host that never uses extram can pick `'static`
/// implicitly by never calling `attach_extram`.
pub struct Vm<'ext> {
    regs: [i32; 32],
    pc: u32,
    mem: AddressSpace<'ext>,
    status: Status,
    err: VmError,
    event: Event,
    /// Offset from `BASE` of the stack canary byte, once `STACKPROTECT` has fired.
    canary_offset: Option<u32>,
    /// Backing store for marshaling failures; see SPEC_FULL.md DESIGN NOTES
    /// "Global garbage fallback byte" — a per-VM field rather than a process-wide static.
    pub(crate) garbage: [u8; 4],
}

impl<'ext> Vm<'ext> {
    /// Allocate `ram_size` bytes of main RAM and initialize. Equivalent to
    /// the language-neutral `init(vm)` applied to a freshly allocated state.
    pub fn new(ram_size: usize) -> Self {
        let mut vm = Vm {
            regs: [0; 32],
            pc: BASE,
            mem: AddressSpace::new(ram_size),
            status: Status::Paused,
            err: VmError::None,
            event: Event::default(),
            canary_offset: None,
            garbage: [0; 4],
        };
        vm.reset_core();
        vm
    }

    /// Reinitialize in place, reusing the existing RAM allocation. Zeros
    /// memory, clears registers, and re-derives PC/SP/status from scratch.
    pub fn init(&mut self) {
        self.mem.reset();
        self.reset_core();
    }

    fn reset_core(&mut self) {
        self.regs = [0; 32];
        self.pc = BASE;
        self.status = Status::Paused;
        self.err = VmError::None;
        self.event = Event::default();
        self.canary_offset = None;
        // sp = ((BASE + M) & ~0xF) - 16, per SPEC_FULL.md §3.
        let top = (BASE.wrapping_add(self.mem.len() as u32)) & !0xF;
        self.regs[2] = top.wrapping_sub(16) as i32;
        // hart ID (a0) is 0; machine-mode is implicit (no other mode is modeled).
        self.regs[10] = 0;
        self.regs[11] = 0;
    }

    /// Copy a ROM image into main RAM at offset 0. Returns `false` (leaving
    /// memory untouched) if `rom` is larger than main RAM.
    pub fn load(&mut self, rom: &[u8]) -> bool {
        self.mem.load(rom)
    }

    /// Register (or replace) the external-RAM borrow, resetting the dirty flag.
    pub fn attach_extram(&mut self, buf: &'ext mut [u8]) {
        self.mem.attach_extram(buf);
    }

    /// Detach external RAM, if attached.
    pub fn detach_extram(&mut self) {
        self.mem.detach_extram();
    }

    /// Whether the guest has written to extram since the last `run` entry.
    pub fn extram_dirty(&self) -> bool {
        self.mem.extram_dirty()
    }

    /// True once the guest has issued `HALT`.
    pub fn has_ended(&self) -> bool {
        self.status == Status::Ended
    }

    /// If in `ERROR`, return to `PAUSED` so `run` can be called again.
    /// A no-op in any other state.
    pub fn clear_error(&mut self) {
        if self.status == Status::Error {
            self.status = Status::Paused;
            self.err = VmError::None;
            log::debug!("error cleared, resuming from pc=0x{:08x}", self.pc);
        }
    }

    /// Current program counter. Debug-only accessor.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Borrow of the register file. Debug-only accessor.
    pub fn regs(&self) -> &[i32; 32] {
        &self.regs
    }

    /// Borrow of main RAM. Debug-only accessor.
    pub fn memory(&self) -> &[u8] {
        self.mem.main_ram()
    }

    pub(crate) fn address_space(&self) -> &AddressSpace<'ext> {
        &self.mem
    }

    pub(crate) fn status(&self) -> Status {
        self.status
    }

    pub(crate) fn current_event(&self) -> Event {
        self.event
    }

    /// Overwrite a register by numeric index. Used by [`crate::marshal`] to
    /// implement `arg_setval`; `x0` writes are accepted (the marshaling
    /// handles never name `x0`, but this stays consistent with [`exec::write_reg`]).
    pub(crate) fn set_reg(&mut self, index: usize, value: i32) {
        self.regs[index] = value;
    }

    /// Transition to `ERROR` with `err`, unless already in `ERROR` — first
    /// error wins (SPEC_FULL.md §4.5 stickiness rule). The single writer
    /// every fault site in this crate funnels through. Exposed to
    /// [`crate::marshal`] as `set_error_pub` since marshaling failures are
    /// also fault sites.
    fn set_error(&mut self, err: VmError) {
        if self.status != Status::Error {
            log::error!("vm fault: {err}");
            self.status = Status::Error;
            self.err = err;
        }
    }

    pub(crate) fn set_error_pub(&mut self, err: VmError) {
        self.set_error(err);
    }

    /// Run for at most `budget` guest instructions. Returns the number of
    /// instructions actually executed and the event describing why `run`
    /// returned. See SPEC_FULL.md §4.4 for the full state-machine algorithm.
    pub fn run(&mut self, budget: u32) -> (u32, Event) {
        self.mem.clear_extram_dirty();
        let orig_budget = budget.max(1);
        let mut remaining = orig_budget;

        if let Some(offset) = self.canary_offset {
            match self.mem.read_u8(BASE.wrapping_add(offset)) {
                Ok(b) if b == STACK_CANARY_VALUE => {}
                _ => {
                    self.set_error(VmError::InternalCore);
                    return (orig_budget - remaining, self.package_event());
                }
            }
        }

        if self.status != Status::Paused {
            self.set_error(VmError::NotReady);
            return (orig_budget - remaining, self.package_event());
        }

        self.status = Status::Running;
        log::trace!("run: entering RUNNING at pc=0x{:08x}, budget={budget}", self.pc);

        while self.status == Status::Running && remaining > 0 {
            self.step();
            remaining -= 1;

            if self.status == Status::Running && remaining == 0 {
                self.set_error(VmError::Hung);
            }
        }

        (orig_budget - remaining, self.package_event())
    }

    /// Execute exactly one guest instruction, dispatching its outcome per
    /// the decoder contract (SPEC_FULL.md §4.2). Never panics on a
    /// guest-controlled address or opcode.
    fn step(&mut self) {
        let word = match self.mem.fetch(self.pc) {
            Ok(w) => w,
            Err(_) => {
                self.set_error(VmError::InternalCore);
                return;
            }
        };

        match exec::decode_execute(word, self.pc, &mut self.regs, &mut self.mem) {
            Ok(outcome) => {
                if outcome.syscall {
                    self.pc = self.pc.wrapping_add(4);
                    self.handle_ecall();
                } else {
                    self.pc = outcome.new_pc.unwrap_or_else(|| self.pc.wrapping_add(4));
                }
            }
            Err(VmError::MemRd) => self.set_error(VmError::MemRd),
            Err(VmError::MemWr) => self.set_error(VmError::MemWr),
            Err(_) => self.set_error(VmError::InternalCore),
        }
    }

    fn handle_ecall(&mut self) {
        let code = self.regs[17] as u32; // a7
        if !syscall::is_reserved(code) {
            self.surface_syscall(code);
            return;
        }
        match syscall::classify(code) {
            Reserved::Halt => {
                log::debug!("guest halted at pc=0x{:08x}", self.pc);
                self.status = Status::Ended;
            }
            Reserved::StackProtect => self.handle_stackprotect(),
            // `YIELD` and any reserved-range code this VM doesn't otherwise
            // recognize both fall through to an ordinary syscall event,
            // matching `uvm32_run`'s `switch (a7)`, which only special-cases
            // HALT/STACKPROTECT and surfaces everything else via `default:`.
            Reserved::Yield | Reserved::Unknown => self.surface_syscall(code),
        }
    }

    fn surface_syscall(&mut self, code: u32) {
        self.event = Event::Syscall { code };
        self.status = Status::Paused;
    }

    fn handle_stackprotect(&mut self) {
        if self.canary_offset.is_some() {
            return; // one-shot; subsequent calls are silently ignored
        }
        let a0 = self.regs[10] as u32; // a0
        let offset = a0.wrapping_sub(BASE) & !0xF;
        let offset = offset.wrapping_add(64);
        if (offset as usize) < self.mem.len() {
            if self.mem.write_u8(BASE.wrapping_add(offset), STACK_CANARY_VALUE).is_ok() {
                self.canary_offset = Some(offset);
            } else {
                self.set_error(VmError::InternalCore);
            }
        } else {
            self.set_error(VmError::InternalCore);
        }
    }

    fn package_event(&mut self) -> Event {
        match self.status {
            Status::Ended => Event::End,
            Status::Paused => self.event,
            Status::Error => Event::Err { code: self.err },
            Status::Running => {
                self.set_error(VmError::InternalState);
                Event::Err { code: self.err }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode;

    fn rom(words: &[u32]) -> alloc::vec::Vec<u8> {
        let mut bytes = alloc::vec::Vec::with_capacity(words.len() * 4);
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn halt_ends_the_vm() {
        let mut vm = Vm::new(256);
        // HALT (0x1000000) doesn't fit a 12-bit immediate, so load it via LUI.
        let program = rom(&[encode::lui(17, 0x1000000u32 as i32), encode::ecall()]);
        assert!(vm.load(&program));
        let (_n, evt) = vm.run(10);
        assert_eq!(evt, Event::End);
        assert!(vm.has_ended());
    }

    #[test]
    fn unknown_syscall_is_surfaced() {
        let mut vm = Vm::new(256);
        let program = rom(&[encode::addi(17, 0, 7), encode::ecall()]);
        assert!(vm.load(&program));
        let (_n, evt) = vm.run(10);
        assert_eq!(evt, Event::Syscall { code: 7 });
    }

    #[test]
    fn budget_exhaustion_is_hung() {
        let mut vm = Vm::new(256);
        // an infinite loop: jal x0, 0
        let program = rom(&[encode::jal(0, 0)]);
        assert!(vm.load(&program));
        let (n, evt) = vm.run(50);
        assert_eq!(n, 50);
        assert_eq!(evt, Event::Err { code: VmError::Hung });
    }

    #[test]
    fn clear_error_resumes_from_hang() {
        let mut vm = Vm::new(256);
        let program = rom(&[encode::jal(0, 0)]);
        assert!(vm.load(&program));
        let (_n, evt) = vm.run(5);
        assert_eq!(evt, Event::Err { code: VmError::Hung });
        vm.clear_error();
        let (n2, evt2) = vm.run(5);
        assert_eq!(n2, 5);
        assert_eq!(evt2, Event::Err { code: VmError::Hung });
    }

    #[test]
    fn misaligned_pc_is_internal_core() {
        let mut vm = Vm::new(256);
        assert!(vm.load(&rom(&[encode::ecall()])));
        vm.pc = BASE + 1;
        let (_n, evt) = vm.run(1);
        assert_eq!(evt, Event::Err { code: VmError::InternalCore });
    }

    #[test]
    fn giant_rom_is_rejected_and_state_untouched() {
        let mut vm = Vm::new(16);
        let big = alloc::vec::Vec::from([0u8; 17]);
        assert!(!vm.load(&big));
        assert_eq!(vm.status(), Status::Paused);
    }

    #[test]
    fn load_over_budget_still_runs_at_least_one_step() {
        let mut vm = Vm::new(256);
        let program = rom(&[encode::addi(17, 0, 3), encode::ecall()]);
        assert!(vm.load(&program));
        let (n, evt) = vm.run(0);
        assert_eq!(n, 1);
        assert_eq!(evt, Event::Syscall { code: 3 });
    }
}
