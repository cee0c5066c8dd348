//! The KERNAL hook set.
//!
//! Before every instruction the machine loop asks the hook set whether the
//! current PC is one of the trapped KERNAL entry points. A hook either
//! falls through (`NotHandled`: the ROM code still runs, as for CHROUT) or
//! fully simulates the routine and unwinds the JSR (`Handled`).
//!
//! The per-machine differences are confined to [`KernalSpec`]: the PET has
//! no SETLFS/SETNAM at the standard jump-table addresses, each BASIC puts
//! its READY loop somewhere else, and the zero-page pointer layout moved
//! between BASIC versions. The hook bodies are shared.

use cpu_6502::{disasm, Mos6502};
use emu_core::{Bus, Console, Exit};
use log::trace;

/// Outcome of a pre-instruction hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hooked {
    /// The hook simulated the routine; do not decode the byte at the
    /// original PC on this iteration.
    Handled,
    /// Proceed with normal decode (the hook may still have emitted output).
    NotHandled,
}

/// Per-machine KERNAL and BASIC entry points.
///
/// Addresses are from the published ROM listings of the respective BASIC
/// versions; a different ROM revision means editing one constructor here.
#[derive(Debug, Clone)]
pub struct KernalSpec {
    /// Character out ($FFD2 everywhere).
    pub chrout: u16,
    /// Character in ($FFCF).
    pub chrin: u16,
    /// Non-blocking get ($FFE4).
    pub getin: u16,
    /// STOP key test ($FFE1).
    pub stop: u16,
    /// Set logical file parameters ($FFBA where present).
    pub setlfs: Option<u16>,
    /// Set file name ($FFBD where present).
    pub setnam: Option<u16>,
    /// LOAD/VERIFY entry ($FFD5 where present).
    pub load: Option<u16>,
    /// SAVE entry ($FFD8 where present).
    pub save: Option<u16>,
    /// BASIC READY prompt loop.
    pub ready: u16,
    /// BASIC main loop past the READY banner (jumped to after auto-RUN).
    pub main: u16,
    /// The GO statement executor, where the machine-switch sniffer runs.
    pub go: Option<u16>,
    /// BASIC's relink-line-pointers routine.
    pub linkprg: u16,
    /// BASIC's CLR routine.
    pub clr: u16,
    /// Zero page: start-of-BASIC-text pointer.
    pub txttab: u16,
    /// Zero page: start-of-variables pointer (end-of-program).
    pub vartab: u16,
    /// Zero page: where LINKPRG leaves the address of the last line link.
    pub link_end: u16,
    /// Zero page: BASIC text pointer (CHRGET), used by the GO sniffer.
    pub txtptr: u16,
}

impl KernalSpec {
    /// C64: BASIC V2 at $A000, KERNAL jump table at $FFxx.
    pub fn c64() -> Self {
        Self {
            chrout: 0xFFD2,
            chrin: 0xFFCF,
            getin: 0xFFE4,
            stop: 0xFFE1,
            setlfs: Some(0xFFBA),
            setnam: Some(0xFFBD),
            load: Some(0xFFD5),
            save: Some(0xFFD8),
            ready: 0xA474,
            main: 0xA480,
            go: Some(0xA8F8),
            linkprg: 0xA533,
            clr: 0xA65E,
            txttab: 0x2B,
            vartab: 0x2D,
            link_end: 0x22,
            txtptr: 0x7A,
        }
    }

    /// VIC-20: the same BASIC V2 image assembled at $C000.
    pub fn vic20() -> Self {
        Self {
            ready: 0xC474,
            main: 0xC480,
            go: Some(0xC8F8),
            linkprg: 0xC533,
            clr: 0xC65E,
            ..Self::c64()
        }
    }

    /// PET 2001: the original BASIC has no SETLFS/SETNAM jump-table slots
    /// and no GO statement; the zero-page pointers sit lower.
    pub fn pet() -> Self {
        Self {
            setlfs: None,
            setnam: None,
            ready: 0xC38B,
            main: 0xC397,
            go: None,
            linkprg: 0xC442,
            clr: 0xC577,
            txttab: 0x28,
            vartab: 0x2A,
            link_end: 0x1F,
            txtptr: 0x77,
            ..Self::c64()
        }
    }

    /// C16/Plus-4: BASIC 3.5 at $8000; CHRGET pointer moved to $3B.
    pub fn ted() -> Self {
        Self {
            ready: 0x8703,
            main: 0x870F,
            go: Some(0x8A07),
            linkprg: 0x8818,
            clr: 0x8A9B,
            txtptr: 0x3B,
            ..Self::c64()
        }
    }

    /// C128: BASIC 7.0 in the low ROMs; program text in bank 0.
    pub fn c128() -> Self {
        Self {
            ready: 0x4D37,
            main: 0x4D43,
            go: Some(0x5A5D),
            linkprg: 0x4F4F,
            clr: 0x51F8,
            txttab: 0x2D,
            vartab: 0x2F,
            link_end: 0x24,
            txtptr: 0x3D,
            ..Self::c64()
        }
    }
}

/// Commodore KERNAL error codes used by the hooks.
pub(crate) mod error_code {
    /// Generic I/O fault ("too many files" on real hardware).
    pub const GENERIC: u8 = 1;
    /// FILE NOT FOUND.
    pub const FILE_NOT_FOUND: u8 = 4;
    /// ILLEGAL QUANTITY (bad VERIFY flag).
    pub const ILLEGAL_QUANTITY: u8 = 14;
    /// VERIFY mismatch.
    pub const VERIFY: u8 = 28;
}

/// The hook set plus the state it carries between instructions: captured
/// SETLFS/SETNAM parameters, the armed LOAD trap, the auto-load state
/// machine, and the exit flag the CPU loop checks between instructions.
pub struct Kernal {
    pub(crate) spec: KernalSpec,
    /// File name captured by SETNAM (PETSCII bytes).
    pub(crate) file_name: Vec<u8>,
    /// Logical file number from SETLFS.
    pub(crate) file_num: u8,
    /// Device number from SETLFS.
    pub(crate) file_dev: u8,
    /// Secondary address from SETLFS (0 = relative load).
    pub(crate) file_sec: u8,
    /// LOAD vs VERIFY, from A at the LOAD entry.
    pub(crate) file_verify: bool,
    /// Caller-supplied load address from X/Y.
    pub(crate) file_addr: u16,
    /// Armed when the LOAD hook ran; fires at the post-RTS PC.
    pub(crate) load_trap: Option<u16>,
    /// Program to load at the first READY prompt.
    pub(crate) startup: Option<std::path::PathBuf>,
    /// Auto-load sequencing: 0 = idle, 1 = relink done, 2 = ready to RUN.
    pub(crate) startup_state: u8,
    /// Set by the GO sniffer (and the C128 mode register path).
    pub(crate) exit: Option<Exit>,
}

impl Kernal {
    pub fn new(spec: KernalSpec) -> Self {
        Self {
            spec,
            file_name: Vec::new(),
            file_num: 0,
            file_dev: 8,
            file_sec: 0,
            file_verify: false,
            file_addr: 0,
            load_trap: None,
            startup: None,
            startup_state: 0,
            exit: None,
        }
    }

    /// Configure a program to auto-load and RUN at the READY prompt.
    pub fn set_startup(&mut self, path: std::path::PathBuf) {
        self.startup = Some(path);
    }

    /// Run hooks to quiescence, then execute one instruction.
    ///
    /// Returns `Some(exit)` when something set the exit flag; the machine's
    /// run loop returns it to the launcher.
    pub fn step<B: Bus>(
        &mut self,
        cpu: &mut Mos6502,
        bus: &mut B,
        console: &mut dyn Console,
    ) -> Result<Option<Exit>, String> {
        loop {
            if let Some(exit) = self.exit.take() {
                return Ok(Some(exit));
            }
            match self.hook(cpu, bus, console) {
                Hooked::Handled => continue,
                Hooked::NotHandled => break,
            }
        }

        if log::log_enabled!(log::Level::Trace) {
            let (text, _) = disasm::disassemble(bus, cpu.pc());
            trace!("{:04X}  {text}", cpu.pc());
        }

        cpu.step(bus).map_err(|e| e.to_string())?;
        Ok(None)
    }

    /// The pre-instruction hook: dispatch on PC against the trap table.
    pub fn hook<B: Bus>(
        &mut self,
        cpu: &mut Mos6502,
        bus: &mut B,
        console: &mut dyn Console,
    ) -> Hooked {
        let pc = cpu.pc();

        // An armed LOAD trap fires once, with the caller's stack already
        // unwound, then lets the ROM continue at the return address.
        if self.load_trap == Some(pc) {
            self.load_trap = None;
            self.finish_load(cpu, bus);
            return Hooked::NotHandled;
        }

        if pc == self.spec.chrout {
            // Emit the character, then fall through so the ROM's native
            // code still runs and updates screen memory.
            console.write_char(cpu.a());
            return Hooked::NotHandled;
        }

        if pc == self.spec.chrin {
            if console.eof() {
                self.exit = Some(Exit::Bye);
                return Hooked::Handled;
            }
            let c = console.read_char();
            cpu.set_a(c);
            cpu.set_nz(c);
            cpu.set_carry(false);
            cpu.simulate_rts(bus);
            return Hooked::Handled;
        }

        if pc == self.spec.getin {
            let c = console.get_in();
            cpu.set_a(c);
            if c != 0 {
                // The real ROM leaves the fetched code in X as well.
                cpu.set_x(c);
            }
            cpu.set_nz(c);
            cpu.set_carry(false);
            cpu.simulate_rts(bus);
            return Hooked::Handled;
        }

        if pc == self.spec.stop {
            cpu.set_zero(console.check_stop());
            cpu.simulate_rts(bus);
            return Hooked::Handled;
        }

        if Some(pc) == self.spec.setlfs {
            self.file_num = cpu.a();
            self.file_dev = cpu.x();
            self.file_sec = cpu.y();
            return Hooked::NotHandled;
        }

        if Some(pc) == self.spec.setnam {
            let len = cpu.a() as u16;
            let addr = u16::from_le_bytes([cpu.x(), cpu.y()]);
            self.file_name = (0..len).map(|i| bus.read(addr.wrapping_add(i))).collect();
            return Hooked::NotHandled;
        }

        if Some(pc) == self.spec.load {
            return self.load_hook(cpu, bus);
        }

        if Some(pc) == self.spec.save {
            return self.save_hook(cpu, bus);
        }

        if pc == self.spec.ready {
            return self.ready_hook(cpu, bus, console);
        }

        if Some(pc) == self.spec.go {
            return self.go_hook(bus);
        }

        Hooked::NotHandled
    }

    /// The GO sniffer: at the GO statement executor, a bare machine number
    /// (2001, 20, 64, 16, 4, 128) exits the inner loop with a switch
    /// signal. Anything else falls through to the ROM's own GO handling.
    fn go_hook<B: Bus>(&mut self, bus: &mut B) -> Hooked {
        let mut p = self.read_zp_word(bus, self.spec.txtptr);

        // Skip spaces after the GO token
        while bus.read(p) == 0x20 {
            p = p.wrapping_add(1);
        }

        let mut number: u32 = 0;
        let mut digits = 0;
        loop {
            let byte = bus.read(p);
            if !byte.is_ascii_digit() {
                break;
            }
            number = number * 10 + (byte - b'0') as u32;
            digits += 1;
            if digits > 4 {
                return Hooked::NotHandled;
            }
            p = p.wrapping_add(1);
        }

        if digits == 0 {
            return Hooked::NotHandled;
        }

        match number {
            2001 | 20 | 64 | 16 | 4 | 128 => {
                log::info!("GO {number}: switching machine");
                self.exit = Some(Exit::Switch(number as u16));
                Hooked::Handled
            }
            _ => Hooked::NotHandled,
        }
    }

    /// Read a little-endian pointer from the zero page.
    pub(crate) fn read_zp_word<B: Bus>(&self, bus: &mut B, addr: u16) -> u16 {
        let low = bus.read(addr);
        let high = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Write a little-endian pointer to the zero page.
    pub(crate) fn write_zp_word<B: Bus>(&self, bus: &mut B, addr: u16, value: u16) {
        bus.write(addr, value as u8);
        bus.write(addr.wrapping_add(1), (value >> 8) as u8);
    }
}
