//! Program loading: the LOAD/SAVE hooks and the auto-load state machine.
//!
//! Two paths bring a program into RAM:
//!
//! - The KERNAL LOAD entry, reached when the running BASIC executes a LOAD
//!   statement. The hook captures the call parameters, unwinds the JSR and
//!   arms a trap at the return address; the trap performs the transfer on
//!   the next hook pass, so file I/O runs with the stack already consistent.
//! - The startup program configured on the command line, driven by a
//!   three-state machine at the READY prompt: load and relink, fix the
//!   variable pointers and CLR, then push "RUN" into the console input.
//!
//! All RAM transfers go through the normal bus write path so banking is
//! honored on every machine.

use cpu_6502::Mos6502;
use emu_core::{Bus, Console};
use log::{info, warn};

use crate::kernal::{error_code, Hooked, Kernal};
use crate::prg;

impl Kernal {
    /// The LOAD entry hook ($FFD5): capture parameters, unwind, arm the
    /// trap at the return address, and report success so far (C = 0).
    pub(crate) fn load_hook<B: Bus>(&mut self, cpu: &mut Mos6502, bus: &mut B) -> Hooked {
        let verify = cpu.a();
        if verify > 1 {
            cpu.set_a(error_code::ILLEGAL_QUANTITY);
            cpu.set_carry(true);
            cpu.simulate_rts(bus);
            return Hooked::Handled;
        }

        self.file_verify = verify == 1;
        self.file_addr = u16::from_le_bytes([cpu.x(), cpu.y()]);
        cpu.simulate_rts(bus);
        self.load_trap = Some(cpu.pc());
        cpu.set_carry(false);
        Hooked::Handled
    }

    /// The armed LOAD trap: perform the transfer (or verify) and report
    /// through the KERNAL ABI (C/A on failure, X/Y = end address).
    pub(crate) fn finish_load<B: Bus>(&mut self, cpu: &mut Mos6502, bus: &mut B) {
        let name = file_name_string(&self.file_name);
        let bytes = match read_program(&name) {
            Ok(bytes) => bytes,
            Err(code) => {
                warn!("LOAD {name:?}: file not found");
                cpu.set_a(code);
                cpu.set_carry(true);
                return;
            }
        };

        let image = match prg::parse(&bytes) {
            Ok(image) => image,
            Err(_) => {
                cpu.set_a(error_code::GENERIC);
                cpu.set_carry(true);
                return;
            }
        };

        // Secondary address 0 loads at the caller-supplied BASIC start;
        // anything else honors the file header.
        let dest = if self.file_sec == 0 {
            self.file_addr
        } else {
            image.load_addr
        };
        let end = dest.wrapping_add(image.data.len() as u16);

        if self.file_verify {
            let mismatch = image
                .data
                .iter()
                .enumerate()
                .any(|(i, &byte)| bus.read(dest.wrapping_add(i as u16)) != byte);
            if mismatch {
                cpu.set_a(error_code::VERIFY);
                cpu.set_carry(true);
                return;
            }
        } else {
            for (i, &byte) in image.data.iter().enumerate() {
                bus.write(dest.wrapping_add(i as u16), byte);
            }
            info!(
                "LOAD {name:?}: ${dest:04X}-${end:04X} (file {}, device {})",
                self.file_num, self.file_dev
            );
        }

        cpu.set_x(end as u8);
        cpu.set_y((end >> 8) as u8);
        cpu.set_carry(false);
    }

    /// The SAVE entry hook ($FFD8): write RAM from the pointer at zero-page
    /// A up to X/Y as a PRG file. C reports not-success.
    pub(crate) fn save_hook<B: Bus>(&mut self, cpu: &mut Mos6502, bus: &mut B) -> Hooked {
        let start = self.read_zp_word(bus, cpu.a() as u16);
        let end = u16::from_le_bytes([cpu.x(), cpu.y()]);
        let name = file_name_string(&self.file_name);

        cpu.simulate_rts(bus);

        if name.is_empty() || end < start {
            cpu.set_a(error_code::GENERIC);
            cpu.set_carry(true);
            return Hooked::Handled;
        }

        let data: Vec<u8> = (start..end).map(|addr| bus.read(addr)).collect();
        let path = save_path(&name);
        match prg::write(&path, start, &data) {
            Ok(()) => {
                info!("SAVE {name:?}: ${start:04X}-${end:04X}");
                cpu.set_carry(false);
            }
            Err(e) => {
                warn!("SAVE {name:?}: {e}");
                cpu.set_a(error_code::GENERIC);
                cpu.set_carry(true);
            }
        }
        Hooked::Handled
    }

    /// The READY prompt hook: run the auto-load state machine.
    ///
    /// State 0 streams the configured program into RAM and relinks it;
    /// state 1 fixes the start-of-variables pointer and runs CLR; state 2
    /// types RUN and skips the READY banner.
    pub(crate) fn ready_hook<B: Bus>(
        &mut self,
        cpu: &mut Mos6502,
        bus: &mut B,
        console: &mut dyn Console,
    ) -> Hooked {
        match self.startup_state {
            0 => {
                let Some(path) = self.startup.clone() else {
                    return Hooked::NotHandled;
                };

                let bytes = match std::fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("startup program {}: {e}", path.display());
                        self.startup = None;
                        cpu.set_a(error_code::FILE_NOT_FOUND);
                        cpu.set_carry(true);
                        return Hooked::NotHandled;
                    }
                };
                let image = match prg::parse(&bytes) {
                    Ok(image) => image,
                    Err(e) => {
                        warn!("startup program {}: {e}", path.display());
                        self.startup = None;
                        cpu.set_a(error_code::GENERIC);
                        cpu.set_carry(true);
                        return Hooked::NotHandled;
                    }
                };

                // Relative load lands at the BASIC text start; absolute
                // honors the header.
                let dest = if self.file_sec == 0 {
                    self.read_zp_word(bus, self.spec.txttab)
                } else {
                    image.load_addr
                };

                for (i, &byte) in image.data.iter().enumerate() {
                    bus.write(dest.wrapping_add(i as u16), byte);
                }
                let end = dest.wrapping_add(image.data.len() as u16);

                // End-of-program, start-of-arrays and end-of-arrays all
                // point just past the program until CLR recomputes them.
                self.write_zp_word(bus, self.spec.vartab, end);
                self.write_zp_word(bus, self.spec.vartab.wrapping_add(2), end);
                self.write_zp_word(bus, self.spec.vartab.wrapping_add(4), end);

                info!(
                    "startup: loaded {} at ${dest:04X}-${end:04X}",
                    path.display()
                );

                let ready = self.spec.ready;
                cpu.simulate_jsr(bus, self.spec.linkprg, ready);
                self.startup_state = 1;
                Hooked::Handled
            }
            1 => {
                // LINKPRG left the address of the last line link at the
                // index pointer; the free byte after it starts variables.
                let base = self.read_zp_word(bus, self.spec.link_end);
                self.write_zp_word(bus, self.spec.vartab, base.wrapping_add(2));

                cpu.set_a(0);
                let ready = self.spec.ready;
                cpu.simulate_jsr(bus, self.spec.clr, ready);
                self.startup_state = 2;
                Hooked::Handled
            }
            _ => {
                console.push_input(b"RUN\r");
                cpu.set_pc(self.spec.main);
                self.startup = None;
                self.startup_state = 0;
                Hooked::Handled
            }
        }
    }
}

/// Decode a PETSCII file name for host file-system lookup.
fn file_name_string(name: &[u8]) -> String {
    name.iter()
        .map(|&b| match b {
            // Shifted letters come out lowercase
            0xC1..=0xDA => (b - 0x80) as char,
            0x20..=0x7E => b as char,
            _ => '_',
        })
        .collect()
}

/// Find a program file, trying the name as typed, with a `.prg` suffix,
/// and both again in lowercase.
fn read_program(name: &str) -> Result<Vec<u8>, u8> {
    if name.is_empty() {
        return Err(error_code::GENERIC);
    }

    let lower = name.to_lowercase();
    let candidates = [
        name.to_string(),
        format!("{name}.prg"),
        lower.clone(),
        format!("{lower}.prg"),
    ];

    for candidate in &candidates {
        if let Ok(bytes) = std::fs::read(candidate) {
            return Ok(bytes);
        }
    }
    Err(error_code::FILE_NOT_FOUND)
}

/// SAVE writes into the working directory, appending `.prg` when the name
/// has no extension.
fn save_path(name: &str) -> std::path::PathBuf {
    let lower = name.to_lowercase();
    if lower.ends_with(".prg") {
        std::path::PathBuf::from(lower)
    } else {
        std::path::PathBuf::from(format!("{lower}.prg"))
    }
}
