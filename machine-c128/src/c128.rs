//! The Commodore 128 machine model.

use cpu_6502::Mos6502;
use emu_core::{Console, Exit, Machine};
use machine_c64::{Kernal, KernalSpec};
use std::path::PathBuf;

use crate::memory::C128Memory;

/// Configuration for constructing a C128 instance.
pub struct C128Config {
    /// BASIC-LO ROM (16,384 bytes, $4000-$7FFF).
    pub basic_lo_rom: Vec<u8>,
    /// BASIC-HI ROM (16,384 bytes, $8000-$BFFF).
    pub basic_hi_rom: Vec<u8>,
    /// KERNAL/editor ROM (16,384 bytes, $C000-$FFFF).
    pub kernal_rom: Vec<u8>,
    /// Character ROM (4,096 or 8,192 bytes).
    pub char_rom: Vec<u8>,
    /// Program to auto-load and RUN at the READY prompt.
    pub startup: Option<PathBuf>,
}

/// Commodore 128: 128K in two banks, MMU banking, BASIC 7.0.
pub struct C128 {
    cpu: Mos6502,
    mem: C128Memory,
    kernal: Kernal,
    console: Box<dyn Console>,
}

impl C128 {
    pub fn new(config: C128Config, console: Box<dyn Console>) -> Result<Self, String> {
        let mem = C128Memory::new(
            &config.basic_lo_rom,
            &config.basic_hi_rom,
            &config.kernal_rom,
            &config.char_rom,
        )?;
        let mut kernal = Kernal::new(KernalSpec::c128());
        if let Some(path) = config.startup {
            kernal.set_startup(path);
        }

        Ok(Self {
            cpu: Mos6502::new(),
            mem,
            kernal,
            console,
        })
    }

    /// The memory subsystem (for tests and diagnostics).
    pub fn mem(&mut self) -> &mut C128Memory {
        &mut self.mem
    }
}

impl Machine for C128 {
    fn run(&mut self) -> Result<Exit, String> {
        self.cpu.reset(&mut self.mem);
        loop {
            if let Some(exit) =
                self.kernal
                    .step(&mut self.cpu, &mut self.mem, self.console.as_mut())?
            {
                return Ok(exit);
            }
            // The 8502-to-C64 switch is a memory-side sentinel: hand it to
            // the launcher as a machine switch.
            if self.mem.take_c64_request() {
                return Ok(Exit::Switch(64));
            }
            if !self.mem.effects.is_empty() {
                for effect in self.mem.effects.drain(..) {
                    effect.apply(self.console.as_mut());
                }
            }
        }
    }
}
