//! The Commodore 64 machine model.

use cpu_6502::Mos6502;
use emu_core::{Console, Exit, Machine};
use std::path::PathBuf;

use crate::kernal::{Kernal, KernalSpec};
use crate::memory::C64Memory;

/// Configuration for constructing a C64 instance.
pub struct C64Config {
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// KERNAL ROM (8,192 bytes).
    pub kernal_rom: Vec<u8>,
    /// Character ROM (4,096 bytes).
    pub char_rom: Vec<u8>,
    /// Program to auto-load and RUN at the READY prompt.
    pub startup: Option<PathBuf>,
}

/// Commodore 64: 64K RAM, BASIC V2, banking via the 6510 port.
pub struct C64 {
    cpu: Mos6502,
    mem: C64Memory,
    kernal: Kernal,
    console: Box<dyn Console>,
}

impl C64 {
    pub fn new(config: C64Config, console: Box<dyn Console>) -> Result<Self, String> {
        let mem = C64Memory::new(&config.basic_rom, &config.kernal_rom, &config.char_rom)?;
        let mut kernal = Kernal::new(KernalSpec::c64());
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
    pub fn mem(&mut self) -> &mut C64Memory {
        &mut self.mem
    }
}

impl Machine for C64 {
    fn run(&mut self) -> Result<Exit, String> {
        self.cpu.reset(&mut self.mem);
        loop {
            if let Some(exit) =
                self.kernal
                    .step(&mut self.cpu, &mut self.mem, self.console.as_mut())?
            {
                return Ok(exit);
            }
            if !self.mem.effects.is_empty() {
                for effect in self.mem.effects.drain(..) {
                    effect.apply(self.console.as_mut());
                }
            }
        }
    }
}
