//! The VIC-20 machine model.

use cpu_6502::Mos6502;
use emu_core::{Console, Exit, Machine};
use machine_c64::{Kernal, KernalSpec};
use std::path::PathBuf;

use crate::memory::Vic20Memory;

/// Configuration for constructing a VIC-20 instance.
pub struct Vic20Config {
    /// RAM size in KiB (5, 8, 13, 21, 29, 32 or 40).
    pub ram_kb: u32,
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// KERNAL ROM (8,192 bytes).
    pub kernal_rom: Vec<u8>,
    /// Character ROM (4,096 bytes).
    pub char_rom: Vec<u8>,
    /// Program to auto-load and RUN at the READY prompt.
    pub startup: Option<PathBuf>,
}

/// VIC-20: banked expansion RAM, BASIC V2 at $C000.
pub struct Vic20 {
    cpu: Mos6502,
    mem: Vic20Memory,
    kernal: Kernal,
    console: Box<dyn Console>,
}

impl Vic20 {
    pub fn new(config: Vic20Config, console: Box<dyn Console>) -> Result<Self, String> {
        let mem = Vic20Memory::new(
            config.ram_kb,
            &config.basic_rom,
            &config.kernal_rom,
            &config.char_rom,
        )?;
        let mut kernal = Kernal::new(KernalSpec::vic20());
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
}

impl Machine for Vic20 {
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
