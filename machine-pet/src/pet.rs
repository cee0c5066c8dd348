//! The PET 2001 machine model.

use cpu_6502::Mos6502;
use emu_core::{Console, Exit, Machine};
use machine_c64::{Kernal, KernalSpec};
use std::path::PathBuf;

use crate::memory::PetMemory;

/// Configuration for constructing a PET instance.
pub struct PetConfig {
    /// RAM size in KiB (4, 8, 16 or 32).
    pub ram_kb: u32,
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// Screen editor ROM (2,048 bytes).
    pub editor_rom: Vec<u8>,
    /// KERNAL ROM (4,096 bytes).
    pub kernal_rom: Vec<u8>,
    /// Program to auto-load and RUN at the READY prompt.
    pub startup: Option<PathBuf>,
}

/// PET 2001: fixed memory map, monochrome text.
pub struct Pet {
    cpu: Mos6502,
    mem: PetMemory,
    kernal: Kernal,
    console: Box<dyn Console>,
}

impl Pet {
    pub fn new(config: PetConfig, console: Box<dyn Console>) -> Result<Self, String> {
        let mem = PetMemory::new(
            config.ram_kb,
            &config.basic_rom,
            &config.editor_rom,
            &config.kernal_rom,
        )?;
        let mut kernal = Kernal::new(KernalSpec::pet());
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

impl Machine for Pet {
    fn run(&mut self) -> Result<Exit, String> {
        self.cpu.reset(&mut self.mem);
        loop {
            if let Some(exit) =
                self.kernal
                    .step(&mut self.cpu, &mut self.mem, self.console.as_mut())?
            {
                return Ok(exit);
            }
        }
    }
}
