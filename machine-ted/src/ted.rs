//! The C16/Plus-4 machine model.

use cpu_6502::Mos6502;
use emu_core::{Console, Exit, Machine};
use machine_c64::{Kernal, KernalSpec};
use std::path::PathBuf;

use crate::memory::TedMemory;

/// Configuration for constructing a C16/Plus-4 instance.
pub struct TedConfig {
    /// RAM size in KiB (16, 32 or 64).
    pub ram_kb: u32,
    /// BASIC ROM (16,384 bytes).
    pub basic_rom: Vec<u8>,
    /// KERNAL ROM (16,384 bytes).
    pub kernal_rom: Vec<u8>,
    /// Program to auto-load and RUN at the READY prompt.
    pub startup: Option<PathBuf>,
}

/// C16/Plus-4: TED ROM banking, BASIC 3.5.
pub struct Ted {
    cpu: Mos6502,
    mem: TedMemory,
    kernal: Kernal,
    console: Box<dyn Console>,
}

impl Ted {
    pub fn new(config: TedConfig, console: Box<dyn Console>) -> Result<Self, String> {
        let mem = TedMemory::new(config.ram_kb, &config.basic_rom, &config.kernal_rom)?;
        let mut kernal = Kernal::new(KernalSpec::ted());
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

impl Machine for Ted {
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
