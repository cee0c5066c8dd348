//! Commodore 64 machine model, plus the KERNAL plumbing shared by every
//! machine in the family.
//!
//! The other machine crates (PET, VIC-20, TED, C128) differ from the C64 in
//! their address decoding and in a handful of entry-point addresses; the
//! hook set, the auto-load state machine and the PRG file handling are the
//! same everywhere and live here.

mod autoload;
mod c64;
mod kernal;
mod memory;
pub mod prg;

pub use c64::{C64, C64Config};
pub use kernal::{Hooked, Kernal, KernalSpec};
pub use memory::C64Memory;
