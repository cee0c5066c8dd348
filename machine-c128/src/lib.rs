//! Commodore 128 machine model.

mod c128;
mod memory;
mod mmu;

pub use c128::{C128, C128Config};
pub use memory::C128Memory;
pub use mmu::{Layer, Mmu};
