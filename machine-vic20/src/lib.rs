//! Commodore VIC-20 machine model.

mod memory;
mod vic20;

pub use memory::Vic20Memory;
pub use vic20::{Vic20, Vic20Config};
