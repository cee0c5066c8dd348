//! Commodore C16 / Plus-4 (TED) machine model.

mod memory;
mod ted;

pub use memory::TedMemory;
pub use ted::{Ted, TedConfig};
