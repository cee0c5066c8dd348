//! PRG file handling.
//!
//! A PRG file is the simplest Commodore binary format: a 2-byte
//! little-endian load address followed by the data bytes.

use std::io::Write;
use std::path::Path;

/// A parsed PRG image borrowing the raw file bytes.
pub struct Prg<'a> {
    /// Load address from the 2-byte header.
    pub load_addr: u16,
    /// Payload after the header.
    pub data: &'a [u8],
}

/// Split a PRG file into load address and payload.
///
/// # Errors
///
/// Returns an error if the data is too short to contain a valid PRG header.
pub fn parse(bytes: &[u8]) -> Result<Prg<'_>, String> {
    if bytes.len() < 3 {
        return Err("PRG file too short (need at least 3 bytes)".to_string());
    }

    Ok(Prg {
        load_addr: u16::from_le_bytes([bytes[0], bytes[1]]),
        data: &bytes[2..],
    })
}

/// Write a PRG file: 2-byte little-endian start address, then the payload.
pub fn write(path: &Path, start: u16, data: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(&start.to_le_bytes())?;
    file.write_all(data)?;
    Ok(())
}
