//! PETSCII translation for the host terminal.
//!
//! Output decoding turns a PETSCII byte into a terminal action; input
//! encoding turns typed host characters into the byte codes the KERNAL
//! expects. Unshifted letters occupy $41-$5A (which the lowercase charset
//! displays as small letters), shifted letters $C1-$DA.

/// What a PETSCII byte means to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A printable host character.
    Char(char),
    /// End of line.
    Newline,
    /// Rub out the previous character.
    Backspace,
    /// Clear the screen and home the cursor.
    Clear,
    /// Cursor home.
    Home,
    /// Cursor motion.
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Reverse video on/off.
    ReverseOn,
    ReverseOff,
    /// Foreground color change (Commodore color index).
    Color(u8),
    /// Charset switch.
    Lowercase(bool),
    /// A code with no terminal representation.
    Ignore,
}

/// Decode one PETSCII output byte under the given charset mode.
pub fn decode(b: u8, lowercase: bool) -> Glyph {
    match b {
        0x0D | 0x8D => Glyph::Newline,
        0x14 => Glyph::Backspace,
        0x93 => Glyph::Clear,
        0x13 => Glyph::Home,
        0x91 => Glyph::CursorUp,
        0x11 => Glyph::CursorDown,
        0x9D => Glyph::CursorLeft,
        0x1D => Glyph::CursorRight,
        0x12 => Glyph::ReverseOn,
        0x92 => Glyph::ReverseOff,
        0x0E => Glyph::Lowercase(true),
        0x8E => Glyph::Lowercase(false),
        // Color control codes
        0x05 => Glyph::Color(1),  // white
        0x1C => Glyph::Color(2),  // red
        0x1E => Glyph::Color(5),  // green
        0x1F => Glyph::Color(6),  // blue
        0x81 => Glyph::Color(8),  // orange
        0x90 => Glyph::Color(0),  // black
        0x95 => Glyph::Color(9),  // brown
        0x96 => Glyph::Color(10), // light red
        0x97 => Glyph::Color(11), // dark gray
        0x98 => Glyph::Color(12), // mid gray
        0x99 => Glyph::Color(13), // light green
        0x9A => Glyph::Color(14), // light blue
        0x9B => Glyph::Color(15), // light gray
        0x9C => Glyph::Color(4),  // purple
        0x9E => Glyph::Color(7),  // yellow
        0x9F => Glyph::Color(3),  // cyan
        // Unshifted letters: small in the lowercase charset
        0x41..=0x5A if lowercase => Glyph::Char((b + 0x20) as char),
        // Shifted letters: capitals in the lowercase charset, approximated
        // by capitals in the graphics charset too
        0xC1..=0xDA => Glyph::Char((b - 0x80) as char),
        // The literal printable range
        0x20..=0x7E => Glyph::Char(b as char),
        _ => Glyph::Ignore,
    }
}

/// Encode one typed host character as PETSCII, or `None` for characters
/// the Commodore keyboard has no code for.
pub fn encode(c: char) -> Option<u8> {
    match c {
        '\n' | '\r' => Some(0x0D),
        'a'..='z' => Some(c as u8 - 0x20),
        'A'..='Z' => Some(c as u8 + 0x80),
        '\x08' | '\x7F' => Some(0x14),
        '\t' => Some(0x20),
        ' '..='~' => Some(c as u8),
        _ => None,
    }
}

/// ANSI SGR foreground code approximating a Commodore color index.
pub fn ansi_fg(color: u8) -> u8 {
    match color & 0x0F {
        0 => 30,  // black
        1 => 97,  // white
        2 => 31,  // red
        3 => 96,  // cyan
        4 => 35,  // purple
        5 => 32,  // green
        6 => 34,  // blue
        7 => 93,  // yellow
        8 => 33,  // orange
        9 => 33,  // brown
        10 => 91, // light red
        11 => 90, // dark gray
        12 => 37, // mid gray
        13 => 92, // light green
        14 => 94, // light blue
        _ => 37,  // light gray
    }
}

/// ANSI SGR background code approximating a Commodore color index.
pub fn ansi_bg(color: u8) -> u8 {
    ansi_fg(color) + 10
}
