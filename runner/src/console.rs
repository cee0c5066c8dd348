//! The terminal console: the host side of the console port.
//!
//! A background thread reads whole lines from stdin, translates them to
//! PETSCII and appends them to a mutex-guarded input queue; the CPU side
//! pops from the queue through the `Console` trait. The mutex is the only
//! synchronization the design needs - nothing else happens concurrently.
//!
//! An ESC byte anywhere in the typed input raises the STOP event instead
//! of being queued.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, Condvar, Mutex};

use emu_core::Console;

use crate::petscii::{self, Glyph};

struct InputState {
    queue: VecDeque<u8>,
    stop_pending: bool,
    eof: bool,
}

struct Input {
    state: Mutex<InputState>,
    avail: Condvar,
}

/// Console implementation over stdin/stdout with ANSI escapes.
///
/// Clones share the input queue and reader thread, so the launcher can
/// hand a fresh handle to each machine it instantiates.
pub struct TermConsole {
    input: Arc<Input>,
    lowercase: bool,
}

impl TermConsole {
    /// Create the console and spawn the stdin reader thread.
    pub fn new() -> Self {
        let input = Arc::new(Input {
            state: Mutex::new(InputState {
                queue: VecDeque::new(),
                stop_pending: false,
                eof: false,
            }),
            avail: Condvar::new(),
        });

        let reader_input = Arc::clone(&input);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                let n = match stdin.lock().read_line(&mut line) {
                    Ok(n) => n,
                    Err(_) => 0,
                };

                let mut state = reader_input.state.lock().unwrap();
                if n == 0 {
                    state.eof = true;
                    reader_input.avail.notify_all();
                    return;
                }

                for c in line.chars() {
                    if c == '\x1b' {
                        state.stop_pending = true;
                        continue;
                    }
                    if let Some(b) = petscii::encode(c) {
                        state.queue.push_back(b);
                    }
                }
                reader_input.avail.notify_all();
            }
        });

        Self {
            input,
            lowercase: false,
        }
    }

    fn emit(s: &str) {
        let mut out = std::io::stdout();
        let _ = out.write_all(s.as_bytes());
        let _ = out.flush();
    }
}

impl Default for TermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TermConsole {
    fn clone(&self) -> Self {
        Self {
            input: Arc::clone(&self.input),
            lowercase: self.lowercase,
        }
    }
}

impl Console for TermConsole {
    fn write_char(&mut self, b: u8) {
        match petscii::decode(b, self.lowercase) {
            Glyph::Char(c) => Self::emit(&c.to_string()),
            Glyph::Newline => Self::emit("\n"),
            Glyph::Backspace => Self::emit("\x08 \x08"),
            Glyph::Clear => Self::emit("\x1b[2J\x1b[H"),
            Glyph::Home => Self::emit("\x1b[H"),
            Glyph::CursorUp => Self::emit("\x1b[A"),
            Glyph::CursorDown => Self::emit("\x1b[B"),
            Glyph::CursorLeft => Self::emit("\x1b[D"),
            Glyph::CursorRight => Self::emit("\x1b[C"),
            Glyph::ReverseOn => Self::emit("\x1b[7m"),
            Glyph::ReverseOff => Self::emit("\x1b[27m"),
            Glyph::Color(c) => Self::emit(&format!("\x1b[{}m", petscii::ansi_fg(c))),
            Glyph::Lowercase(enabled) => self.lowercase = enabled,
            Glyph::Ignore => {}
        }
    }

    fn read_char(&mut self) -> u8 {
        let mut state = self.input.state.lock().unwrap();
        loop {
            if let Some(b) = state.queue.pop_front() {
                return b;
            }
            if state.eof {
                return 0x0D;
            }
            state = self.input.avail.wait(state).unwrap();
        }
    }

    fn get_in(&mut self) -> u8 {
        let mut state = self.input.state.lock().unwrap();
        state.queue.pop_front().unwrap_or(0)
    }

    fn check_stop(&mut self) -> bool {
        let mut state = self.input.state.lock().unwrap();
        std::mem::take(&mut state.stop_pending)
    }

    fn push_input(&mut self, bytes: &[u8]) {
        let mut state = self.input.state.lock().unwrap();
        state.queue.extend(bytes.iter().copied());
        self.input.avail.notify_all();
    }

    fn eof(&self) -> bool {
        let state = self.input.state.lock().unwrap();
        state.eof && state.queue.is_empty()
    }

    fn set_colors(&mut self, fg: u8, bg: u8) {
        Self::emit(&format!(
            "\x1b[{};{}m",
            petscii::ansi_fg(fg),
            petscii::ansi_bg(bg)
        ));
    }

    fn set_lowercase(&mut self, enabled: bool) {
        self.lowercase = enabled;
    }
}
