//! The console port: the narrow interface between the emulated machine and
//! the host terminal.
//!
//! Implementations translate between PETSCII-like byte codes and host
//! characters and manage a pushback buffer for typed-ahead input. The core
//! never touches the operating system directly.

/// Host-side character console.
///
/// `read_char` is the only operation allowed to block; the polling
/// operations return immediately.
pub trait Console {
    /// Render one character. `0x0D`/`0x8D` are newline, `0x93` clears the
    /// screen, `0x9D`/`0x1D`/`0x91`/`0x11`/`0x13` are cursor motion.
    fn write_char(&mut self, b: u8);

    /// Block until a whole line is available, then return it one character
    /// at a time. The final character of each line is `0x0D`.
    fn read_char(&mut self) -> u8;

    /// Non-blocking read. Returns 0 when no key is available.
    fn get_in(&mut self) -> u8;

    /// True exactly once after the user pressed the STOP key; consumes the
    /// event.
    fn check_stop(&mut self) -> bool;

    /// Push bytes into the input buffer ahead of anything the user types.
    fn push_input(&mut self, bytes: &[u8]);

    /// True once host input is exhausted (stdin closed). Lets the machine
    /// exit cleanly instead of reading empty lines forever.
    fn eof(&self) -> bool {
        false
    }

    /// Update the foreground/background colors (Commodore color indices).
    fn set_colors(&mut self, fg: u8, bg: u8) {
        let _ = (fg, bg);
    }

    /// Switch between the uppercase/graphics and lowercase/uppercase
    /// character sets.
    fn set_lowercase(&mut self, enabled: bool) {
        let _ = enabled;
    }
}

/// A shared handle is itself a console, so a harness can keep inspecting a
/// console it has handed to a machine.
impl<C: Console> Console for std::rc::Rc<std::cell::RefCell<C>> {
    fn write_char(&mut self, b: u8) {
        self.borrow_mut().write_char(b);
    }

    fn read_char(&mut self) -> u8 {
        self.borrow_mut().read_char()
    }

    fn get_in(&mut self) -> u8 {
        self.borrow_mut().get_in()
    }

    fn check_stop(&mut self) -> bool {
        self.borrow_mut().check_stop()
    }

    fn push_input(&mut self, bytes: &[u8]) {
        self.borrow_mut().push_input(bytes);
    }

    fn eof(&self) -> bool {
        self.borrow().eof()
    }

    fn set_colors(&mut self, fg: u8, bg: u8) {
        self.borrow_mut().set_colors(fg, bg);
    }

    fn set_lowercase(&mut self, enabled: bool) {
        self.borrow_mut().set_lowercase(enabled);
    }
}

/// A console side effect produced by a memory write.
///
/// Address spaces queue these instead of holding a console reference; the
/// machine loop drains the queue after each instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEffect {
    /// Foreground/background color change (Commodore color indices).
    Colors { fg: u8, bg: u8 },
    /// Character set switch.
    Lowercase(bool),
}

impl ConsoleEffect {
    pub fn apply(self, console: &mut dyn Console) {
        match self {
            ConsoleEffect::Colors { fg, bg } => console.set_colors(fg, bg),
            ConsoleEffect::Lowercase(enabled) => console.set_lowercase(enabled),
        }
    }
}

/// An in-memory console for tests and headless runs.
///
/// Input is scripted up front (or via `push_input`); output accumulates in a
/// byte buffer the test can inspect.
#[derive(Default)]
pub struct BufferConsole {
    input: std::collections::VecDeque<u8>,
    output: Vec<u8>,
    stop_pending: bool,
    colors: Option<(u8, u8)>,
    lowercase: bool,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console whose input queue starts with `bytes`.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut console = Self::default();
        console.push_input(bytes);
        console
    }

    /// Everything written so far, untranslated.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Arm a single STOP event.
    pub fn press_stop(&mut self) {
        self.stop_pending = true;
    }

    /// The most recent color change, if any.
    pub fn colors(&self) -> Option<(u8, u8)> {
        self.colors
    }

    /// Current character-set mode.
    pub fn lowercase(&self) -> bool {
        self.lowercase
    }
}

impl Console for BufferConsole {
    fn write_char(&mut self, b: u8) {
        self.output.push(b);
    }

    fn read_char(&mut self) -> u8 {
        // Scripted input never blocks; an exhausted queue reads as an empty
        // line so a runaway test terminates instead of deadlocking.
        self.input.pop_front().unwrap_or(0x0D)
    }

    fn get_in(&mut self) -> u8 {
        self.input.pop_front().unwrap_or(0)
    }

    fn check_stop(&mut self) -> bool {
        std::mem::take(&mut self.stop_pending)
    }

    fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    fn eof(&self) -> bool {
        self.input.is_empty()
    }

    fn set_colors(&mut self, fg: u8, bg: u8) {
        self.colors = Some((fg, bg));
    }

    fn set_lowercase(&mut self, enabled: bool) {
        self.lowercase = enabled;
    }
}
