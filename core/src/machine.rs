/// Why a machine's inner loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Normal termination.
    Bye,
    /// A GO statement (or the C128 mode register) asked for another machine.
    /// The payload is the GO argument: 2001, 20, 64, 16, 4 or 128.
    Switch(u16),
}

/// Trait for emulated machines.
///
/// A machine owns its CPU, address space, hook set and console, and runs
/// single-threaded from RESET until something sets the exit flag.
pub trait Machine {
    /// Reset the CPU and execute until an exit signal.
    ///
    /// Errors are non-recoverable faults (an undefined opcode, a host I/O
    /// failure the Commodore error codes cannot express).
    fn run(&mut self) -> Result<Exit, String>;
}
