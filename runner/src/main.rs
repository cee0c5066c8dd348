//! The `cbm` launcher.
//!
//! Parses the thin CLI surface, loads the ROM set for the requested
//! machine, and runs machine models in a loop: a GO statement (or the C128
//! mode register) tears the current machine down and instantiates the next
//! one; GO to the machine already running quits.

use std::path::{Path, PathBuf};
use std::process;

use emu_core::{Console, Exit, Machine};
use log::info;
use machine_c128::{C128, C128Config};
use machine_c64::{C64, C64Config};
use machine_pet::{Pet, PetConfig};
use machine_ted::{Ted, TedConfig};
use machine_vic20::{Vic20, Vic20Config};

mod console;
mod petscii;

use console::TermConsole;

/// The machine families the launcher can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum System {
    Pet,
    Vic20,
    C64,
    Ted,
    C128,
}

impl System {
    fn name(self) -> &'static str {
        match self {
            System::Pet => "pet",
            System::Vic20 => "vic20",
            System::C64 => "c64",
            System::Ted => "plus4",
            System::C128 => "c128",
        }
    }

    /// ROM directory under roms/.
    fn rom_dir(self) -> &'static str {
        match self {
            System::Pet => "pet",
            System::Vic20 => "vic20",
            System::C64 => "c64",
            System::Ted => "ted",
            System::C128 => "c128",
        }
    }

    fn default_ram(self) -> u32 {
        match self {
            System::Pet => 32,
            System::Vic20 => 5,
            System::C64 => 64,
            System::Ted => 64,
            System::C128 => 128,
        }
    }

    /// The machine a GO argument names.
    fn for_go(number: u16) -> Option<System> {
        match number {
            2001 => Some(System::Pet),
            20 => Some(System::Vic20),
            64 => Some(System::C64),
            16 | 4 => Some(System::Ted),
            128 => Some(System::C128),
            _ => None,
        }
    }
}

struct CliArgs {
    system: System,
    ram_kb: u32,
    program: Option<PathBuf>,
}

fn usage() -> ! {
    eprintln!("Usage: cbm [SYSTEM] [ram N] [program[.prg]]");
    eprintln!();
    eprintln!("Systems: c64 (default), vic20, pet, c16, plus4, ted, c128");
    eprintln!();
    eprintln!("  ram N        RAM size in KiB, from the machine's valid set");
    eprintln!("  program      PRG file to auto-load and RUN at the READY prompt");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut system = System::C64;
    let mut ram_kb = None;
    let mut program = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "c64" => system = System::C64,
            "vic20" => system = System::Vic20,
            "pet" => system = System::Pet,
            "c16" => {
                system = System::Ted;
                ram_kb.get_or_insert(16);
            }
            "plus4" | "ted" => system = System::Ted,
            "c128" => system = System::C128,
            "ram" => {
                i += 1;
                let Some(value) = args.get(i).and_then(|s| s.parse().ok()) else {
                    eprintln!("ram needs a size in KiB");
                    usage();
                };
                ram_kb = Some(value);
            }
            "walk" => {
                eprintln!("the static reachability walker is not built into this binary");
                process::exit(1);
            }
            "--help" | "-h" => usage(),
            other => {
                if program.is_some() {
                    eprintln!("unexpected argument: {other}");
                    usage();
                }
                program = Some(resolve_program(other));
            }
        }
        i += 1;
    }

    CliArgs {
        system,
        ram_kb: ram_kb.unwrap_or(system.default_ram()),
        program,
    }
}

/// A trailing program name may omit the .prg suffix.
fn resolve_program(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.exists() {
        return direct;
    }
    let with_ext = PathBuf::from(format!("{name}.prg"));
    if with_ext.exists() {
        return with_ext;
    }
    direct
}

/// Load a ROM image, or exit with an error message.
fn load_rom(dir: &Path, name: &str) -> Vec<u8> {
    let rom = dir.join(format!("{name}.rom"));
    let bin = dir.join(format!("{name}.bin"));
    match std::fs::read(&rom).or_else(|_| std::fs::read(&bin)) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("cannot read {name} ROM at {}: {e}", rom.display());
            eprintln!("place the machine's ROM images in {}", dir.display());
            process::exit(1);
        }
    }
}

/// Find the roms/ directory relative to the executable or the working
/// directory.
fn find_roms_dir(system: System) -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let mut dir = exe.parent().map(Path::to_path_buf);
        for _ in 0..5 {
            if let Some(ref d) = dir {
                let roms = d.join("roms");
                if roms.is_dir() {
                    return roms.join(system.rom_dir());
                }
                dir = d.parent().map(Path::to_path_buf);
            }
        }
    }
    PathBuf::from("roms").join(system.rom_dir())
}

fn build_machine(
    system: System,
    ram_kb: u32,
    startup: Option<PathBuf>,
    console: Box<dyn Console>,
) -> Result<Box<dyn Machine>, String> {
    let dir = find_roms_dir(system);

    Ok(match system {
        System::Pet => Box::new(Pet::new(
            PetConfig {
                ram_kb,
                basic_rom: load_rom(&dir, "basic"),
                editor_rom: load_rom(&dir, "editor"),
                kernal_rom: load_rom(&dir, "kernal"),
                startup,
            },
            console,
        )?),
        System::Vic20 => Box::new(Vic20::new(
            Vic20Config {
                ram_kb,
                basic_rom: load_rom(&dir, "basic"),
                kernal_rom: load_rom(&dir, "kernal"),
                char_rom: load_rom(&dir, "chargen"),
                startup,
            },
            console,
        )?),
        System::C64 => {
            if ram_kb != 64 {
                return Err(format!("C64 RAM size {ram_kb}K not supported (valid: 64)"));
            }
            Box::new(C64::new(
                C64Config {
                    basic_rom: load_rom(&dir, "basic"),
                    kernal_rom: load_rom(&dir, "kernal"),
                    char_rom: load_rom(&dir, "chargen"),
                    startup,
                },
                console,
            )?)
        }
        System::Ted => Box::new(Ted::new(
            TedConfig {
                ram_kb,
                basic_rom: load_rom(&dir, "basic"),
                kernal_rom: load_rom(&dir, "kernal"),
                startup,
            },
            console,
        )?),
        System::C128 => {
            if ram_kb != 128 {
                return Err(format!(
                    "C128 RAM size {ram_kb}K not supported (valid: 128)"
                ));
            }
            Box::new(C128::new(
                C128Config {
                    basic_lo_rom: load_rom(&dir, "basiclo"),
                    basic_hi_rom: load_rom(&dir, "basichi"),
                    kernal_rom: load_rom(&dir, "kernal"),
                    char_rom: load_rom(&dir, "chargen"),
                    startup,
                },
                console,
            )?)
        }
    })
}

fn main() {
    env_logger::init();

    let cli = parse_args();
    let console = TermConsole::new();

    let mut system = cli.system;
    let mut ram_kb = cli.ram_kb;
    let mut startup = cli.program;

    loop {
        let mut machine =
            match build_machine(system, ram_kb, startup.take(), Box::new(console.clone())) {
                Ok(machine) => machine,
                Err(e) => {
                    eprintln!("{e}");
                    process::exit(1);
                }
            };

        match machine.run() {
            Ok(Exit::Bye) => break,
            Ok(Exit::Switch(number)) => {
                let Some(next) = System::for_go(number) else {
                    break;
                };
                // GO to the machine already running is the way out
                if next == system {
                    break;
                }
                info!("GO {number}: restarting as {}", next.name());
                system = next;
                ram_kb = next.default_ram();
            }
            Err(e) => {
                eprintln!("fatal: {e}");
                process::exit(1);
            }
        }
    }
}
