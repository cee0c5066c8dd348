//! KERNAL hook semantics, driven against a flat test bus and a scripted
//! console - no ROM images required.

use cpu_6502::Mos6502;
use emu_core::{BufferConsole, Bus, Console, Exit, SimpleBus};
use machine_c64::{Hooked, Kernal, KernalSpec};

/// A CPU "inside a JSR": the stack holds a return address so a hook can
/// simulate RTS back to `return_to`.
fn cpu_in_call(bus: &mut SimpleBus, pc: u16, return_to: u16) -> Mos6502 {
    let mut cpu = Mos6502::new();
    cpu.set_sp(0xFD);
    bus.write(0x01FE, (return_to.wrapping_sub(1) & 0xFF) as u8);
    bus.write(0x01FF, (return_to.wrapping_sub(1) >> 8) as u8);
    cpu.set_pc(pc);
    cpu
}

#[test]
fn chrout_emits_and_falls_through() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    let mut cpu = Mos6502::new();
    cpu.set_pc(0xFFD2);
    cpu.set_a(0x48);

    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::NotHandled
    );
    assert_eq!(console.output(), &[0x48]);
    // PC untouched: the ROM's own code still runs
    assert_eq!(cpu.pc(), 0xFFD2);
}

#[test]
fn chrin_returns_one_character_and_unwinds() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::with_input(b"HI\r");
    let mut kernal = Kernal::new(KernalSpec::c64());
    let mut cpu = cpu_in_call(&mut bus, 0xFFCF, 0xE176);

    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.a(), b'H');
    assert!(!cpu.carry());
    assert_eq!(cpu.pc(), 0xE176);
}

#[test]
fn getin_copies_into_x_when_nonzero() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::with_input(&[0x41]);
    let mut kernal = Kernal::new(KernalSpec::c64());

    let mut cpu = cpu_in_call(&mut bus, 0xFFE4, 0xE200);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.a(), 0x41);
    assert_eq!(cpu.x(), 0x41);
    assert!(!cpu.carry());

    // Empty queue: A = 0, X untouched
    let mut cpu = cpu_in_call(&mut bus, 0xFFE4, 0xE200);
    cpu.set_x(0x99);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.a(), 0);
    assert_eq!(cpu.x(), 0x99);
}

#[test]
fn stop_reports_through_z() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    let mut cpu = cpu_in_call(&mut bus, 0xFFE1, 0xE300);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert!(!cpu.zero());

    console.press_stop();
    let mut cpu = cpu_in_call(&mut bus, 0xFFE1, 0xE300);
    kernal.hook(&mut cpu, &mut bus, &mut console);
    assert!(cpu.zero());
}

/// Run the SETNAM hook with `name` placed at $0340.
fn set_name(kernal: &mut Kernal, bus: &mut SimpleBus, console: &mut BufferConsole, name: &[u8]) {
    bus.load(0x0340, name);
    let mut cpu = Mos6502::new();
    cpu.set_a(name.len() as u8);
    cpu.set_x(0x40);
    cpu.set_y(0x03);
    cpu.set_pc(0xFFBD);
    assert_eq!(kernal.hook(&mut cpu, bus, console), Hooked::NotHandled);
}

/// Run the SETLFS hook.
fn set_lfs(kernal: &mut Kernal, bus: &mut SimpleBus, console: &mut BufferConsole, secondary: u8) {
    let mut cpu = Mos6502::new();
    cpu.set_a(1);
    cpu.set_x(8);
    cpu.set_y(secondary);
    cpu.set_pc(0xFFBA);
    assert_eq!(kernal.hook(&mut cpu, bus, console), Hooked::NotHandled);
}

/// Run the LOAD entry hook followed by the armed trap. Returns the CPU
/// state after the transfer.
fn run_load(
    kernal: &mut Kernal,
    bus: &mut SimpleBus,
    console: &mut BufferConsole,
    verify: u8,
) -> Mos6502 {
    let mut cpu = cpu_in_call(bus, 0xFFD5, 0xE176);
    cpu.set_a(verify);
    assert_eq!(kernal.hook(&mut cpu, bus, console), Hooked::Handled);
    assert_eq!(cpu.pc(), 0xE176);
    // The trap fires on the next hook pass
    assert_eq!(kernal.hook(&mut cpu, bus, console), Hooked::NotHandled);
    cpu
}

#[test]
fn load_streams_file_into_ram() {
    let path = std::env::temp_dir().join("cbm_load_test.prg");
    std::fs::write(&path, [0x00, 0x12, 0xAA, 0xBB, 0xCC]).unwrap();

    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    set_name(
        &mut kernal,
        &mut bus,
        &mut console,
        path.to_str().unwrap().as_bytes(),
    );
    set_lfs(&mut kernal, &mut bus, &mut console, 1);
    let cpu = run_load(&mut kernal, &mut bus, &mut console, 0);

    assert!(!cpu.carry());
    assert_eq!(bus.peek(0x1200), 0xAA);
    assert_eq!(bus.peek(0x1202), 0xCC);
    // X/Y report the end address
    assert_eq!(u16::from_le_bytes([cpu.x(), cpu.y()]), 0x1203);

    std::fs::remove_file(&path).ok();
}

#[test]
fn load_missing_file_reports_error_four() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    set_name(&mut kernal, &mut bus, &mut console, b"/nonexistent/nowhere");
    set_lfs(&mut kernal, &mut bus, &mut console, 1);
    let cpu = run_load(&mut kernal, &mut bus, &mut console, 0);

    assert!(cpu.carry());
    assert_eq!(cpu.a(), 4);
}

#[test]
fn verify_matches_and_mismatches() {
    let path = std::env::temp_dir().join("cbm_verify_test.prg");
    std::fs::write(&path, [0x00, 0x12, 0xAA, 0xBB, 0xCC]).unwrap();

    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    // Identical image in RAM: verify passes
    bus.load(0x1200, &[0xAA, 0xBB, 0xCC]);
    set_name(
        &mut kernal,
        &mut bus,
        &mut console,
        path.to_str().unwrap().as_bytes(),
    );
    set_lfs(&mut kernal, &mut bus, &mut console, 1);
    let cpu = run_load(&mut kernal, &mut bus, &mut console, 1);
    assert!(!cpu.carry());

    // Flip one byte: VERIFY error 28
    bus.write(0x1201, 0x00);
    let cpu = run_load(&mut kernal, &mut bus, &mut console, 1);
    assert!(cpu.carry());
    assert_eq!(cpu.a(), 28);

    std::fs::remove_file(&path).ok();
}

#[test]
fn load_rejects_bad_verify_flag() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    let mut cpu = cpu_in_call(&mut bus, 0xFFD5, 0xE176);
    cpu.set_a(2);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert!(cpu.carry());
    assert_eq!(cpu.a(), 14);
    assert_eq!(cpu.pc(), 0xE176);
}

#[test]
fn save_writes_a_prg() {
    let path = std::env::temp_dir().join("cbm_save_test.prg");
    std::fs::remove_file(&path).ok();

    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    set_name(
        &mut kernal,
        &mut bus,
        &mut console,
        path.to_str().unwrap().as_bytes(),
    );
    bus.load(0x1000, &[0x01, 0x02, 0x03]);
    bus.write(0x0060, 0x00);
    bus.write(0x0061, 0x10);

    let mut cpu = cpu_in_call(&mut bus, 0xFFD8, 0xE200);
    cpu.set_a(0x60);
    cpu.set_x(0x03);
    cpu.set_y(0x10);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert!(!cpu.carry());
    assert_eq!(cpu.pc(), 0xE200);

    let saved = std::fs::read(&path).unwrap();
    assert_eq!(saved, vec![0x00, 0x10, 0x01, 0x02, 0x03]);

    std::fs::remove_file(&path).ok();
}

#[test]
fn go_sniffer_switches_machines() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    // TXTPTR -> " 128" in program text
    bus.write(0x7A, 0x40);
    bus.write(0x7B, 0x03);
    bus.load(0x0340, b" 128\x00");

    let mut cpu = Mos6502::new();
    cpu.set_pc(0xA8F8);
    let exit = kernal
        .step(&mut cpu, &mut bus, &mut console)
        .expect("step should not fault");
    assert_eq!(exit, Some(Exit::Switch(128)));
}

#[test]
fn go_ignores_unknown_numbers() {
    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());

    bus.write(0x7A, 0x40);
    bus.write(0x7B, 0x03);
    bus.load(0x0340, b"99\x00");

    let mut cpu = Mos6502::new();
    cpu.set_pc(0xA8F8);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::NotHandled
    );
}

#[test]
fn autoload_walks_the_three_states() {
    let path = std::env::temp_dir().join("cbm_autoload_test.prg");
    // Relative PRG: header says $0801
    std::fs::write(&path, [0x01, 0x08, 0x10, 0x20, 0x30]).unwrap();

    let mut bus = SimpleBus::new();
    let mut console = BufferConsole::new();
    let mut kernal = Kernal::new(KernalSpec::c64());
    kernal.set_startup(path.clone());

    // BASIC text starts at $0801
    bus.write(0x2B, 0x01);
    bus.write(0x2C, 0x08);

    // State 0: load, fix pointers, call the relinker
    let mut cpu = Mos6502::new();
    cpu.set_pc(0xA474);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.pc(), 0xA533);
    assert_eq!(bus.peek(0x0801), 0x10);
    assert_eq!(bus.peek(0x0803), 0x30);
    assert_eq!(
        u16::from_le_bytes([bus.peek(0x2D), bus.peek(0x2E)]),
        0x0804
    );

    // The relinker returns to READY; it left the last line link at $22/$23
    cpu.simulate_rts(&mut bus);
    assert_eq!(cpu.pc(), 0xA474);
    bus.write(0x22, 0x45);
    bus.write(0x23, 0x08);

    // State 1: start-of-variables = link + 2, then CLR
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.pc(), 0xA65E);
    assert_eq!(cpu.a(), 0);
    assert_eq!(
        u16::from_le_bytes([bus.peek(0x2D), bus.peek(0x2E)]),
        0x0847
    );

    // State 2: type RUN and skip the READY banner
    cpu.simulate_rts(&mut bus);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::Handled
    );
    assert_eq!(cpu.pc(), 0xA480);
    assert_eq!(console.read_char(), b'R');
    assert_eq!(console.read_char(), b'U');
    assert_eq!(console.read_char(), b'N');
    assert_eq!(console.read_char(), 0x0D);

    // Back to idle: a later READY does nothing
    let mut cpu = Mos6502::new();
    cpu.set_pc(0xA474);
    assert_eq!(
        kernal.hook(&mut cpu, &mut bus, &mut console),
        Hooked::NotHandled
    );

    std::fs::remove_file(&path).ok();
}
