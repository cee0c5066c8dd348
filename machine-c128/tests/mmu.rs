//! C128 MMU properties driven through the bus, plus a synthetic-ROM run
//! that exercises the C64-mode switch end to end.

use emu_core::{BufferConsole, Bus, Exit, Machine};
use machine_c128::{C128, C128Config, C128Memory};

fn make_memory() -> C128Memory {
    C128Memory::new(
        &vec![0x44; 16384],
        &vec![0x88; 16384],
        &vec![0xCC; 16384],
        &vec![0xEE; 4096],
    )
    .unwrap()
}

#[test]
fn cr_bit6_swaps_banks() {
    let mut mem = make_memory();
    mem.poke_bank(0, 0x8000, 0x11);
    mem.poke_bank(1, 0x8000, 0x22);

    mem.write(0xFF00, 0x3F); // all RAM, bank 0
    assert_eq!(mem.read(0x8000), 0x11);

    mem.write(0xFF00, 0x7F); // all RAM, bank 1
    assert_eq!(mem.read(0x8000), 0x22);

    mem.write(0xFF00, 0x3F);
    assert_eq!(mem.read(0x8000), 0x11);
}

#[test]
fn stack_page_relocation_moves_stack_writes() {
    let mut mem = make_memory();

    // Stack lives at $0100 by default
    mem.write(0x01FD, 0xAA);
    assert_eq!(mem.peek(0x01FD), 0xAA);

    // Point page 1 at $2000: stack operations land there
    mem.write(0xD509, 0x20);
    mem.write(0x01FD, 0xBB);
    assert_eq!(mem.peek(0x20FD), 0xBB);
    assert_eq!(mem.read(0x01FD), 0xBB);
    // The architectural page was left alone
    assert_eq!(mem.peek(0x01FD), 0xAA);
}

#[test]
fn zero_page_relocation() {
    let mut mem = make_memory();
    mem.write(0xD507, 0x30); // page 0 -> $3000
    mem.write(0x0050, 0x42);
    assert_eq!(mem.peek(0x3050), 0x42);
    assert_eq!(mem.read(0x0050), 0x42);
}

#[test]
fn common_ram_reads_bank_zero() {
    let mut mem = make_memory();
    mem.poke_bank(0, 0x0800, 0x10);
    mem.poke_bank(1, 0x0800, 0x20);
    mem.poke_bank(0, 0x8000, 0x30);
    mem.poke_bank(1, 0x8000, 0x40);

    mem.write(0xD506, 0x05); // bottom 4K common
    mem.write(0xFF00, 0x7F); // bank 1, all RAM

    assert_eq!(mem.read(0x0800), 0x10); // common: bank 0 answers
    assert_eq!(mem.read(0x8000), 0x40); // beyond common: bank 1
}

#[test]
fn mode_register_switch_exits_the_run_loop() {
    // A KERNAL image whose reset code asks the MMU for C64 mode.
    let mut kernal = vec![0x00; 16384];
    let code = [
        0xA9, 0x40, // LDA #$40
        0x8D, 0x05, 0xD5, // STA $D505
        0x4C, 0x05, 0xC0, // JMP self
    ];
    kernal[..code.len()].copy_from_slice(&code);
    // RESET vector -> $C000
    kernal[0x3FFC] = 0x00;
    kernal[0x3FFD] = 0xC0;

    let mut machine = C128::new(
        C128Config {
            basic_lo_rom: vec![0x00; 16384],
            basic_hi_rom: vec![0x00; 16384],
            kernal_rom: kernal,
            char_rom: vec![0x00; 4096],
            startup: None,
        },
        Box::new(BufferConsole::new()),
    )
    .unwrap();

    let exit = machine.run().expect("run should not fault");
    assert_eq!(exit, Exit::Switch(64));
}
