//! C64 banking properties driven through the bus interface.

use emu_core::Bus;
use machine_c64::C64Memory;

const BASIC_BYTE: u8 = 0xB1;
const KERNAL_BYTE: u8 = 0xE2;
const CHAR_BYTE: u8 = 0xC3;

fn make_memory() -> C64Memory {
    C64Memory::new(
        &vec![BASIC_BYTE; 8192],
        &vec![KERNAL_BYTE; 8192],
        &vec![CHAR_BYTE; 4096],
    )
    .unwrap()
}

#[test]
fn default_port_shows_basic_and_kernal() {
    let mut mem = make_memory();
    mem.write(0x0001, 0x37);
    assert_eq!(mem.read(0xA000), BASIC_BYTE);
    assert_eq!(mem.read(0xE000), KERNAL_BYTE);
}

#[test]
fn port_35_shows_io() {
    let mut mem = make_memory();
    mem.write(0x0001, 0x35);
    // BASIC and KERNAL give way to RAM
    assert_eq!(mem.read(0xA000), 0x00);
    assert_eq!(mem.read(0xE000), 0x00);
    // I/O still answers at $D000: registers echo writes
    mem.write(0xD020, 0x0E);
    assert_eq!(mem.read(0xD020), 0x0E);
}

#[test]
fn port_30_exposes_full_ram() {
    let mut mem = make_memory();
    mem.write(0x0001, 0x30);
    assert_eq!(mem.read(0xA000), 0x00);
    assert_eq!(mem.read(0xD000), 0x00);
    assert_eq!(mem.read(0xE000), 0x00);
}

#[test]
fn ram_under_rom_survives_banking() {
    let mut mem = make_memory();

    // With ROMs visible, writes land in the RAM underneath
    mem.write(0x0001, 0x37);
    mem.write(0xA123, 0x11);
    mem.write(0xE456, 0x22);
    assert_eq!(mem.read(0xA123), BASIC_BYTE);
    assert_eq!(mem.read(0xE456), KERNAL_BYTE);

    // Bank the ROMs out: the bytes are still there
    mem.write(0x0001, 0x30);
    assert_eq!(mem.read(0xA123), 0x11);
    assert_eq!(mem.read(0xE456), 0x22);

    // And back in
    mem.write(0x0001, 0x37);
    assert_eq!(mem.read(0xA123), BASIC_BYTE);
}

#[test]
fn chargen_appears_when_charen_clear() {
    let mut mem = make_memory();
    mem.write(0x0001, 0x33); // CHAREN=0, LORAM/HIRAM set
    assert_eq!(mem.read(0xD000), CHAR_BYTE);
}

#[test]
fn color_ram_nybbles() {
    let mut mem = make_memory();
    mem.write(0x0001, 0x37);
    mem.write(0xD800, 0xAB);
    assert_eq!(mem.read(0xD800), 0xFB);
}
