#![allow(dead_code)]

use once_cell::sync::Lazy;

use dotmatrix_core::cartridge::header_checksum;
use dotmatrix_core::gameboy::GameBoy;

/// Where synthesized test programs are placed, right after the header.
pub const PROGRAM_START: u16 = 0x0150;

/// 32K ROM-only image with a valid header whose entry stub is
/// `NOP; JP PROGRAM_START`.
static BASE_ROM: Lazy<Vec<u8>> = Lazy::new(|| {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0100] = 0x00;
    rom[0x0101] = 0xC3;
    rom[0x0102] = (PROGRAM_START & 0xFF) as u8;
    rom[0x0103] = (PROGRAM_START >> 8) as u8;
    rom[0x0134..0x0134 + 9].copy_from_slice(b"DOTMATRIX");
    // Cartridge type 0x00 (ROM only), 32K ROM, no RAM: all already zero.
    rom[0x014D] = header_checksum(&rom);
    rom
});

pub fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = BASE_ROM.clone();
    let start = PROGRAM_START as usize;
    rom[start..start + program.len()].copy_from_slice(program);
    rom
}

/// A machine with `program` loaded and the CPU parked at its first byte.
pub fn machine_with_program(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new();
    gb.load_rom(rom_with_program(program))
        .expect("synthesized ROM must pass header validation");
    gb.cpu.pc.set(PROGRAM_START);
    gb
}

/// Execute exactly one instruction and return its cost in machine cycles.
///
/// The budget is topped up to a single cycle first; since every instruction
/// costs at least one, the execute loop runs exactly once.
pub fn step(gb: &mut GameBoy) -> i64 {
    gb.cpu.cycles = 0;
    gb.cpu.emulate(&mut gb.bus, 1);
    1 - gb.cpu.cycles
}
