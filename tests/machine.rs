mod common;

use common::{machine_with_program, rom_with_program, step, PROGRAM_START};
use dotmatrix_core::gameboy::GameBoy;

#[test]
fn power_on_state_matches_the_post_boot_registers() {
    let gb = GameBoy::new();
    assert_eq!(gb.cpu.a.get(), 0x01);
    assert_eq!(gb.cpu.flag.get(), 0xB0);
    assert_eq!(gb.cpu.bc.get(), 0x0013);
    assert_eq!(gb.cpu.de.get(), 0x00D8);
    assert_eq!(gb.cpu.hl.get(), 0x014D);
    assert_eq!(gb.cpu.sp.get(), 0xFFFE);
    assert_eq!(gb.cpu.pc.get(), 0x0100);
    assert!(!gb.cpu.ime);
}

#[test]
fn execution_starts_at_the_cartridge_entry_point() {
    let mut gb = GameBoy::new();
    gb.load_rom(rom_with_program(&[]))
        .expect("synthesized ROM must pass header validation");

    // The entry stub is NOP; JP PROGRAM_START.
    assert_eq!(step(&mut gb), 1);
    assert_eq!(gb.cpu.last_op_code, 0x00);
    assert_eq!(step(&mut gb), 4);
    assert_eq!(gb.cpu.last_op_code, 0xC3);
    assert_eq!(gb.cpu.pc.get(), PROGRAM_START);
}

#[test]
fn a_frame_consumes_exactly_17556_cycles() {
    // JR -2: spin in place while the machine runs.
    let mut gb = machine_with_program(&[0x18, 0xFE]);
    gb.bus.write(0xFF40, 0x91);

    assert_eq!(gb.emulate_frame(), 17556);
    assert_eq!(gb.frame_count(), 1);
    assert_eq!(gb.emulate_frame(), 17556);
    assert_eq!(gb.frame_count(), 2);

    // Still spinning on the same instruction.
    let pc = gb.cpu.pc.get();
    assert!(pc == PROGRAM_START || pc == PROGRAM_START + 2);
}

#[test]
fn peripherals_advance_in_lock_step_with_the_cpu() {
    let mut gb = machine_with_program(&[0x18, 0xFE]);
    gb.bus.write(0xFF40, 0x91);
    gb.emulate_frame();

    // DIV ticks at 16384 Hz: 17556 / 64 increments, modulo 256.
    assert_eq!(gb.bus.read(0xFF04), (17556 / 64 % 256) as u8);
    // LY wrapped back to the top of the frame.
    assert_eq!(gb.bus.read(0xFF44), 0);
}

#[test]
fn vblank_handler_runs_during_a_frame() {
    // Vector 0x40 is reachable in ROM, so bake the handler in: the main
    // program enables IME and halts; the handler increments B and spins.
    let mut rom = rom_with_program(&[0xFB, 0x76, 0x00]); // EI; HALT; NOP
    rom[0x0040] = 0x04; // INC B
    rom[0x0041] = 0x18; // JR -2
    rom[0x0042] = 0xFE;

    let mut gb = GameBoy::new();
    gb.load_rom(rom).expect("valid header");
    gb.cpu.pc.set(PROGRAM_START);
    gb.cpu.bc.hi.set(0);
    gb.bus.write(0xFF40, 0x91);
    gb.bus.write(0xFFFF, 0x01);

    gb.emulate_frame();
    assert_eq!(gb.cpu.bc.hi.get(), 1, "handler ran once");
    assert!(!gb.cpu.ime, "dispatch cleared IME");
}

#[test]
fn reset_restores_the_machine_but_keeps_the_cartridge() {
    let mut gb = machine_with_program(&[0x18, 0xFE]);
    gb.bus.write(0xFF40, 0x91);
    gb.bus.write(0xC000, 0x55);
    gb.emulate_frame();

    gb.reset();
    assert_eq!(gb.cpu.pc.get(), 0x0100);
    assert_eq!(gb.bus.read(0xC000), 0x00);
    assert_eq!(gb.bus.read(0xFF44), 0);
    // The ROM is still mapped.
    assert_eq!(gb.bus.read(0x0101), 0xC3);
}
