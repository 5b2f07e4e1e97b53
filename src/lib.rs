//! Cycle-accurate DMG (original Game Boy) emulation core.
//!
//! This crate contains the platform-agnostic emulator logic: the LR35902
//! CPU interpreter, interrupt controller, PPU mode state machine and the
//! timer/serial/joypad/cartridge plumbing, all advanced in lock step by the
//! [`gameboy`] scheduler. Frontends supply display, input, sound and link
//! cable backends through the driver traits each peripheral exposes.

/// Memory bus and address router.
pub mod bus;

/// Cartridge interface and the ROM-only mapper.
pub mod cartridge;

/// LR35902 CPU core.
pub mod cpu;

/// Injected observability sink for core trace events.
pub mod diagnostics;

/// High-level facade wiring CPU, bus and peripherals into one machine.
pub mod gameboy;

/// Interrupt lines, IE/IF register views and service priority.
pub mod interrupt;

/// Joypad matrix register and input polling.
pub mod joypad;

/// 8-bit, paired 16-bit and flag register storage.
pub mod registers;

/// Serial unit and link cable plumbing.
pub mod serial;

/// Sound register file and output clock.
pub mod sound;

/// Divider/timer unit.
pub mod timer;

/// PPU emulation: mode state machine, OAM sprites, scanline renderer.
pub mod video;
