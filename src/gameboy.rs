use crate::bus::Bus;
use crate::cartridge::{self, CartridgeError, MemoryBankController};
use crate::cpu::Cpu;
use crate::joypad::JoypadDriver;
use crate::serial::LinkPort;
use crate::sound::SoundDriver;
use crate::video::VideoDriver;

/// Machine cycles per second (2^20; the 4 MiHz crystal divided by 4).
pub const GAMEBOY_CLOCK: i64 = 1 << 20;

/// One emulated machine: the CPU plus the bus with every peripheral on it.
///
/// `emulate` advances all components in lock step. Each round it takes the
/// minimum of the peripherals' remaining cycle budgets, runs the CPU for
/// that long, then runs every peripheral for the same span, so no component
/// ever observes another past its next event boundary.
pub struct GameBoy {
    pub cpu: Cpu,
    pub bus: Bus,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
        }
    }

    /// Validate a ROM image and install its mapper.
    pub fn load_rom(&mut self, rom: Vec<u8>) -> Result<(), CartridgeError> {
        let cartridge = cartridge::open(rom)?;
        self.bus.set_cartridge(cartridge);
        Ok(())
    }

    /// Install an already-built cartridge, bypassing header checks.
    pub fn load_cartridge(&mut self, cartridge: Box<dyn MemoryBankController>) {
        self.bus.set_cartridge(cartridge);
    }

    /// Restore the documented post-boot state. The cartridge stays in place;
    /// its RAM is cleared.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
    }

    pub fn set_video_driver(&mut self, driver: Box<dyn VideoDriver>) {
        self.bus.video.set_driver(driver);
    }

    pub fn set_joypad_driver(&mut self, driver: Box<dyn JoypadDriver>) {
        self.bus.joypad.set_driver(driver);
    }

    pub fn set_sound_driver(&mut self, driver: Box<dyn SoundDriver>) {
        self.bus.sound.set_driver(driver);
    }

    pub fn set_link_port(&mut self, port: Box<dyn LinkPort>) {
        self.bus.serial.set_link_port(port);
    }

    pub fn set_frame_skip(&mut self, frame_skip: u32) {
        self.bus.video.set_frame_skip(frame_skip);
    }

    pub fn frame_count(&self) -> u64 {
        self.bus.video.frame_count()
    }

    /// Cycles until the next peripheral event; the longest slice the CPU may
    /// run without one of them falling behind.
    fn min_cycles(&self) -> i64 {
        self.bus
            .video
            .get_cycles()
            .min(self.bus.serial.get_cycles())
            .min(self.bus.timer.get_cycles())
            .min(self.bus.sound.get_cycles())
            .min(self.bus.joypad.get_cycles())
    }

    /// Run the machine for at least `ticks` machine cycles and return the
    /// number actually consumed. Returns short only on a zero-length slice,
    /// which would otherwise loop forever.
    pub fn emulate(&mut self, ticks: i64) -> i64 {
        let mut consumed = 0;
        while consumed < ticks {
            let count = self.min_cycles();
            if count == 0 {
                break;
            }
            self.cpu.emulate(&mut self.bus, count);
            self.bus.video.emulate(count, &mut self.bus.interrupts);
            self.bus.serial.emulate(count, &mut self.bus.interrupts);
            self.bus.timer.emulate(count, &mut self.bus.interrupts);
            self.bus.sound.emulate(count);
            self.bus.joypad.emulate(count, &mut self.bus.interrupts);
            consumed += count;
        }
        consumed
    }

    /// Emulate one whole frame (154 scanlines of 114 cycles).
    pub fn emulate_frame(&mut self) -> i64 {
        self.emulate(154 * 114)
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
