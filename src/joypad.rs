use crate::gameboy::GAMEBOY_CLOCK;
use crate::interrupt::{Interrupt, InterruptController};

// Pad state is sampled at a fixed 64 Hz, well above human input rates.
const POLL_CYCLES: i64 = GAMEBOY_CLOCK / 64;

const SELECT_DIRECTIONS: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;
const SELECT_MASK: u8 = SELECT_DIRECTIONS | SELECT_BUTTONS;

/// Input backend polled by the joypad peripheral.
///
/// Codes are pressed-high bitmasks: bit 0-3 = Right/Left/Up/Down for
/// directions, A/B/Select/Start for buttons. `is_raised` reports whether
/// any state changed since the last poll, so idle frontends cost nothing.
pub trait JoypadDriver {
    fn get_button_code(&self) -> u8;
    fn get_direction_code(&self) -> u8;
    fn is_raised(&mut self) -> bool;
}

/// Backend with no input attached; nothing is ever pressed.
#[derive(Default)]
pub struct NullJoypadDriver;

impl JoypadDriver for NullJoypadDriver {
    fn get_button_code(&self) -> u8 {
        0
    }

    fn get_direction_code(&self) -> u8 {
        0
    }

    fn is_raised(&mut self) -> bool {
        false
    }
}

/// The JOYP register (0xFF00) and its polling clock.
pub struct Joypad {
    select: u8,
    button_code: u8,
    direction_code: u8,
    cycles: i64,
    driver: Box<dyn JoypadDriver>,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            select: SELECT_MASK,
            button_code: 0,
            direction_code: 0,
            cycles: POLL_CYCLES,
            driver: Box::new(NullJoypadDriver),
        }
    }

    pub fn set_driver(&mut self, driver: Box<dyn JoypadDriver>) {
        self.driver = driver;
    }

    pub fn reset(&mut self) {
        self.select = SELECT_MASK;
        self.button_code = 0;
        self.direction_code = 0;
        self.cycles = POLL_CYCLES;
    }

    pub fn get_cycles(&self) -> i64 {
        self.cycles
    }

    pub fn emulate(&mut self, ticks: i64, interrupts: &mut InterruptController) {
        self.cycles -= ticks;
        while self.cycles <= 0 {
            self.cycles += POLL_CYCLES;
            if self.driver.is_raised() {
                self.update(interrupts);
            }
        }
    }

    fn update(&mut self, interrupts: &mut InterruptController) {
        let buttons = self.driver.get_button_code();
        let directions = self.driver.get_direction_code();
        // A high-to-low edge on a selected input line requests the joypad
        // interrupt; releases never do.
        let pressed = (buttons & !self.button_code) | (directions & !self.direction_code);
        self.button_code = buttons;
        self.direction_code = directions;
        if pressed != 0 {
            interrupts.request(Interrupt::Joypad);
        }
    }

    /// JOYP read: selected input lines appear active-low in the low nibble;
    /// bits 6-7 are unwired and read high.
    pub fn read(&self) -> u8 {
        let mut nibble = 0x0F;
        if self.select & SELECT_DIRECTIONS == 0 {
            nibble &= !self.direction_code;
        }
        if self.select & SELECT_BUTTONS == 0 {
            nibble &= !self.button_code;
        }
        0xC0 | self.select | (nibble & 0x0F)
    }

    /// Only the two select bits are writable.
    pub fn write(&mut self, data: u8) {
        self.select = data & SELECT_MASK;
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}
