use crate::gameboy::GAMEBOY_CLOCK;
use crate::interrupt::{Interrupt, InterruptController};

// DIV advances at 16384 Hz regardless of TAC.
const DIVIDER_PERIOD: i64 = GAMEBOY_CLOCK / 16384;

/// TIMA period in machine cycles for each TAC clock select
/// (4096 / 262144 / 65536 / 16384 Hz).
const TIMA_PERIODS: [i64; 4] = [256, 4, 16, 64];

const TAC_ENABLE: u8 = 0x04;

pub struct Timer {
    /// Divider register (DIV, 0xFF04)
    pub div: u8,
    /// Timer counter (TIMA, 0xFF05)
    pub tima: u8,
    /// Timer modulo (TMA, 0xFF06)
    pub tma: u8,
    /// Timer control (TAC, 0xFF07)
    pub tac: u8,
    divider_cycles: i64,
    timer_cycles: i64,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            div: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            divider_cycles: DIVIDER_PERIOD,
            timer_cycles: TIMA_PERIODS[0],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn tima_period(&self) -> i64 {
        TIMA_PERIODS[(self.tac & 0x03) as usize]
    }

    /// Cycles until the next DIV or TIMA event.
    pub fn get_cycles(&self) -> i64 {
        if self.tac & TAC_ENABLE != 0 {
            self.divider_cycles.min(self.timer_cycles)
        } else {
            self.divider_cycles
        }
    }

    pub fn emulate(&mut self, ticks: i64, interrupts: &mut InterruptController) {
        self.divider_cycles -= ticks;
        while self.divider_cycles <= 0 {
            self.divider_cycles += DIVIDER_PERIOD;
            self.div = self.div.wrapping_add(1);
        }

        if self.tac & TAC_ENABLE == 0 {
            return;
        }
        self.timer_cycles -= ticks;
        while self.timer_cycles <= 0 {
            self.timer_cycles += self.tima_period();
            self.tima = self.tima.wrapping_add(1);
            if self.tima == 0 {
                self.tima = self.tma;
                interrupts.request(Interrupt::Timer);
            }
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0xFF04 => self.div,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            0xFF07 => self.tac | 0xF8,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, address: u16, data: u8) {
        match address {
            // Any write to DIV clears the counter.
            0xFF04 => {
                self.div = 0;
                self.divider_cycles = DIVIDER_PERIOD;
            }
            0xFF05 => self.tima = data,
            0xFF06 => self.tma = data,
            0xFF07 => {
                let previous = self.tac;
                self.tac = data & 0x07;
                // Changing the clock select (or enabling the timer)
                // restarts the current period.
                if previous != self.tac {
                    self.timer_cycles = self.tima_period();
                }
            }
            _ => {}
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
