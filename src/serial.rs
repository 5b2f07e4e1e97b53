use crate::diagnostics::core_trace;
use crate::gameboy::GAMEBOY_CLOCK;
use crate::interrupt::{Interrupt, InterruptController};

// A transfer shifts 8 bits at the 8192 Hz internal bit clock.
const TRANSFER_CYCLES: i64 = 8 * (GAMEBOY_CLOCK / 8192);

const SC_START: u8 = 0x80;
const SC_INTERNAL_CLOCK: u8 = 0x01;

pub trait LinkPort: Send {
    /// Transfer a byte over the link. Returns the byte received from the
    /// partner. Implementations may perform the transfer immediately.
    fn transfer(&mut self, byte: u8) -> u8;
}

/// A stub link port used when no cable is attached.
/// By default it emulates a "line dead" scenario where incoming bits are all 1,
/// so any transfer receives 0xFF. When `loopback` is true the sent byte is
/// echoed back instead.
#[derive(Default)]
pub struct NullLinkPort {
    loopback: bool,
}

impl NullLinkPort {
    pub fn new(loopback: bool) -> Self {
        Self { loopback }
    }
}

impl LinkPort for NullLinkPort {
    fn transfer(&mut self, byte: u8) -> u8 {
        if self.loopback { byte } else { 0xFF }
    }
}

/// The serial registers (SB/SC) and transfer clock.
///
/// Only internally-clocked transfers complete on their own; an
/// externally-clocked transfer waits forever on a dead line, as on hardware
/// with no cable attached.
pub struct Serial {
    sb: u8,
    sc: u8,
    cycles: i64,
    port: Box<dyn LinkPort>,
}

impl Serial {
    pub fn new() -> Self {
        Self {
            sb: 0,
            sc: 0,
            cycles: TRANSFER_CYCLES,
            port: Box::new(NullLinkPort::default()),
        }
    }

    pub fn set_link_port(&mut self, port: Box<dyn LinkPort>) {
        self.port = port;
    }

    pub fn reset(&mut self) {
        self.sb = 0;
        self.sc = 0;
        self.cycles = TRANSFER_CYCLES;
    }

    fn transfer_active(&self) -> bool {
        self.sc & (SC_START | SC_INTERNAL_CLOCK) == (SC_START | SC_INTERNAL_CLOCK)
    }

    pub fn get_cycles(&self) -> i64 {
        self.cycles
    }

    pub fn emulate(&mut self, ticks: i64, interrupts: &mut InterruptController) {
        if !self.transfer_active() {
            return;
        }
        self.cycles -= ticks;
        if self.cycles <= 0 {
            let sent = self.sb;
            self.sb = self.port.transfer(sent);
            self.sc &= !SC_START;
            self.cycles = TRANSFER_CYCLES;
            interrupts.request(Interrupt::Serial);
            core_trace!("serial", "transfer complete out={sent:02X} in={:02X}", self.sb);
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0xFF01 => self.sb,
            // Bits 1-6 of SC are unwired on DMG.
            0xFF02 => self.sc | 0x7E,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, address: u16, data: u8) {
        match address {
            0xFF01 => self.sb = data,
            0xFF02 => {
                self.sc = data & (SC_START | SC_INTERNAL_CLOCK);
                if self.transfer_active() {
                    self.cycles = TRANSFER_CYCLES;
                }
            }
            _ => {}
        }
    }
}

impl Default for Serial {
    fn default() -> Self {
        Self::new()
    }
}
