// Interrupt vectors (gbdev.io/pandocs/Interrupts.html)
const VECTOR_VBLANK: u16 = 0x40;
const VECTOR_LCD: u16 = 0x48;
const VECTOR_TIMER: u16 = 0x50;
const VECTOR_SERIAL: u16 = 0x58;
const VECTOR_JOYPAD: u16 = 0x60;

// The upper three bits of IF are unwired and always read high.
const UNUSED_BITS: u8 = 0xE0;

/// The five maskable interrupt sources in service-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    Lcd,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::Lcd,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Bit position of this source in the IE/IF registers.
    pub const fn mask(self) -> u8 {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::Lcd => 0x02,
            Interrupt::Timer => 0x04,
            Interrupt::Serial => 0x08,
            Interrupt::Joypad => 0x10,
        }
    }

    /// Fixed ISR address the CPU jumps to when servicing this source.
    pub const fn call_code(self) -> u16 {
        match self {
            Interrupt::VBlank => VECTOR_VBLANK,
            Interrupt::Lcd => VECTOR_LCD,
            Interrupt::Timer => VECTOR_TIMER,
            Interrupt::Serial => VECTOR_SERIAL,
            Interrupt::Joypad => VECTOR_JOYPAD,
        }
    }

    const fn index(self) -> usize {
        match self {
            Interrupt::VBlank => 0,
            Interrupt::Lcd => 1,
            Interrupt::Timer => 2,
            Interrupt::Serial => 3,
            Interrupt::Joypad => 4,
        }
    }
}

/// Latched request and mask bit for one interrupt source.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptFlag {
    pub pending: bool,
    pub enabled: bool,
}

/// Holds the five interrupt lines plus the IE/IF register views.
pub struct InterruptController {
    flags: [InterruptFlag; 5],
    /// Bits 5-7 of IE as last written; readable back on hardware.
    enable_upper: u8,
}

impl InterruptController {
    pub fn new() -> Self {
        Self {
            flags: [InterruptFlag::default(); 5],
            enable_upper: 0,
        }
    }

    /// Latch a request from a peripheral.
    pub fn request(&mut self, source: Interrupt) {
        self.flags[source.index()].pending = true;
    }

    pub fn is_requested(&self, source: Interrupt) -> bool {
        self.flags[source.index()].pending
    }

    pub fn is_enabled(&self, source: Interrupt) -> bool {
        self.flags[source.index()].enabled
    }

    /// True if any enabled interrupt selected by `mask` is pending.
    pub fn is_pending(&self, mask: u8) -> bool {
        for source in Interrupt::ALL {
            let flag = self.flags[source.index()];
            if flag.pending && flag.enabled && source.mask() & mask != 0 {
                return true;
            }
        }
        false
    }

    /// Clear and return the highest-priority pending-and-enabled source.
    ///
    /// Priority is fixed: VBlank > LCD > Timer > Serial > Joypad. Exactly
    /// one source is acknowledged per call.
    pub fn acknowledge(&mut self) -> Option<Interrupt> {
        for source in Interrupt::ALL {
            let flag = &mut self.flags[source.index()];
            if flag.pending && flag.enabled {
                flag.pending = false;
                return Some(source);
            }
        }
        None
    }

    /// IE register (0xFFFF): five enable bits plus the written upper bits.
    pub fn get_enable_mask(&self) -> u8 {
        let mut value = self.enable_upper;
        for source in Interrupt::ALL {
            if self.flags[source.index()].enabled {
                value |= source.mask();
            }
        }
        value
    }

    pub fn set_enable_mask(&mut self, value: u8) {
        for source in Interrupt::ALL {
            self.flags[source.index()].enabled = value & source.mask() != 0;
        }
        self.enable_upper = value & UNUSED_BITS;
    }

    /// IF register (0xFF0F): the upper three bits always read as 1.
    pub fn get_interrupt_flag(&self) -> u8 {
        let mut value = UNUSED_BITS;
        for source in Interrupt::ALL {
            if self.flags[source.index()].pending {
                value |= source.mask();
            }
        }
        value
    }

    pub fn set_interrupt_flag(&mut self, value: u8) {
        for source in Interrupt::ALL {
            self.flags[source.index()].pending = value & source.mask() != 0;
        }
    }

    pub fn reset(&mut self) {
        self.flags = [InterruptFlag::default(); 5];
        self.enable_upper = 0;
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}
