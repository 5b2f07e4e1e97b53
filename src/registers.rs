// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

/// An 8-bit register cell.
///
/// Each cell remembers its hardware-defined power-on value so `reset()`
/// restores the documented post-boot state. Cycle accounting lives in the
/// CPU's access helpers, not here; the cell is pure storage.
#[derive(Debug, Clone, Copy)]
pub struct Register {
    value: u8,
    reset_value: u8,
}

impl Register {
    pub fn new(reset_value: u8) -> Self {
        Self {
            value: reset_value,
            reset_value,
        }
    }

    #[inline(always)]
    pub fn get(&self) -> u8 {
        self.value
    }

    #[inline(always)]
    pub fn set(&mut self, value: u8) {
        self.value = value;
    }

    pub fn reset(&mut self) {
        self.value = self.reset_value;
    }
}

/// A 16-bit register pair composed of two owned 8-bit halves.
///
/// `get() == (hi << 8) | lo` holds at all times; there is no separate
/// 16-bit shadow value that could fall out of sync.
#[derive(Debug, Clone, Copy)]
pub struct DoubleRegister {
    pub hi: Register,
    pub lo: Register,
}

impl DoubleRegister {
    pub fn new(reset_hi: u8, reset_lo: u8) -> Self {
        Self {
            hi: Register::new(reset_hi),
            lo: Register::new(reset_lo),
        }
    }

    #[inline(always)]
    pub fn get(&self) -> u16 {
        ((self.hi.get() as u16) << 8) | self.lo.get() as u16
    }

    #[inline(always)]
    pub fn set(&mut self, value: u16) {
        self.hi.set((value >> 8) as u8);
        self.lo.set(value as u8);
    }

    pub fn inc(&mut self) {
        self.set(self.get().wrapping_add(1));
    }

    pub fn dec(&mut self) {
        self.set(self.get().wrapping_sub(1));
    }

    pub fn add(&mut self, value: u16) {
        self.set(self.get().wrapping_add(value));
    }

    pub fn reset(&mut self) {
        self.hi.reset();
        self.lo.reset();
    }
}

/// The F register with its four condition bits individually addressable.
///
/// The lower nibble is wired to zero on hardware; the value written there is
/// still tracked (`lower`) so `get()` reconstructs writes bit for bit.
#[derive(Debug, Clone, Copy)]
pub struct FlagRegister {
    pub zero: bool,
    pub subtract: bool,
    pub half_carry: bool,
    pub carry: bool,
    lower: u8,
    reset_value: u8,
}

impl FlagRegister {
    pub fn new(reset_value: u8) -> Self {
        let mut flag = Self {
            zero: false,
            subtract: false,
            half_carry: false,
            carry: false,
            lower: 0,
            reset_value,
        };
        flag.set(reset_value);
        flag
    }

    pub fn get(&self) -> u8 {
        let mut value = self.lower;
        if self.zero {
            value |= FLAG_Z;
        }
        if self.subtract {
            value |= FLAG_N;
        }
        if self.half_carry {
            value |= FLAG_H;
        }
        if self.carry {
            value |= FLAG_C;
        }
        value
    }

    pub fn set(&mut self, value: u8) {
        self.zero = value & FLAG_Z != 0;
        self.subtract = value & FLAG_N != 0;
        self.half_carry = value & FLAG_H != 0;
        self.carry = value & FLAG_C != 0;
        self.lower = value & 0x0F;
    }

    pub fn reset(&mut self) {
        let value = self.reset_value;
        self.set(value);
    }

    /// Clear all four condition bits (and the lower filler bits).
    pub fn clear(&mut self) {
        self.set(0);
    }

    /// Set the zero bit iff `value` is zero.
    #[inline(always)]
    pub fn zero_check(&mut self, value: u8) {
        self.zero = value == 0;
    }

    /// Nibble comparison used by the decrement/compare family: half-carry is
    /// a borrow out of bit 4, i.e. the subtrahend's low nibble exceeds the
    /// minuend's. The exact polarity matters; this is not a generic
    /// overflow check.
    #[inline(always)]
    pub fn half_carry_compare(&mut self, a: u8, b: u8) {
        self.half_carry = (a & 0x0F) > (b & 0x0F);
    }
}
