use std::fmt;

use crate::diagnostics::core_info;

// Header layout (gbdev.io/pandocs/The_Cartridge_Header.html)
const HEADER_END: usize = 0x0150;
const TITLE_RANGE: std::ops::Range<usize> = 0x0134..0x0144;
const CHECKSUM_RANGE: std::ops::Range<usize> = 0x0134..0x014D;
const CART_TYPE_OFFSET: usize = 0x0147;
const ROM_SIZE_OFFSET: usize = 0x0148;
const RAM_SIZE_OFFSET: usize = 0x0149;
const HEADER_CHECKSUM_OFFSET: usize = 0x014D;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Cartridge-side memory interface consumed by the bus.
///
/// The bus routes 0x0000-0x7FFF and 0xA000-0xBFFF here. Banked mappers
/// (MBC1/3/5, RTC) are collaborator concerns; the core only depends on this
/// trait.
pub trait MemoryBankController {
    fn read(&self, address: u16) -> u8;
    fn write(&mut self, address: u16, data: u8);
    fn reset(&mut self);
    fn rom_size(&self) -> usize;
    fn ram_size(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    /// Image is smaller than the cartridge header.
    TooShort(usize),
    /// Header checksum over 0x0134-0x014C does not match byte 0x014D.
    BadChecksum { expected: u8, computed: u8 },
    /// The cartridge-type byte names a mapper this core does not provide.
    UnsupportedMapper(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::TooShort(len) => {
                write!(f, "ROM image of {len} bytes is too short for a header")
            }
            CartridgeError::BadChecksum { expected, computed } => write!(
                f,
                "header checksum mismatch: header says {expected:02X}, computed {computed:02X}"
            ),
            CartridgeError::UnsupportedMapper(kind) => {
                write!(f, "unsupported cartridge type {kind:02X}")
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// A ROM-only cartridge (type 0x00), optionally with external RAM.
pub struct Rom {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl Rom {
    /// Build a cartridge from raw bytes without header validation.
    /// Intended for synthesized test programs.
    pub fn from_bytes(rom: Vec<u8>) -> Self {
        Self::from_bytes_with_ram(rom, 0)
    }

    pub fn from_bytes_with_ram(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
        }
    }
}

impl MemoryBankController for Rom {
    fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x7FFF => self.rom.get(address as usize).copied().unwrap_or(0xFF),
            0xA000..=0xBFFF => self
                .ram
                .get((address - 0xA000) as usize)
                .copied()
                .unwrap_or(0xFF),
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        // ROM is not writable; only external RAM takes writes.
        if let 0xA000..=0xBFFF = address {
            let offset = (address - 0xA000) as usize;
            if let Some(cell) = self.ram.get_mut(offset) {
                *cell = data;
            }
        }
    }

    fn reset(&mut self) {
        self.ram.fill(0);
    }

    fn rom_size(&self) -> usize {
        self.rom.len()
    }

    fn ram_size(&self) -> usize {
        self.ram.len()
    }
}

/// Header checksum over the title/licensee region, as verified by the boot
/// ROM: `x = x - byte - 1` for each byte, truncated to 8 bits.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[CHECKSUM_RANGE]
        .iter()
        .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1))
}

/// Validate a ROM image's header and build the matching mapper.
pub fn open(rom: Vec<u8>) -> Result<Box<dyn MemoryBankController>, CartridgeError> {
    if rom.len() < HEADER_END {
        return Err(CartridgeError::TooShort(rom.len()));
    }

    let expected = rom[HEADER_CHECKSUM_OFFSET];
    let computed = header_checksum(&rom);
    if expected != computed {
        return Err(CartridgeError::BadChecksum { expected, computed });
    }

    let cart_type = rom[CART_TYPE_OFFSET];
    let rom_banks = 2usize << (rom[ROM_SIZE_OFFSET] & 0x0F);
    let ram_size = match rom[RAM_SIZE_OFFSET] {
        0x02 => RAM_BANK_SIZE,
        0x03 => 4 * RAM_BANK_SIZE,
        0x04 => 16 * RAM_BANK_SIZE,
        0x05 => 8 * RAM_BANK_SIZE,
        _ => 0,
    };

    let title: String = rom[TITLE_RANGE]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    core_info!(
        "cartridge",
        "loaded \"{title}\" type={cart_type:02X} rom={}K ram={}K",
        rom_banks * ROM_BANK_SIZE / 1024,
        ram_size / 1024
    );

    match cart_type {
        // ROM only, or ROM+RAM(+battery); banking never engages for these.
        0x00 | 0x08 | 0x09 => Ok(Box::new(Rom::from_bytes_with_ram(rom, ram_size))),
        other => Err(CartridgeError::UnsupportedMapper(other)),
    }
}
