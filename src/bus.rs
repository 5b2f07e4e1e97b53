use crate::cartridge::{MemoryBankController, Rom};
use crate::diagnostics::core_trace;
use crate::interrupt::InterruptController;
use crate::joypad::Joypad;
use crate::serial::Serial;
use crate::sound::Sound;
use crate::timer::Timer;
use crate::video::Video;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

const OAM_DMA_LENGTH: u16 = 0xA0;

/// The memory bus: a single address decoder routing every CPU access to the
/// backing peripheral, plus the RAM the bus itself owns.
///
/// Reads of unmapped addresses return 0xFF (open bus) and unmapped writes
/// are dropped; neither is an error.
pub struct Bus {
    pub cartridge: Box<dyn MemoryBankController>,
    pub video: Video,
    pub timer: Timer,
    pub serial: Serial,
    pub joypad: Joypad,
    pub sound: Sound,
    pub interrupts: InterruptController,
    wram: Box<[u8; WRAM_SIZE]>,
    hram: [u8; HRAM_SIZE],
}

impl Bus {
    pub fn new() -> Self {
        Self {
            cartridge: Box::new(Rom::from_bytes(Vec::new())),
            video: Video::new(),
            timer: Timer::new(),
            serial: Serial::new(),
            joypad: Joypad::new(),
            sound: Sound::new(),
            interrupts: InterruptController::new(),
            wram: Box::new([0; WRAM_SIZE]),
            hram: [0; HRAM_SIZE],
        }
    }

    pub fn set_cartridge(&mut self, cartridge: Box<dyn MemoryBankController>) {
        self.cartridge = cartridge;
    }

    pub fn reset(&mut self) {
        self.cartridge.reset();
        self.video.reset();
        self.timer.reset();
        self.serial.reset();
        self.joypad.reset();
        self.sound.reset();
        self.interrupts.reset();
        self.wram.fill(0);
        self.hram = [0; HRAM_SIZE];
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x7FFF => self.cartridge.read(address),
            0x8000..=0x9FFF => self.video.read_vram(address),
            0xA000..=0xBFFF => self.cartridge.read(address),
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize],
            // Echo RAM mirrors 0xC000-0xDDFF.
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize],
            0xFE00..=0xFE9F => self.video.read_oam(address),
            0xFF00 => self.joypad.read(),
            0xFF01..=0xFF02 => self.serial.read(address),
            0xFF04..=0xFF07 => self.timer.read(address),
            0xFF0F => self.interrupts.get_interrupt_flag(),
            0xFF10..=0xFF3F => self.sound.read(address),
            0xFF40..=0xFF4B => self.video.read(address),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize],
            0xFFFF => self.interrupts.get_enable_mask(),
            _ => {
                core_trace!("bus", "open-bus read {address:04X}");
                0xFF
            }
        }
    }

    pub fn write(&mut self, address: u16, data: u8) {
        match address {
            0x0000..=0x7FFF => self.cartridge.write(address, data),
            0x8000..=0x9FFF => self.video.write_vram(address, data),
            0xA000..=0xBFFF => self.cartridge.write(address, data),
            0xC000..=0xDFFF => self.wram[(address - 0xC000) as usize] = data,
            0xE000..=0xFDFF => self.wram[(address - 0xE000) as usize] = data,
            0xFE00..=0xFE9F => self.video.write_oam(address, data),
            0xFF00 => self.joypad.write(data),
            0xFF01..=0xFF02 => self.serial.write(address, data),
            0xFF04..=0xFF07 => self.timer.write(address, data),
            0xFF0F => self.interrupts.set_interrupt_flag(data),
            0xFF10..=0xFF3F => self.sound.write(address, data),
            0xFF46 => self.oam_dma(data),
            0xFF40..=0xFF4B => self.video.write(address, data, &mut self.interrupts),
            0xFF80..=0xFFFE => self.hram[(address - 0xFF80) as usize] = data,
            0xFFFF => self.interrupts.set_enable_mask(data),
            _ => core_trace!("bus", "unmapped write {address:04X} <- {data:02X}"),
        }
    }

    /// OAM DMA: copy 0xA0 bytes from `data << 8` into OAM. The copy is
    /// immediate; the sprite cache refreshes as each byte lands.
    fn oam_dma(&mut self, data: u8) {
        self.video.write(0xFF46, data, &mut self.interrupts);
        let source = (data as u16) << 8;
        for offset in 0..OAM_DMA_LENGTH {
            let byte = self.read(source.wrapping_add(offset));
            self.video.write_oam(0xFE00 + offset, byte);
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
