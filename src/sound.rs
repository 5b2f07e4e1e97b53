use crate::gameboy::GAMEBOY_CLOCK;

const REGISTER_BASE: u16 = 0xFF10;
const REGISTER_END: u16 = 0xFF3F;
const REGISTER_COUNT: usize = 0x30;
const WAVE_RAM_BASE: u16 = 0xFF30;

const NR52: u16 = 0xFF26;
const NR52_POWER: u8 = 0x80;

/// Bits that read back as 1 for each register in 0xFF10-0xFF2F.
/// Unwired bits and write-only fields (frequency low bytes, length loads)
/// read high on hardware. 0xFF entries are gaps in the register map.
const READ_MASKS: [u8; REGISTER_COUNT] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // NR20-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // NR40-NR44
    0x00, 0x00, 0x70, // NR50-NR52
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // 0xFF27-0xFF2F gap
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // wave RAM
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Audio backend handed sample buffers at a fixed rate.
pub trait SoundDriver {
    fn sample_rate(&self) -> u32;
    /// Consume one buffer of interleaved stereo u8 samples.
    fn handle_buffer(&mut self, samples: &[u8]);
}

/// Backend that discards all audio.
#[derive(Default)]
pub struct NullSoundDriver;

impl SoundDriver for NullSoundDriver {
    fn sample_rate(&self) -> u32 {
        44100
    }

    fn handle_buffer(&mut self, _samples: &[u8]) {}
}

/// The sound register file (0xFF10-0xFF3F including wave RAM).
///
/// Registers and wave RAM behave as memory with the documented read masks,
/// and the driver is fed silence at its sample rate. Channel synthesis and
/// mixing are not modeled.
pub struct Sound {
    registers: [u8; REGISTER_COUNT],
    enabled: bool,
    cycles: i64,
    buffer: Vec<u8>,
    driver: Box<dyn SoundDriver>,
}

impl Sound {
    pub fn new() -> Self {
        let mut sound = Self {
            registers: [0; REGISTER_COUNT],
            enabled: false,
            cycles: 0,
            buffer: Vec::new(),
            driver: Box::new(NullSoundDriver),
        };
        sound.reset_buffer();
        sound
    }

    pub fn set_driver(&mut self, driver: Box<dyn SoundDriver>) {
        self.driver = driver;
        self.reset_buffer();
    }

    fn reset_buffer(&mut self) {
        // One buffer per frame, two channels.
        let frame_rate = 60;
        let samples = (self.driver.sample_rate() / frame_rate) as usize * 2;
        self.buffer = vec![0x80; samples];
        self.cycles = self.buffer_period();
    }

    fn buffer_period(&self) -> i64 {
        GAMEBOY_CLOCK * (self.buffer.len() as i64 / 2) / self.driver.sample_rate() as i64
    }

    pub fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.enabled = false;
        self.cycles = self.buffer_period();
    }

    pub fn get_cycles(&self) -> i64 {
        self.cycles
    }

    pub fn emulate(&mut self, ticks: i64) {
        self.cycles -= ticks;
        while self.cycles <= 0 {
            self.cycles += self.buffer_period();
            self.driver.handle_buffer(&self.buffer);
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            NR52 => {
                let power = if self.enabled { NR52_POWER } else { 0 };
                power | READ_MASKS[(NR52 - REGISTER_BASE) as usize]
            }
            REGISTER_BASE..=REGISTER_END => {
                let index = (address - REGISTER_BASE) as usize;
                self.registers[index] | READ_MASKS[index]
            }
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, address: u16, data: u8) {
        match address {
            NR52 => {
                self.enabled = data & NR52_POWER != 0;
                // Powering the APU off clears every register except wave RAM.
                if !self.enabled {
                    for (offset, register) in self.registers.iter_mut().enumerate() {
                        if (REGISTER_BASE + offset as u16) < WAVE_RAM_BASE {
                            *register = 0;
                        }
                    }
                }
            }
            REGISTER_BASE..=REGISTER_END => {
                // Registers below NR52 ignore writes while powered off.
                if self.enabled || address >= WAVE_RAM_BASE {
                    self.registers[(address - REGISTER_BASE) as usize] = data;
                }
            }
            _ => {}
        }
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::new()
    }
}
