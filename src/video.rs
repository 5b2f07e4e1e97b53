use crate::interrupt::{Interrupt, InterruptController};

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

const VBLANK_LINES: u8 = 10;
const LAST_LINE: u8 = SCREEN_HEIGHT as u8 + VBLANK_LINES - 1;

// Mode durations in machine cycles. A scanline is 20 + (12 + 32) + 50 = 114
// cycles; a VBlank line is 114 split into an 8-cycle entry delay on line 144
// and a 1-cycle tail before LY wraps on line 153. A full frame is 154 * 114.
const MODE_0_TICKS: i64 = 50; // HBlank
const MODE_1_TICKS: i64 = 114; // One line during VBlank
const MODE_1_BEGIN_TICKS: i64 = 8;
const MODE_1_END_TICKS: i64 = 1;
const MODE_2_TICKS: i64 = 20; // OAM scan
const MODE_3_BEGIN_TICKS: i64 = 12; // Pixel transfer, before the line is drawn
const MODE_3_END_TICKS: i64 = 32;

const MAX_SPRITES_PER_LINE: usize = 10;
const TOTAL_SPRITES: usize = 40;

const VRAM_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;

const WINDOW_X_MAX: u8 = 166;

const BG_MAP_0_BASE: usize = 0x1800;
const BG_MAP_1_BASE: usize = 0x1C00;
const TILE_DATA_0_BASE: usize = 0x0000;
const TILE_DATA_1_BASE: usize = 0x0800;

/// Display backend. The core pushes one scanline of shades (0 = lightest,
/// 3 = darkest) at a time during pixel transfer and signals a finished frame
/// once per VBlank.
pub trait VideoDriver {
    fn draw_pixel(&mut self, x: usize, y: usize, shade: u8);
    fn update_display(&mut self);
    fn get_pixels(&self) -> &[u8];
    fn clear_pixels(&mut self);
}

/// Backend that keeps the framebuffer but displays nothing.
pub struct NullVideoDriver {
    pixels: Vec<u8>,
}

impl NullVideoDriver {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl Default for NullVideoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoDriver for NullVideoDriver {
    fn draw_pixel(&mut self, x: usize, y: usize, shade: u8) {
        self.pixels[y * SCREEN_WIDTH + x] = shade;
    }

    fn update_display(&mut self) {}

    fn get_pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn clear_pixels(&mut self) {
        self.pixels.fill(0);
    }
}

/// Decoded LCDC (0xFF40).
#[derive(Default)]
pub struct ControlRegister {
    pub lcd_enabled: bool,
    pub window_map_select: bool,
    pub window_enabled: bool,
    pub tile_data_select: bool,
    pub background_map_select: bool,
    pub big_sprites: bool,
    pub sprites_enabled: bool,
    pub background_enabled: bool,
}

impl ControlRegister {
    pub fn get(&self) -> u8 {
        let mut value = 0;
        if self.lcd_enabled {
            value |= 0x80;
        }
        if self.window_map_select {
            value |= 0x40;
        }
        if self.window_enabled {
            value |= 0x20;
        }
        if self.tile_data_select {
            value |= 0x10;
        }
        if self.background_map_select {
            value |= 0x08;
        }
        if self.big_sprites {
            value |= 0x04;
        }
        if self.sprites_enabled {
            value |= 0x02;
        }
        if self.background_enabled {
            value |= 0x01;
        }
        value
    }

    pub fn set(&mut self, value: u8) {
        self.lcd_enabled = value & 0x80 != 0;
        self.window_map_select = value & 0x40 != 0;
        self.window_enabled = value & 0x20 != 0;
        self.tile_data_select = value & 0x10 != 0;
        self.background_map_select = value & 0x08 != 0;
        self.big_sprites = value & 0x04 != 0;
        self.sprites_enabled = value & 0x02 != 0;
        self.background_enabled = value & 0x01 != 0;
    }
}

/// Decoded STAT (0xFF41) minus the mode bits, which live in `Video::mode`.
#[derive(Default)]
pub struct StatusRegister {
    pub compare_interrupt: bool,
    pub oam_interrupt: bool,
    pub vblank_interrupt: bool,
    pub hblank_interrupt: bool,
    pub line_compare_flag: bool,
}

impl StatusRegister {
    pub fn get(&self, mode_bits: u8) -> u8 {
        let mut value = 0x80 | (mode_bits & 0x03);
        if self.compare_interrupt {
            value |= 0x40;
        }
        if self.oam_interrupt {
            value |= 0x20;
        }
        if self.vblank_interrupt {
            value |= 0x10;
        }
        if self.hblank_interrupt {
            value |= 0x08;
        }
        if self.line_compare_flag {
            value |= 0x04;
        }
        value
    }

    /// Bits 0-2 are read-only from the CPU side.
    pub fn set(&mut self, value: u8) {
        self.compare_interrupt = value & 0x40 != 0;
        self.oam_interrupt = value & 0x20 != 0;
        self.vblank_interrupt = value & 0x10 != 0;
        self.hblank_interrupt = value & 0x08 != 0;
    }
}

/// One OAM entry, decoded in place whenever its bytes change.
#[derive(Copy, Clone, Default)]
pub struct Sprite {
    /// Screen X of the left edge (OAM byte minus 8, so may be negative).
    pub x: i16,
    /// Screen Y of the top edge (OAM byte minus 16).
    pub y: i16,
    pub tile: u8,
    pub behind_background: bool,
    pub y_flip: bool,
    pub x_flip: bool,
    pub use_obp1: bool,
}

impl Sprite {
    fn decode(&mut self, bytes: &[u8]) {
        self.y = bytes[0] as i16 - 16;
        self.x = bytes[1] as i16 - 8;
        self.tile = bytes[2];
        self.behind_background = bytes[3] & 0x80 != 0;
        self.y_flip = bytes[3] & 0x40 != 0;
        self.x_flip = bytes[3] & 0x20 != 0;
        self.use_obp1 = bytes[3] & 0x10 != 0;
    }
}

/// The four PPU states. Mode 3 records whether the line has been drawn yet
/// (its duration is split around the draw); Mode 1 tracks which slice of the
/// ten blanking lines it is in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Mode {
    HBlank,
    VBlank(VBlankPhase),
    OamScan,
    PixelTransfer { drawn: bool },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VBlankPhase {
    /// First 8 cycles of line 144, before the VBlank interrupt fires.
    Entry,
    /// Whole lines 144-152.
    Line,
    /// The single cycle on which LY reads 153.
    Wrap,
    /// The remainder of line 153 with LY already showing 0.
    LineZero,
}

impl Mode {
    pub fn bits(self) -> u8 {
        match self {
            Mode::HBlank => 0,
            Mode::VBlank(_) => 1,
            Mode::OamScan => 2,
            Mode::PixelTransfer { .. } => 3,
        }
    }
}

pub struct Video {
    pub control: ControlRegister,
    pub status: StatusRegister,
    mode: Mode,
    cycles: i64,

    scroll_y: u8,
    scroll_x: u8,
    line_y: u8,
    line_y_compare: u8,
    dma: u8,
    background_palette: u8,
    object_palette_0: u8,
    object_palette_1: u8,
    window_y: u8,
    window_x: u8,
    window_line: u8,

    vram: Box<[u8; VRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    sprites: [Sprite; TOTAL_SPRITES],
    line_sprites: [usize; MAX_SPRITES_PER_LINE],
    line_sprite_count: usize,

    // Shade lookup per palette, rebuilt lazily on palette writes.
    background_shades: [u8; 4],
    object_shades: [[u8; 4]; 2],
    dirty_palettes: bool,

    line_shades: [u8; SCREEN_WIDTH],
    background_zero: [bool; SCREEN_WIDTH],

    display: bool,
    frames: u32,
    frame_skip: u32,
    frame_count: u64,

    driver: Box<dyn VideoDriver>,
}

impl Video {
    pub fn new() -> Self {
        Self {
            control: ControlRegister::default(),
            status: StatusRegister::default(),
            mode: Mode::OamScan,
            cycles: MODE_2_TICKS,
            scroll_y: 0,
            scroll_x: 0,
            line_y: 0,
            line_y_compare: 0,
            dma: 0xFF,
            background_palette: 0,
            object_palette_0: 0,
            object_palette_1: 0,
            window_y: 0,
            window_x: 0,
            window_line: 0,
            vram: Box::new([0; VRAM_SIZE]),
            oam: [0; OAM_SIZE],
            sprites: [Sprite::default(); TOTAL_SPRITES],
            line_sprites: [0; MAX_SPRITES_PER_LINE],
            line_sprite_count: 0,
            background_shades: [0; 4],
            object_shades: [[0; 4]; 2],
            dirty_palettes: true,
            line_shades: [0; SCREEN_WIDTH],
            background_zero: [true; SCREEN_WIDTH],
            display: true,
            frames: 0,
            frame_skip: 0,
            frame_count: 0,
            driver: Box::new(NullVideoDriver::new()),
        }
    }

    pub fn set_driver(&mut self, driver: Box<dyn VideoDriver>) {
        self.driver = driver;
    }

    pub fn driver(&self) -> &dyn VideoDriver {
        &*self.driver
    }

    pub fn set_frame_skip(&mut self, frame_skip: u32) {
        self.frame_skip = frame_skip;
        self.frames = 0;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn reset(&mut self) {
        self.control = ControlRegister::default();
        self.status = StatusRegister::default();
        self.mode = Mode::OamScan;
        self.cycles = MODE_2_TICKS;
        self.scroll_y = 0;
        self.scroll_x = 0;
        self.line_y = 0;
        self.line_y_compare = 0;
        self.dma = 0xFF;
        self.background_palette = 0;
        self.object_palette_0 = 0;
        self.object_palette_1 = 0;
        self.window_y = 0;
        self.window_x = 0;
        self.window_line = 0;
        self.vram.fill(0);
        self.oam = [0; OAM_SIZE];
        self.sprites = [Sprite::default(); TOTAL_SPRITES];
        self.line_sprite_count = 0;
        self.dirty_palettes = true;
        self.display = true;
        self.frames = 0;
        self.driver.clear_pixels();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn line_y(&self) -> u8 {
        self.line_y
    }

    pub fn get_cycles(&self) -> i64 {
        self.cycles
    }

    pub fn emulate(&mut self, ticks: i64, interrupts: &mut InterruptController) {
        self.cycles -= ticks;
        if !self.control.lcd_enabled {
            // Time still passes with the LCD off, otherwise the scheduler
            // would spin on a permanently exhausted budget.
            while self.cycles <= 0 {
                self.cycles += MODE_1_TICKS;
            }
            return;
        }
        while self.cycles <= 0 {
            self.transition(interrupts);
        }
    }

    /// Run the current mode's exit action and activate its successor.
    fn transition(&mut self, interrupts: &mut InterruptController) {
        match self.mode {
            Mode::OamScan => {
                self.scan_oam_line();
                self.mode = Mode::PixelTransfer { drawn: false };
                self.cycles += MODE_3_BEGIN_TICKS;
            }
            Mode::PixelTransfer { drawn: false } => {
                if self.display {
                    self.draw_line();
                }
                self.mode = Mode::PixelTransfer { drawn: true };
                self.cycles += MODE_3_END_TICKS;
            }
            Mode::PixelTransfer { drawn: true } => self.activate_hblank(interrupts),
            Mode::HBlank => {
                self.line_y += 1;
                self.compare_line(interrupts, false);
                if self.line_y < SCREEN_HEIGHT as u8 {
                    self.activate_oam_scan(interrupts);
                } else {
                    self.finish_frame();
                    self.mode = Mode::VBlank(VBlankPhase::Entry);
                    self.cycles += MODE_1_BEGIN_TICKS;
                }
            }
            Mode::VBlank(VBlankPhase::Entry) => {
                interrupts.request(Interrupt::VBlank);
                if self.status.vblank_interrupt && self.compare_gate() {
                    interrupts.request(Interrupt::Lcd);
                }
                self.mode = Mode::VBlank(VBlankPhase::Line);
                self.cycles += MODE_1_TICKS - MODE_1_BEGIN_TICKS;
            }
            Mode::VBlank(VBlankPhase::Line) => {
                self.line_y += 1;
                self.compare_line(interrupts, false);
                if self.line_y == LAST_LINE {
                    self.mode = Mode::VBlank(VBlankPhase::Wrap);
                    self.cycles += MODE_1_END_TICKS;
                } else {
                    self.cycles += MODE_1_TICKS;
                }
            }
            Mode::VBlank(VBlankPhase::Wrap) => {
                self.line_y = 0;
                self.compare_line(interrupts, false);
                self.mode = Mode::VBlank(VBlankPhase::LineZero);
                self.cycles += MODE_1_TICKS - MODE_1_END_TICKS;
            }
            Mode::VBlank(VBlankPhase::LineZero) => {
                self.window_line = 0;
                self.activate_oam_scan(interrupts);
            }
        }
    }

    fn activate_oam_scan(&mut self, interrupts: &mut InterruptController) {
        self.mode = Mode::OamScan;
        self.cycles += MODE_2_TICKS;
        if self.status.oam_interrupt && self.compare_gate() {
            interrupts.request(Interrupt::Lcd);
        }
    }

    fn activate_hblank(&mut self, interrupts: &mut InterruptController) {
        self.mode = Mode::HBlank;
        self.cycles += MODE_0_TICKS;
        if self.status.hblank_interrupt && self.compare_gate() {
            interrupts.request(Interrupt::Lcd);
        }
    }

    /// A mode's STAT source must not fire when the LYC interrupt already
    /// fired for this line.
    fn compare_gate(&self) -> bool {
        !(self.status.line_compare_flag && self.status.compare_interrupt)
    }

    /// Re-evaluate the LY=LYC coincidence after LY or LYC changed.
    /// `stat_write` suppresses re-firing for a line already flagged, so a
    /// STAT write cannot double-fire the coincidence interrupt.
    fn compare_line(&mut self, interrupts: &mut InterruptController, stat_write: bool) {
        if self.line_y == self.line_y_compare {
            if !(stat_write && self.status.line_compare_flag) {
                self.status.line_compare_flag = true;
                if self.status.compare_interrupt {
                    interrupts.request(Interrupt::Lcd);
                }
            }
        } else {
            self.status.line_compare_flag = false;
        }
    }

    fn finish_frame(&mut self) {
        if self.display {
            self.driver.update_display();
        }
        self.frame_count += 1;
        self.frames += 1;
        if self.frames > self.frame_skip {
            self.frames = 0;
            self.display = true;
        } else {
            self.display = false;
        }
    }

    pub fn read_vram(&self, address: u16) -> u8 {
        self.vram[(address & 0x1FFF) as usize]
    }

    pub fn write_vram(&mut self, address: u16, data: u8) {
        self.vram[(address & 0x1FFF) as usize] = data;
    }

    pub fn read_oam(&self, address: u16) -> u8 {
        self.oam[(address as usize - 0xFE00) % OAM_SIZE]
    }

    /// The decoded OAM entry for sprite `index` (0..40).
    pub fn sprite(&self, index: usize) -> Sprite {
        self.sprites[index]
    }

    /// Write an OAM byte and refresh the decoded entry for its sprite.
    pub fn write_oam(&mut self, address: u16, data: u8) {
        let offset = (address as usize - 0xFE00) % OAM_SIZE;
        self.oam[offset] = data;
        let index = offset / 4;
        let base = index * 4;
        self.sprites[index].decode(&self.oam[base..base + 4]);
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0xFF40 => self.control.get(),
            0xFF41 => self.status.get(self.mode.bits()),
            0xFF42 => self.scroll_y,
            0xFF43 => self.scroll_x,
            0xFF44 => self.line_y,
            0xFF45 => self.line_y_compare,
            0xFF46 => self.dma,
            0xFF47 => self.background_palette,
            0xFF48 => self.object_palette_0,
            0xFF49 => self.object_palette_1,
            0xFF4A => self.window_y,
            0xFF4B => self.window_x,
            _ => 0xFF,
        }
    }

    /// Register writes. OAM DMA (0xFF46) is routed by the bus, which owns
    /// the source memory; only the latched value lands here.
    pub fn write(&mut self, address: u16, data: u8, interrupts: &mut InterruptController) {
        match address {
            0xFF40 => self.set_control(data),
            0xFF41 => {
                self.status.set(data);
                self.compare_line(interrupts, true);
            }
            0xFF42 => self.scroll_y = data,
            0xFF43 => self.scroll_x = data,
            // LY is read-only.
            0xFF44 => {}
            0xFF45 => {
                self.line_y_compare = data;
                if self.control.lcd_enabled {
                    self.compare_line(interrupts, false);
                }
            }
            0xFF46 => self.dma = data,
            0xFF47 => {
                self.background_palette = data;
                self.dirty_palettes = true;
            }
            0xFF48 => {
                self.object_palette_0 = data;
                self.dirty_palettes = true;
            }
            0xFF49 => {
                self.object_palette_1 = data;
                self.dirty_palettes = true;
            }
            0xFF4A => self.window_y = data,
            0xFF4B => self.window_x = data,
            _ => {}
        }
    }

    fn set_control(&mut self, data: u8) {
        let was_enabled = self.control.lcd_enabled;
        self.control.set(data);
        if was_enabled && !self.control.lcd_enabled {
            self.line_y = 0;
            self.window_line = 0;
            self.status.line_compare_flag = false;
            self.mode = Mode::HBlank;
            self.cycles = MODE_1_TICKS;
            self.driver.clear_pixels();
        } else if !was_enabled && self.control.lcd_enabled {
            self.mode = Mode::OamScan;
            self.cycles = MODE_2_TICKS;
        }
    }

    fn refresh_palettes(&mut self) {
        for id in 0..4 {
            self.background_shades[id] = (self.background_palette >> (id * 2)) & 0x03;
            self.object_shades[0][id] = (self.object_palette_0 >> (id * 2)) & 0x03;
            self.object_shades[1][id] = (self.object_palette_1 >> (id * 2)) & 0x03;
        }
        self.dirty_palettes = false;
    }

    /// Collect up to 10 sprites visible on the current scanline, ordered by
    /// X position then OAM index.
    fn scan_oam_line(&mut self) {
        let sprite_height = if self.control.big_sprites { 16 } else { 8 };
        self.line_sprite_count = 0;
        for (index, sprite) in self.sprites.iter().enumerate() {
            if self.line_sprite_count >= MAX_SPRITES_PER_LINE {
                break;
            }
            let line = self.line_y as i16;
            if line >= sprite.y && line < sprite.y + sprite_height {
                self.line_sprites[self.line_sprite_count] = index;
                self.line_sprite_count += 1;
            }
        }
        self.line_sprites[..self.line_sprite_count].sort_by_key(|&i| (self.sprites[i].x, i));
    }

    fn tile_address(&self, tile_index: u8) -> usize {
        if self.control.tile_data_select {
            TILE_DATA_0_BASE + tile_index as usize * 16
        } else {
            TILE_DATA_1_BASE + (tile_index as i8 as i16 + 128) as usize * 16
        }
    }

    fn draw_line(&mut self) {
        if self.dirty_palettes {
            self.refresh_palettes();
        }
        self.line_shades = [self.background_shades[0]; SCREEN_WIDTH];
        self.background_zero = [true; SCREEN_WIDTH];

        if self.control.background_enabled {
            self.draw_background_line();
            self.draw_window_line();
        }
        if self.control.sprites_enabled {
            self.draw_sprite_line();
        }

        let y = self.line_y as usize;
        for (x, &shade) in self.line_shades.iter().enumerate() {
            self.driver.draw_pixel(x, y, shade);
        }
    }

    fn draw_background_line(&mut self) {
        let map_base = if self.control.background_map_select {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let map_y = self.line_y.wrapping_add(self.scroll_y) as usize;
        let tile_row = map_y / 8;
        let tile_y = map_y % 8;
        for x in 0..SCREEN_WIDTH {
            let map_x = (x as u8).wrapping_add(self.scroll_x) as usize;
            let tile_index = self.vram[map_base + tile_row * 32 + map_x / 8];
            let addr = self.tile_address(tile_index) + tile_y * 2;
            let bit = 7 - map_x % 8;
            let lo = self.vram[addr];
            let hi = self.vram[addr + 1];
            let color_id = ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1);
            self.line_shades[x] = self.background_shades[color_id as usize];
            self.background_zero[x] = color_id == 0;
        }
    }

    fn draw_window_line(&mut self) {
        if !self.control.window_enabled
            || self.line_y < self.window_y
            || self.window_x > WINDOW_X_MAX
        {
            return;
        }
        let map_base = if self.control.window_map_select {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let window_y = self.window_line as usize;
        let tile_row = window_y / 8;
        let tile_y = window_y % 8;
        let left = self.window_x.saturating_sub(7) as usize;
        for x in left..SCREEN_WIDTH {
            let window_x = x - left;
            let tile_index = self.vram[map_base + tile_row * 32 + window_x / 8];
            let addr = self.tile_address(tile_index) + tile_y * 2;
            let bit = 7 - window_x % 8;
            let lo = self.vram[addr];
            let hi = self.vram[addr + 1];
            let color_id = ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1);
            self.line_shades[x] = self.background_shades[color_id as usize];
            self.background_zero[x] = color_id == 0;
        }
        // The window keeps its own line counter; it only advances on lines
        // where the window was actually drawn.
        self.window_line = self.window_line.wrapping_add(1);
    }

    fn draw_sprite_line(&mut self) {
        let sprite_height: i16 = if self.control.big_sprites { 16 } else { 8 };
        let mut drawn = [false; SCREEN_WIDTH];
        for &index in &self.line_sprites[..self.line_sprite_count] {
            let sprite = self.sprites[index];
            let mut tile = sprite.tile;
            if sprite_height == 16 {
                tile &= 0xFE;
            }
            let mut line = self.line_y as i16 - sprite.y;
            if sprite.y_flip {
                line = sprite_height - 1 - line;
            }
            // Tall sprites spill into the following tile.
            let addr =
                (tile as usize + (line as usize >> 3)) * 16 + (line as usize & 7) * 2;
            let lo = self.vram[addr];
            let hi = self.vram[addr + 1];
            let shades = &self.object_shades[sprite.use_obp1 as usize];
            for px in 0..8i16 {
                let bit = if sprite.x_flip { px } else { 7 - px };
                let color_id = ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1);
                // Color 0 is transparent for sprites.
                if color_id == 0 {
                    continue;
                }
                let x = sprite.x + px;
                if !(0..SCREEN_WIDTH as i16).contains(&x) || drawn[x as usize] {
                    continue;
                }
                if sprite.behind_background && !self.background_zero[x as usize] {
                    continue;
                }
                self.line_shades[x as usize] = shades[color_id as usize];
                drawn[x as usize] = true;
            }
        }
    }
}

impl Default for Video {
    fn default() -> Self {
        Self::new()
    }
}
