use dotmatrix_core::interrupt::{Interrupt, InterruptController};
use dotmatrix_core::video::{Mode, VBlankPhase, Video};

const SCANLINE: i64 = 114;
const FRAME: i64 = 154 * SCANLINE;

fn enabled_video() -> (Video, InterruptController) {
    let mut video = Video::new();
    let mut ints = InterruptController::new();
    video.write(0xFF40, 0x91, &mut ints);
    (video, ints)
}

#[test]
fn one_scanline_returns_to_oam_scan() {
    let (mut video, mut ints) = enabled_video();
    assert_eq!(video.mode(), Mode::OamScan);
    assert_eq!(video.line_y(), 0);

    // MODE_2 + MODE_3_BEGIN + MODE_3_END + MODE_0 = 20 + 12 + 32 + 50
    video.emulate(SCANLINE, &mut ints);
    assert_eq!(video.line_y(), 1);
    assert_eq!(video.mode(), Mode::OamScan);
}

#[test]
fn mode_sequence_within_a_line() {
    let (mut video, mut ints) = enabled_video();
    video.emulate(20, &mut ints);
    assert_eq!(video.mode().bits(), 3);
    video.emulate(12 + 32, &mut ints);
    assert_eq!(video.mode().bits(), 0);
    video.emulate(50, &mut ints);
    assert_eq!(video.mode().bits(), 2);
}

#[test]
fn stat_mode_bits_follow_the_state_machine() {
    let (mut video, mut ints) = enabled_video();
    assert_eq!(video.read(0xFF41) & 0x03, 2);
    video.emulate(20, &mut ints);
    assert_eq!(video.read(0xFF41) & 0x03, 3);
    video.emulate(44, &mut ints);
    assert_eq!(video.read(0xFF41) & 0x03, 0);
    video.emulate(144 * SCANLINE - 64, &mut ints);
    assert_eq!(video.read(0xFF41) & 0x03, 1);
}

#[test]
fn vblank_interrupt_fires_eight_cycles_into_line_144() {
    let (mut video, mut ints) = enabled_video();
    video.emulate(144 * SCANLINE, &mut ints);
    assert_eq!(video.line_y(), 144);
    assert_eq!(video.mode(), Mode::VBlank(VBlankPhase::Entry));
    assert!(!ints.is_requested(Interrupt::VBlank));

    video.emulate(8, &mut ints);
    assert!(ints.is_requested(Interrupt::VBlank));
}

#[test]
fn line_y_wraps_during_line_153() {
    let (mut video, mut ints) = enabled_video();
    video.emulate(153 * SCANLINE, &mut ints);
    assert_eq!(video.line_y(), 153);
    assert_eq!(video.mode(), Mode::VBlank(VBlankPhase::Wrap));
    video.emulate(1, &mut ints);
    assert_eq!(video.line_y(), 0);
    assert_eq!(video.mode(), Mode::VBlank(VBlankPhase::LineZero));
    video.emulate(SCANLINE - 1, &mut ints);
    assert_eq!(video.mode(), Mode::OamScan);
    assert_eq!(video.line_y(), 0);
}

#[test]
fn a_frame_is_exactly_17556_cycles() {
    let (mut video, mut ints) = enabled_video();
    assert_eq!(FRAME, 17556);
    video.emulate(FRAME, &mut ints);
    assert_eq!(video.line_y(), 0);
    assert_eq!(video.mode(), Mode::OamScan);
    assert_eq!(video.frame_count(), 1);
}

#[test]
fn lyc_coincidence_interrupt_fires_once_per_line() {
    let (mut video, mut ints) = enabled_video();
    video.write(0xFF45, 2, &mut ints);
    video.write(0xFF41, 0x40, &mut ints);
    ints.set_interrupt_flag(0x00);

    video.emulate(2 * SCANLINE, &mut ints);
    assert_eq!(video.line_y(), 2);
    assert!(ints.is_requested(Interrupt::Lcd));
    assert_ne!(video.read(0xFF41) & 0x04, 0, "coincidence flag set");

    // Enabling the mode sources now must not re-fire for the already
    // flagged line, and the OAM/HBlank sources stay suppressed by the
    // gate until the flag clears on line 3.
    video.write(0xFF41, 0x78, &mut ints);
    ints.set_interrupt_flag(0x00);
    video.emulate(SCANLINE - 20, &mut ints);
    assert!(!ints.is_requested(Interrupt::Lcd));
    video.emulate(20, &mut ints);
    assert_eq!(video.line_y(), 3);
    assert_eq!(video.read(0xFF41) & 0x04, 0);
    assert!(ints.is_requested(Interrupt::Lcd), "mode sources resume");
}

#[test]
fn hblank_stat_source() {
    let (mut video, mut ints) = enabled_video();
    video.write(0xFF41, 0x08, &mut ints);
    video.emulate(20 + 12 + 32, &mut ints);
    assert_eq!(video.mode().bits(), 0);
    assert!(ints.is_requested(Interrupt::Lcd));
}

#[test]
fn disabled_lcd_keeps_time_passing() {
    let mut video = Video::new();
    let mut ints = InterruptController::new();
    // LCD off: the state machine must not run, but budgets must refill.
    for _ in 0..10 {
        video.emulate(SCANLINE, &mut ints);
        assert!(video.get_cycles() > 0);
    }
    assert_eq!(video.line_y(), 0);
    assert!(!ints.is_requested(Interrupt::VBlank));
}

#[test]
fn disabling_the_lcd_resets_the_line_counter() {
    let (mut video, mut ints) = enabled_video();
    video.emulate(5 * SCANLINE, &mut ints);
    assert_eq!(video.line_y(), 5);
    video.write(0xFF40, 0x11, &mut ints);
    assert_eq!(video.line_y(), 0);
    assert_eq!(video.read(0xFF44), 0);
    // Re-enabling restarts from OAM scan on line 0.
    video.write(0xFF40, 0x91, &mut ints);
    assert_eq!(video.mode(), Mode::OamScan);
}

#[test]
fn background_renders_through_the_driver() {
    let (mut video, mut ints) = enabled_video();
    // Tile 0 at color id 3 everywhere; identity-ish palette 0b11100100.
    for row in 0..8 {
        video.write_vram(0x8000 + row * 2, 0xFF);
        video.write_vram(0x8000 + row * 2 + 1, 0xFF);
    }
    video.write(0xFF47, 0xE4, &mut ints);

    video.emulate(SCANLINE, &mut ints);
    let pixels = video.driver().get_pixels();
    assert!(pixels[..160].iter().all(|&shade| shade == 3));
    // Line 1 has not been drawn yet.
    assert!(pixels[160..320].iter().all(|&shade| shade == 0));
}

#[test]
fn sprite_overlays_background() {
    let (mut video, mut ints) = enabled_video();
    // Enable sprites; background tile 0 stays color 0.
    video.write(0xFF40, 0x93, &mut ints);
    video.write(0xFF47, 0xE4, &mut ints);
    video.write(0xFF48, 0xE4, &mut ints);
    // Tile 1: color id 1 on every pixel.
    for row in 0..8 {
        video.write_vram(0x8010 + row * 2, 0xFF);
        video.write_vram(0x8010 + row * 2 + 1, 0x00);
    }
    // Sprite 0 at screen origin using tile 1.
    video.write_oam(0xFE00, 16);
    video.write_oam(0xFE01, 8);
    video.write_oam(0xFE02, 1);
    video.write_oam(0xFE03, 0x00);

    video.emulate(SCANLINE, &mut ints);
    let pixels = video.driver().get_pixels();
    assert_eq!(pixels[0], 1, "sprite pixel");
    assert_eq!(pixels[8], 0, "background beyond the sprite");
}

#[test]
fn behind_background_sprite_loses_to_nonzero_background() {
    let (mut video, mut ints) = enabled_video();
    video.write(0xFF40, 0x93, &mut ints);
    video.write(0xFF47, 0xE4, &mut ints);
    video.write(0xFF48, 0xE4, &mut ints);
    // Background tile 0: color id 2; sprite tile 1: color id 1.
    for row in 0..8 {
        video.write_vram(0x8000 + row * 2, 0x00);
        video.write_vram(0x8000 + row * 2 + 1, 0xFF);
        video.write_vram(0x8010 + row * 2, 0xFF);
        video.write_vram(0x8010 + row * 2 + 1, 0x00);
    }
    video.write_oam(0xFE00, 16);
    video.write_oam(0xFE01, 8);
    video.write_oam(0xFE02, 1);
    video.write_oam(0xFE03, 0x80); // behind background

    video.emulate(SCANLINE, &mut ints);
    assert_eq!(video.driver().get_pixels()[0], 2);
}
