use std::cell::Cell;
use std::rc::Rc;

use dotmatrix_core::gameboy::GAMEBOY_CLOCK;
use dotmatrix_core::interrupt::{Interrupt, InterruptController};
use dotmatrix_core::joypad::{Joypad, JoypadDriver};

const POLL_CYCLES: i64 = GAMEBOY_CLOCK / 64;

/// Test backend whose state the test mutates through shared cells.
struct FakePad {
    buttons: Rc<Cell<u8>>,
    directions: Rc<Cell<u8>>,
}

impl FakePad {
    fn install(joypad: &mut Joypad) -> (Rc<Cell<u8>>, Rc<Cell<u8>>) {
        let buttons = Rc::new(Cell::new(0));
        let directions = Rc::new(Cell::new(0));
        joypad.set_driver(Box::new(FakePad {
            buttons: buttons.clone(),
            directions: directions.clone(),
        }));
        (buttons, directions)
    }
}

impl JoypadDriver for FakePad {
    fn get_button_code(&self) -> u8 {
        self.buttons.get()
    }

    fn get_direction_code(&self) -> u8 {
        self.directions.get()
    }

    fn is_raised(&mut self) -> bool {
        true
    }
}

#[test]
fn idle_pad_reads_all_released() {
    let joypad = Joypad::new();
    // Both groups deselected after reset: all lines high.
    assert_eq!(joypad.read(), 0xFF);
}

#[test]
fn press_is_latched_at_the_polling_rate() {
    let mut joypad = Joypad::new();
    let mut ints = InterruptController::new();
    let (buttons, _) = FakePad::install(&mut joypad);
    buttons.set(0x01); // A

    joypad.emulate(POLL_CYCLES - 1, &mut ints);
    assert!(!ints.is_requested(Interrupt::Joypad));
    joypad.emulate(1, &mut ints);
    assert!(ints.is_requested(Interrupt::Joypad));

    joypad.write(0x10); // select buttons
    assert_eq!(joypad.read(), 0xDE, "A reads low in the selected nibble");
}

#[test]
fn only_new_presses_request_the_interrupt() {
    let mut joypad = Joypad::new();
    let mut ints = InterruptController::new();
    let (buttons, directions) = FakePad::install(&mut joypad);
    buttons.set(0x08); // Start

    joypad.emulate(POLL_CYCLES, &mut ints);
    assert!(ints.is_requested(Interrupt::Joypad));
    ints.set_interrupt_flag(0x00);

    // Held button: no further edge, no further request.
    joypad.emulate(POLL_CYCLES, &mut ints);
    assert!(!ints.is_requested(Interrupt::Joypad));

    // Release: no request either.
    buttons.set(0x00);
    joypad.emulate(POLL_CYCLES, &mut ints);
    assert!(!ints.is_requested(Interrupt::Joypad));

    // A fresh press on the other group is a new edge.
    directions.set(0x04); // Up
    joypad.emulate(POLL_CYCLES, &mut ints);
    assert!(ints.is_requested(Interrupt::Joypad));
}

#[test]
fn read_reflects_only_the_selected_group() {
    let mut joypad = Joypad::new();
    let mut ints = InterruptController::new();
    let (buttons, directions) = FakePad::install(&mut joypad);
    buttons.set(0x01); // A
    directions.set(0x02); // Left
    joypad.emulate(POLL_CYCLES, &mut ints);

    joypad.write(0x20); // directions selected (bit 4 low)
    assert_eq!(joypad.read(), 0xED);
    joypad.write(0x10); // buttons selected (bit 5 low)
    assert_eq!(joypad.read(), 0xDE);
    joypad.write(0x00); // both selected
    assert_eq!(joypad.read(), 0xCC);
    joypad.write(0x30); // neither
    assert_eq!(joypad.read(), 0xFF);
}

#[test]
fn only_the_select_bits_are_writable() {
    let mut joypad = Joypad::new();
    joypad.write(0xFF);
    assert_eq!(joypad.read(), 0xFF, "select bits stored, rest dropped");
    // Clearing both select bits picks both groups; bits 6-7 and the idle
    // low nibble come from the wiring, not from the written value.
    joypad.write(0xCF);
    assert_eq!(joypad.read(), 0xCF);
}
