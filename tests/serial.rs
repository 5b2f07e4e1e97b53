use dotmatrix_core::interrupt::{Interrupt, InterruptController};
use dotmatrix_core::serial::{NullLinkPort, Serial};

const TRANSFER_CYCLES: i64 = 1024;

#[test]
fn internally_clocked_transfer_completes_after_1024_cycles() {
    let mut serial = Serial::new();
    let mut ints = InterruptController::new();
    serial.set_link_port(Box::new(NullLinkPort::new(true)));
    serial.write(0xFF01, 0x42);
    serial.write(0xFF02, 0x81);

    serial.emulate(TRANSFER_CYCLES - 1, &mut ints);
    assert!(!ints.is_requested(Interrupt::Serial));
    assert_eq!(serial.read(0xFF02), 0x81 | 0x7E, "start bit still set");

    serial.emulate(1, &mut ints);
    assert!(ints.is_requested(Interrupt::Serial));
    assert_eq!(serial.read(0xFF01), 0x42, "loopback echoes the sent byte");
    assert_eq!(serial.read(0xFF02) & 0x80, 0, "start bit cleared");
}

#[test]
fn dead_line_receives_ff() {
    let mut serial = Serial::new();
    let mut ints = InterruptController::new();
    serial.write(0xFF01, 0x42);
    serial.write(0xFF02, 0x81);
    serial.emulate(TRANSFER_CYCLES, &mut ints);
    assert_eq!(serial.read(0xFF01), 0xFF);
    assert!(ints.is_requested(Interrupt::Serial));
}

#[test]
fn external_clock_never_completes_on_its_own() {
    let mut serial = Serial::new();
    let mut ints = InterruptController::new();
    serial.write(0xFF01, 0x42);
    serial.write(0xFF02, 0x80); // start, external clock
    serial.emulate(TRANSFER_CYCLES * 10, &mut ints);
    assert_eq!(serial.read(0xFF01), 0x42);
    assert_eq!(serial.read(0xFF02) & 0x80, 0x80);
    assert!(!ints.is_requested(Interrupt::Serial));
}

#[test]
fn restarting_a_transfer_restarts_the_clock() {
    let mut serial = Serial::new();
    let mut ints = InterruptController::new();
    serial.write(0xFF02, 0x81);
    serial.emulate(TRANSFER_CYCLES - 1, &mut ints);
    // Rewriting SC with the start bit re-arms the full period.
    serial.write(0xFF02, 0x81);
    serial.emulate(TRANSFER_CYCLES - 1, &mut ints);
    assert!(!ints.is_requested(Interrupt::Serial));
    serial.emulate(1, &mut ints);
    assert!(ints.is_requested(Interrupt::Serial));
}

#[test]
fn sc_reads_with_unwired_bits_high() {
    let mut serial = Serial::new();
    assert_eq!(serial.read(0xFF02), 0x7E);
    serial.write(0xFF02, 0x01);
    assert_eq!(serial.read(0xFF02), 0x7F);
    // Unwired middle bits are not stored.
    serial.write(0xFF02, 0x7E);
    assert_eq!(serial.read(0xFF02), 0x7E);
}
