use dotmatrix_core::registers::{DoubleRegister, FlagRegister, Register, FLAG_C, FLAG_H, FLAG_Z};

#[test]
fn register_reset_restores_the_power_on_value() {
    let mut r = Register::new(0xB0);
    assert_eq!(r.get(), 0xB0);
    r.set(0x12);
    assert_eq!(r.get(), 0x12);
    r.reset();
    assert_eq!(r.get(), 0xB0);
}

#[test]
fn double_register_halves_stay_in_sync() {
    let mut rr = DoubleRegister::new(0x01, 0x4D);
    assert_eq!(rr.get(), 0x014D);
    rr.set(0xBEEF);
    assert_eq!(rr.hi.get(), 0xBE);
    assert_eq!(rr.lo.get(), 0xEF);
    rr.hi.set(0xC0);
    assert_eq!(rr.get(), 0xC0EF);
}

#[test]
fn double_register_arithmetic_wraps() {
    let mut rr = DoubleRegister::new(0xFF, 0xFF);
    rr.inc();
    assert_eq!(rr.get(), 0x0000);
    rr.dec();
    assert_eq!(rr.get(), 0xFFFF);
    rr.add(0x0002);
    assert_eq!(rr.get(), 0x0001);
}

#[test]
fn flag_register_round_trips_writes() {
    let mut flag = FlagRegister::new(0x00);
    // The lower nibble has no named bits but writes must read back.
    flag.set(0xB5);
    assert_eq!(flag.get(), 0xB5);
    assert!(flag.zero);
    assert!(!flag.subtract);
    assert!(flag.half_carry);
    assert!(flag.carry);
    flag.set(0x40);
    assert_eq!(flag.get(), 0x40);
    assert!(flag.subtract);
}

#[test]
fn flag_register_reset_and_clear() {
    let mut flag = FlagRegister::new(FLAG_Z | FLAG_C);
    assert_eq!(flag.get(), FLAG_Z | FLAG_C);
    flag.set(0xFF);
    flag.clear();
    assert_eq!(flag.get(), 0x00);
    flag.reset();
    assert_eq!(flag.get(), FLAG_Z | FLAG_C);
}

#[test]
fn zero_check_polarity() {
    let mut flag = FlagRegister::new(0);
    flag.zero_check(0);
    assert!(flag.zero);
    flag.zero_check(1);
    assert!(!flag.zero);
}

#[test]
fn half_carry_compare_is_a_nibble_borrow() {
    let mut flag = FlagRegister::new(0);
    // Borrow when the subtrahend's low nibble exceeds the minuend's.
    flag.half_carry_compare(0x01, 0x10);
    assert!(flag.half_carry);
    flag.half_carry_compare(0x10, 0x01);
    assert!(!flag.half_carry);
    flag.half_carry_compare(0x0F, 0x0F);
    assert!(!flag.half_carry);
    assert_eq!(flag.get() & FLAG_H, 0);
}
