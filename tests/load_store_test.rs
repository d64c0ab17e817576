//! Loads, stores, transfers, and addressing-mode edge cases.

use mos6502::{CpuVariant, FlatMemory, MemoryBus, CPU};

fn setup() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory, CpuVariant::Nmos6502)
}

#[test]
fn test_lda_tax_flags() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xA9, 0xFF, 0xAA]); // LDA #$FF; TAX
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0xFF);
    assert_eq!(cpu.x(), 0xFF);
    assert!(cpu.flag_n());
    assert!(!cpu.flag_z());
}

#[test]
fn test_lda_zero_sets_z() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xA9, 0x00]);
    cpu.step().unwrap();
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_zero_page_indexed_wraps_not_into_stack_page() {
    let mut cpu = setup();
    // LDX #$01; LDA $FF,X -> effective $0000, not $0100
    cpu.memory_mut().load(0x8000, &[0xA2, 0x01, 0xB5, 0xFF]);
    cpu.memory_mut().write(0x0000, 0x42);
    cpu.memory_mut().write(0x0100, 0x99);
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x42);
}

#[test]
fn test_indirect_y_load() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xB1, 0x40]); // LDA ($40),Y
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x30); // base $3000
    cpu.memory_mut().write(0x3005, 0x77);
    cpu.set_y(0x05);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x77);
    assert_eq!(cycles, 5, "no page cross");
}

#[test]
fn test_sta_absolute_x_no_conditional_penalty() {
    let mut cpu = setup();
    // stores pay the worst case whether or not the index crosses
    cpu.memory_mut().load(0x8000, &[0x9D, 0xFF, 0x20]); // STA $20FF,X
    cpu.set_a(0x33);
    cpu.set_x(0x01);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x2100), 0x33);
    assert_eq!(cycles, 5);

    cpu.set_pc(0x8000);
    cpu.set_x(0x00);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x20FF), 0x33);
    assert_eq!(cycles, 5, "same cost without the cross");
}

#[test]
fn test_sta_does_not_touch_flags() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x85, 0x10]); // STA $10
    cpu.set_a(0x00);
    cpu.set_flag_z(false);
    cpu.set_flag_n(true);
    cpu.step().unwrap();
    assert!(!cpu.flag_z());
    assert!(cpu.flag_n());
}

#[test]
fn test_txa_tax_identity() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x8A, 0xAA]); // TXA; TAX
    cpu.set_x(0x5A);
    cpu.set_a(0x00);
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x5A);
    assert_eq!(cpu.x(), 0x5A);
    assert!(!cpu.flag_n());
    assert!(!cpu.flag_z());
}

#[test]
fn test_txs_does_not_touch_flags() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x9A]); // TXS
    cpu.set_x(0x00);
    cpu.set_flag_z(false);
    cpu.step().unwrap();
    assert_eq!(cpu.sp(), 0x00);
    assert!(!cpu.flag_z(), "TXS affects no flags");
}

#[test]
fn test_rmw_absolute_x_worst_case_cycles() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xFE, 0x00, 0x20]); // INC $2000,X
    cpu.memory_mut().write(0x2001, 0x41);
    cpu.set_x(0x01);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x2001), 0x42);
    assert_eq!(cycles, 7);
}

#[test]
fn test_asl_memory_and_carry() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x06, 0x10]); // ASL $10
    cpu.memory_mut().write(0x0010, 0x81);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x0010), 0x02);
    assert!(cpu.flag_c(), "bit 7 went to carry");
    assert_eq!(cycles, 5);
}

#[test]
fn test_ror_through_carry() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x6A]); // ROR A
    cpu.set_a(0x01);
    cpu.set_flag_c(true);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_c());
    assert!(cpu.flag_n());
}
