//! 65C02-only behavior: new opcodes, the zero-page-indirect mode, the
//! bit instructions, and the one-cycle NOP fill.

use mos6502::{CpuError, CpuVariant, FlatMemory, MemoryBus, CPU};

fn setup() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory, CpuVariant::Cmos65C02)
}

#[test]
fn test_bra_branches_always() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x80, 0x10]); // BRA +16
    cpu.set_flag_z(true);
    cpu.set_flag_c(true);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8012);
    assert_eq!(cycles, 3);
}

#[test]
fn test_stz_forms() {
    let mut cpu = setup();
    cpu.memory_mut().write(0x0010, 0xFF);
    cpu.memory_mut().write(0x2000, 0xFF);
    cpu.memory_mut().load(0x8000, &[0x64, 0x10, 0x9C, 0x00, 0x20]); // STZ $10; STZ $2000
    cpu.set_flag_z(false);
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x0010), 0x00);
    assert_eq!(cpu.memory_mut().read(0x2000), 0x00);
    assert!(!cpu.flag_z(), "STZ affects no flags");
}

#[test]
fn test_phx_plx_phy_ply() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xDA, 0x5A, 0xFA, 0x7A]); // PHX; PHY; PLX; PLY
    cpu.set_x(0x11);
    cpu.set_y(0x22);
    cpu.step().unwrap();
    cpu.step().unwrap();
    cpu.set_x(0);
    cpu.set_y(0);
    cpu.step().unwrap(); // PLX pulls the pushed Y
    cpu.step().unwrap(); // PLY pulls the pushed X
    assert_eq!(cpu.x(), 0x22);
    assert_eq!(cpu.y(), 0x11);
}

#[test]
fn test_inc_dec_accumulator() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x1A, 0x1A, 0x3A]); // INC A; INC A; DEC A
    cpu.set_a(0xFE);
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0xFF);
    assert!(cpu.flag_n());
}

#[test]
fn test_lda_zero_page_indirect() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0xB2, 0x40]); // LDA ($40)
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x30);
    cpu.memory_mut().write(0x3000, 0x5C);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x5C);
    assert_eq!(cycles, 5);
}

#[test]
fn test_sta_zero_page_indirect() {
    let mut cpu = setup();
    cpu.memory_mut().load(0x8000, &[0x92, 0x40]); // STA ($40)
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x30);
    cpu.set_a(0x99);
    cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x3000), 0x99);
}

#[test]
fn test_rmb_smb() {
    let mut cpu = setup();
    // RMB3 $10; SMB7 $10
    cpu.memory_mut().load(0x8000, &[0x37, 0x10, 0xF7, 0x10]);
    cpu.memory_mut().write(0x0010, 0x0F);
    cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x0010), 0x07, "bit 3 cleared");
    cpu.step().unwrap();
    assert_eq!(cpu.memory_mut().read(0x0010), 0x87, "bit 7 set");
}

#[test]
fn test_bbr_bbs() {
    let mut cpu = setup();
    cpu.memory_mut().write(0x0010, 0b0000_0100);
    // BBS2 $10,+5 : bit 2 is set, branch taken
    cpu.memory_mut().load(0x8000, &[0xAF, 0x10, 0x05]);
    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8008);
    assert_eq!(cycles, 5);

    // BBR2 $10,+5 : bit 2 is set, not taken
    cpu.memory_mut().load(0x8008, &[0x2F, 0x10, 0x05]);
    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x800B);
}

#[test]
fn test_undefined_slots_are_one_cycle_nops() {
    let mut cpu = setup();
    cpu.memory_mut().write(0x8000, 0x02); // JAM on NMOS
    let cycles = cpu.step().unwrap();
    assert_eq!(cycles, 1);
    assert_eq!(cpu.pc(), 0x8001);
}

#[test]
fn test_nmos_jam_slot_runs_as_two_cycle_nop() {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    memory.write(0x8000, 0x02);
    let mut cpu = CPU::new(memory, CpuVariant::Nmos6502);
    let cycles = cpu.step().unwrap();
    assert_eq!(cycles, 2);
    assert_eq!(cpu.pc(), 0x8001);
}

#[test]
fn test_strict_mode_rejects_undefined_nmos_opcode() {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    memory.write(0x8000, 0x02);
    let mut cpu = CPU::new(memory, CpuVariant::Nmos6502);
    cpu.set_strict(true);
    match cpu.step() {
        Err(CpuError::InvalidOpcode { opcode: 0x02, pc: 0x8000 }) => {}
        other => panic!("expected InvalidOpcode, got {other:?}"),
    }
    assert_eq!(cpu.pc(), 0x8001, "PC advances so a harness can continue");
}

#[test]
fn test_unofficial_nop_lengths_advance_pc() {
    // $04 = 2-byte NOP, $0C = 3-byte NOP on NMOS
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    memory.load(0x8000, &[0x04, 0x10, 0x0C, 0x00, 0x20]);
    let mut cpu = CPU::new(memory, CpuVariant::Nmos6502);

    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cycles, 3);

    let cycles = cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8005);
    assert_eq!(cycles, 4);
}
