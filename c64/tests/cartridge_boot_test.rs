//! Cartridge loading through the full system: auto-detection, reset
//! vectors, and the Action Replay freeze path.

use c64::{C64, CartridgeError, VicVariant};
use mos6502::CpuVariant;

const CBM80: [u8; 5] = [0xC3, 0xC2, 0xCD, 0x38, 0x30];

fn kernal_with_vector(target: u16) -> Vec<u8> {
    let mut kernal = vec![0xEA; 8192];
    kernal[0x1FFC] = (target & 0xFF) as u8;
    kernal[0x1FFD] = (target >> 8) as u8;
    kernal
}

fn booted() -> C64 {
    let mut c64 = C64::new(CpuVariant::Nmos6502, VicVariant::Pal6569);
    c64.load_roms(&vec![0xAA; 8192], &kernal_with_vector(0xE000), &vec![0xCC; 4096])
        .unwrap();
    c64.reset();
    c64
}

#[test]
fn test_cbm80_cartridge_scenario() {
    let mut c64 = booted();
    let mut rom = vec![0u8; 0x2000];
    rom[0] = 0x09; // cold start pointer
    rom[1] = 0x80;
    rom[4..9].copy_from_slice(&CBM80);
    rom[0x1FFC] = 0x00; // data, not a vector, in 8K mode
    rom[0x1FFD] = 0x80;
    c64.load_cartridge_bin(&rom).unwrap();

    assert_eq!(c64.peek(0x8000), rom[0]);
    assert_eq!(c64.peek(0x8004), 0xC3);
    assert_eq!(c64.memory().bank_lines(), (false, true));
    // KERNAL still owns the reset vector in 8K mode
    assert_eq!(c64.cpu().pc(), 0xE000);
}

#[test]
fn test_ultimax_cartridge_boots_from_cartridge_vector() {
    let mut c64 = booted();
    let mut rom = vec![0xEAu8; 0x2000];
    rom[0x1FFC] = 0x20;
    rom[0x1FFD] = 0xE0; // reset vector $E020 inside the cartridge
    c64.load_cartridge_bin(&rom).unwrap();

    assert_eq!(c64.memory().bank_lines(), (true, false));
    assert_eq!(c64.cpu().pc(), 0xE020);
    // and the CPU can fetch from the cartridge ROM
    let cycles = c64.step().unwrap();
    assert_eq!(cycles, 2);
    assert_eq!(c64.cpu().pc(), 0xE021);
}

#[test]
fn test_16k_cartridge_replaces_basic() {
    let mut c64 = booted();
    let mut rom = vec![0u8; 0x4000];
    rom[0] = 0x01;
    rom[0x2000] = 0x02;
    c64.load_cartridge_bin(&rom).unwrap();
    assert_eq!(c64.peek(0x8000), 0x01);
    assert_eq!(c64.peek(0xA000), 0x02);
}

#[test]
fn test_invalid_bin_is_rejected_without_killing_the_machine() {
    let mut c64 = booted();
    let err = c64.load_cartridge_bin(&[0u8; 4096]).unwrap_err();
    assert!(matches!(
        err,
        c64::C64Error::Cartridge(CartridgeError::InvalidCartridge(_))
    ));
    // machine unaffected, still boots from KERNAL
    c64.reset();
    assert_eq!(c64.cpu().pc(), 0xE000);
}

fn action_replay_crt() -> Vec<u8> {
    let mut crt: Vec<u8> = Vec::new();
    crt.extend_from_slice(b"C64 CARTRIDGE   ");
    crt.extend_from_slice(&0x40u32.to_be_bytes());
    crt.extend_from_slice(&[1, 0]);
    crt.extend_from_slice(&1u16.to_be_bytes()); // Action Replay
    crt.extend_from_slice(&[0, 0]); // EXROM, GAME
    crt.extend_from_slice(&[0; 6]);
    let mut name = [0u8; 32];
    name[..12].copy_from_slice(b"ACTIONREPLAY");
    crt.extend_from_slice(&name);
    for bank in 0..4u16 {
        crt.extend_from_slice(b"CHIP");
        crt.extend_from_slice(&(16 + 0x2000u32).to_be_bytes());
        crt.extend_from_slice(&0u16.to_be_bytes());
        crt.extend_from_slice(&bank.to_be_bytes());
        crt.extend_from_slice(&0x8000u16.to_be_bytes());
        crt.extend_from_slice(&0x2000u16.to_be_bytes());
        crt.extend_from_slice(&vec![0x40 + bank as u8; 0x2000]);
    }
    crt
}

#[test]
fn test_action_replay_bank_switch_from_cpu() {
    let mut c64 = booted();
    c64.load_cartridge_crt(&action_replay_crt()).unwrap();
    assert_eq!(c64.peek(0x8000), 0x40, "bank 0 after load");

    // LDA #$18; STA $DE00 - selects bank 3 through the control register
    let prg = [0x00, 0x10, 0xA9, 0x18, 0x8D, 0x00, 0xDE];
    c64.load_prg(&prg).unwrap();
    c64.cpu_mut().set_pc(0x1000);
    c64.step().unwrap();
    c64.step().unwrap();
    assert_eq!(c64.peek(0x8000), 0x43);
}

#[test]
fn test_freeze_raises_nmi_and_latches() {
    let mut c64 = booted();
    c64.load_cartridge_crt(&action_replay_crt()).unwrap();

    // point the NMI vector somewhere recognizable (RAM under KERNAL is
    // not used for vectors; patch through RAM and bank KERNAL out)
    c64.poke(0x0001, 0x35);
    c64.poke(0xFFFA, 0x00);
    c64.poke(0xFFFB, 0x40);

    c64.freeze();
    c64.step().unwrap();
    assert_eq!(c64.cpu().pc(), 0x4000, "NMI serviced");
    match c64.memory().cartridge().unwrap() {
        c64::Cartridge::ActionReplay(ar) => assert!(ar.frozen()),
        other => panic!("unexpected cartridge {other:?}"),
    }
}

#[test]
fn test_unsupported_crt_type() {
    let mut c64 = booted();
    let mut crt = action_replay_crt();
    crt[0x16] = 0x00;
    crt[0x17] = 0x05; // Ocean type 1
    let err = c64.load_cartridge_crt(&crt).unwrap_err();
    assert!(matches!(
        err,
        c64::C64Error::Cartridge(CartridgeError::UnsupportedCartridge { hardware_type: 5 })
    ));
}
