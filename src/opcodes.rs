//! # Opcode Metadata Tables
//!
//! The 256-entry opcode metadata tables that serve as the single source of
//! truth for instruction decoding: one table for the NMOS parts
//! (6502/6502A/6502C) and one for the CMOS 65C02, selected through
//! [`crate::CpuVariant::table`].
//!
//! Each entry carries the mnemonic, addressing mode, base cycle cost,
//! instruction size, and whether an indexed read adds a cycle on page
//! crossing.
//!
//! Undefined NMOS slots are listed with the mnemonic `"???"` and the
//! length/cycle cost those opcodes exhibit on real silicon (the stable
//! unofficial-NOP subset), so test ROMs that stumble into them advance
//! deterministically. The CMOS table replaces all of them with true
//! one-cycle NOPs and layers the 65C02 additions on top.

use crate::addressing::AddressingMode;
use crate::addressing::AddressingMode::*;

/// Metadata for a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic ("LDA", "STA", "???" for undefined NMOS slots).
    ///
    /// The CMOS bit instructions appear as "RMB"/"SMB"/"BBR"/"BBS"; the
    /// bit number is encoded in bits 4-6 of the opcode itself.
    pub mnemonic: &'static str,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Base cycle cost, before page-crossing and branch penalties.
    pub base_cycles: u8,

    /// Total instruction size in bytes (opcode + operands).
    pub size_bytes: u8,

    /// Whether an indexed *read* through this entry costs one extra cycle
    /// when the effective address crosses a page boundary. Writes and
    /// read-modify-write forms always pay the worst case in `base_cycles`.
    pub page_cross_adds_cycle: bool,

    /// True for slots with no documented instruction. Executed as NOPs of
    /// `size_bytes`/`base_cycles` unless strict mode is enabled.
    pub undocumented: bool,
}

const fn op(
    mnemonic: &'static str,
    addressing_mode: AddressingMode,
    base_cycles: u8,
    size_bytes: u8,
) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        addressing_mode,
        base_cycles,
        size_bytes,
        page_cross_adds_cycle: false,
        undocumented: false,
    }
}

/// Same as [`op`] but with the page-cross read penalty.
const fn op_pc(
    mnemonic: &'static str,
    addressing_mode: AddressingMode,
    base_cycles: u8,
    size_bytes: u8,
) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        addressing_mode,
        base_cycles,
        size_bytes,
        page_cross_adds_cycle: true,
        undocumented: false,
    }
}

/// Undefined NMOS slot executing as an unofficial NOP.
const fn bad(addressing_mode: AddressingMode, base_cycles: u8, size_bytes: u8) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic: "???",
        addressing_mode,
        base_cycles,
        size_bytes,
        page_cross_adds_cycle: false,
        undocumented: true,
    }
}

/// Undefined NMOS slot whose unofficial NOP pays the page-cross penalty
/// (the $1C/$3C/... NOP abs,X family).
const fn bad_pc(addressing_mode: AddressingMode, base_cycles: u8, size_bytes: u8) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic: "???",
        addressing_mode,
        base_cycles,
        size_bytes,
        page_cross_adds_cycle: true,
        undocumented: true,
    }
}

/// Opcode table for the NMOS 6502/6502A/6502C.
///
/// 151 documented instructions; the 105 undefined slots carry the
/// length/cycle counts of their unofficial-NOP behavior (JAM opcodes are
/// listed as one-byte two-cycle NOPs rather than halting).
pub const NMOS_OPCODE_TABLE: [OpcodeMetadata; 256] = [
    op("BRK", Implicit, 7, 1),      // 00
    op("ORA", IndirectX, 6, 2),     // 01
    bad(Implicit, 2, 1),            // 02 JAM
    bad(IndirectX, 8, 2),           // 03
    bad(ZeroPage, 3, 2),            // 04
    op("ORA", ZeroPage, 3, 2),      // 05
    op("ASL", ZeroPage, 5, 2),      // 06
    bad(ZeroPage, 5, 2),            // 07
    op("PHP", Implicit, 3, 1),      // 08
    op("ORA", Immediate, 2, 2),     // 09
    op("ASL", Accumulator, 2, 1),   // 0A
    bad(Immediate, 2, 2),           // 0B
    bad(Absolute, 4, 3),            // 0C
    op("ORA", Absolute, 4, 3),      // 0D
    op("ASL", Absolute, 6, 3),      // 0E
    bad(Absolute, 6, 3),            // 0F
    op("BPL", Relative, 2, 2),      // 10
    op_pc("ORA", IndirectY, 5, 2),  // 11
    bad(Implicit, 2, 1),            // 12 JAM
    bad(IndirectY, 8, 2),           // 13
    bad(ZeroPageX, 4, 2),           // 14
    op("ORA", ZeroPageX, 4, 2),     // 15
    op("ASL", ZeroPageX, 6, 2),     // 16
    bad(ZeroPageX, 6, 2),           // 17
    op("CLC", Implicit, 2, 1),      // 18
    op_pc("ORA", AbsoluteY, 4, 3),  // 19
    bad(Implicit, 2, 1),            // 1A
    bad(AbsoluteY, 7, 3),           // 1B
    bad_pc(AbsoluteX, 4, 3),        // 1C
    op_pc("ORA", AbsoluteX, 4, 3),  // 1D
    op("ASL", AbsoluteX, 7, 3),     // 1E
    bad(AbsoluteX, 7, 3),           // 1F
    op("JSR", Absolute, 6, 3),      // 20
    op("AND", IndirectX, 6, 2),     // 21
    bad(Implicit, 2, 1),            // 22 JAM
    bad(IndirectX, 8, 2),           // 23
    op("BIT", ZeroPage, 3, 2),      // 24
    op("AND", ZeroPage, 3, 2),      // 25
    op("ROL", ZeroPage, 5, 2),      // 26
    bad(ZeroPage, 5, 2),            // 27
    op("PLP", Implicit, 4, 1),      // 28
    op("AND", Immediate, 2, 2),     // 29
    op("ROL", Accumulator, 2, 1),   // 2A
    bad(Immediate, 2, 2),           // 2B
    op("BIT", Absolute, 4, 3),      // 2C
    op("AND", Absolute, 4, 3),      // 2D
    op("ROL", Absolute, 6, 3),      // 2E
    bad(Absolute, 6, 3),            // 2F
    op("BMI", Relative, 2, 2),      // 30
    op_pc("AND", IndirectY, 5, 2),  // 31
    bad(Implicit, 2, 1),            // 32 JAM
    bad(IndirectY, 8, 2),           // 33
    bad(ZeroPageX, 4, 2),           // 34
    op("AND", ZeroPageX, 4, 2),     // 35
    op("ROL", ZeroPageX, 6, 2),     // 36
    bad(ZeroPageX, 6, 2),           // 37
    op("SEC", Implicit, 2, 1),      // 38
    op_pc("AND", AbsoluteY, 4, 3),  // 39
    bad(Implicit, 2, 1),            // 3A
    bad(AbsoluteY, 7, 3),           // 3B
    bad_pc(AbsoluteX, 4, 3),        // 3C
    op_pc("AND", AbsoluteX, 4, 3),  // 3D
    op("ROL", AbsoluteX, 7, 3),     // 3E
    bad(AbsoluteX, 7, 3),           // 3F
    op("RTI", Implicit, 6, 1),      // 40
    op("EOR", IndirectX, 6, 2),     // 41
    bad(Implicit, 2, 1),            // 42 JAM
    bad(IndirectX, 8, 2),           // 43
    bad(ZeroPage, 3, 2),            // 44
    op("EOR", ZeroPage, 3, 2),      // 45
    op("LSR", ZeroPage, 5, 2),      // 46
    bad(ZeroPage, 5, 2),            // 47
    op("PHA", Implicit, 3, 1),      // 48
    op("EOR", Immediate, 2, 2),     // 49
    op("LSR", Accumulator, 2, 1),   // 4A
    bad(Immediate, 2, 2),           // 4B
    op("JMP", Absolute, 3, 3),      // 4C
    op("EOR", Absolute, 4, 3),      // 4D
    op("LSR", Absolute, 6, 3),      // 4E
    bad(Absolute, 6, 3),            // 4F
    op("BVC", Relative, 2, 2),      // 50
    op_pc("EOR", IndirectY, 5, 2),  // 51
    bad(Implicit, 2, 1),            // 52 JAM
    bad(IndirectY, 8, 2),           // 53
    bad(ZeroPageX, 4, 2),           // 54
    op("EOR", ZeroPageX, 4, 2),     // 55
    op("LSR", ZeroPageX, 6, 2),     // 56
    bad(ZeroPageX, 6, 2),           // 57
    op("CLI", Implicit, 2, 1),      // 58
    op_pc("EOR", AbsoluteY, 4, 3),  // 59
    bad(Implicit, 2, 1),            // 5A
    bad(AbsoluteY, 7, 3),           // 5B
    bad_pc(AbsoluteX, 4, 3),        // 5C
    op_pc("EOR", AbsoluteX, 4, 3),  // 5D
    op("LSR", AbsoluteX, 7, 3),     // 5E
    bad(AbsoluteX, 7, 3),           // 5F
    op("RTS", Implicit, 6, 1),      // 60
    op("ADC", IndirectX, 6, 2),     // 61
    bad(Implicit, 2, 1),            // 62 JAM
    bad(IndirectX, 8, 2),           // 63
    bad(ZeroPage, 3, 2),            // 64
    op("ADC", ZeroPage, 3, 2),      // 65
    op("ROR", ZeroPage, 5, 2),      // 66
    bad(ZeroPage, 5, 2),            // 67
    op("PLA", Implicit, 4, 1),      // 68
    op("ADC", Immediate, 2, 2),     // 69
    op("ROR", Accumulator, 2, 1),   // 6A
    bad(Immediate, 2, 2),           // 6B
    op("JMP", Indirect, 5, 3),      // 6C
    op("ADC", Absolute, 4, 3),      // 6D
    op("ROR", Absolute, 6, 3),      // 6E
    bad(Absolute, 6, 3),            // 6F
    op("BVS", Relative, 2, 2),      // 70
    op_pc("ADC", IndirectY, 5, 2),  // 71
    bad(Implicit, 2, 1),            // 72 JAM
    bad(IndirectY, 8, 2),           // 73
    bad(ZeroPageX, 4, 2),           // 74
    op("ADC", ZeroPageX, 4, 2),     // 75
    op("ROR", ZeroPageX, 6, 2),     // 76
    bad(ZeroPageX, 6, 2),           // 77
    op("SEI", Implicit, 2, 1),      // 78
    op_pc("ADC", AbsoluteY, 4, 3),  // 79
    bad(Implicit, 2, 1),            // 7A
    bad(AbsoluteY, 7, 3),           // 7B
    bad_pc(AbsoluteX, 4, 3),        // 7C
    op_pc("ADC", AbsoluteX, 4, 3),  // 7D
    op("ROR", AbsoluteX, 7, 3),     // 7E
    bad(AbsoluteX, 7, 3),           // 7F
    bad(Immediate, 2, 2),           // 80
    op("STA", IndirectX, 6, 2),     // 81
    bad(Immediate, 2, 2),           // 82
    bad(IndirectX, 6, 2),           // 83
    op("STY", ZeroPage, 3, 2),      // 84
    op("STA", ZeroPage, 3, 2),      // 85
    op("STX", ZeroPage, 3, 2),      // 86
    bad(ZeroPage, 3, 2),            // 87
    op("DEY", Implicit, 2, 1),      // 88
    bad(Immediate, 2, 2),           // 89
    op("TXA", Implicit, 2, 1),      // 8A
    bad(Immediate, 2, 2),           // 8B
    op("STY", Absolute, 4, 3),      // 8C
    op("STA", Absolute, 4, 3),      // 8D
    op("STX", Absolute, 4, 3),      // 8E
    bad(Absolute, 4, 3),            // 8F
    op("BCC", Relative, 2, 2),      // 90
    op("STA", IndirectY, 6, 2),     // 91
    bad(Implicit, 2, 1),            // 92 JAM
    bad(IndirectY, 6, 2),           // 93
    op("STY", ZeroPageX, 4, 2),     // 94
    op("STA", ZeroPageX, 4, 2),     // 95
    op("STX", ZeroPageY, 4, 2),     // 96
    bad(ZeroPageY, 4, 2),           // 97
    op("TYA", Implicit, 2, 1),      // 98
    op("STA", AbsoluteY, 5, 3),     // 99
    op("TXS", Implicit, 2, 1),      // 9A
    bad(AbsoluteY, 5, 3),           // 9B
    bad(AbsoluteX, 5, 3),           // 9C
    op("STA", AbsoluteX, 5, 3),     // 9D
    bad(AbsoluteY, 5, 3),           // 9E
    bad(AbsoluteY, 5, 3),           // 9F
    op("LDY", Immediate, 2, 2),     // A0
    op("LDA", IndirectX, 6, 2),     // A1
    op("LDX", Immediate, 2, 2),     // A2
    bad(IndirectX, 6, 2),           // A3
    op("LDY", ZeroPage, 3, 2),      // A4
    op("LDA", ZeroPage, 3, 2),      // A5
    op("LDX", ZeroPage, 3, 2),      // A6
    bad(ZeroPage, 3, 2),            // A7
    op("TAY", Implicit, 2, 1),      // A8
    op("LDA", Immediate, 2, 2),     // A9
    op("TAX", Implicit, 2, 1),      // AA
    bad(Immediate, 2, 2),           // AB
    op("LDY", Absolute, 4, 3),      // AC
    op("LDA", Absolute, 4, 3),      // AD
    op("LDX", Absolute, 4, 3),      // AE
    bad(Absolute, 4, 3),            // AF
    op("BCS", Relative, 2, 2),      // B0
    op_pc("LDA", IndirectY, 5, 2),  // B1
    bad(Implicit, 2, 1),            // B2 JAM
    bad_pc(IndirectY, 5, 2),        // B3
    op("LDY", ZeroPageX, 4, 2),     // B4
    op("LDA", ZeroPageX, 4, 2),     // B5
    op("LDX", ZeroPageY, 4, 2),     // B6
    bad(ZeroPageY, 4, 2),           // B7
    op("CLV", Implicit, 2, 1),      // B8
    op_pc("LDA", AbsoluteY, 4, 3),  // B9
    op("TSX", Implicit, 2, 1),      // BA
    bad_pc(AbsoluteY, 4, 3),        // BB
    op_pc("LDY", AbsoluteX, 4, 3),  // BC
    op_pc("LDA", AbsoluteX, 4, 3),  // BD
    op_pc("LDX", AbsoluteY, 4, 3),  // BE
    bad_pc(AbsoluteY, 4, 3),        // BF
    op("CPY", Immediate, 2, 2),     // C0
    op("CMP", IndirectX, 6, 2),     // C1
    bad(Immediate, 2, 2),           // C2
    bad(IndirectX, 8, 2),           // C3
    op("CPY", ZeroPage, 3, 2),      // C4
    op("CMP", ZeroPage, 3, 2),      // C5
    op("DEC", ZeroPage, 5, 2),      // C6
    bad(ZeroPage, 5, 2),            // C7
    op("INY", Implicit, 2, 1),      // C8
    op("CMP", Immediate, 2, 2),     // C9
    op("DEX", Implicit, 2, 1),      // CA
    bad(Immediate, 2, 2),           // CB
    op("CPY", Absolute, 4, 3),      // CC
    op("CMP", Absolute, 4, 3),      // CD
    op("DEC", Absolute, 6, 3),      // CE
    bad(Absolute, 6, 3),            // CF
    op("BNE", Relative, 2, 2),      // D0
    op_pc("CMP", IndirectY, 5, 2),  // D1
    bad(Implicit, 2, 1),            // D2 JAM
    bad(IndirectY, 8, 2),           // D3
    bad(ZeroPageX, 4, 2),           // D4
    op("CMP", ZeroPageX, 4, 2),     // D5
    op("DEC", ZeroPageX, 6, 2),     // D6
    bad(ZeroPageX, 6, 2),           // D7
    op("CLD", Implicit, 2, 1),      // D8
    op_pc("CMP", AbsoluteY, 4, 3),  // D9
    bad(Implicit, 2, 1),            // DA
    bad(AbsoluteY, 7, 3),           // DB
    bad_pc(AbsoluteX, 4, 3),        // DC
    op_pc("CMP", AbsoluteX, 4, 3),  // DD
    op("DEC", AbsoluteX, 7, 3),     // DE
    bad(AbsoluteX, 7, 3),           // DF
    op("CPX", Immediate, 2, 2),     // E0
    op("SBC", IndirectX, 6, 2),     // E1
    bad(Immediate, 2, 2),           // E2
    bad(IndirectX, 8, 2),           // E3
    op("CPX", ZeroPage, 3, 2),      // E4
    op("SBC", ZeroPage, 3, 2),      // E5
    op("INC", ZeroPage, 5, 2),      // E6
    bad(ZeroPage, 5, 2),            // E7
    op("INX", Implicit, 2, 1),      // E8
    op("SBC", Immediate, 2, 2),     // E9
    op("NOP", Implicit, 2, 1),      // EA
    bad(Immediate, 2, 2),           // EB
    op("CPX", Absolute, 4, 3),      // EC
    op("SBC", Absolute, 4, 3),      // ED
    op("INC", Absolute, 6, 3),      // EE
    bad(Absolute, 6, 3),            // EF
    op("BEQ", Relative, 2, 2),      // F0
    op_pc("SBC", IndirectY, 5, 2),  // F1
    bad(Implicit, 2, 1),            // F2 JAM
    bad(IndirectY, 8, 2),           // F3
    bad(ZeroPageX, 4, 2),           // F4
    op("SBC", ZeroPageX, 4, 2),     // F5
    op("INC", ZeroPageX, 6, 2),     // F6
    bad(ZeroPageX, 6, 2),           // F7
    op("SED", Implicit, 2, 1),      // F8
    op_pc("SBC", AbsoluteY, 4, 3),  // F9
    bad(Implicit, 2, 1),            // FA
    bad(AbsoluteY, 7, 3),           // FB
    bad_pc(AbsoluteX, 4, 3),        // FC
    op_pc("SBC", AbsoluteX, 4, 3),  // FD
    op("INC", AbsoluteX, 7, 3),     // FE
    bad(AbsoluteX, 7, 3),           // FF
];

/// Opcode table for the CMOS 65C02.
///
/// Derived from the NMOS table: every undefined slot becomes a true
/// one-byte one-cycle NOP, the JMP-indirect bug fix costs a cycle, and the
/// 65C02 additions (BRA, STZ, PHX/PHY/PLX/PLY, INC A / DEC A, the
/// zero-page-indirect ALU forms, RMB/SMB and BBR/BBS) fill their slots.
pub const CMOS_OPCODE_TABLE: [OpcodeMetadata; 256] = cmos_table();

const fn cmos_table() -> [OpcodeMetadata; 256] {
    let mut table = NMOS_OPCODE_TABLE;

    let mut i = 0;
    while i < 256 {
        if table[i].undocumented {
            table[i] = OpcodeMetadata {
                mnemonic: "NOP",
                addressing_mode: Implicit,
                base_cycles: 1,
                size_bytes: 1,
                page_cross_adds_cycle: false,
                undocumented: true,
            };
        }
        i += 1;
    }

    // JMP ($nnnn) fetches the pointer correctly, one cycle slower
    table[0x6C] = op("JMP", Indirect, 6, 3);

    // New instructions
    table[0x80] = op("BRA", Relative, 2, 2);
    table[0x64] = op("STZ", ZeroPage, 3, 2);
    table[0x74] = op("STZ", ZeroPageX, 4, 2);
    table[0x9C] = op("STZ", Absolute, 4, 3);
    table[0x9E] = op("STZ", AbsoluteX, 5, 3);
    table[0x5A] = op("PHY", Implicit, 3, 1);
    table[0x7A] = op("PLY", Implicit, 4, 1);
    table[0xDA] = op("PHX", Implicit, 3, 1);
    table[0xFA] = op("PLX", Implicit, 4, 1);
    table[0x1A] = op("INC", Accumulator, 2, 1);
    table[0x3A] = op("DEC", Accumulator, 2, 1);

    // Zero-page indirect forms of the accumulator ops
    table[0x12] = op("ORA", ZeroPageIndirect, 5, 2);
    table[0x32] = op("AND", ZeroPageIndirect, 5, 2);
    table[0x52] = op("EOR", ZeroPageIndirect, 5, 2);
    table[0x72] = op("ADC", ZeroPageIndirect, 5, 2);
    table[0x92] = op("STA", ZeroPageIndirect, 5, 2);
    table[0xB2] = op("LDA", ZeroPageIndirect, 5, 2);
    table[0xD2] = op("CMP", ZeroPageIndirect, 5, 2);
    table[0xF2] = op("SBC", ZeroPageIndirect, 5, 2);

    // Bit set/reset and bit branches; bit number lives in opcode bits 4-6
    let mut bit = 0;
    while bit < 8 {
        table[0x07 + bit * 0x10] = op("RMB", ZeroPage, 5, 2);
        table[0x87 + bit * 0x10] = op("SMB", ZeroPage, 5, 2);
        table[0x0F + bit * 0x10] = op("BBR", ZeroPageRelative, 5, 3);
        table[0x8F + bit * 0x10] = op("BBS", ZeroPageRelative, 5, 3);
        bit += 1;
    }

    table
}
