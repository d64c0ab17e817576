//! # 65C02 Bit Instructions
//!
//! RMB0-7 / SMB0-7 (reset/set a bit in zero page) and BBR0-7 / BBS0-7
//! (branch on a zero-page bit). The bit number is bits 4-6 of the opcode.
//!
//! None of these touch the flags.

use crate::{CpuError, MemoryBus, CPU};

#[inline]
fn bit_mask(opcode: u8) -> u8 {
    1 << ((opcode >> 4) & 0x07)
}

fn modify_bit<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8, set: bool) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let addr = cpu.memory.read(cpu.pc.wrapping_add(1)) as u16;
    let value = cpu.memory.read(addr);
    let result = if set {
        value | bit_mask(opcode)
    } else {
        value & !bit_mask(opcode)
    };
    cpu.memory.write(addr, result);
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}

fn branch_on_bit<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
    branch_if_set: bool,
) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let addr = cpu.memory.read(cpu.pc.wrapping_add(1)) as u16;
    let offset = cpu.memory.read(cpu.pc.wrapping_add(2)) as i8;
    let value = cpu.memory.read(addr);
    let pc_after = cpu.pc.wrapping_add(metadata.size_bytes as u16);

    let bit_set = value & bit_mask(opcode) != 0;
    let mut cycles = metadata.base_cycles as u64;
    if bit_set == branch_if_set {
        let target = pc_after.wrapping_add_signed(offset as i16);
        if (pc_after & 0xFF00) != (target & 0xFF00) {
            cycles += 1;
        }
        cpu.pc = target;
    } else {
        cpu.pc = pc_after;
    }

    cpu.cycles += cycles;
    Ok(())
}

/// RMB: clear bit n of a zero-page byte.
pub(crate) fn execute_rmb<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    modify_bit(cpu, opcode, false)
}

/// SMB: set bit n of a zero-page byte.
pub(crate) fn execute_smb<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    modify_bit(cpu, opcode, true)
}

/// BBR: branch if bit n of a zero-page byte is clear.
pub(crate) fn execute_bbr<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    branch_on_bit(cpu, opcode, false)
}

/// BBS: branch if bit n of a zero-page byte is set.
pub(crate) fn execute_bbs<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    branch_on_bit(cpu, opcode, true)
}
