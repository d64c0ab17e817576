//! # Load and Store Instructions
//!
//! LDA, LDX, LDY, STA, STX, STY, and the 65C02's STZ.
//!
//! Loads set N and Z and pay the page-cross penalty on indexed reads.
//! Stores never pay a conditional penalty - their base cycle counts are
//! already the worst case.

use crate::{CpuError, MemoryBus, CPU};

macro_rules! load {
    ($name:ident, $register:ident) => {
        pub(crate) fn $name<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
            let metadata = &cpu.variant.table()[opcode as usize];
            let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);

            cpu.$register = value;
            cpu.set_nz(value);

            let mut cycles = metadata.base_cycles as u64;
            if page_crossed && metadata.page_cross_adds_cycle {
                cycles += 1;
            }
            cpu.cycles += cycles;
            cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
            Ok(())
        }
    };
}

macro_rules! store {
    ($name:ident, $register:ident) => {
        pub(crate) fn $name<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
            let metadata = &cpu.variant.table()[opcode as usize];
            let (addr, _) = cpu.operand_address(metadata.addressing_mode);

            let value = cpu.$register;
            cpu.memory.write(addr, value);

            cpu.cycles += metadata.base_cycles as u64;
            cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
            Ok(())
        }
    };
}

load!(execute_lda, a);
load!(execute_ldx, x);
load!(execute_ldy, y);

store!(execute_sta, a);
store!(execute_stx, x);
store!(execute_sty, y);

/// Executes STZ (65C02): store zero, flags untouched.
pub(crate) fn execute_stz<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let (addr, _) = cpu.operand_address(metadata.addressing_mode);
    cpu.memory.write(addr, 0);
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}
