//! # Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED, CLV. All implied, 2 cycles. There is no
//! SEV: the overflow flag is only set by ALU results (or the SO pin, which
//! is not modeled).

use crate::status::Status;
use crate::{CpuError, MemoryBus, CPU};

fn set_flag<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
    flag: Status,
    value: bool,
) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    cpu.status.set(flag, value);
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}

pub(crate) fn execute_clc<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::CARRY, false)
}

pub(crate) fn execute_sec<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::CARRY, true)
}

pub(crate) fn execute_cli<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::IRQ_DISABLE, false)
}

pub(crate) fn execute_sei<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::IRQ_DISABLE, true)
}

pub(crate) fn execute_cld<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::DECIMAL, false)
}

pub(crate) fn execute_sed<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::DECIMAL, true)
}

pub(crate) fn execute_clv<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    set_flag(cpu, opcode, Status::OVERFLOW, false)
}
