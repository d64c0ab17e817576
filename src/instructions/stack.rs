//! # Stack Instructions
//!
//! PHA, PHP, PLA, PLP, and the 65C02's PHX, PHY, PLX, PLY.
//!
//! PHP pushes with B set; PLP discards B and forces the unused bit, so
//! PHP/PLP round-trips P exactly.

use crate::status::Status;
use crate::{CpuError, MemoryBus, CPU};

fn advance<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) {
    let metadata = &cpu.variant.table()[opcode as usize];
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
}

pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.a;
    cpu.push(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.status.to_pushed(true);
    cpu.push(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.pop();
    cpu.a = value;
    cpu.set_nz(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.pop();
    cpu.status = Status::from_pulled(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_phx<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.x;
    cpu.push(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_phy<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.y;
    cpu.push(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_plx<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.pop();
    cpu.x = value;
    cpu.set_nz(value);
    advance(cpu, opcode);
    Ok(())
}

pub(crate) fn execute_ply<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let value = cpu.pop();
    cpu.y = value;
    cpu.set_nz(value);
    advance(cpu, opcode);
    Ok(())
}
