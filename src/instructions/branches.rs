//! # Branch Instructions
//!
//! The eight conditional branches plus the 65C02's unconditional BRA.
//!
//! All use relative addressing with a signed 8-bit offset from the address
//! after the instruction. Timing: 2 cycles not taken, 3 taken, 4 taken
//! across a page boundary.

use crate::status::Status;
use crate::{CpuError, MemoryBus, CPU};

/// Shared branch body: takes the branch when `condition` holds.
pub(crate) fn branch_on<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
    condition: bool,
) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let offset = cpu.memory.read(cpu.pc.wrapping_add(1)) as i8;
    let pc_after = cpu.pc.wrapping_add(metadata.size_bytes as u16);

    let mut cycles = metadata.base_cycles as u64;
    if condition {
        let target = pc_after.wrapping_add_signed(offset as i16);
        cycles += 1;
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

/// BCC: branch if carry clear.
pub(crate) fn execute_bcc<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = !cpu.status.contains(Status::CARRY);
    branch_on(cpu, opcode, taken)
}

/// BCS: branch if carry set.
pub(crate) fn execute_bcs<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = cpu.status.contains(Status::CARRY);
    branch_on(cpu, opcode, taken)
}

/// BEQ: branch if zero set.
pub(crate) fn execute_beq<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = cpu.status.contains(Status::ZERO);
    branch_on(cpu, opcode, taken)
}

/// BNE: branch if zero clear.
pub(crate) fn execute_bne<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = !cpu.status.contains(Status::ZERO);
    branch_on(cpu, opcode, taken)
}

/// BMI: branch if negative set.
pub(crate) fn execute_bmi<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = cpu.status.contains(Status::NEGATIVE);
    branch_on(cpu, opcode, taken)
}

/// BPL: branch if negative clear.
pub(crate) fn execute_bpl<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = !cpu.status.contains(Status::NEGATIVE);
    branch_on(cpu, opcode, taken)
}

/// BVC: branch if overflow clear.
pub(crate) fn execute_bvc<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = !cpu.status.contains(Status::OVERFLOW);
    branch_on(cpu, opcode, taken)
}

/// BVS: branch if overflow set.
pub(crate) fn execute_bvs<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let taken = cpu.status.contains(Status::OVERFLOW);
    branch_on(cpu, opcode, taken)
}

/// BRA (65C02): branch always.
pub(crate) fn execute_bra<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    branch_on(cpu, opcode, true)
}
