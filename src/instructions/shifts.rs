//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL, ROR in accumulator and memory forms.
//!
//! Memory forms are read-modify-write; see the `inc_dec` module note on
//! the NMOS spurious write.

use crate::status::Status;
use crate::{AddressingMode, CpuError, MemoryBus, CPU};

#[derive(Clone, Copy)]
enum ShiftKind {
    Asl,
    Lsr,
    Rol,
    Ror,
}

fn apply<M: MemoryBus>(cpu: &mut CPU<M>, kind: ShiftKind, value: u8) -> u8 {
    let carry_in = cpu.status.contains(Status::CARRY) as u8;
    let (result, carry_out) = match kind {
        ShiftKind::Asl => (value << 1, value & 0x80 != 0),
        ShiftKind::Lsr => (value >> 1, value & 0x01 != 0),
        ShiftKind::Rol => ((value << 1) | carry_in, value & 0x80 != 0),
        ShiftKind::Ror => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
    };
    cpu.status.set(Status::CARRY, carry_out);
    cpu.set_nz(result);
    result
}

fn shift<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8, kind: ShiftKind) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];

    if metadata.addressing_mode == AddressingMode::Accumulator {
        let value = cpu.a;
        cpu.a = apply(cpu, kind, value);
    } else {
        let (addr, _) = cpu.operand_address(metadata.addressing_mode);
        let old = cpu.memory.read(addr);
        let result = apply(cpu, kind, old);
        if cpu.variant.is_nmos() {
            cpu.memory.write(addr, old);
        }
        cpu.memory.write(addr, result);
    }

    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}

/// Executes ASL (arithmetic shift left).
pub(crate) fn execute_asl<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    shift(cpu, opcode, ShiftKind::Asl)
}

/// Executes LSR (logical shift right).
pub(crate) fn execute_lsr<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    shift(cpu, opcode, ShiftKind::Lsr)
}

/// Executes ROL (rotate left through carry).
pub(crate) fn execute_rol<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    shift(cpu, opcode, ShiftKind::Rol)
}

/// Executes ROR (rotate right through carry).
pub(crate) fn execute_ror<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    shift(cpu, opcode, ShiftKind::Ror)
}
