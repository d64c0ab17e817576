//! # Increment and Decrement Instructions
//!
//! INC, DEC (memory and, on the 65C02, accumulator), INX, INY, DEX, DEY.
//!
//! The memory forms are read-modify-write: NMOS parts write the unmodified
//! value back before the result (visible to I/O registers with write side
//! effects); the 65C02 performs a second read instead, so only the final
//! value is ever written.

use crate::{AddressingMode, CpuError, MemoryBus, CPU};

fn modify<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8, delta: i8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];

    if metadata.addressing_mode == AddressingMode::Accumulator {
        let result = cpu.a.wrapping_add_signed(delta);
        cpu.set_nz(result);
        cpu.a = result;
    } else {
        let (addr, _) = cpu.operand_address(metadata.addressing_mode);
        let old = cpu.memory.read(addr);
        let result = old.wrapping_add_signed(delta);
        if cpu.variant.is_nmos() {
            cpu.memory.write(addr, old);
        }
        cpu.memory.write(addr, result);
        cpu.set_nz(result);
    }

    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}

macro_rules! step_register {
    ($name:ident, $register:ident, $delta:expr) => {
        pub(crate) fn $name<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
            let metadata = &cpu.variant.table()[opcode as usize];
            let value = cpu.$register.wrapping_add_signed($delta);
            cpu.$register = value;
            cpu.set_nz(value);
            cpu.cycles += metadata.base_cycles as u64;
            cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
            Ok(())
        }
    };
}

/// Executes INC (memory, or accumulator on the 65C02).
pub(crate) fn execute_inc<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    modify(cpu, opcode, 1)
}

/// Executes DEC (memory, or accumulator on the 65C02).
pub(crate) fn execute_dec<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    modify(cpu, opcode, -1)
}

step_register!(execute_inx, x, 1);
step_register!(execute_iny, y, 1);
step_register!(execute_dex, x, -1);
step_register!(execute_dey, y, -1);
