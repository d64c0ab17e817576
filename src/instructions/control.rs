//! # Control Flow Instructions
//!
//! BRK, JMP, JSR, RTS, RTI, NOP, and the undefined-slot fallback.

use crate::status::Status;
use crate::{AddressingMode, CpuError, MemoryBus, CPU};

/// Executes BRK (force interrupt).
///
/// Pushes PC+2 (the extra byte is a break mark the handler may inspect),
/// pushes P with B set, sets I, and loads PC from the IRQ vector. The D
/// flag is preserved on NMOS and cleared on the 65C02. 7 cycles.
pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let brk_pc = cpu.pc;
    let return_address = cpu.pc.wrapping_add(2);

    cpu.push((return_address >> 8) as u8);
    cpu.push((return_address & 0xFF) as u8);
    cpu.push(cpu.status.to_pushed(true));

    cpu.status.insert(Status::IRQ_DISABLE);
    if cpu.variant.is_cmos() {
        cpu.status.remove(Status::DECIMAL);
    }

    cpu.pc = cpu.memory.read_word(crate::cpu::IRQ_VECTOR);
    cpu.cycles += metadata.base_cycles as u64;

    if cpu.break_on_brk() {
        return Err(CpuError::Break { pc: brk_pc });
    }
    Ok(())
}

/// Executes JMP (absolute or indirect).
///
/// The indirect form reproduces the NMOS page-wrap bug: a pointer at
/// $xxFF fetches its high byte from $xx00. The 65C02 fetches across the
/// page correctly (its table charges the extra cycle).
pub(crate) fn execute_jmp<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];

    let target = match metadata.addressing_mode {
        AddressingMode::Absolute => {
            let lo = cpu.memory.read(cpu.pc.wrapping_add(1)) as u16;
            let hi = cpu.memory.read(cpu.pc.wrapping_add(2)) as u16;
            (hi << 8) | lo
        }
        AddressingMode::Indirect => {
            let ptr_lo = cpu.memory.read(cpu.pc.wrapping_add(1)) as u16;
            let ptr_hi = cpu.memory.read(cpu.pc.wrapping_add(2)) as u16;
            let ptr = (ptr_hi << 8) | ptr_lo;

            let lo = cpu.memory.read(ptr) as u16;
            let hi_addr = if cpu.variant.is_nmos() && (ptr & 0x00FF) == 0x00FF {
                ptr & 0xFF00
            } else {
                ptr.wrapping_add(1)
            };
            let hi = cpu.memory.read(hi_addr) as u16;
            (hi << 8) | lo
        }
        _ => unreachable!("JMP only has absolute and indirect forms"),
    };

    cpu.pc = target;
    cpu.cycles += metadata.base_cycles as u64;
    Ok(())
}

/// Executes JSR (jump to subroutine).
///
/// Pushes the address of the JSR's last byte (PC+2); RTS adds one on pull.
pub(crate) fn execute_jsr<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let lo = cpu.memory.read(cpu.pc.wrapping_add(1)) as u16;
    let hi = cpu.memory.read(cpu.pc.wrapping_add(2)) as u16;
    let target = (hi << 8) | lo;

    let return_address = cpu.pc.wrapping_add(2);
    cpu.push((return_address >> 8) as u8);
    cpu.push((return_address & 0xFF) as u8);

    cpu.pc = target;
    cpu.cycles += metadata.base_cycles as u64;
    Ok(())
}

/// Executes RTS (return from subroutine).
pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let lo = cpu.pop() as u16;
    let hi = cpu.pop() as u16;
    cpu.pc = ((hi << 8) | lo).wrapping_add(1);
    cpu.cycles += metadata.base_cycles as u64;
    Ok(())
}

/// Executes RTI (return from interrupt).
///
/// Pulls P (B discarded, unused forced) then PC. Unlike RTS, no +1.
pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    let pulled = cpu.pop();
    cpu.status = Status::from_pulled(pulled);
    let lo = cpu.pop() as u16;
    let hi = cpu.pop() as u16;
    cpu.pc = (hi << 8) | lo;
    cpu.cycles += metadata.base_cycles as u64;
    Ok(())
}

/// Executes NOP, including the CMOS one-cycle NOPs in undefined slots.
pub(crate) fn execute_nop<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}

/// Fallback for undefined NMOS slots.
///
/// Executes as a NOP of the slot's documented length and cycle count
/// (including the page-cross penalty for the $1C family) unless strict
/// mode turns it into an error.
pub(crate) fn execute_undocumented<M: MemoryBus>(
    cpu: &mut CPU<M>,
    opcode: u8,
) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];

    if cpu.strict() {
        // Still advance so a harness can resume past the fault
        cpu.cycles += metadata.base_cycles as u64;
        cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
        return Err(CpuError::InvalidOpcode {
            opcode,
            pc: cpu.pc.wrapping_sub(metadata.size_bytes as u16),
        });
    }

    log::debug!(
        "undocumented opcode {:02X} at ${:04X}, running as NOP",
        opcode,
        cpu.pc
    );

    let mut cycles = metadata.base_cycles as u64;
    if metadata.page_cross_adds_cycle {
        let (_, crossed) = cpu.operand_address(metadata.addressing_mode);
        if crossed {
            cycles += 1;
        }
    }
    cpu.cycles += cycles;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}
