//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA, TSX, TXS. All implied, 2 cycles. TXS is the one
//! transfer that does not touch the flags.

use crate::{CpuError, MemoryBus, CPU};

macro_rules! transfer {
    ($name:ident, $from:ident, $to:ident) => {
        pub(crate) fn $name<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
            let metadata = &cpu.variant.table()[opcode as usize];
            let value = cpu.$from;
            cpu.$to = value;
            cpu.set_nz(value);
            cpu.cycles += metadata.base_cycles as u64;
            cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
            Ok(())
        }
    };
}

transfer!(execute_tax, a, x);
transfer!(execute_tay, a, y);
transfer!(execute_txa, x, a);
transfer!(execute_tya, y, a);
transfer!(execute_tsx, sp, x);

/// Executes TXS: X to stack pointer, no flags.
pub(crate) fn execute_txs<M: MemoryBus>(cpu: &mut CPU<M>, opcode: u8) -> Result<(), CpuError> {
    let metadata = &cpu.variant.table()[opcode as usize];
    cpu.sp = cpu.x;
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    Ok(())
}
