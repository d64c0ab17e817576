//! # Execution Errors
//!
//! Error taxonomy for CPU execution. The CPU never aborts on its own: every
//! undefined opcode has a well-defined NOP fallback, and the variants below
//! only surface when the caller opts into strict/testing behavior.

use thiserror::Error;

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    /// Undefined opcode executed while strict mode is enabled.
    ///
    /// With strict mode off (the default) undefined opcodes execute as
    /// documented NOPs of the appropriate length and cycle count.
    #[error("invalid opcode 0x{opcode:02X} at ${pc:04X}")]
    InvalidOpcode { opcode: u8, pc: u16 },

    /// A cycle budget passed to [`crate::CPU::execute`] was exhausted
    /// mid-instruction while strict mode is enabled.
    ///
    /// This is a testing aid: the instruction in flight always completes
    /// before the error is reported, so CPU state is left at an
    /// instruction boundary.
    #[error("cycle budget of {budget} exhausted ({consumed} cycles consumed)")]
    CycleExhaustion { budget: u64, consumed: u64 },

    /// BRK executed while the harness requested break surfacing.
    ///
    /// The interrupt sequence has already run when this is returned; `pc`
    /// is the address of the BRK opcode.
    #[error("BRK executed at ${pc:04X}")]
    Break { pc: u16 },
}
