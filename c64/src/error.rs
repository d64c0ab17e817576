//! System-level error taxonomy.
//!
//! Load and parse failures are fatal to the operation that raised them,
//! never to the process. Runtime I/O faults ([`BusDeviceError`]) are
//! recoverable: the bus substitutes open-bus data and the system loop
//! logs them.

use crate::cartridge::CartridgeError;
use crate::devices::BusDeviceError;
use mos6502::CpuError;
use thiserror::Error;

/// Errors surfaced by the C64 system layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum C64Error {
    /// CPU execution error (strict-mode and test aids only).
    #[error(transparent)]
    Cpu(#[from] CpuError),

    /// Cartridge image rejected at load time.
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    /// A ROM image has the wrong size.
    #[error("{rom} ROM must be {expected} bytes, got {actual}")]
    InvalidRom {
        rom: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An I/O device handler failed.
    #[error(transparent)]
    BusDevice(#[from] BusDeviceError),
}
