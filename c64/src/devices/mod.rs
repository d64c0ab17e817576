//! C64 hardware devices mapped into the I/O page.
//!
//! - [`Vic`]: MOS 6569/6567 raster timing and registers
//! - [`Sid`]: MOS 6581 register latch
//! - [`Cia`]: MOS 6526 register file (timers not modeled)
//! - [`Port6510`]: the 6510's built-in I/O port (memory banking)
//!
//! [`BusDevice`] is the seam for I/O chips with read side effects: the bus
//! calls through it for the CIA slots and the expansion port, and a
//! failing handler surfaces as a [`BusDeviceError`] that the system loop
//! logs and survives.

mod cia;
mod port;
mod sid;
mod vic;

pub use cia::Cia;
pub use port::Port6510;
pub use sid::Sid;
pub use vic::{Vic, VicVariant, VIC_REGISTER_COUNT};

use thiserror::Error;

/// An I/O handler failure. Recoverable: the bus substitutes open-bus data
/// and the system loop logs the fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bus device fault at ${addr:04X}: {reason}")]
pub struct BusDeviceError {
    pub addr: u16,
    pub reason: String,
}

/// A chip mapped into the I/O page.
///
/// Offsets are relative to the device's base address. Reads take `&mut
/// self` because I/O reads may have side effects (latch clears,
/// acknowledge-on-read registers).
pub trait BusDevice: Send {
    fn read(&mut self, offset: u16) -> Result<u8, BusDeviceError>;
    fn write(&mut self, offset: u16, value: u8) -> Result<(), BusDeviceError>;
}
