//! # Commodore 64 System Emulation
//!
//! The C64 integration for the `mos6502` CPU core: the banked 64KB memory
//! map with its six switchable regions, cartridge auto-detection and
//! mapping (8K, 16K, Ultimax, Action Replay), VIC-II raster timing as a
//! clocked observer of CPU cycles, and the lock-free frame handshake that
//! hands RAM snapshots to a renderer thread without tearing.
//!
//! ## Quick Start
//!
//! ```rust
//! use c64::{C64, FrameSync, VicVariant};
//! use mos6502::CpuVariant;
//! use std::sync::Arc;
//!
//! let mut c64 = C64::new(CpuVariant::Nmos6502, VicVariant::Pal6569);
//!
//! // A trivial "KERNAL": NOPs with the reset vector pointing at $E000
//! let mut kernal = vec![0xEA; 8192];
//! kernal[0x1FFC] = 0x00;
//! kernal[0x1FFD] = 0xE0;
//! c64.load_roms(&vec![0; 8192], &kernal, &vec![0; 4096]).unwrap();
//! c64.reset();
//!
//! // Producer side: run one frame and publish it
//! let sync = FrameSync::new();
//! c64.run_frame().unwrap();
//! sync.publish(c64.snapshot());
//!
//! // Consumer side: take the frame and render from the copy
//! let frame = sync.take_frame().unwrap();
//! assert_eq!(frame.ram.len(), 65536);
//! # let _ = Arc::clone(&sync);
//! ```
//!
//! ## Crate Layout
//!
//! - `memory` - the banked bus ([`C64Memory`])
//! - `devices` - VIC-II, SID, CIA, and the 6510 port
//! - `cartridge` - .bin/.crt loaders and mappers
//! - `frame` - producer/consumer frame handshake
//! - `system` - the [`C64`] machine and its run loop
//! - `timing` - real-time frame pacing
//!
//! The renderer itself is not here: it is whatever consumes
//! [`frame::Snapshot`]s on the other end of a [`FrameSync`].

pub mod cartridge;
pub mod devices;
pub mod error;
pub mod frame;
pub mod memory;
pub mod system;
pub mod timing;

pub use cartridge::{Cartridge, CartridgeError};
pub use devices::{BusDevice, BusDeviceError, Cia, Port6510, Sid, Vic, VicVariant};
pub use error::C64Error;
pub use frame::{FrameSync, Snapshot};
pub use memory::C64Memory;
pub use system::C64;
pub use timing::FrameGovernor;
