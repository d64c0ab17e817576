//! C64 system orchestration.
//!
//! [`C64`] wires a [`mos6502::CPU`] to the banked [`C64Memory`] and drives
//! the VIC from consumed cycles: step CPU, tick VIC, publish a frame at
//! VBlank. The producer loop in [`C64::run`] is the emulation half of the
//! frame handshake; a renderer on another thread consumes through the
//! shared [`FrameSync`].

use crate::cartridge::Cartridge;
use crate::devices::VicVariant;
use crate::frame::{FrameSync, Snapshot};
use crate::memory::C64Memory;
use crate::timing::FrameGovernor;
use crate::C64Error;
use mos6502::{CpuVariant, MemoryBus, CPU};

/// A Commodore 64: CPU, banked memory, VIC timing, cartridge port.
pub struct C64 {
    cpu: CPU<C64Memory>,
}

impl C64 {
    /// Creates a machine with empty ROMs. Load ROMs (or an Ultimax
    /// cartridge) and call [`C64::reset`] before running.
    pub fn new(cpu_variant: CpuVariant, vic_variant: VicVariant) -> Self {
        let memory = C64Memory::new(vic_variant);
        Self {
            cpu: CPU::new(memory, cpu_variant),
        }
    }

    /// Loads BASIC (8K), KERNAL (8K) and character (4K) ROM images.
    pub fn load_roms(&mut self, basic: &[u8], kernal: &[u8], charrom: &[u8]) -> Result<(), C64Error> {
        self.cpu.memory_mut().load_roms(basic, kernal, charrom)
    }

    /// Loads a raw cartridge image (8K, 16K, or Ultimax auto-detected)
    /// and resets so the new reset vector takes effect.
    pub fn load_cartridge_bin(&mut self, data: &[u8]) -> Result<(), C64Error> {
        let cartridge = Cartridge::from_bin(data)?;
        self.cpu.memory_mut().attach_cartridge(cartridge);
        self.reset();
        Ok(())
    }

    /// Loads a CRT container and resets.
    pub fn load_cartridge_crt(&mut self, data: &[u8]) -> Result<(), C64Error> {
        let cartridge = Cartridge::from_crt(data)?;
        self.cpu.memory_mut().attach_cartridge(cartridge);
        self.reset();
        Ok(())
    }

    /// Loads a PRG image (2-byte little-endian load address header) into
    /// RAM. Returns the load address, or `None` for a header-less stub.
    pub fn load_prg(&mut self, data: &[u8]) -> Option<u16> {
        if data.len() < 3 {
            return None;
        }
        let load_address = data[0] as u16 | ((data[1] as u16) << 8);
        let memory = self.cpu.memory_mut();
        for (i, &byte) in data[2..].iter().enumerate() {
            memory.write(load_address.wrapping_add(i as u16), byte);
        }
        log::debug!("PRG loaded at ${load_address:04X} ({} bytes)", data.len() - 2);
        Some(load_address)
    }

    /// Resets the machine. The reset vector is read through the banked
    /// view, so an attached cartridge's vector wins over the KERNAL's.
    /// RAM persists.
    pub fn reset(&mut self) {
        self.cpu.memory_mut().reset();
        self.cpu.reset();
    }

    /// The freeze button on a freezer cartridge: latches freeze mode on
    /// the cartridge and raises the NMI.
    pub fn freeze(&mut self) {
        if let Some(cart) = self.cpu.memory_mut().cartridge_mut() {
            cart.freeze();
        }
        self.cpu.nmi();
    }

    /// Executes one instruction and advances the VIC by the consumed
    /// cycles. Device faults have been logged by the bus; the CPU carries
    /// on regardless.
    pub fn step(&mut self) -> Result<u8, C64Error> {
        let cycles = self.cpu.step()?;
        let memory = self.cpu.memory_mut();
        memory.vic.tick(cycles as u32);
        memory.take_device_error();
        Ok(cycles)
    }

    /// Executes (at least) one frame's worth of cycles.
    pub fn run_frame(&mut self) -> Result<u32, C64Error> {
        let target = self.vic_variant().cycles_per_frame();
        let mut total = 0u32;
        while total < target {
            total += self.step()? as u32;
        }
        Ok(total)
    }

    /// The producer loop: runs until [`FrameSync::request_stop`], publishing
    /// a snapshot at every VBlank. Pass a governor to pace to real time;
    /// `None` runs flat out.
    pub fn run(&mut self, sync: &FrameSync, mut governor: Option<FrameGovernor>) -> Result<(), C64Error> {
        log::debug!(
            "emulation loop: {} CPU, {:?} VIC",
            self.cpu.variant(),
            self.vic_variant()
        );
        while !sync.stop_requested() {
            self.step()?;
            if self.cpu.memory_mut().vic.take_frame_ready() {
                sync.publish(self.snapshot());
                if let Some(governor) = governor.as_mut() {
                    governor.throttle();
                }
            }
        }
        log::debug!("emulation loop stopped at ${:04X}", self.cpu.pc());
        Ok(())
    }

    /// A freshly allocated frame snapshot: raw RAM, color RAM, and the
    /// VIC register view.
    pub fn snapshot(&self) -> Snapshot {
        let memory = self.cpu.memory();
        Snapshot {
            ram: memory.snapshot_ram(),
            color_ram: memory.snapshot_color_ram(),
            vic_regs: memory.vic.registers(),
            frame: memory.vic.frames(),
        }
    }

    pub fn vic_variant(&self) -> VicVariant {
        self.cpu.memory().vic.variant()
    }

    /// Reads a byte through the banked view (debug).
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.cpu.memory_mut().read(addr)
    }

    /// Writes a byte through the banked view (debug).
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.cpu.memory_mut().write(addr, value);
    }

    pub fn cpu(&self) -> &CPU<C64Memory> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU<C64Memory> {
        &mut self.cpu
    }

    pub fn memory(&self) -> &C64Memory {
        self.cpu.memory()
    }

    pub fn memory_mut(&mut self) -> &mut C64Memory {
        self.cpu.memory_mut()
    }
}
