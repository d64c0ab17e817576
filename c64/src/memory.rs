//! C64 memory system with bank switching.
//!
//! The C64 maps ROMs, RAM, I/O chips and cartridge windows into
//! overlapping regions of one 16-bit address space. Visibility is decided
//! by a five-line selector: LORAM/HIRAM/CHAREN from the 6510 port at
//! $0001 plus the cartridge's EXROM/GAME lines. Every write to $0001 and
//! every cartridge control write re-resolves the mapping in O(1) - the
//! selector is just re-read on each access.
//!
//! Memory map (no cartridge, $0001 = $37):
//! - $0000-$0001: 6510 I/O port
//! - $0002-$9FFF: RAM
//! - $A000-$BFFF: BASIC ROM or RAM
//! - $C000-$CFFF: RAM
//! - $D000-$DFFF: I/O, Character ROM, or RAM
//! - $E000-$FFFF: KERNAL ROM or RAM
//!
//! Cartridges overlay ROML at $8000-$9FFF and ROMH at $A000-$BFFF (16K
//! mode) or $E000-$FFFF (Ultimax). ROM overlays affect reads only: writes
//! land in the RAM underneath, except where a cartridge claims them
//! (Action Replay RAM). Reads of unclaimed I/O return the last value seen
//! on the bus (open bus).

use crate::cartridge::Cartridge;
use crate::devices::{BusDevice, BusDeviceError, Cia, Port6510, Sid, Vic, VicVariant};
use mos6502::MemoryBus;

const BASIC_START: u16 = 0xA000;
const CHAR_START: u16 = 0xD000;
const KERNAL_START: u16 = 0xE000;

/// C64 memory system implementing bank switching.
pub struct C64Memory {
    /// 64KB main RAM.
    ram: Box<[u8; 65536]>,

    /// BASIC ROM (8KB at $A000-$BFFF).
    basic_rom: Box<[u8; 8192]>,
    /// KERNAL ROM (8KB at $E000-$FFFF).
    kernal_rom: Box<[u8; 8192]>,
    /// Character ROM (4KB at $D000-$DFFF when visible).
    char_rom: Box<[u8; 4096]>,
    roms_loaded: bool,

    /// 6510 I/O port (bank switching control).
    pub port: Port6510,
    /// VIC-II raster timing and registers.
    pub vic: Vic,
    /// SID register latch.
    pub sid: Sid,
    /// CIA1 (keyboard/joystick on real hardware; register file here).
    pub cia1: Cia,
    /// CIA2 (VIC bank select, serial bus).
    pub cia2: Cia,
    /// Color RAM (1KB, low nibbles).
    color_ram: [u8; 1024],

    /// Expansion-port device claiming IO1/IO2 when no cartridge does.
    expansion: Option<Box<dyn BusDevice>>,

    cartridge: Option<Cartridge>,
    /// Cartridge port lines, pulled up when nothing drives them.
    exrom: bool,
    game: bool,

    /// Last byte transferred on the bus, returned for open-bus reads.
    last_bus_value: u8,
    /// Most recent device fault, drained by the system loop.
    device_error: Option<BusDeviceError>,
}

impl C64Memory {
    /// Creates a C64 memory system with empty ROMs.
    pub fn new(vic_variant: VicVariant) -> Self {
        let mut ram = Box::new([0u8; 65536]);
        ram[0x00] = 0x2F; // DDR default
        ram[0x01] = 0x37; // port default

        Self {
            ram,
            basic_rom: Box::new([0; 8192]),
            kernal_rom: Box::new([0; 8192]),
            char_rom: Box::new([0; 4096]),
            roms_loaded: false,
            port: Port6510::new(),
            vic: Vic::new(vic_variant),
            sid: Sid::new(),
            cia1: Cia::new(),
            cia2: Cia::new(),
            color_ram: [0; 1024],
            expansion: None,
            cartridge: None,
            exrom: true,
            game: true,
            last_bus_value: 0,
            device_error: None,
        }
    }

    /// Loads the three system ROMs, validating sizes (8K/8K/4K).
    pub fn load_roms(
        &mut self,
        basic: &[u8],
        kernal: &[u8],
        charrom: &[u8],
    ) -> Result<(), crate::C64Error> {
        check_rom("BASIC", basic, 8192)?;
        check_rom("KERNAL", kernal, 8192)?;
        check_rom("character", charrom, 4096)?;
        self.basic_rom.copy_from_slice(basic);
        self.kernal_rom.copy_from_slice(kernal);
        self.char_rom.copy_from_slice(charrom);
        self.roms_loaded = true;
        Ok(())
    }

    pub fn roms_loaded(&self) -> bool {
        self.roms_loaded
    }

    /// Attaches a cartridge and lets it drive the EXROM/GAME lines.
    pub fn attach_cartridge(&mut self, cartridge: Cartridge) {
        self.exrom = cartridge.exrom();
        self.game = cartridge.game();
        log::debug!(
            "cartridge attached: EXROM={} GAME={}",
            self.exrom as u8,
            self.game as u8
        );
        self.cartridge = Some(cartridge);
    }

    /// Detaches the cartridge, releasing the port lines.
    pub fn detach_cartridge(&mut self) -> Option<Cartridge> {
        self.exrom = true;
        self.game = true;
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Overrides the cartridge port lines (`true` = pulled up). A later
    /// cartridge control write re-drives them.
    pub fn set_bank_lines(&mut self, exrom: bool, game: bool) {
        self.exrom = exrom;
        self.game = game;
    }

    /// Current (EXROM, GAME) line levels.
    pub fn bank_lines(&self) -> (bool, bool) {
        (self.exrom, self.game)
    }

    /// Installs a device on the expansion port I/O ranges ($DE00-$DFFF);
    /// a cartridge takes precedence.
    pub fn set_expansion(&mut self, device: Option<Box<dyn BusDevice>>) {
        self.expansion = device;
    }

    /// Takes the most recent I/O device fault, if any.
    pub fn take_device_error(&mut self) -> Option<BusDeviceError> {
        self.device_error.take()
    }

    /// Ultimax mode: EXROM released, GAME asserted.
    #[inline]
    fn ultimax(&self) -> bool {
        self.exrom && !self.game
    }

    /// Resets chips, the port, and cartridge banking. RAM persists.
    pub fn reset(&mut self) {
        self.port = Port6510::new();
        self.vic = Vic::new(self.vic.variant());
        self.sid = Sid::new();
        self.cia1 = Cia::new();
        self.cia2 = Cia::new();
        if let Some(cart) = &mut self.cartridge {
            cart.reset();
            self.exrom = cart.exrom();
            self.game = cart.game();
        }
    }

    /// Direct RAM access (debug, snapshots).
    pub fn ram(&self) -> &[u8; 65536] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8; 65536] {
        &mut self.ram
    }

    /// Copies all 64KB of RAM, bypassing the banked view. This is what the
    /// frame snapshot uses: raw RAM, not ROM overlays, and no I/O side
    /// effects.
    pub fn snapshot_ram(&self) -> Box<[u8; 65536]> {
        self.ram.clone()
    }

    /// The 16KB bank base the VIC currently sees (CIA2 port A).
    pub fn vic_bank_base(&self) -> u16 {
        self.cia2.vic_bank_base()
    }

    /// Reads a byte as the VIC sees memory: its 14-bit address within the
    /// CIA2-selected bank, with the character ROM shadowed at $1000-$1FFF
    /// in banks 0 and 2. The VIC never sees BASIC, KERNAL, or I/O.
    pub fn vic_read(&self, addr: u16) -> u8 {
        let bank = self.vic_bank_base();
        let offset = addr & 0x3FFF;
        if (bank == 0x0000 || bank == 0x8000) && (0x1000..0x2000).contains(&offset) {
            return self.char_rom[(offset & 0x0FFF) as usize];
        }
        self.ram[(bank | offset) as usize]
    }

    /// Color RAM nibble (0-15) at index 0..1024.
    pub fn color_ram(&self, index: usize) -> u8 {
        self.color_ram[index & 0x3FF] & 0x0F
    }

    /// Copies the color RAM for frame snapshots.
    pub fn snapshot_color_ram(&self) -> [u8; 1024] {
        self.color_ram
    }

    fn read_device(&mut self, device: DeviceSlot, addr: u16) -> u8 {
        let result = match device {
            DeviceSlot::Cia1 => self.cia1.read(addr & 0x0F),
            DeviceSlot::Cia2 => self.cia2.read(addr & 0x0F),
            DeviceSlot::Expansion => match &mut self.expansion {
                Some(dev) => dev.read(addr),
                None => return self.last_bus_value,
            },
        };
        match result {
            Ok(value) => value,
            Err(error) => {
                log::error!("{error}");
                self.device_error = Some(error);
                self.last_bus_value
            }
        }
    }

    fn write_device(&mut self, device: DeviceSlot, addr: u16, value: u8) {
        let result = match device {
            DeviceSlot::Cia1 => self.cia1.write(addr & 0x0F, value),
            DeviceSlot::Cia2 => self.cia2.write(addr & 0x0F, value),
            DeviceSlot::Expansion => match &mut self.expansion {
                Some(dev) => dev.write(addr, value),
                None => Ok(()),
            },
        };
        if let Err(error) = result {
            log::error!("{error}");
            self.device_error = Some(error);
        }
    }

    fn read_io(&mut self, addr: u16) -> u8 {
        match addr {
            0xD000..=0xD3FF => self.vic.read(addr & 0x3F),
            0xD400..=0xD7FF => self.sid.read(addr & 0x1F),
            // upper color nibble floats
            0xD800..=0xDBFF => self.color_ram[(addr & 0x3FF) as usize] | 0xF0,
            0xDC00..=0xDCFF => self.read_device(DeviceSlot::Cia1, addr),
            0xDD00..=0xDDFF => self.read_device(DeviceSlot::Cia2, addr),
            0xDE00..=0xDEFF => match &self.cartridge {
                Some(cart) => cart.read_io1(addr).unwrap_or(self.last_bus_value),
                None => self.read_device(DeviceSlot::Expansion, addr),
            },
            0xDF00..=0xDFFF => match &self.cartridge {
                Some(cart) => cart.read_io2(addr).unwrap_or(self.last_bus_value),
                None => self.read_device(DeviceSlot::Expansion, addr),
            },
            _ => unreachable!(),
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            0xD000..=0xD3FF => self.vic.write(addr & 0x3F, value),
            0xD400..=0xD7FF => self.sid.write(addr & 0x1F, value),
            0xD800..=0xDBFF => self.color_ram[(addr & 0x3FF) as usize] = value & 0x0F,
            0xDC00..=0xDCFF => self.write_device(DeviceSlot::Cia1, addr, value),
            0xDD00..=0xDDFF => self.write_device(DeviceSlot::Cia2, addr, value),
            0xDE00..=0xDFFF => {
                if let Some(cart) = &mut self.cartridge {
                    if addr < 0xDF00 {
                        cart.write_io1(addr, value);
                    } else {
                        cart.write_io2(addr, value);
                    }
                    // control writes may re-drive the port lines
                    self.exrom = cart.exrom();
                    self.game = cart.game();
                } else {
                    self.write_device(DeviceSlot::Expansion, addr, value);
                }
            }
            _ => unreachable!(),
        }
    }

    fn read_mapped(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x0001 => self.port.read(addr),

            0x0002..=0x7FFF => self.ram[addr as usize],

            // ROML window
            0x8000..=0x9FFF => {
                if let Some(cart) = &self.cartridge {
                    if self.ultimax() {
                        return cart.read_roml(addr);
                    }
                    if !self.exrom && self.port.loram() && self.port.hiram() {
                        return cart.read_roml(addr);
                    }
                }
                self.ram[addr as usize]
            }

            // ROMH (16K mode) / BASIC window
            0xA000..=0xBFFF => {
                if let Some(cart) = &self.cartridge {
                    if !self.exrom && !self.game {
                        if self.port.loram() && self.port.hiram() {
                            return cart.read_romh(addr);
                        }
                        return self.ram[addr as usize];
                    }
                }
                if self.port.basic_visible() {
                    self.basic_rom[(addr - BASIC_START) as usize]
                } else {
                    self.ram[addr as usize]
                }
            }

            0xC000..=0xCFFF => self.ram[addr as usize],

            // I/O, character ROM, or RAM
            0xD000..=0xDFFF => {
                if self.ultimax() || self.port.io_visible() {
                    self.read_io(addr)
                } else if self.port.char_rom_visible() {
                    self.char_rom[(addr - CHAR_START) as usize]
                } else {
                    self.ram[addr as usize]
                }
            }

            // KERNAL / Ultimax ROMH window
            0xE000..=0xFFFF => {
                if self.ultimax() {
                    if let Some(cart) = &self.cartridge {
                        return cart.read_ultimax_romh(addr);
                    }
                }
                if self.port.kernal_visible() {
                    self.kernal_rom[(addr - KERNAL_START) as usize]
                } else {
                    self.ram[addr as usize]
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
enum DeviceSlot {
    Cia1,
    Cia2,
    Expansion,
}

fn check_rom(rom: &'static str, data: &[u8], expected: usize) -> Result<(), crate::C64Error> {
    if data.len() != expected {
        return Err(crate::C64Error::InvalidRom {
            rom,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

impl MemoryBus for C64Memory {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.read_mapped(addr);
        self.last_bus_value = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus_value = value;
        match addr {
            0x0000..=0x0001 => {
                self.port.write(addr, value);
                // write-through for programs that peek the page directly
                self.ram[addr as usize] = value;
            }

            0x0002..=0x7FFF => self.ram[addr as usize] = value,

            // Action Replay RAM can claim ROML writes
            0x8000..=0x9FFF => {
                if let Some(cart) = &mut self.cartridge {
                    if cart.write_roml(addr, value) {
                        return;
                    }
                }
                self.ram[addr as usize] = value;
            }

            0xA000..=0xCFFF => self.ram[addr as usize] = value,

            0xD000..=0xDFFF => {
                if self.ultimax() || self.port.io_visible() {
                    self.write_io(addr, value);
                } else {
                    // character ROM or RAM selected: writes land in RAM
                    self.ram[addr as usize] = value;
                }
            }

            // ROM is an overlay on reads only
            0xE000..=0xFFFF => self.ram[addr as usize] = value,
        }
    }

    fn irq_active(&self) -> bool {
        self.vic.irq_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::BANK_SIZE;

    fn memory_with_roms() -> C64Memory {
        let mut mem = C64Memory::new(VicVariant::Pal6569);
        mem.load_roms(&[0xAA; 8192], &[0xBB; 8192], &[0xCC; 4096])
            .unwrap();
        mem
    }

    #[test]
    fn test_default_map() {
        let mut mem = memory_with_roms();
        assert_eq!(mem.read(0x0000), 0x2F);
        assert_eq!(mem.read(0xA000), 0xAA); // BASIC
        assert_eq!(mem.read(0xE000), 0xBB); // KERNAL
    }

    #[test]
    fn test_rom_write_through_to_ram() {
        let mut mem = memory_with_roms();
        mem.write(0xA000, 0x55);
        assert_eq!(mem.read(0xA000), 0xAA, "BASIC still banked in");

        mem.write(0x0001, 0x30); // all-RAM config
        assert_eq!(mem.read(0xA000), 0x55, "RAM revealed under BASIC");
    }

    #[test]
    fn test_bank_selection_is_pure_function_of_last_port_write() {
        let mut mem = memory_with_roms();
        for value in [0x30u8, 0x37, 0x33, 0x35] {
            mem.write(0x0001, value);
        }
        // config 5: RAM at $A000, I/O at $D000, RAM at $E000
        assert_eq!(mem.read(0xA000), 0x00);
        assert_eq!(mem.read(0xE000), 0x00);
        mem.write(0xD020, 0x07);
        assert_eq!(mem.vic.border_color(), 0x07);
    }

    #[test]
    fn test_char_rom_config() {
        let mut mem = memory_with_roms();
        mem.write(0x0001, 0x33);
        assert_eq!(mem.read(0xD000), 0xCC);
        // writes under the character ROM land in RAM
        mem.write(0xD100, 0x12);
        assert_eq!(mem.read(0xD100), 0xCC);
        mem.write(0x0001, 0x30);
        assert_eq!(mem.read(0xD100), 0x12);
    }

    #[test]
    fn test_config_1_maps_char_rom() {
        // LORAM=1, HIRAM=0, CHAREN=0: Character ROM at $D000 while both
        // BASIC and KERNAL are banked out
        let mut mem = memory_with_roms();
        mem.write(0x0001, 0x31);
        assert_eq!(mem.read(0xD000), 0xCC);
        assert_eq!(mem.read(0xA000), 0x00);
        assert_eq!(mem.read(0xE000), 0x00);
    }

    #[test]
    fn test_config_4_maps_io() {
        // CHAREN=1, LORAM=HIRAM=0: I/O responds at $D000 with every ROM
        // banked out
        let mut mem = memory_with_roms();
        mem.write(0x0001, 0x34);
        mem.write(0xD020, 0x09);
        assert_eq!(mem.vic.border_color(), 0x09);
        assert_eq!(mem.read(0xD020) & 0x0F, 0x09);
        assert_eq!(mem.read(0xA000), 0x00);
        assert_eq!(mem.read(0xE000), 0x00);
    }

    #[test]
    fn test_io_dispatch() {
        let mut mem = memory_with_roms();
        mem.write(0xD020, 0x05);
        assert_eq!(mem.vic.border_color(), 0x05);

        mem.write(0xD418, 0x0F);
        assert_eq!(mem.sid.volume(), 0x0F);

        mem.write(0xD800, 0x13);
        assert_eq!(mem.read(0xD800), 0x03 | 0xF0, "upper nibble floats");

        mem.write(0xDC04, 0x42);
        assert_eq!(mem.read(0xDC04), 0x42);
    }

    #[test]
    fn test_open_bus_returns_last_bus_value() {
        let mut mem = memory_with_roms();
        // no cartridge, no expansion device: $DE00 is unclaimed
        mem.read(0xA123); // puts $AA on the bus
        assert_eq!(mem.read(0xDE00), 0xAA);
        mem.write(0x1000, 0x77);
        assert_eq!(mem.read(0xDE00), 0x77);
    }

    #[test]
    fn test_8k_cartridge_mapping() {
        let mut mem = memory_with_roms();
        let mut rom = vec![0x11u8; BANK_SIZE];
        rom[4..9].copy_from_slice(&[0xC3, 0xC2, 0xCD, 0x38, 0x30]);
        rom[0] = 0x11;
        mem.attach_cartridge(Cartridge::from_bin(&rom).unwrap());

        assert_eq!(mem.bank_lines(), (false, true));
        assert_eq!(mem.read(0x8000), 0x11);
        assert_eq!(mem.read(0xA000), 0xAA, "BASIC unaffected in 8K mode");

        // LORAM=0 banks the cartridge out (diagnostics rely on this)
        mem.write(0x0001, 0x36);
        mem.write(0x8000, 0x99);
        assert_eq!(mem.read(0x8000), 0x99);
    }

    #[test]
    fn test_16k_cartridge_mapping() {
        let mut mem = memory_with_roms();
        let mut rom = vec![0u8; 2 * BANK_SIZE];
        rom[0] = 0x11;
        rom[BANK_SIZE] = 0x22;
        mem.attach_cartridge(Cartridge::from_bin(&rom).unwrap());

        assert_eq!(mem.bank_lines(), (false, false));
        assert_eq!(mem.read(0x8000), 0x11);
        assert_eq!(mem.read(0xA000), 0x22, "ROMH replaces BASIC");
    }

    #[test]
    fn test_ultimax_mapping() {
        let mut mem = memory_with_roms();
        let mut rom = vec![0u8; BANK_SIZE];
        rom[0] = 0x33;
        rom[0x1FFC] = 0x09;
        rom[0x1FFD] = 0xE0;
        mem.attach_cartridge(Cartridge::from_bin(&rom).unwrap());

        assert_eq!(mem.bank_lines(), (true, false));
        assert_eq!(mem.read(0xE000), 0x33, "cartridge replaces KERNAL");
        assert_eq!(mem.read(0xFFFC), 0x09);
        assert_eq!(mem.read(0xFFFD), 0xE0);
        // I/O stays visible in Ultimax mode regardless of the port
        mem.write(0x0001, 0x30);
        mem.write(0xD020, 0x02);
        assert_eq!(mem.vic.border_color(), 0x02);
    }

    #[test]
    fn test_action_replay_control_re_drives_lines() {
        let mut mem = memory_with_roms();
        let mut crt: Vec<u8> = Vec::new();
        crt.extend_from_slice(b"C64 CARTRIDGE   ");
        crt.extend_from_slice(&0x40u32.to_be_bytes());
        crt.extend_from_slice(&[1, 0]);
        crt.extend_from_slice(&1u16.to_be_bytes());
        crt.extend_from_slice(&[0, 0]);
        crt.extend_from_slice(&[0; 6]);
        crt.extend_from_slice(&[0; 32]);
        for bank in 0..4u16 {
            crt.extend_from_slice(b"CHIP");
            crt.extend_from_slice(&(16 + BANK_SIZE as u32).to_be_bytes());
            crt.extend_from_slice(&0u16.to_be_bytes());
            crt.extend_from_slice(&bank.to_be_bytes());
            crt.extend_from_slice(&0x8000u16.to_be_bytes());
            crt.extend_from_slice(&(BANK_SIZE as u16).to_be_bytes());
            crt.extend_from_slice(&vec![bank as u8; BANK_SIZE]);
        }
        mem.attach_cartridge(Cartridge::from_crt(&crt).unwrap());
        assert_eq!(mem.bank_lines(), (false, false));
        assert_eq!(mem.read(0x8000), 0);

        mem.write(0xDE00, 2 << 3); // bank 2
        assert_eq!(mem.read(0x8000), 2);

        mem.write(0xDE00, 0x04); // disable
        assert_eq!(mem.bank_lines(), (true, true));
    }

    #[test]
    fn test_vic_view_of_memory() {
        let mut mem = memory_with_roms();
        mem.ram_mut()[0x0400] = 0x01;
        assert_eq!(mem.vic_read(0x0400), 0x01);
        // character ROM shadow at $1000-$1FFF in bank 0
        assert_eq!(mem.vic_read(0x1000), 0xCC);

        // switch to bank 3 via CIA2 port A
        mem.write(0xDD00, 0xFC);
        mem.ram_mut()[0xC400] = 0x44;
        assert_eq!(mem.vic_read(0x0400), 0x44);
        // no character shadow in bank 3
        mem.ram_mut()[0xD000] = 0x55;
        assert_eq!(mem.vic_read(0x1000), 0x55);
    }

    #[test]
    fn test_device_error_is_logged_and_survivable() {
        struct FaultyDevice;
        impl BusDevice for FaultyDevice {
            fn read(&mut self, offset: u16) -> Result<u8, BusDeviceError> {
                Err(BusDeviceError {
                    addr: 0xDE00 | offset,
                    reason: "not ready".into(),
                })
            }
            fn write(&mut self, _offset: u16, _value: u8) -> Result<(), BusDeviceError> {
                Ok(())
            }
        }

        let mut mem = memory_with_roms();
        mem.set_expansion(Some(Box::new(FaultyDevice)));
        mem.read(0x2000); // known bus value (0)
        let value = mem.read(0xDE00);
        assert_eq!(value, 0, "fault substitutes open bus");
        assert!(mem.take_device_error().is_some());
        assert!(mem.take_device_error().is_none());
    }

    #[test]
    fn test_reset_preserves_ram() {
        let mut mem = memory_with_roms();
        mem.write(0x1234, 0x56);
        mem.write(0x0001, 0x30);
        mem.reset();
        assert_eq!(mem.ram()[0x1234], 0x56);
        assert_eq!(mem.port.bank_config(), 7);
    }
}
