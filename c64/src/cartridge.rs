//! Cartridge images and mappers.
//!
//! Two on-disk formats are supported:
//!
//! - **Raw .bin images**, auto-detected by size and content: an 8 KiB image
//!   with the CBM80 signature is a normal 8K cartridge at $8000; an 8 KiB
//!   image whose reset vector points into $E000-$FFFF is an Ultimax
//!   cartridge at $E000; a 16 KiB image maps $8000-$BFFF.
//! - **CRT files** (the C64 community container): a 64-byte header with
//!   the `C64 CARTRIDGE   ` signature and big-endian fields, followed by
//!   CHIP packets carrying ROM data with load addresses.
//!
//! Hardware types 0 (normal) and 1 (Action Replay) are implemented; other
//! types fail the load with [`CartridgeError::UnsupportedCartridge`].
//!
//! The EXROM/GAME line values follow the cartridge port convention:
//! `true` is the pulled-up (inactive) level, `false` is asserted.

use thiserror::Error;

/// ROML region start ($8000).
pub const ROML_START: u16 = 0x8000;
/// ROMH region start in 16K mode ($A000).
pub const ROMH_START: u16 = 0xA000;
/// ROMH region start in Ultimax mode ($E000).
pub const ULTIMAX_ROMH_START: u16 = 0xE000;
/// Cartridge bank size (8 KiB).
pub const BANK_SIZE: usize = 0x2000;
/// IO1 region start ($DE00).
pub const IO1_START: u16 = 0xDE00;
/// IO2 region start ($DF00).
pub const IO2_START: u16 = 0xDF00;

/// The CBM80 autostart signature at cartridge offset 4 ($8004).
const CBM80: [u8; 5] = [0xC3, 0xC2, 0xCD, 0x38, 0x30];

/// CRT container signature (16 bytes).
const CRT_SIGNATURE: &[u8; 16] = b"C64 CARTRIDGE   ";

/// Errors raised while loading a cartridge image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    /// The image cannot be a cartridge: wrong size, bad signature, or a
    /// malformed container.
    #[error("invalid cartridge image: {0}")]
    InvalidCartridge(String),

    /// A well-formed CRT file for a mapper this crate does not implement.
    #[error("unsupported cartridge hardware type {hardware_type}")]
    UnsupportedCartridge { hardware_type: u16 },
}

/// An attached cartridge with its banking state.
#[derive(Debug, Clone, PartialEq)]
pub enum Cartridge {
    /// Static ROM with no banking hardware: 8K, 16K, or Ultimax,
    /// depending on which regions are populated.
    Normal {
        roml: Option<Vec<u8>>,
        romh: Option<Vec<u8>>,
        ultimax_romh: Option<Vec<u8>>,
    },
    /// Action Replay freezer: 4 x 8 KiB ROM banks, 8 KiB RAM, control
    /// register at $DE00.
    ActionReplay(ActionReplay),
}

/// Action Replay banking state.
///
/// Control register at $DE00 (write only):
/// - Bit 0: 1 = GAME line asserted (low)
/// - Bit 1: 1 = EXROM line released (high)
/// - Bit 2: 1 = disable cartridge entirely
/// - Bits 3-4: ROM bank select
/// - Bit 5: 1 = RAM at ROML and IO2
/// - Bit 6: 1 = clear freeze mode
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReplay {
    banks: Vec<Vec<u8>>,
    ram: Vec<u8>,
    bank: u8,
    ram_enabled: bool,
    disabled: bool,
    frozen: bool,
    exrom: bool,
    game: bool,
}

impl ActionReplay {
    fn new(banks: Vec<Vec<u8>>) -> Self {
        Self {
            banks,
            ram: vec![0; BANK_SIZE],
            bank: 0,
            ram_enabled: false,
            disabled: false,
            frozen: false,
            // powers up in 16K mode
            exrom: false,
            game: false,
        }
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }

    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn frozen(&self) -> bool {
        self.frozen
    }

    fn rom_byte(&self, offset: usize) -> u8 {
        self.banks
            .get(self.bank as usize)
            .and_then(|bank| bank.get(offset))
            .copied()
            .unwrap_or(0xFF)
    }

    fn control_write(&mut self, value: u8) {
        self.game = value & 0x01 == 0;
        self.exrom = value & 0x02 != 0;
        if value & 0x04 != 0 {
            self.disabled = true;
            self.exrom = true;
            self.game = true;
        }
        self.bank = (value >> 3) & 0x03;
        self.ram_enabled = value & 0x20 != 0;
        if value & 0x40 != 0 {
            self.frozen = false;
        }
        log::debug!(
            "action replay control ${value:02X}: bank={} ram={} disabled={} exrom={} game={}",
            self.bank,
            self.ram_enabled,
            self.disabled,
            self.exrom as u8,
            self.game as u8
        );
    }
}

impl Cartridge {
    /// Loads a raw binary image, auto-detecting the mapping:
    ///
    /// 1. 8192 bytes with the CBM80 signature at offset 4: normal 8K at
    ///    $8000 (EXROM=0, GAME=1)
    /// 2. 8192 bytes whose reset vector (offset $1FFC) points into
    ///    $E000-$FFFF: Ultimax at $E000 (EXROM=1, GAME=0)
    /// 3. 16384 bytes: 16K at $8000-$BFFF (EXROM=0, GAME=0)
    pub fn from_bin(data: &[u8]) -> Result<Self, CartridgeError> {
        match data.len() {
            BANK_SIZE => {
                if data[4..9] == CBM80 {
                    log::debug!("auto-detected 8K cartridge (CBM80 signature)");
                    return Ok(Cartridge::Normal {
                        roml: Some(data.to_vec()),
                        romh: None,
                        ultimax_romh: None,
                    });
                }
                let reset = data[0x1FFC] as u16 | ((data[0x1FFD] as u16) << 8);
                if reset >= 0xE000 {
                    log::debug!("auto-detected Ultimax cartridge (reset vector ${reset:04X})");
                    return Ok(Cartridge::Normal {
                        roml: None,
                        romh: None,
                        ultimax_romh: Some(data.to_vec()),
                    });
                }
                Err(CartridgeError::InvalidCartridge(format!(
                    "8K image with no CBM80 signature and reset vector ${reset:04X} outside ROM"
                )))
            }
            len if len == 2 * BANK_SIZE => Ok(Cartridge::Normal {
                roml: Some(data[..BANK_SIZE].to_vec()),
                romh: Some(data[BANK_SIZE..].to_vec()),
                ultimax_romh: None,
            }),
            len => Err(CartridgeError::InvalidCartridge(format!(
                "size {len} bytes (expected 8192 or 16384)"
            ))),
        }
    }

    /// Parses a CRT container.
    pub fn from_crt(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < 64 {
            return Err(CartridgeError::InvalidCartridge(
                "shorter than the 64-byte CRT header".into(),
            ));
        }
        if &data[..16] != CRT_SIGNATURE {
            return Err(CartridgeError::InvalidCartridge("bad CRT signature".into()));
        }

        let header_len = be32(&data[0x10..]) as usize;
        let hardware_type = be16(&data[0x16..]);
        let exrom_line = data[0x18];
        let game_line = data[0x19];
        let name = String::from_utf8_lossy(&data[0x20..0x40])
            .trim_end_matches('\0')
            .to_string();
        log::debug!(
            "CRT header: name='{name}' type={hardware_type} EXROM={exrom_line} GAME={game_line}"
        );

        if hardware_type > 1 {
            return Err(CartridgeError::UnsupportedCartridge { hardware_type });
        }

        let mut roml: Option<Vec<u8>> = None;
        let mut romh: Option<Vec<u8>> = None;
        let mut ultimax_romh: Option<Vec<u8>> = None;
        let mut banks: Vec<(u16, Vec<u8>)> = Vec::new();

        let mut offset = header_len.max(0x40);
        while offset + 16 <= data.len() {
            if &data[offset..offset + 4] != b"CHIP" {
                return Err(CartridgeError::InvalidCartridge(format!(
                    "bad CHIP signature at offset {offset}"
                )));
            }
            let packet_len = be32(&data[offset + 4..]) as usize;
            let chip_type = be16(&data[offset + 8..]);
            let bank = be16(&data[offset + 10..]);
            let load_address = be16(&data[offset + 12..]);
            let rom_size = be16(&data[offset + 14..]) as usize;

            if packet_len < 16 || offset + 16 + rom_size > data.len() {
                return Err(CartridgeError::InvalidCartridge(format!(
                    "truncated CHIP packet at offset {offset}"
                )));
            }
            let rom = data[offset + 16..offset + 16 + rom_size].to_vec();
            log::debug!(
                "CHIP packet: type={chip_type} bank={bank} load=${load_address:04X} size={rom_size}"
            );

            if chip_type != 0 {
                log::warn!("skipping non-ROM CHIP type {chip_type}");
                offset += packet_len;
                continue;
            }

            if hardware_type == 0 {
                match load_address {
                    a if a == ROML_START && rom_size > BANK_SIZE => {
                        // one 16 KiB CHIP covering ROML and ROMH
                        romh = Some(rom[BANK_SIZE..].to_vec());
                        roml = Some(rom[..BANK_SIZE].to_vec());
                    }
                    a if a == ROML_START => roml = Some(rom),
                    a if a == ROMH_START => romh = Some(rom),
                    a if a == ULTIMAX_ROMH_START => ultimax_romh = Some(rom),
                    a => log::warn!("ignoring CHIP at unexpected load address ${a:04X}"),
                }
            } else {
                if load_address == ROML_START {
                    banks.push((bank, rom));
                } else {
                    log::warn!("ignoring CHIP at unexpected load address ${load_address:04X}");
                }
            }

            offset += packet_len;
        }

        if hardware_type == 0 {
            if roml.is_none() && ultimax_romh.is_none() {
                return Err(CartridgeError::InvalidCartridge(
                    "no usable CHIP packets".into(),
                ));
            }
            return Ok(Cartridge::Normal {
                roml,
                romh,
                ultimax_romh,
            });
        }

        if banks.is_empty() {
            return Err(CartridgeError::InvalidCartridge(
                "Action Replay CRT with no ROM banks".into(),
            ));
        }
        banks.sort_by_key(|(number, _)| *number);
        let highest = banks.last().map(|(number, _)| *number).unwrap_or(0);
        let mut bank_list = vec![vec![0u8; BANK_SIZE]; highest as usize + 1];
        for (number, rom) in banks {
            bank_list[number as usize] = rom;
        }
        Ok(Cartridge::ActionReplay(ActionReplay::new(bank_list)))
    }

    /// EXROM line level (`true` = pulled up / inactive).
    pub fn exrom(&self) -> bool {
        match self {
            Cartridge::Normal {
                roml, ultimax_romh, ..
            } => {
                if ultimax_romh.is_some() {
                    true
                } else {
                    // 8K and 16K both assert EXROM
                    roml.is_none()
                }
            }
            Cartridge::ActionReplay(ar) => ar.exrom,
        }
    }

    /// GAME line level (`true` = pulled up / inactive).
    pub fn game(&self) -> bool {
        match self {
            Cartridge::Normal {
                romh, ultimax_romh, ..
            } => ultimax_romh.is_none() && romh.is_none(),
            Cartridge::ActionReplay(ar) => ar.game,
        }
    }

    /// Reads from the ROML window ($8000-$9FFF).
    pub fn read_roml(&self, addr: u16) -> u8 {
        let offset = (addr - ROML_START) as usize;
        match self {
            Cartridge::Normal { roml, .. } => {
                roml.as_ref().and_then(|r| r.get(offset)).copied().unwrap_or(0xFF)
            }
            Cartridge::ActionReplay(ar) => {
                if ar.disabled {
                    0xFF
                } else if ar.ram_enabled {
                    ar.ram[offset]
                } else {
                    ar.rom_byte(offset)
                }
            }
        }
    }

    /// Reads from the ROMH window ($A000-$BFFF, 16K mode).
    pub fn read_romh(&self, addr: u16) -> u8 {
        let offset = (addr - ROMH_START) as usize;
        match self {
            Cartridge::Normal { romh, .. } => {
                romh.as_ref().and_then(|r| r.get(offset)).copied().unwrap_or(0xFF)
            }
            Cartridge::ActionReplay(ar) => {
                if ar.disabled {
                    0xFF
                } else {
                    ar.rom_byte(offset)
                }
            }
        }
    }

    /// Reads from the Ultimax ROMH window ($E000-$FFFF).
    pub fn read_ultimax_romh(&self, addr: u16) -> u8 {
        let offset = (addr - ULTIMAX_ROMH_START) as usize;
        match self {
            Cartridge::Normal { ultimax_romh, .. } => ultimax_romh
                .as_ref()
                .and_then(|r| r.get(offset))
                .copied()
                .unwrap_or(0xFF),
            Cartridge::ActionReplay(ar) => ar.rom_byte(offset),
        }
    }

    /// Writes into the ROML window. Returns `true` when the cartridge
    /// claimed the write (Action Replay RAM); otherwise it falls through
    /// to C64 RAM.
    pub fn write_roml(&mut self, addr: u16, value: u8) -> bool {
        if let Cartridge::ActionReplay(ar) = self {
            if !ar.disabled && ar.ram_enabled {
                ar.ram[(addr - ROML_START) as usize] = value;
                return true;
            }
        }
        false
    }

    /// Reads IO1 ($DE00-$DEFF). `None` is open bus.
    pub fn read_io1(&self, _addr: u16) -> Option<u8> {
        None
    }

    /// Reads IO2 ($DF00-$DFFF). The Action Replay maps the last 256 bytes
    /// of its RAM here when RAM is enabled.
    pub fn read_io2(&self, addr: u16) -> Option<u8> {
        match self {
            Cartridge::ActionReplay(ar) if !ar.disabled && ar.ram_enabled => {
                Some(ar.ram[BANK_SIZE - 0x100 + (addr - IO2_START) as usize])
            }
            _ => None,
        }
    }

    /// Writes IO1 ($DE00-$DEFF) - the Action Replay control register.
    pub fn write_io1(&mut self, _addr: u16, value: u8) {
        if let Cartridge::ActionReplay(ar) = self {
            if !ar.disabled {
                ar.control_write(value);
            }
        }
    }

    /// Writes IO2 ($DF00-$DFFF).
    pub fn write_io2(&mut self, addr: u16, value: u8) {
        if let Cartridge::ActionReplay(ar) = self {
            if !ar.disabled && ar.ram_enabled {
                ar.ram[BANK_SIZE - 0x100 + (addr - IO2_START) as usize] = value;
            }
        }
    }

    /// The freeze button: latches freeze mode. The system raises the NMI.
    pub fn freeze(&mut self) {
        if let Cartridge::ActionReplay(ar) = self {
            ar.frozen = true;
        }
    }

    /// Restores power-on banking state (system reset).
    pub fn reset(&mut self) {
        if let Cartridge::ActionReplay(ar) = self {
            ar.bank = 0;
            ar.ram_enabled = false;
            ar.disabled = false;
            ar.frozen = false;
            ar.exrom = false;
            ar.game = false;
        }
    }
}

#[inline]
fn be16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

#[inline]
fn be32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}
