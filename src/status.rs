//! # Processor Status Register
//!
//! The 6502 status register `P` as a single byte with masked accessors.
//!
//! Bit layout (NV-BDIZC):
//! - Bit 7: N (Negative)
//! - Bit 6: V (Overflow)
//! - Bit 5: unused, reads as 1 and is always 1 in pushed copies
//! - Bit 4: B (Break) - exists only in bytes pushed to the stack
//! - Bit 3: D (Decimal)
//! - Bit 2: I (Interrupt Disable)
//! - Bit 1: Z (Zero)
//! - Bit 0: C (Carry)
//!
//! `B` is synthetic: it is never stored in the live register, only in the
//! copy pushed by BRK/PHP (set) or by IRQ/NMI service (clear).

use bitflags::bitflags;

bitflags! {
    /// 6502 processor status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        const CARRY       = 0b0000_0001;
        const ZERO        = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL     = 0b0000_1000;
        const BREAK       = 0b0001_0000;
        const UNUSED      = 0b0010_0000;
        const OVERFLOW    = 0b0100_0000;
        const NEGATIVE    = 0b1000_0000;
    }
}

impl Status {
    /// Power-on/reset value: I set, unused bit set ($24).
    pub fn reset() -> Self {
        Status::IRQ_DISABLE | Status::UNUSED
    }

    /// The byte pushed to the stack for this status.
    ///
    /// Bit 5 is forced to 1. Bit 4 is 1 for BRK/PHP pushes and 0 for
    /// IRQ/NMI service pushes.
    pub fn to_pushed(self, break_flag: bool) -> u8 {
        let mut byte = self.bits() | Status::UNUSED.bits();
        if break_flag {
            byte |= Status::BREAK.bits();
        } else {
            byte &= !Status::BREAK.bits();
        }
        byte
    }

    /// Reconstructs the live register from a byte pulled off the stack.
    ///
    /// B is discarded (it is never stored) and the unused bit is forced on.
    pub fn from_pulled(byte: u8) -> Self {
        let mut status = Status::from_bits_retain(byte);
        status.remove(Status::BREAK);
        status.insert(Status::UNUSED);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_value() {
        assert_eq!(Status::reset().bits(), 0x24);
    }

    #[test]
    fn test_pushed_byte_forces_bits() {
        let status = Status::CARRY | Status::UNUSED;
        assert_eq!(status.to_pushed(true), 0b0011_0001);
        assert_eq!(status.to_pushed(false), 0b0010_0001);

        // Unused bit is forced even if somehow clear in the live register
        let status = Status::from_bits_retain(0x00);
        assert_eq!(status.to_pushed(false) & 0x20, 0x20);
    }

    #[test]
    fn test_pull_discards_break() {
        let status = Status::from_pulled(0xFF);
        assert!(!status.contains(Status::BREAK));
        assert!(status.contains(Status::UNUSED));
        assert!(status.contains(Status::NEGATIVE));
        assert!(status.contains(Status::CARRY));
    }

    #[test]
    fn test_php_plp_round_trip() {
        let original = Status::NEGATIVE | Status::DECIMAL | Status::CARRY | Status::UNUSED;
        let restored = Status::from_pulled(original.to_pushed(true));
        assert_eq!(restored, original);
    }
}
