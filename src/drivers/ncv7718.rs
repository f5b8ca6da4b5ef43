//! NCV7718 bit-level encodings.
//!
//! This module handles the chip-level bit packing for both board revisions of
//! the NCV7718-class half-bridge drivers. Chain framing and chip-select
//! bracketing live in [`crate::drivers::chain`].
//!
//! Two encodings exist:
//!
//! - the direct 16-bit control word (3 bridges per chip), shifted out as two
//!   bytes MSB-first;
//! - the register-addressed variant (6 bridges per chip): three HB_ACT
//!   control registers, each written as one address byte plus one data byte
//!   packing two 4-bit half-bridge nibbles.

/// Bridges controlled per chip in the direct control-word topology.
pub const DIRECT_BRIDGES_PER_CHIP: usize = 3;

/// Bridges controlled per chip in the register-addressed topology.
pub const REGISTER_BRIDGES_PER_CHIP: usize = 6;

/// Register-select addresses for the register-addressed variant.
pub mod reg {
    pub const HB_ACT_1: u8 = 0b00000;
    pub const HB_ACT_2: u8 = 0b10000;
    pub const HB_ACT_3: u8 = 0b01000;

    /// Write order on the wire.
    pub const ALL: [u8; 3] = [HB_ACT_1, HB_ACT_2, HB_ACT_3];
}

/// Per-bridge drive instruction for one waveform phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Drive {
    Off,
    Forward,
    Reverse,
}

/// Enable/direction bit pair for one chip.
///
/// Bit `n` of `en` enables bridge `n`; bit `n` of `dir` selects its polarity.
/// This is the logical form; `control_word` / `register_data` produce the
/// datasheet layouts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChipState {
    en: u8,
    dir: u8,
}

impl ChipState {
    /// All bridges off.
    pub const fn off() -> Self {
        Self { en: 0, dir: 0 }
    }

    /// Set one bridge's drive instruction.
    pub fn set_bridge(&mut self, offset: usize, drive: Drive) {
        let bit = 1u8 << offset;
        self.en &= !bit;
        self.dir &= !bit;
        match drive {
            Drive::Off => {}
            Drive::Forward => self.en |= bit,
            Drive::Reverse => {
                self.en |= bit;
                self.dir |= bit;
            }
        }
    }

    /// Pack the direct-topology 16-bit control word.
    ///
    /// Each enable bit is replicated to the 2 adjacent HBEN positions of its
    /// bridge; the direction produces the complementary HBCNF pair (01 one
    /// polarity, 10 the other). Layout: `000 {en:6} {cc:6} 0`.
    pub fn control_word(&self) -> u16 {
        let mut hben: u16 = 0;
        let mut hbcnf: u16 = 0;
        for j in 0..DIRECT_BRIDGES_PER_CHIP {
            if self.en & (1 << j) != 0 {
                hben |= 0b11 << (j * 2);
            }
            if self.dir & (1 << j) != 0 {
                hbcnf |= 0b01 << (j * 2);
            } else {
                hbcnf |= 0b10 << (j * 2);
            }
        }
        (hben << 7) | (hbcnf << 1)
    }

    /// Direct control word as two bytes, MSB-first.
    pub fn control_bytes(&self) -> [u8; 2] {
        let word = self.control_word();
        [(word >> 8) as u8, word as u8]
    }

    /// Pack the data byte for one HB_ACT register: two half-bridge nibbles,
    /// `0000` off, `0110` one polarity, `1001` the other.
    pub fn register_data(&self, reg_idx: usize) -> u8 {
        let mut data = 0u8;
        for k in 0..2 {
            let bridge = reg_idx * 2 + k;
            if self.en & (1 << bridge) != 0 {
                let nibble = if self.dir & (1 << bridge) != 0 {
                    0b1001
                } else {
                    0b0110
                };
                data |= nibble << (k * 4);
            }
        }
        data
    }
}

/// Build the address/command byte preceding each chip's register data.
///
/// `last_in_frame` sets the flag telling the final chip in the daisy chain to
/// latch the shifted data into its outputs.
pub fn register_addr(reg_idx: usize, last_in_frame: bool) -> u8 {
    let mut addr = 0b1000_0001;
    if last_in_frame {
        addr |= 0b0000_0010;
    }
    addr | (reg::ALL[reg_idx] << 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_chip_has_zero_enable_field() {
        let word = ChipState::off().control_word();
        // HBEN occupies bits 12..7; all clear when every bridge is off.
        assert_eq!(word & 0b0001_1111_1000_0000, 0);
        // HBCNF still drives the idle 10 pattern per bridge.
        assert_eq!(word, 0b0000_0000_0101_0100);
    }

    #[test]
    fn off_chip_has_zero_register_nibbles() {
        let chip = ChipState::off();
        for r in 0..3 {
            assert_eq!(chip.register_data(r), 0x00);
        }
    }

    #[test]
    fn forward_replicates_enable_pair() {
        let mut chip = ChipState::off();
        chip.set_bridge(0, Drive::Forward);
        assert_eq!(chip.control_word(), 0b0000_0001_1101_0100);
        assert_eq!(chip.control_bytes(), [0x01, 0xD4]);
    }

    #[test]
    fn reverse_flips_the_config_pair() {
        let mut chip = ChipState::off();
        chip.set_bridge(0, Drive::Reverse);
        assert_eq!(chip.control_word(), 0b0000_0001_1101_0010);
    }

    #[test]
    fn high_bridge_lands_in_high_bits() {
        let mut chip = ChipState::off();
        chip.set_bridge(2, Drive::Forward);
        assert_eq!(chip.control_word(), 0b0001_1000_0101_0100);
    }

    #[test]
    fn overwriting_a_bridge_clears_old_bits() {
        let mut chip = ChipState::off();
        chip.set_bridge(1, Drive::Reverse);
        chip.set_bridge(1, Drive::Off);
        assert_eq!(chip, ChipState::off());
    }

    #[test]
    fn register_nibbles_encode_polarity() {
        let mut chip = ChipState::off();
        chip.set_bridge(0, Drive::Forward); // reg 0, low nibble
        chip.set_bridge(1, Drive::Reverse); // reg 0, high nibble
        chip.set_bridge(4, Drive::Forward); // reg 2, low nibble
        assert_eq!(chip.register_data(0), 0b1001_0110);
        assert_eq!(chip.register_data(1), 0x00);
        assert_eq!(chip.register_data(2), 0b0000_0110);
    }

    #[test]
    fn register_addr_bytes() {
        assert_eq!(register_addr(0, false), 0b1000_0001);
        assert_eq!(register_addr(0, true), 0b1000_0011);
        assert_eq!(register_addr(1, false), 0b1100_0001);
        assert_eq!(register_addr(2, true), 0b1010_0011);
    }
}
