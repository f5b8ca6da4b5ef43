//! Chain encoders: turning the logical bridge vector into chip-select-bracketed
//! SPI frames for a daisy chain of driver chips.
//!
//! The scheduler decides *what* should be driven (a phase intent plus the
//! desired-state vector); a [`ChainEncoder`] decides how that maps onto the
//! wire for one hardware revision. Both revisions share [`FramePort`], which
//! guarantees that one logical multi-chip transfer is a single atomic
//! select/shift/deselect sequence.

use crate::board::MAX_CHIPS;
use crate::drivers::ncv7718::{
    register_addr, ChipState, Drive, DIRECT_BRIDGES_PER_CHIP, REGISTER_BRIDGES_PER_CHIP,
};
use crate::hw::{ChipSelect, SpiBus};
use stm32f7xx_hal::spi;

/// One atomic frame transfer: select, shift all bytes MSB-first, deselect.
///
/// No other bus user may interleave within a frame.
pub trait FramePort {
    type Error;

    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Converts a desired-state vector plus a phase intent into hardware frames.
///
/// `active` holds the host's desired flags, one per bridge; `drive` is the
/// polarity for the current waveform phase. Inactive bridges (and bridges
/// past the end of `active`) are always driven off. Calling `emit` twice with
/// identical inputs produces bit-identical frames.
pub trait ChainEncoder {
    fn emit<P: FramePort>(
        &self,
        active: &[bool],
        drive: Drive,
        port: &mut P,
    ) -> Result<(), P::Error>;
}

fn chip_state(active: &[bool], base: usize, count: usize, drive: Drive) -> ChipState {
    let mut chip = ChipState::off();
    for j in 0..count {
        if active.get(base + j).copied().unwrap_or(false) {
            chip.set_bridge(j, drive);
        }
    }
    chip
}

/// Direct control-word topology: 2 bytes per chip, 3 bridges per chip, the
/// whole chain in one frame with the highest-address chip shifted first.
pub struct DirectChain {
    chips: usize,
}

impl DirectChain {
    pub fn new(chips: usize) -> Self {
        Self {
            chips: chips.min(MAX_CHIPS),
        }
    }
}

impl ChainEncoder for DirectChain {
    fn emit<P: FramePort>(
        &self,
        active: &[bool],
        drive: Drive,
        port: &mut P,
    ) -> Result<(), P::Error> {
        let mut buf = [0u8; 2 * MAX_CHIPS];
        let mut len = 0;
        for chip_idx in (0..self.chips).rev() {
            let chip = chip_state(
                active,
                chip_idx * DIRECT_BRIDGES_PER_CHIP,
                DIRECT_BRIDGES_PER_CHIP,
                drive,
            );
            let bytes = chip.control_bytes();
            buf[len] = bytes[0];
            buf[len + 1] = bytes[1];
            len += 2;
        }
        port.write_frame(&buf[..len])
    }
}

/// Register-addressed topology: 6 bridges per chip across three HB_ACT
/// registers. Each register write is one frame: an address byte per chip in
/// chain order (latch flag on the last), then a data byte per chip.
pub struct RegisterChain {
    chips: usize,
}

impl RegisterChain {
    pub fn new(chips: usize) -> Self {
        Self {
            chips: chips.min(MAX_CHIPS),
        }
    }
}

impl ChainEncoder for RegisterChain {
    fn emit<P: FramePort>(
        &self,
        active: &[bool],
        drive: Drive,
        port: &mut P,
    ) -> Result<(), P::Error> {
        let mut buf = [0u8; 2 * MAX_CHIPS];
        for reg_idx in 0..3 {
            for chip_idx in 0..self.chips {
                buf[chip_idx] = register_addr(reg_idx, chip_idx == self.chips - 1);
                let chip = chip_state(
                    active,
                    chip_idx * REGISTER_BRIDGES_PER_CHIP,
                    REGISTER_BRIDGES_PER_CHIP,
                    drive,
                );
                buf[self.chips + chip_idx] = chip.register_data(reg_idx);
            }
            port.write_frame(&buf[..2 * self.chips])?;
        }
        Ok(())
    }
}

/// Hardware [`FramePort`] over the SPI bus and a manual chip-select line.
pub struct SpiChainPort<I, PINS, const P: char, const N: u8> {
    bus: SpiBus<I, PINS>,
    cs: ChipSelect<P, N>,
}

impl<I, PINS, const P: char, const N: u8> SpiChainPort<I, PINS, P, N>
where
    I: spi::Instance,
    PINS: spi::Pins<I>,
{
    pub fn new(bus: SpiBus<I, PINS>, cs: ChipSelect<P, N>) -> Self {
        Self { bus, cs }
    }

    pub fn free(self) -> (SpiBus<I, PINS>, ChipSelect<P, N>) {
        (self.bus, self.cs)
    }
}

impl<I, PINS, const P: char, const N: u8> FramePort for SpiChainPort<I, PINS, P, N>
where
    I: spi::Instance,
    PINS: spi::Pins<I>,
{
    type Error = spi::Error;

    fn write_frame(&mut self, bytes: &[u8]) -> Result<(), spi::Error> {
        self.cs.select();
        let res = self.bus.write_bytes(bytes);
        // Deselect even on a failed transfer so the chain is never left latched.
        self.cs.deselect();
        res
    }
}
