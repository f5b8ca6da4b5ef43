// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Build-time board topology and timing constants.
//!
//! One "board" carries a fixed number of daisy-chained NCV7718-class driver
//! chips; each chip drives a fixed number of H-bridges. The totals below size
//! every buffer in the firmware; nothing allocates.
//!
//! Two chip topologies exist across board revisions and are selected with the
//! `register-chain` cargo feature:
//!
//! - default: direct 16-bit control words, 3 bridges per chip
//! - `register-chain`: three address/data control registers, 6 bridges per chip

/// Number of boards on the daisy chain.
pub const NUM_BOARDS: usize = 1;

/// Driver chips per board.
pub const CHIPS_PER_BOARD: usize = 3;

/// H-bridges controlled by one chip.
#[cfg(not(feature = "register-chain"))]
pub const BRIDGES_PER_CHIP: usize = 3;
#[cfg(feature = "register-chain")]
pub const BRIDGES_PER_CHIP: usize = 6;

/// Total chips on the chain.
pub const TOTAL_CHIPS: usize = NUM_BOARDS * CHIPS_PER_BOARD;

/// Total addressable bridges.
pub const TOTAL_BRIDGES: usize = TOTAL_CHIPS * BRIDGES_PER_CHIP;

/// Capacity bound for chain transfer buffers, independent of the configured
/// topology so the encoders work for any chain up to this size.
pub const MAX_CHIPS: usize = 36;

/// Capacity bound for the decoder's staging vector.
pub const MAX_BRIDGES: usize = MAX_CHIPS * 6;

/// All waveform phase durations are expressed in ticks of 10 µs.
pub const TICKS_PER_SEC: u32 = 100_000;
