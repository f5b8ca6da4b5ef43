// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module sits above the raw `hw/` layer and below the control logic.
//!
//! - [`ncv7718`] – chip-level bit packing for the NCV7718-class drivers
//! - [`chain`] – daisy-chain frame encoders and the SPI frame port

pub mod chain;
pub mod ncv7718;

pub use chain::{ChainEncoder, DirectChain, FramePort, RegisterChain, SpiChainPort};
pub use ncv7718::{ChipState, Drive};
