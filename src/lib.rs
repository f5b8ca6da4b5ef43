// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # TapArray Firmware
//!
//! Firmware for arrays of NCV7718-class H-bridge driver chips behind an
//! STM32F777 MCU. A host streams a compact serial protocol describing which
//! bridges should be active; the firmware turns that into a periodic bipolar
//! pulse waveform (forward pulse → idle → reverse pulse → idle) and shifts
//! the per-chip bit patterns out over SPI.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`board`] | Build-time chain topology and timing constants |
//! | [`hw`] | MCU-level wrappers around USART, SPI, LED, time source |
//! | [`drivers`] | NCV7718 bit packing and daisy-chain frame encoders |
//! | [`protocol`] | Host serial protocol: frame decoder and wire constants |
//! | [`control`] | Waveform scheduler and the top-level control loop |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! Unit tests run on the host:
//!
//! ```bash
//! cargo test --lib
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod protocol;
