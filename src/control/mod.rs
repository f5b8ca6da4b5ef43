// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Logic
//!
//! - [`scheduler`] - phase-driven pulse-waveform generation.
//! - [`controller`] - top-level loop tying the decoder, scheduler, and chain
//!   encoder together.

pub mod controller;
pub mod scheduler;

pub use controller::Controller;
pub use scheduler::{phase_at, Phase, Scheduler};
