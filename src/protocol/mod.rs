// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod decoder;
pub mod messages;

pub use decoder::{CommitPolicy, Decoder, DecoderConfig, StateLayout};
pub use messages::{DecoderEvent, TimingConfig};
