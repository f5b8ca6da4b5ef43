// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire format of the host-to-device serial protocol.
//!
//! The stream has no framing or checksum: three marker bytes delimit frames
//! and everything else is payload. Any byte that is not a recognized marker
//! while the decoder is idle is ignored.

/// Begin a configuration frame: 8 payload bytes follow, four little-endian
/// u16 durations in the order up, inter, down, pause.
pub const MARK_CONFIG: u8 = 0x80;

/// Begin a state frame: bit-packed per-bridge flags follow.
pub const MARK_STATE: u8 = 0x81;

/// End a state frame. Valid at any point inside a state frame.
pub const MARK_END: u8 = 0x82;

/// Number of payload bytes in a configuration frame.
pub const CONFIG_FRAME_LEN: usize = 8;

/// Pulse-waveform phase durations, in ticks of 10 µs (see [`crate::board`]).
///
/// The four durations in sequence make up one full drive period:
/// forward pulse, idle, reverse pulse, idle. Each is independently settable
/// by the host; a zero duration skips that phase entirely.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub up_pulse: u16,
    pub inter_pulse: u16,
    pub down_pulse: u16,
    pub pause: u16,
}

impl TimingConfig {
    pub const fn new(up_pulse: u16, inter_pulse: u16, down_pulse: u16, pause: u16) -> Self {
        Self {
            up_pulse,
            inter_pulse,
            down_pulse,
            pause,
        }
    }

    /// Length of one full drive period in ticks.
    ///
    /// Summed as u32: four u16 durations cannot overflow.
    pub fn period(&self) -> u32 {
        self.up_pulse as u32 + self.inter_pulse as u32 + self.down_pulse as u32 + self.pause as u32
    }
}

impl Default for TimingConfig {
    /// Power-on defaults: 5 ms per phase.
    fn default() -> Self {
        Self::new(500, 500, 500, 500)
    }
}

/// Outcome of feeding one byte to the decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecoderEvent {
    /// A configuration frame completed and its record is ready to latch.
    ConfigReady(TimingConfig),
    /// A state frame ended; the bridge vector holds the new desired state.
    StateReady,
    /// A state frame addressed more bridges than the board carries. The rest
    /// of the frame is being discarded.
    FrameOverrun,
}
