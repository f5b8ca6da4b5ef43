// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Incremental frame decoder for the host serial stream.
//!
//! The decoder consumes one byte at a time and never fails: unknown bytes are
//! ignored while idle, and a state frame that addresses more bridges than the
//! board carries is drained without disturbing what was already latched. The
//! caller owns the bridge vector and passes it in on every byte.

use crate::board::MAX_BRIDGES;
use crate::protocol::messages::*;

/// How state-frame payload bytes map onto bridge indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StateLayout {
    /// Each byte carries `bits_per_byte` flags, little-endian, at consecutive
    /// base offsets. Board revisions with 6 bridges per chip use 6 here.
    Flat { bits_per_byte: u8 },
    /// 9-bridge board units: even bytes carry bits 0–6 for unit offsets 0–6,
    /// odd bytes carry bits 0–1 for unit offsets 7–8.
    SplitNine,
}

impl StateLayout {
    /// Base bridge offset and flag count for the payload byte at `byte_idx`.
    fn span(&self, byte_idx: usize) -> (usize, usize) {
        match *self {
            StateLayout::Flat { bits_per_byte } => {
                (byte_idx * bits_per_byte as usize, bits_per_byte as usize)
            }
            StateLayout::SplitNine => {
                let base = (byte_idx / 2) * 9;
                if byte_idx % 2 == 0 {
                    (base, 7)
                } else {
                    (base + 7, 2)
                }
            }
        }
    }
}

/// When state-frame bits become visible in the live bridge vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Bits land in the live vector as each byte arrives ("latch as we go").
    /// A scheduler tick between bytes can observe a partially updated vector.
    Incremental,
    /// Bits are staged and copied over in one piece when the end marker
    /// arrives. An overrun discards the whole staged frame.
    OnFrameEnd,
}

/// Decoder behavior knobs, fixed at construction.
#[derive(Copy, Clone, Debug)]
pub struct DecoderConfig {
    pub layout: StateLayout,
    pub commit: CommitPolicy,
    /// Zero the target vector when a state frame starts instead of
    /// overwriting only the offsets actually received.
    pub clear_on_start: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            layout: StateLayout::Flat { bits_per_byte: 6 },
            commit: CommitPolicy::Incremental,
            clear_on_start: false,
        }
    }
}

#[derive(Copy, Clone)]
enum Mode {
    Idle,
    /// Accumulating a configuration frame: four u16 fields, low byte first.
    /// `idx` counts payload bytes; field = idx / 2, byte-within-field = idx % 2.
    Config { buf: [u16; 4], idx: usize },
    State { byte_idx: usize },
    /// Discarding the rest of an overrun state frame.
    Drain,
}

/// Byte-at-a-time protocol state machine.
pub struct Decoder {
    config: DecoderConfig,
    mode: Mode,
    staging: [bool; MAX_BRIDGES],
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            mode: Mode::Idle,
            staging: [false; MAX_BRIDGES],
        }
    }

    /// Process one incoming byte.
    ///
    /// `bridges` is the controller-owned desired-state vector; its length is
    /// the board's bridge count and bounds every state frame.
    pub fn push(&mut self, byte: u8, bridges: &mut [bool]) -> Option<DecoderEvent> {
        match self.mode {
            Mode::Idle => {
                match byte {
                    MARK_CONFIG => self.mode = Mode::Config { buf: [0; 4], idx: 0 },
                    MARK_STATE => self.begin_state(bridges),
                    _ => {}
                }
                None
            }

            Mode::Config { mut buf, idx } => {
                if idx % 2 == 0 {
                    buf[idx / 2] |= byte as u16;
                } else {
                    buf[idx / 2] |= (byte as u16) << 8;
                }

                if idx + 1 == CONFIG_FRAME_LEN {
                    self.mode = Mode::Idle;
                    Some(DecoderEvent::ConfigReady(TimingConfig::new(
                        buf[0], buf[1], buf[2], buf[3],
                    )))
                } else {
                    self.mode = Mode::Config { buf, idx: idx + 1 };
                    None
                }
            }

            Mode::State { byte_idx } => {
                if byte == MARK_END {
                    self.mode = Mode::Idle;
                    if self.config.commit == CommitPolicy::OnFrameEnd {
                        let n = bridges.len().min(MAX_BRIDGES);
                        bridges[..n].copy_from_slice(&self.staging[..n]);
                    }
                    return Some(DecoderEvent::StateReady);
                }

                let n = bridges.len();
                let (base, count) = self.config.layout.span(byte_idx);
                if base >= n {
                    self.mode = Mode::Drain;
                    return Some(DecoderEvent::FrameOverrun);
                }

                let target = match self.config.commit {
                    CommitPolicy::Incremental => bridges,
                    CommitPolicy::OnFrameEnd => &mut self.staging[..n.min(MAX_BRIDGES)],
                };
                for i in 0..count {
                    if base + i < target.len() {
                        target[base + i] = byte & (1 << i) != 0;
                    }
                }

                self.mode = Mode::State {
                    byte_idx: byte_idx + 1,
                };
                None
            }

            Mode::Drain => {
                // Skip the abandoned frame, but let any marker rescue the
                // stream so a lost end byte cannot wedge the decoder.
                match byte {
                    MARK_END => self.mode = Mode::Idle,
                    MARK_CONFIG => self.mode = Mode::Config { buf: [0; 4], idx: 0 },
                    MARK_STATE => self.begin_state(bridges),
                    _ => {}
                }
                None
            }
        }
    }

    fn begin_state(&mut self, bridges: &mut [bool]) {
        let n = bridges.len().min(MAX_BRIDGES);
        if self.config.commit == CommitPolicy::OnFrameEnd {
            // Stage from the live vector so unwritten offsets carry over.
            self.staging[..n].copy_from_slice(&bridges[..n]);
        }
        if self.config.clear_on_start {
            match self.config.commit {
                CommitPolicy::Incremental => bridges[..n].fill(false),
                CommitPolicy::OnFrameEnd => self.staging[..n].fill(false),
            }
        }
        self.mode = Mode::State { byte_idx: 0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(layout: StateLayout) -> Decoder {
        Decoder::new(DecoderConfig {
            layout,
            ..Default::default()
        })
    }

    fn feed(dec: &mut Decoder, bridges: &mut [bool], bytes: &[u8]) -> Option<DecoderEvent> {
        let mut last = None;
        for &b in bytes {
            last = dec.push(b, bridges);
        }
        last
    }

    #[test]
    fn idle_ignores_unrecognized_bytes() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        for b in [0x00, 0x7F, 0xFF, 0x83, 0x42] {
            assert_eq!(dec.push(b, &mut bridges), None);
        }
        assert_eq!(bridges, [false; 9]);
    }

    #[test]
    fn config_round_trip() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        // up = 1000, inter = 0, down = 1000, pause = 0, low byte first
        let ev = feed(
            &mut dec,
            &mut bridges,
            &[0x80, 0xE8, 0x03, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00],
        );
        assert_eq!(
            ev,
            Some(DecoderEvent::ConfigReady(TimingConfig::new(1000, 0, 1000, 0)))
        );
        // Back in idle: a data-looking byte does nothing.
        assert_eq!(dec.push(0x55, &mut bridges), None);
    }

    #[test]
    fn config_fields_are_little_endian() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        let ev = feed(
            &mut dec,
            &mut bridges,
            &[0x80, 0x34, 0x12, 0x78, 0x56, 0xBC, 0x9A, 0xF0, 0xDE],
        );
        assert_eq!(
            ev,
            Some(DecoderEvent::ConfigReady(TimingConfig::new(
                0x1234, 0x5678, 0x9ABC, 0xDEF0
            )))
        );
    }

    #[test]
    fn config_payload_may_contain_marker_values() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        let ev = feed(
            &mut dec,
            &mut bridges,
            &[0x80, 0x80, 0x81, 0x82, 0x80, 0x00, 0x00, 0x00, 0x00],
        );
        assert_eq!(
            ev,
            Some(DecoderEvent::ConfigReady(TimingConfig::new(
                0x8180, 0x8082, 0, 0
            )))
        );
    }

    #[test]
    fn state_frame_sets_bridge_zero() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        let ev = feed(&mut dec, &mut bridges, &[0x81, 0b0000_0001, 0x82]);
        assert_eq!(ev, Some(DecoderEvent::StateReady));
        let mut expected = [false; 9];
        expected[0] = true;
        assert_eq!(bridges, expected);
        // End marker returned the decoder to idle.
        assert_eq!(dec.push(0x01, &mut bridges), None);
        assert_eq!(bridges, expected);
    }

    #[test]
    fn split_nine_odd_byte_maps_to_high_offsets() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 18];
        // unit 0: bits 0..6 then bits 7..8; unit 1 even byte follows.
        feed(
            &mut dec,
            &mut bridges,
            &[0x81, 0b0100_0000, 0b0000_0010, 0b0000_0001, 0x82],
        );
        let mut expected = [false; 18];
        expected[6] = true; // even byte, bit 6
        expected[8] = true; // odd byte, bit 1
        expected[9] = true; // second unit, bit 0
        assert_eq!(bridges, expected);
    }

    #[test]
    fn flat_layout_maps_six_bits_per_byte() {
        let mut dec = decoder(StateLayout::Flat { bits_per_byte: 6 });
        let mut bridges = [false; 12];
        feed(&mut dec, &mut bridges, &[0x81, 0b0010_0001, 0b0000_0011, 0x82]);
        let mut expected = [false; 12];
        expected[0] = true;
        expected[5] = true;
        expected[6] = true;
        expected[7] = true;
        assert_eq!(bridges, expected);
    }

    #[test]
    fn empty_state_frame_still_fires_state_ready() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [true, false, true, false, false, false, false, false, false];
        let ev = feed(&mut dec, &mut bridges, &[0x81, 0x82]);
        assert_eq!(ev, Some(DecoderEvent::StateReady));
        // Nothing received, nothing overwritten.
        assert!(bridges[0] && bridges[2]);
    }

    #[test]
    fn incremental_commit_is_visible_between_bytes() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        dec.push(0x81, &mut bridges);
        dec.push(0b0000_0100, &mut bridges);
        // No end marker yet, but the bit already landed.
        assert!(bridges[2]);
    }

    #[test]
    fn on_frame_end_commit_defers_until_end_marker() {
        let mut dec = Decoder::new(DecoderConfig {
            layout: StateLayout::SplitNine,
            commit: CommitPolicy::OnFrameEnd,
            clear_on_start: false,
        });
        let mut bridges = [false; 9];
        dec.push(0x81, &mut bridges);
        dec.push(0b0000_0100, &mut bridges);
        assert_eq!(bridges, [false; 9]);
        assert_eq!(dec.push(0x82, &mut bridges), Some(DecoderEvent::StateReady));
        assert!(bridges[2]);
    }

    #[test]
    fn on_frame_end_preserves_offsets_not_received() {
        let mut dec = Decoder::new(DecoderConfig {
            layout: StateLayout::SplitNine,
            commit: CommitPolicy::OnFrameEnd,
            clear_on_start: false,
        });
        let mut bridges = [false; 9];
        bridges[8] = true;
        // One even byte only: offsets 7..8 never written this frame.
        feed(&mut dec, &mut bridges, &[0x81, 0b0000_0001, 0x82]);
        assert!(bridges[0]);
        assert!(bridges[8]);
    }

    #[test]
    fn clear_on_start_drops_stale_state() {
        let mut dec = Decoder::new(DecoderConfig {
            layout: StateLayout::SplitNine,
            commit: CommitPolicy::Incremental,
            clear_on_start: true,
        });
        let mut bridges = [true; 9];
        feed(&mut dec, &mut bridges, &[0x81, 0b0000_0001, 0x82]);
        let mut expected = [false; 9];
        expected[0] = true;
        assert_eq!(bridges, expected);
    }

    #[test]
    fn overrun_discards_rest_of_frame() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        dec.push(0x81, &mut bridges);
        assert_eq!(dec.push(0b0000_0001, &mut bridges), None);
        assert_eq!(dec.push(0b0000_0011, &mut bridges), None);
        // Third byte addresses unit 1 (base offset 9) on a 9-bridge board.
        assert_eq!(
            dec.push(0b0111_1111, &mut bridges),
            Some(DecoderEvent::FrameOverrun)
        );
        // Remaining payload is discarded without touching the vector.
        assert_eq!(dec.push(0b0111_1111, &mut bridges), None);
        let mut expected = [false; 9];
        expected[0] = true;
        expected[7] = true;
        expected[8] = true;
        assert_eq!(bridges, expected);
        // End marker leaves drain mode; no second event fires.
        assert_eq!(dec.push(0x82, &mut bridges), None);
        // And the next frame decodes normally.
        let ev = feed(&mut dec, &mut bridges, &[0x81, 0b0000_0010, 0x82]);
        assert_eq!(ev, Some(DecoderEvent::StateReady));
        assert!(bridges[1]);
    }

    #[test]
    fn overrun_with_deferred_commit_discards_staged_frame() {
        let mut dec = Decoder::new(DecoderConfig {
            layout: StateLayout::SplitNine,
            commit: CommitPolicy::OnFrameEnd,
            clear_on_start: false,
        });
        let mut bridges = [false; 9];
        feed(
            &mut dec,
            &mut bridges,
            &[0x81, 0b0111_1111, 0b0000_0011, 0b0000_0001, 0x82],
        );
        // The frame overran at its third byte; nothing was committed.
        assert_eq!(bridges, [false; 9]);
    }

    #[test]
    fn start_marker_rescues_a_drained_frame() {
        let mut dec = decoder(StateLayout::SplitNine);
        let mut bridges = [false; 9];
        feed(&mut dec, &mut bridges, &[0x81, 0, 0, 0x7F]); // overrun
        let ev = feed(&mut dec, &mut bridges, &[0x81, 0b0000_0001, 0x82]);
        assert_eq!(ev, Some(DecoderEvent::StateReady));
        assert!(bridges[0]);
    }
}
