// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Top-level control loop glue.
//!
//! The controller owns the pieces the decoder and scheduler share (the
//! desired-state vector and the latched timing config) and passes them by
//! reference so there is no global state. One `poll` consumes at most one
//! input byte and performs exactly one scheduler tick; nothing blocks except
//! the bounded SPI transfer on a phase transition.

use crate::control::Scheduler;
use crate::drivers::{ChainEncoder, FramePort};
use crate::protocol::{Decoder, DecoderConfig, DecoderEvent, TimingConfig};

/// Firmware core, generic over the board's total bridge count.
pub struct Controller<const N: usize> {
    decoder: Decoder,
    scheduler: Scheduler,
    timing: TimingConfig,
    bridges: [bool; N],
}

impl<const N: usize> Controller<N> {
    pub fn new(decoder_config: DecoderConfig, scheduler: Scheduler) -> Self {
        Self {
            decoder: Decoder::new(decoder_config),
            scheduler,
            timing: TimingConfig::default(),
            bridges: [false; N],
        }
    }

    /// Run one loop iteration at time `now` (ticks).
    ///
    /// Feeds the input byte (if one arrived), latches a completed config
    /// frame, then advances the waveform. Returns the decoder event so the
    /// caller can report diagnostics.
    pub fn poll<E: ChainEncoder, P: FramePort>(
        &mut self,
        byte: Option<u8>,
        now: u32,
        encoder: &E,
        port: &mut P,
    ) -> Result<Option<DecoderEvent>, P::Error> {
        let mut event = None;
        if let Some(b) = byte {
            event = self.decoder.push(b, &mut self.bridges);
            if let Some(DecoderEvent::ConfigReady(cfg)) = event {
                self.timing = cfg;
            }
        }

        self.scheduler
            .tick(now, &self.bridges, &self.timing, encoder, port)?;
        Ok(event)
    }

    /// Currently latched phase durations.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Desired-state vector as last written by the host.
    pub fn bridges(&self) -> &[bool; N] {
        &self.bridges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::DirectChain;
    use crate::protocol::StateLayout;
    use core::convert::Infallible;

    struct RecordingPort {
        frames: Vec<Vec<u8>>,
    }

    impl FramePort for RecordingPort {
        type Error = Infallible;

        fn write_frame(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
            self.frames.push(bytes.to_vec());
            Ok(())
        }
    }

    fn controller() -> Controller<9> {
        Controller::new(
            DecoderConfig {
                layout: StateLayout::SplitNine,
                ..Default::default()
            },
            Scheduler::new(),
        )
    }

    #[test]
    fn config_frame_latches_timing() {
        let mut ctl = controller();
        let chain = DirectChain::new(3);
        let mut port = RecordingPort { frames: Vec::new() };

        let stream = [0x80, 0xE8, 0x03, 0x00, 0x00, 0xE8, 0x03, 0x00, 0x00];
        let mut last = None;
        for &b in &stream {
            last = ctl.poll(Some(b), 0, &chain, &mut port).unwrap();
        }
        assert_eq!(
            last,
            Some(DecoderEvent::ConfigReady(TimingConfig::new(1000, 0, 1000, 0)))
        );
        assert_eq!(*ctl.timing(), TimingConfig::new(1000, 0, 1000, 0));
    }

    #[test]
    fn state_frame_then_ticks_drive_the_chain() {
        let mut ctl = controller();
        let chain = DirectChain::new(3);
        let mut port = RecordingPort { frames: Vec::new() };

        for &b in &[0x81, 0b0000_0001, 0x82] {
            ctl.poll(Some(b), 0, &chain, &mut port).unwrap();
        }
        assert!(ctl.bridges()[0]);
        let frames_after_input = port.frames.len();

        // Default timing: forward pulse starts at elapsed 0, reverse at 1000.
        ctl.poll(None, 1000, &chain, &mut port).unwrap();
        assert_eq!(port.frames.len(), frames_after_input + 1);
        // Reverse pulse on the chain: chips 2 and 1 off, chip 0 bridge 0 reverse.
        assert_eq!(
            *port.frames.last().unwrap(),
            vec![0x00, 0x54, 0x00, 0x54, 0x01, 0xD2]
        );
    }

    #[test]
    fn one_poll_consumes_at_most_one_byte_and_one_tick() {
        let mut ctl = controller();
        let chain = DirectChain::new(3);
        let mut port = RecordingPort { frames: Vec::new() };

        // First tick emits the initial phase; a second poll at the same
        // instant with no input emits nothing further.
        ctl.poll(None, 0, &chain, &mut port).unwrap();
        let n = port.frames.len();
        ctl.poll(None, 0, &chain, &mut port).unwrap();
        assert_eq!(port.frames.len(), n);
    }

    #[test]
    fn overrun_event_reaches_the_caller() {
        let mut ctl = controller();
        let chain = DirectChain::new(3);
        let mut port = RecordingPort { frames: Vec::new() };

        let mut events = Vec::new();
        for &b in &[0x81, 0, 0, 0x7F, 0x7F, 0x82] {
            events.push(ctl.poll(Some(b), 0, &chain, &mut port).unwrap());
        }
        assert!(events.contains(&Some(DecoderEvent::FrameOverrun)));
        // The discarded frame produced no StateReady.
        assert!(!events.contains(&Some(DecoderEvent::StateReady)));
    }
}
