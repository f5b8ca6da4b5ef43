// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-phase pulse-waveform scheduler.
//!
//! One drive period is forward pulse → idle → reverse pulse → idle, with the
//! four durations taken live from the latched [`TimingConfig`] so a config
//! update takes effect within one tick. Hardware writes happen only on phase
//! transitions; re-ticking inside a phase touches nothing on the bus. (Early
//! board revisions re-issued the frame on every tick; emitting on the edge
//! keeps the bus quiet and the output is identical.)

use crate::drivers::{ChainEncoder, Drive, FramePort};
use crate::protocol::TimingConfig;

/// Position within one drive period. Cyclic, advances forward only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    PulseForward,
    IdleAfterForward,
    PulseReverse,
    IdleAfterReverse,
}

/// Map an elapsed offset in `[0, period)` to its phase.
///
/// The four half-open duration ranges partition the period, so a zero-length
/// phase can never be selected.
pub fn phase_at(cfg: &TimingConfig, elapsed: u32) -> Phase {
    let up = cfg.up_pulse as u32;
    let inter = up + cfg.inter_pulse as u32;
    let down = inter + cfg.down_pulse as u32;
    if elapsed < up {
        Phase::PulseForward
    } else if elapsed < inter {
        Phase::IdleAfterForward
    } else if elapsed < down {
        Phase::PulseReverse
    } else {
        Phase::IdleAfterReverse
    }
}

/// Edge-triggered waveform driver.
///
/// Holds only the last emitted phase; the bridge vector and timing config are
/// owned by the controller and passed in each tick.
pub struct Scheduler {
    last_phase: Option<Phase>,
    min_pulse: u16,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            last_phase: None,
            min_pulse: 0,
        }
    }

    /// Suppress the hardware write for pulse phases shorter than `ticks`.
    /// Chips see no on-time worth driving below this; the phase still
    /// advances so the following idle write happens normally.
    pub fn with_min_pulse(mut self, ticks: u16) -> Self {
        self.min_pulse = ticks;
        self
    }

    /// Advance the waveform to `now` (in ticks), emitting through the encoder
    /// on a phase transition.
    ///
    /// `now` is free to wrap; the modulo fold keeps the phase cyclic. With an
    /// all-zero config there is no period and nothing is driven.
    pub fn tick<E: ChainEncoder, P: FramePort>(
        &mut self,
        now: u32,
        active: &[bool],
        cfg: &TimingConfig,
        encoder: &E,
        port: &mut P,
    ) -> Result<(), P::Error> {
        let period = cfg.period();
        if period == 0 {
            return Ok(());
        }

        let phase = phase_at(cfg, now % period);
        if self.last_phase == Some(phase) {
            return Ok(());
        }
        self.last_phase = Some(phase);

        let (drive, pulse_len) = match phase {
            Phase::PulseForward => (Drive::Forward, cfg.up_pulse),
            Phase::PulseReverse => (Drive::Reverse, cfg.down_pulse),
            Phase::IdleAfterForward | Phase::IdleAfterReverse => {
                return encoder.emit(active, Drive::Off, port)
            }
        };
        if pulse_len < self.min_pulse {
            return Ok(());
        }
        encoder.emit(active, drive, port)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
