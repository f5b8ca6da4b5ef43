// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Waveform time source on the DWT cycle counter.
//!
//! The scheduler wants a monotonic count of 10 µs ticks. The DWT counter
//! wraps every 2^32 core cycles (well under a minute), so `now` folds the
//! wrapping cycle delta into an accumulated tick count instead of dividing
//! the raw counter. Polling at least once per counter wrap is required; the
//! control loop runs far faster than that.

use cortex_m::peripheral::{DCB, DWT};

pub struct TickClock {
    cycles_per_tick: u32,
    last_cycles: u32,
    carry: u32,
    ticks: u32,
}

impl TickClock {
    /// Enable the cycle counter and start counting ticks from zero.
    ///
    /// `sysclk_hz` is the core clock; `ticks_per_sec` the tick rate
    /// ([`crate::board::TICKS_PER_SEC`]).
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32, ticks_per_sec: u32) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        Self {
            cycles_per_tick: (sysclk_hz / ticks_per_sec).max(1),
            last_cycles: DWT::cycle_count(),
            carry: 0,
            ticks: 0,
        }
    }

    /// Current time in ticks. Wraps at 2^32 ticks (~12 h at 10 µs).
    pub fn now(&mut self) -> u32 {
        let cycles = DWT::cycle_count();
        let delta = cycles.wrapping_sub(self.last_cycles);
        self.last_cycles = cycles;

        let total = self.carry as u64 + delta as u64;
        self.ticks = self
            .ticks
            .wrapping_add((total / self.cycles_per_tick as u64) as u32);
        self.carry = (total % self.cycles_per_tick as u64) as u32;
        self.ticks
    }
}
