//! Candle flicker effect
//!
//! Samples an LFSR at roughly 30 Hz and runs the samples through a lag-2
//! IIR low-pass filter, which gives the slow wander and occasional sharp
//! dip of a candle flame.

use embassy_time::{Duration, Instant};

use super::Effect;
use crate::{lfsr::Lfsr, output::PwmSink};

/// Brightest flicker level
pub const MAX_FLICKER_LEVEL: u8 = 5;

/// Sample period, close to 30 Hz
pub const FLICKER_PERIOD: Duration = Duration::from_nanos(33_333_333);

/// Upper bound of LFSR steps per sample
const MAX_STEPS: u8 = 3;

/// Candle flicker simulation
#[derive(Debug, Clone)]
pub struct FlickerEffect {
    lfsr: Lfsr,
    /// 1 (dimmest) to 5 (brightest), 0 is off
    level: u8,
    /// Filter accumulator, the last rendered duty cycle while lit
    duty_cycle: u16,
    last_update: Option<Instant>,
}

impl FlickerEffect {
    /// Create a dark flicker with the given LFSR seed
    pub const fn new(seed: u16) -> Self {
        Self {
            lfsr: Lfsr::new(seed),
            level: 0,
            duty_cycle: 0,
            last_update: None,
        }
    }

    /// Set the level
    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.set_intensity(level);
        self
    }

    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Filter accumulator, left untouched while the level is 0
    pub const fn duty_cycle(&self) -> u16 {
        self.duty_cycle
    }

    /// Current LFSR state
    pub const fn lfsr_state(&self) -> u16 {
        self.lfsr.state()
    }

    fn sample(&self) -> u16 {
        let state = self.lfsr.state();
        if state & 0x100 != 0 {
            255
        } else {
            state & 0xFF
        }
    }

    /// Step the register until the low byte exceeds 128, at most three times
    fn advance(&mut self) {
        for _ in 0..MAX_STEPS {
            if self.lfsr.step() & 0xFF > 128 {
                break;
            }
        }
    }
}

impl Default for FlickerEffect {
    fn default() -> Self {
        Self::new(crate::lfsr::DEFAULT_SEED)
    }
}

impl Effect for FlickerEffect {
    fn update<P: PwmSink>(&mut self, now: Instant, sink: &mut P) -> Option<u16> {
        let due = self
            .last_update
            .is_none_or(|last| now >= last + FLICKER_PERIOD);
        if !due {
            return None;
        }
        // Off keeps the filter and its timestamp, so every later tick is due
        if self.level == 0 {
            sink.set_duty_cycle(0);
            return Some(0);
        }
        self.last_update = Some(now);

        let lowpass = self.duty_cycle;
        let filtered = lowpass - (lowpass >> 1) + (self.sample() << 7);
        // Level 5 shifts by one, level 1 by five
        self.duty_cycle = filtered >> (6 - self.level);
        sink.set_duty_cycle(self.duty_cycle);

        self.advance();
        Some(self.duty_cycle)
    }

    fn set_intensity(&mut self, value: u8) {
        self.level = value.min(MAX_FLICKER_LEVEL);
    }
}
