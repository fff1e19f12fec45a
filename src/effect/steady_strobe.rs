//! Steady dimmer with optional strobe
//!
//! With strobing disabled the channel holds a gamma corrected level and only
//! touches the hardware when the level changes. With strobing enabled the
//! channel alternates between the level and off, flipping once per half
//! period.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::Effect;
use crate::{gamma::GammaTable, output::PwmSink};

/// Highest strobe frequency the PWM carrier can express
pub const MAX_STROBE_HZ: u16 = 1400;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Dimmer/strobe effect
#[derive(Debug, Clone)]
pub struct SteadyStrobeEffect {
    gamma: GammaTable,
    dim: u8,
    strobe_hz: u16,
    /// Time between on/off flips (half of the strobe period)
    transition_period: Duration,
    /// `None` forces a flip on the next update
    last_transition: Option<Instant>,
    next_is_on: bool,
    /// `None` forces a hardware write on the next update
    last_rendered: Option<u8>,
}

impl Default for SteadyStrobeEffect {
    fn default() -> Self {
        Self::new(GammaTable::default())
    }
}

impl SteadyStrobeEffect {
    /// Create a dark, non-strobing effect
    pub const fn new(gamma: GammaTable) -> Self {
        Self {
            gamma,
            dim: 0,
            strobe_hz: 0,
            transition_period: Duration::from_ticks(0),
            last_transition: None,
            next_is_on: true,
            last_rendered: None,
        }
    }

    /// Set the level
    #[must_use]
    pub fn with_dim(mut self, dim: u8) -> Self {
        self.set_intensity(dim);
        self
    }

    /// Set the strobe frequency
    #[must_use]
    pub fn with_strobe(mut self, hz: u16) -> Self {
        self.set_strobe(hz);
        self
    }

    pub const fn dim(&self) -> u8 {
        self.dim
    }

    pub const fn strobe(&self) -> u16 {
        self.strobe_hz
    }

    pub const fn transition_period(&self) -> Duration {
        self.transition_period
    }

    pub const fn is_strobing(&self) -> bool {
        self.strobe_hz > 0
    }

    /// Set the strobe frequency in Hz, clamped to [`MAX_STROBE_HZ`]
    ///
    /// Zero disables strobing.
    pub fn set_strobe(&mut self, hz: u16) {
        let hz = hz.min(MAX_STROBE_HZ);
        self.strobe_hz = hz;
        if hz > 0 {
            self.transition_period =
                Duration::from_nanos(NANOS_PER_SECOND / u64::from(hz) / 2);
            #[cfg(feature = "esp32-log")]
            println!(
                "[SteadyStrobe] transition period: {} us",
                self.transition_period.as_micros()
            );
        }
    }

    fn render<P: PwmSink>(&mut self, level: u8, sink: &mut P) -> u16 {
        let duty = self.gamma.get(level);
        sink.set_duty_cycle(duty);
        self.last_rendered = Some(level);
        duty
    }
}

impl Effect for SteadyStrobeEffect {
    fn enter(&mut self) {
        self.last_transition = None;
        self.next_is_on = true;
        self.last_rendered = None;
    }

    fn update<P: PwmSink>(&mut self, now: Instant, sink: &mut P) -> Option<u16> {
        if !self.is_strobing() {
            if self.last_rendered == Some(self.dim) {
                return None;
            }
            return Some(self.render(self.dim, sink));
        }

        // One flip per update at most: late ticks stretch the period
        // instead of replaying missed transitions.
        let due = self
            .last_transition
            .is_none_or(|last| now >= last + self.transition_period);
        if !due {
            return None;
        }

        self.last_transition = Some(now);
        let level = if self.next_is_on { self.dim } else { 0 };
        self.next_is_on = !self.next_is_on;
        Some(self.render(level, sink))
    }

    fn set_intensity(&mut self, value: u8) {
        self.dim = value;
    }
}
