//! Effect system with compile-time known effect variants
//!
//! All effects are stored in an enum to avoid heap allocations.
//! Each effect implements the `Effect` trait.

mod flicker;
mod steady_strobe;

use embassy_time::Instant;
pub use flicker::{FLICKER_PERIOD, FlickerEffect, MAX_FLICKER_LEVEL};
pub use steady_strobe::{MAX_STROBE_HZ, SteadyStrobeEffect};

use crate::output::{ChannelId, PwmSink};

const EFFECT_NAME_DIMMER: &str = "dimmer";
const EFFECT_NAME_FLICKER: &str = "flicker";

pub trait Effect {
    /// Prepare for the first update after the owning state is entered
    fn enter(&mut self) {}

    /// Called when the owning state is left
    fn exit(&mut self) {}

    /// Advance the effect to `now`
    ///
    /// Returns the duty cycle written to `sink`, or `None` if the hardware
    /// was left untouched this tick.
    fn update<P: PwmSink>(&mut self, now: Instant, sink: &mut P) -> Option<u16>;

    /// Set the effect intensity, clamped to the effect's own range
    fn set_intensity(&mut self, value: u8);
}

/// Effect slot - enum containing all possible effects
#[derive(Debug, Clone)]
pub enum EffectSlot {
    /// Gamma corrected dimmer with optional strobe
    SteadyStrobe(SteadyStrobeEffect),
    /// Candle flicker
    Flicker(FlickerEffect),
}

/// Known effect kinds that can be configured
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EffectKind {
    #[default]
    Dimmer,
    Flicker,
}

impl EffectKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dimmer => EFFECT_NAME_DIMMER,
            Self::Flicker => EFFECT_NAME_FLICKER,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            EFFECT_NAME_DIMMER => Some(Self::Dimmer),
            EFFECT_NAME_FLICKER => Some(Self::Flicker),
            _ => None,
        }
    }
}

impl EffectSlot {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::SteadyStrobe(_) => EffectKind::Dimmer,
            Self::Flicker(_) => EffectKind::Flicker,
        }
    }

    pub fn enter(&mut self) {
        match self {
            Self::SteadyStrobe(effect) => effect.enter(),
            Self::Flicker(effect) => effect.enter(),
        }
    }

    pub fn exit(&mut self) {
        match self {
            Self::SteadyStrobe(effect) => effect.exit(),
            Self::Flicker(effect) => effect.exit(),
        }
    }

    pub fn update<P: PwmSink>(&mut self, now: Instant, sink: &mut P) -> Option<u16> {
        match self {
            Self::SteadyStrobe(effect) => effect.update(now, sink),
            Self::Flicker(effect) => effect.update(now, sink),
        }
    }

    pub fn set_intensity(&mut self, value: u8) {
        match self {
            Self::SteadyStrobe(effect) => effect.set_intensity(value),
            Self::Flicker(effect) => effect.set_intensity(value),
        }
    }
}

impl From<SteadyStrobeEffect> for EffectSlot {
    fn from(effect: SteadyStrobeEffect) -> Self {
        Self::SteadyStrobe(effect)
    }
}

impl From<FlickerEffect> for EffectSlot {
    fn from(effect: FlickerEffect) -> Self {
        Self::Flicker(effect)
    }
}

/// An effect wired to an output channel
#[derive(Debug, Clone)]
pub struct BoundEffect {
    pub channel: ChannelId,
    pub effect: EffectSlot,
}

impl BoundEffect {
    pub fn new(channel: ChannelId, effect: impl Into<EffectSlot>) -> Self {
        Self {
            channel,
            effect: effect.into(),
        }
    }
}
