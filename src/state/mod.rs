//! Actor states
//!
//! Both states own their effects and an audio binding. A state never
//! switches itself: `update` returns the state it wants to move to and the
//! controller runs the exit/enter protocol.

mod ambient;
mod triggered;

use embassy_time::Instant;
use heapless::Vec;

pub use ambient::AmbientState;
pub use triggered::{DEFAULT_TRIGGER_DURATION, TriggeredExitPolicy, TriggeredState};

use crate::{
    effect::BoundEffect,
    output::{CHANNEL_COUNT, PwmSink},
    playback::PlaybackChannel,
    trigger::TriggerInput,
};

const STATE_NAME_AMBIENT: &str = "ambient";
const STATE_NAME_TRIGGERED: &str = "triggered";

/// Effects owned by a state, at most one per channel
pub type EffectList = Vec<BoundEffect, CHANNEL_COUNT>;

/// Known state identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StateId {
    Ambient = 0,
    Triggered = 1,
}

impl StateId {
    /// Number of states
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambient => STATE_NAME_AMBIENT,
            Self::Triggered => STATE_NAME_TRIGGERED,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            STATE_NAME_AMBIENT => Some(Self::Ambient),
            STATE_NAME_TRIGGERED => Some(Self::Triggered),
            _ => None,
        }
    }
}

/// State slot - enum containing both actor states
pub enum ActorState<A> {
    Ambient(AmbientState<A>),
    Triggered(TriggeredState<A>),
}

impl<A: PlaybackChannel> ActorState<A> {
    pub const fn id(&self) -> StateId {
        match self {
            Self::Ambient(_) => StateId::Ambient,
            Self::Triggered(_) => StateId::Triggered,
        }
    }

    pub fn enter(&mut self, now: Instant) {
        match self {
            Self::Ambient(state) => state.enter(now),
            Self::Triggered(state) => state.enter(now),
        }
    }

    pub fn exit(&mut self) {
        match self {
            Self::Ambient(state) => state.exit(),
            Self::Triggered(state) => state.exit(),
        }
    }

    /// Run one tick, returning the requested transition if any
    pub fn update<P: PwmSink, T: TriggerInput>(
        &mut self,
        now: Instant,
        outputs: &mut [P; CHANNEL_COUNT],
        trigger: &T,
    ) -> Option<StateId> {
        match self {
            Self::Ambient(state) => state.update(now, outputs, trigger),
            Self::Triggered(state) => state.update(now, outputs),
        }
    }

    pub fn effects(&self) -> &[BoundEffect] {
        match self {
            Self::Ambient(state) => state.effects(),
            Self::Triggered(state) => state.effects(),
        }
    }
}

impl<A> From<AmbientState<A>> for ActorState<A> {
    fn from(state: AmbientState<A>) -> Self {
        Self::Ambient(state)
    }
}

impl<A> From<TriggeredState<A>> for ActorState<A> {
    fn from(state: TriggeredState<A>) -> Self {
        Self::Triggered(state)
    }
}

/// Update every effect with the same timestamp
fn update_effects<P: PwmSink>(
    effects: &mut EffectList,
    now: Instant,
    outputs: &mut [P; CHANNEL_COUNT],
) {
    for bound in effects.iter_mut() {
        bound.effect.update(now, &mut outputs[bound.channel.index()]);
    }
}

fn enter_effects(effects: &mut EffectList) {
    for bound in effects.iter_mut() {
        bound.effect.enter();
    }
}

fn exit_effects(effects: &mut EffectList) {
    for bound in effects.iter_mut() {
        bound.effect.exit();
    }
}
