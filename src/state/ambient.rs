use embassy_time::Instant;

use super::{EffectList, StateId, enter_effects, exit_effects, update_effects};
use crate::{
    effect::BoundEffect,
    output::{CHANNEL_COUNT, PwmSink},
    playback::PlaybackChannel,
    trigger::TriggerInput,
};

/// Idle state: looped background audio and lighting, waiting for a trigger
pub struct AmbientState<A> {
    effects: EffectList,
    playback: Option<A>,
}

impl<A: PlaybackChannel> AmbientState<A> {
    /// Create the state, with or without a background loop
    pub const fn new(playback: Option<A>) -> Self {
        Self {
            effects: EffectList::new(),
            playback,
        }
    }

    /// Replace the owned effects
    #[must_use]
    pub fn with_effects(mut self, effects: EffectList) -> Self {
        self.effects = effects;
        self
    }

    /// Add an effect
    ///
    /// Returns the effect back if the state already drives every channel.
    pub fn add_effect(&mut self, effect: BoundEffect) -> Result<(), BoundEffect> {
        self.effects.push(effect)
    }

    pub fn effects(&self) -> &[BoundEffect] {
        &self.effects
    }

    pub const fn playback(&self) -> Option<&A> {
        self.playback.as_ref()
    }

    pub(crate) fn enter(&mut self, _now: Instant) {
        if let Some(playback) = &mut self.playback {
            playback.play(true);
        }
        enter_effects(&mut self.effects);
    }

    pub(crate) fn exit(&mut self) {
        if let Some(playback) = &mut self.playback {
            playback.stop();
        }
        exit_effects(&mut self.effects);
    }

    pub(crate) fn update<P: PwmSink, T: TriggerInput>(
        &mut self,
        now: Instant,
        outputs: &mut [P; CHANNEL_COUNT],
        trigger: &T,
    ) -> Option<StateId> {
        update_effects(&mut self.effects, now, outputs);

        trigger.fell().then_some(StateId::Triggered)
    }
}
