use embassy_time::{Duration, Instant};

use super::{EffectList, StateId, enter_effects, exit_effects, update_effects};
use crate::{
    effect::BoundEffect,
    output::{CHANNEL_COUNT, PwmSink},
    playback::PlaybackChannel,
};

/// Nominal length of a triggered sequence
pub const DEFAULT_TRIGGER_DURATION: Duration = Duration::from_secs(5);

/// How the triggered state decides it is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggeredExitPolicy {
    /// Leave once the trigger clip stops playing
    #[default]
    AudioEnd,
    /// Leave after a fixed time, regardless of the clip
    FixedDuration(Duration),
}

impl TriggeredExitPolicy {
    /// Time after entering at which the sequence nominally ends
    pub const fn duration(self) -> Duration {
        match self {
            Self::AudioEnd => DEFAULT_TRIGGER_DURATION,
            Self::FixedDuration(duration) => duration,
        }
    }
}

/// Active state: one-shot trigger clip with its own lighting
pub struct TriggeredState<A> {
    effects: EffectList,
    playback: A,
    exit_policy: TriggeredExitPolicy,
    finish_deadline: Option<Instant>,
}

impl<A: PlaybackChannel> TriggeredState<A> {
    pub const fn new(playback: A) -> Self {
        Self {
            effects: EffectList::new(),
            playback,
            exit_policy: TriggeredExitPolicy::AudioEnd,
            finish_deadline: None,
        }
    }

    #[must_use]
    pub fn with_exit_policy(mut self, policy: TriggeredExitPolicy) -> Self {
        self.exit_policy = policy;
        self
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

    pub const fn playback(&self) -> &A {
        &self.playback
    }

    pub const fn exit_policy(&self) -> TriggeredExitPolicy {
        self.exit_policy
    }

    /// Deadline recorded on the last `enter`
    pub const fn finish_deadline(&self) -> Option<Instant> {
        self.finish_deadline
    }

    pub(crate) fn enter(&mut self, now: Instant) {
        self.playback.play(false);
        enter_effects(&mut self.effects);
        let deadline = now
            .checked_add(self.exit_policy.duration())
            .unwrap_or(Instant::MAX);
        self.finish_deadline = Some(deadline);
    }

    pub(crate) fn exit(&mut self) {
        exit_effects(&mut self.effects);
        // Under the audio policy the clip has already ended
        if self.playback.is_playing() {
            self.playback.stop();
        }
    }

    pub(crate) fn update<P: PwmSink>(
        &mut self,
        now: Instant,
        outputs: &mut [P; CHANNEL_COUNT],
    ) -> Option<StateId> {
        if self.is_finished(now) {
            return Some(StateId::Ambient);
        }

        update_effects(&mut self.effects, now, outputs);
        None
    }

    fn is_finished(&self, now: Instant) -> bool {
        match self.exit_policy {
            TriggeredExitPolicy::AudioEnd => !self.playback.is_playing(),
            TriggeredExitPolicy::FixedDuration(_) => {
                self.finish_deadline.is_some_and(|deadline| now >= deadline)
            }
        }
    }
}
