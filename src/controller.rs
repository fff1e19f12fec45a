//! Actor state machine driver
//!
//! The controller is meant to be ticked from a single-threaded super-loop:
//! poll the trigger, then update the active state. Nothing in a tick blocks,
//! so strobe and flicker timing only depends on how often the loop spins.

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::{
    config::ActorConfig,
    error::ControllerError,
    output::{CHANNEL_COUNT, PwmSink},
    playback::PlaybackChannel,
    state::{ActorState, AmbientState, StateId, TriggeredState},
    trigger::TriggerInput,
};

/// Hardware handed to [`Controller::assemble`]
pub struct ActorParts<P, A, T> {
    /// PWM sinks in channel order
    pub outputs: [P; CHANNEL_COUNT],
    pub trigger: T,
    /// Background loop, optional
    pub ambient_track: Option<A>,
    /// Trigger clip, required
    pub trigger_track: Option<A>,
}

/// Two-state actor controller
///
/// # Usage
///
/// ```ignore
/// let config = ActorConfig::resolve(&card.open_config(CONFIG_FILE));
/// let parts = ActorParts {
///     outputs: [PwmOutput::new(pwm1), PwmOutput::new(pwm2)],
///     trigger: Debouncer::new(trigger_pin),
///     ambient_track: player.open(AMBIENT_TRACK),
///     trigger_track: player.open(TRIGGER_TRACK),
/// };
/// let mut controller = Controller::assemble(parts, &config, Instant::now())?;
///
/// loop {
///     controller.run_once(Instant::now())?;
/// }
/// ```
pub struct Controller<P, A, T> {
    outputs: [P; CHANNEL_COUNT],
    trigger: T,
    states: [Option<ActorState<A>>; StateId::COUNT],
    current: Option<StateId>,
}

impl<P: PwmSink, A: PlaybackChannel, T: TriggerInput> Controller<P, A, T> {
    /// Create a controller with no states
    ///
    /// Every output is switched off.
    pub fn new(mut outputs: [P; CHANNEL_COUNT], trigger: T) -> Self {
        for output in &mut outputs {
            output.set_duty_cycle(0);
        }
        Self {
            outputs,
            trigger,
            states: core::array::from_fn(|_| None),
            current: None,
        }
    }

    /// Build both states from `config` and enter the ambient state
    ///
    /// Fails with [`ControllerError::MissingTriggerAudio`] when there is no
    /// trigger clip. A missing ambient loop only silences the ambient state.
    pub fn assemble(
        parts: ActorParts<P, A, T>,
        config: &ActorConfig,
        now: Instant,
    ) -> Result<Self, ControllerError> {
        let Some(trigger_track) = parts.trigger_track else {
            #[cfg(feature = "esp32-log")]
            println!("[Controller] required trigger audio not found");
            return Err(ControllerError::MissingTriggerAudio);
        };

        let ambient = AmbientState::new(parts.ambient_track)
            .with_effects(config.ambient.build_effects(config.gamma));
        let triggered = TriggeredState::new(trigger_track)
            .with_effects(config.triggered.build_effects(config.gamma))
            .with_exit_policy(config.exit_policy);

        let mut controller = Self::new(parts.outputs, parts.trigger);
        controller.add_state(ambient.into());
        controller.add_state(triggered.into());
        controller.go_to_state(StateId::Ambient, now)?;

        Ok(controller)
    }

    /// Register a state under its own id
    ///
    /// Returns the state previously registered under that id. The
    /// replacement is not entered, even if the old state was active.
    pub fn add_state(&mut self, state: ActorState<A>) -> Option<ActorState<A>> {
        let index = state.id().index();
        self.states[index].replace(state)
    }

    /// Leave the active state (if any) and enter `id`
    ///
    /// The target is checked before anything is exited, so a failed
    /// transition leaves the active state untouched.
    pub fn go_to_state(&mut self, id: StateId, now: Instant) -> Result<(), ControllerError> {
        if self.states[id.index()].is_none() {
            return Err(ControllerError::UnknownState);
        }

        if let Some(current) = self.current.and_then(|current| self.states[current.index()].as_mut())
        {
            #[cfg(feature = "esp32-log")]
            println!("[Controller] exiting {}", current.id().as_str());
            current.exit();
        }

        self.current = Some(id);
        if let Some(next) = self.states[id.index()].as_mut() {
            #[cfg(feature = "esp32-log")]
            println!("[Controller] entering {}", id.as_str());
            next.enter(now);
        }
        Ok(())
    }

    /// Same as [`Self::go_to_state`], addressing the state by name
    pub fn go_to_state_named(&mut self, name: &str, now: Instant) -> Result<(), ControllerError> {
        let id = StateId::parse_from_str(name).ok_or(ControllerError::UnknownState)?;
        self.go_to_state(id, now)
    }

    /// Update the active state and perform the transition it asks for
    ///
    /// Does nothing until a state has been entered.
    pub fn update(&mut self, now: Instant) -> Result<(), ControllerError> {
        let Some(current) = self.current else {
            return Ok(());
        };
        let Some(state) = self.states[current.index()].as_mut() else {
            return Ok(());
        };

        if let Some(next) = state.update(now, &mut self.outputs, &self.trigger) {
            self.go_to_state(next, now)?;
        }
        Ok(())
    }

    /// One loop iteration: poll the trigger, then update
    pub fn run_once(&mut self, now: Instant) -> Result<(), ControllerError> {
        self.trigger.update();
        self.update(now)
    }

    /// Production super-loop, sampling the system clock every iteration
    pub fn run(&mut self) -> ! {
        loop {
            if let Err(_err) = self.run_once(Instant::now()) {
                #[cfg(feature = "esp32-log")]
                println!("[Controller] tick failed: {}", _err);
            }
        }
    }

    /// Id of the active state
    pub const fn current_state(&self) -> Option<StateId> {
        self.current
    }

    /// Registered state by id
    pub fn state(&self, id: StateId) -> Option<&ActorState<A>> {
        self.states[id.index()].as_ref()
    }

    pub const fn outputs(&self) -> &[P; CHANNEL_COUNT] {
        &self.outputs
    }

    pub const fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut T {
        &mut self.trigger
    }
}
