mod common;

mod tests {
    use std::rc::Rc;

    use actor_enhancement_controller::{
        ActorConfig, ActorParts, ActorState, BoundEffect, ChannelId, ConfigEntry, ConfigTable, Controller,
        ControllerError, Duration, EdgeLatch, GammaTable, Instant, SteadyStrobeEffect, StateId,
        TriggeredExitPolicy,
        playback::{AMBIENT_TRACK, TRIGGER_TRACK},
        state::{AmbientState, DEFAULT_TRIGGER_DURATION, TriggeredState},
        trigger::LatchedTrigger,
    };

    use super::common::{FakePlayback, PlaybackEvent, PlaybackLog, RecordingPwm, outputs};

    const AMBIENT: &str = AMBIENT_TRACK;
    const TRIGGER: &str = TRIGGER_TRACK;

    type TestController<'a> = Controller<RecordingPwm, FakePlayback, LatchedTrigger<'a>>;

    fn ms(value: u64) -> Instant {
        Instant::from_millis(value)
    }

    fn register_states(
        controller: &mut TestController<'_>,
        log: &PlaybackLog,
        with_ambient_audio: bool,
    ) {
        let ambient_track = with_ambient_audio.then(|| FakePlayback::new(AMBIENT, log));
        let mut ambient = AmbientState::new(ambient_track);
        let _ = ambient.add_effect(BoundEffect::new(
            ChannelId::Channel1,
            SteadyStrobeEffect::default().with_dim(200),
        ));
        let mut triggered = TriggeredState::new(FakePlayback::new(TRIGGER, log));
        let _ = triggered.add_effect(BoundEffect::new(
            ChannelId::Channel2,
            SteadyStrobeEffect::default().with_dim(255).with_strobe(10),
        ));
        controller.add_state(ambient.into());
        controller.add_state(triggered.into());
    }

    #[test]
    fn test_new_switches_outputs_off() {
        let latch = EdgeLatch::new();
        let controller: TestController<'_> = Controller::new(outputs(), latch.trigger());
        assert_eq!(controller.outputs()[0].writes, [0]);
        assert_eq!(controller.outputs()[1].writes, [0]);
        assert_eq!(controller.current_state(), None);
    }

    #[test]
    fn test_update_without_state_is_noop() {
        let latch = EdgeLatch::new();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());
        latch.record_fall();
        assert_eq!(controller.run_once(ms(0)), Ok(()));
        assert_eq!(controller.update(ms(1)), Ok(()));
        assert_eq!(controller.current_state(), None);
    }

    #[test]
    fn test_transition_protocol() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());
        register_states(&mut controller, &log, true);

        controller.go_to_state_named("ambient", ms(0)).unwrap();
        assert_eq!(
            *log.borrow(),
            [PlaybackEvent::Play {
                track: AMBIENT,
                looping: true
            }]
        );

        log.borrow_mut().clear();
        controller.go_to_state_named("triggered", ms(1)).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                PlaybackEvent::Stop { track: AMBIENT },
                PlaybackEvent::Play {
                    track: TRIGGER,
                    looping: false
                },
            ]
        );
        assert_eq!(controller.current_state(), Some(StateId::Triggered));
    }

    #[test]
    fn test_unknown_state() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());

        controller.add_state(AmbientState::new(Some(FakePlayback::new(AMBIENT, &log))).into());
        controller.go_to_state(StateId::Ambient, ms(0)).unwrap();
        log.borrow_mut().clear();

        assert_eq!(
            controller.go_to_state_named("haunted", ms(1)),
            Err(ControllerError::UnknownState)
        );
        assert_eq!(
            controller.go_to_state(StateId::Triggered, ms(1)),
            Err(ControllerError::UnknownState)
        );
        // The active state was not exited
        assert!(log.borrow().is_empty());
        assert_eq!(controller.current_state(), Some(StateId::Ambient));

        // A trigger with nowhere to go surfaces the fault
        latch.record_fall();
        assert_eq!(controller.run_once(ms(2)), Err(ControllerError::UnknownState));
    }

    #[test]
    fn test_ambient_to_triggered_scenario() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());
        register_states(&mut controller, &log, false);
        controller.go_to_state(StateId::Ambient, ms(0)).unwrap();

        for tick in 1..=3 {
            controller.run_once(ms(tick)).unwrap();
        }
        // Initial switch-off, then exactly one write of the dimmed level
        let gamma = GammaTable::default();
        assert_eq!(controller.outputs()[0].writes, [0, gamma.get(200)]);
        assert!(log.borrow().is_empty());

        latch.record_fall();
        controller.run_once(ms(4)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Triggered));
        assert_eq!(
            *log.borrow(),
            [PlaybackEvent::Play {
                track: TRIGGER,
                looping: false
            }]
        );

        // The edge is consumed
        controller.run_once(ms(5)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Triggered));
    }

    #[test]
    fn test_triggered_returns_when_audio_ends() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());

        let clip = FakePlayback::new(TRIGGER, &log);
        let playing = Rc::clone(&clip.playing);
        let mut triggered = TriggeredState::new(clip);
        let _ = triggered.add_effect(BoundEffect::new(
            ChannelId::Channel2,
            SteadyStrobeEffect::default().with_dim(255).with_strobe(10),
        ));
        controller.add_state(ActorState::Ambient(AmbientState::new(None)));
        controller.add_state(triggered.into());
        controller.go_to_state(StateId::Triggered, ms(0)).unwrap();

        // One strobe flip per 50 ms tick
        for tick in 1..=10 {
            controller.run_once(ms(tick * 50)).unwrap();
        }
        assert_eq!(controller.outputs()[1].writes.len(), 1 + 10);

        playing.set(false);
        controller.run_once(ms(11 * 50)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Ambient));
        assert_eq!(controller.outputs()[1].writes.len(), 1 + 10);
    }

    #[test]
    fn test_fixed_duration_policy() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());

        let policy = TriggeredExitPolicy::FixedDuration(Duration::from_millis(500));
        controller.add_state(ActorState::Ambient(AmbientState::new(None)));
        let triggered = TriggeredState::new(FakePlayback::new(TRIGGER, &log)).with_exit_policy(policy);
        controller.add_state(triggered.into());
        controller.go_to_state(StateId::Triggered, ms(1000)).unwrap();

        controller.run_once(ms(1499)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Triggered));

        controller.run_once(ms(1500)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Ambient));
        assert_eq!(
            *log.borrow(),
            [
                PlaybackEvent::Play {
                    track: TRIGGER,
                    looping: false
                },
                PlaybackEvent::Stop { track: TRIGGER },
            ]
        );
    }

    fn triggered<'a>(controller: &'a TestController<'_>) -> &'a TriggeredState<FakePlayback> {
        match controller.state(StateId::Triggered) {
            Some(ActorState::Triggered(state)) => state,
            _ => panic!("triggered state not registered"),
        }
    }

    #[test]
    fn test_triggered_deadline() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let mut controller: TestController<'_> = Controller::new(outputs(), latch.trigger());
        controller.add_state(ActorState::Ambient(AmbientState::new(None)));
        controller.add_state(TriggeredState::new(FakePlayback::new(TRIGGER, &log)).into());

        assert_eq!(triggered(&controller).finish_deadline(), None);
        controller.go_to_state(StateId::Triggered, ms(100)).unwrap();

        let state = triggered(&controller);
        assert_eq!(state.exit_policy(), TriggeredExitPolicy::AudioEnd);
        assert_eq!(state.finish_deadline(), Some(ms(100) + DEFAULT_TRIGGER_DURATION));
        assert!(state.playback().playing.get());
        assert_eq!(state.playback().track, TRIGGER);

        // A duration past the end of the clock saturates
        let policy = TriggeredExitPolicy::FixedDuration(Duration::MAX);
        controller.add_state(
            TriggeredState::new(FakePlayback::new(TRIGGER, &log))
                .with_exit_policy(policy)
                .into(),
        );
        controller.go_to_state(StateId::Triggered, ms(200)).unwrap();
        assert_eq!(triggered(&controller).finish_deadline(), Some(Instant::MAX));
        controller.run_once(ms(300)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Triggered));
    }

    #[test]
    fn test_ambient_playback_accessor() {
        let log = PlaybackLog::default();
        let ambient: AmbientState<FakePlayback> = AmbientState::new(None);
        assert!(ambient.playback().is_none());

        let ambient = AmbientState::new(Some(FakePlayback::new(AMBIENT, &log)));
        assert_eq!(ambient.playback().map(|track| track.track), Some(AMBIENT));
    }

    #[test]
    fn test_assemble_requires_trigger_audio() {
        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let parts = ActorParts {
            outputs: outputs(),
            trigger: latch.trigger(),
            ambient_track: Some(FakePlayback::new(AMBIENT, &log)),
            trigger_track: None,
        };
        let result = TestController::assemble(parts, &ActorConfig::default(), ms(0));
        assert!(matches!(result, Err(ControllerError::MissingTriggerAudio)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_assemble_from_config() {
        let entries = [
            ConfigEntry::text("ambient", "effect1", "flicker"),
            ConfigEntry::integer("ambient", "effect1.dim", 3),
            ConfigEntry::integer("ambient", "effect2.dim", 40),
            ConfigEntry::integer("triggered", "effect2.dim", 255),
            ConfigEntry::integer("triggered", "effect2.strobe", 10),
        ];
        let config = ActorConfig::resolve(&ConfigTable::new(&entries));

        let latch = EdgeLatch::new();
        let log = PlaybackLog::default();
        let parts = ActorParts {
            outputs: outputs(),
            trigger: latch.trigger(),
            ambient_track: None,
            trigger_track: Some(FakePlayback::new(TRIGGER, &log)),
        };
        let mut controller = TestController::assemble(parts, &config, ms(0)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Ambient));
        assert!(log.borrow().is_empty());

        let ambient = controller.state(StateId::Ambient).unwrap();
        assert_eq!(ambient.effects().len(), 2);

        controller.run_once(ms(1)).unwrap();
        let gamma = GammaTable::default();
        assert_eq!(controller.outputs()[1].writes, vec![0, gamma.get(40)]);
        assert_eq!(controller.outputs()[0].writes.len(), 2);

        latch.record_fall();
        controller.run_once(ms(2)).unwrap();
        assert_eq!(controller.current_state(), Some(StateId::Triggered));
        controller.run_once(ms(3)).unwrap();
        assert_eq!(controller.outputs()[1].last(), Some(gamma.get(255)));
    }
}
