#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use actor_enhancement_controller::{PlaybackChannel, PwmSink};

/// PWM sink remembering every write
#[derive(Debug, Default)]
pub struct RecordingPwm {
    pub writes: Vec<u16>,
}

impl RecordingPwm {
    pub fn last(&self) -> Option<u16> {
        self.writes.last().copied()
    }
}

impl PwmSink for RecordingPwm {
    fn set_duty_cycle(&mut self, duty: u16) {
        self.writes.push(duty);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play { track: &'static str, looping: bool },
    Stop { track: &'static str },
}

pub type PlaybackLog = Rc<RefCell<Vec<PlaybackEvent>>>;

/// Playback fake; `playing` can be cleared by the test to end the clip
pub struct FakePlayback {
    pub track: &'static str,
    pub playing: Rc<Cell<bool>>,
    pub log: PlaybackLog,
}

impl FakePlayback {
    pub fn new(track: &'static str, log: &PlaybackLog) -> Self {
        Self {
            track,
            playing: Rc::new(Cell::new(false)),
            log: Rc::clone(log),
        }
    }
}

impl PlaybackChannel for FakePlayback {
    fn play(&mut self, looping: bool) {
        self.playing.set(true);
        self.log.borrow_mut().push(PlaybackEvent::Play {
            track: self.track,
            looping,
        });
    }

    fn stop(&mut self) {
        self.playing.set(false);
        self.log
            .borrow_mut()
            .push(PlaybackEvent::Stop { track: self.track });
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

pub fn outputs() -> [RecordingPwm; 2] {
    [RecordingPwm::default(), RecordingPwm::default()]
}
