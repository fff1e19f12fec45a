#![no_std]

//! Electronic actor enhancement controller
//!
//! Plays an ambient loop until the trigger input falls, then plays a one-shot
//! clip while two PWM lighting channels run their configured effects.
//!
//! - `effect` - Dimmer/strobe and candle flicker effects
//! - `state` - Ambient and triggered states
//! - `controller` - State machine driver and startup assembly
//! - `config` - Startup configuration and defaults
//! - `output`, `playback`, `trigger` - Hardware capabilities

pub mod config;
pub mod controller;
pub mod effect;
pub mod error;
pub mod gamma;
pub mod lfsr;
pub mod output;
pub mod playback;
pub mod state;
pub mod trigger;

pub use config::{ActorConfig, ConfigEntry, ConfigSource, ConfigTable, ConfigValue, EffectConfig};
pub use controller::{ActorParts, Controller};
pub use effect::{BoundEffect, Effect, EffectKind, EffectSlot, FlickerEffect, SteadyStrobeEffect};
pub use error::ControllerError;
pub use gamma::GammaTable;
pub use output::{ChannelId, PwmOutput, PwmSink};
pub use playback::PlaybackChannel;
pub use state::{ActorState, StateId, TriggeredExitPolicy};
pub use trigger::{Debouncer, EdgeLatch, TriggerInput};

pub use embassy_time::{Duration, Instant};
