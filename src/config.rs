//! Actor configuration
//!
//! Configuration is read once at startup from a [`ConfigSource`] and
//! resolved into plain structures. Anything missing, malformed or
//! unreadable falls back to a dark, non-strobing dimmer so the actor still
//! runs.

use core::convert::Infallible;
use core::fmt;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::{
    effect::{BoundEffect, EffectKind, EffectSlot, FlickerEffect, MAX_STROBE_HZ, SteadyStrobeEffect},
    gamma::{DEFAULT_GAMMA, GammaTable},
    lfsr::DEFAULT_SEED,
    output::{CHANNEL_COUNT, ChannelId},
    state::{DEFAULT_TRIGGER_DURATION, EffectList, StateId, TriggeredExitPolicy},
};

/// Location of the configuration file on the card
pub const CONFIG_FILE: &str = "/sd/config.toml";

/// Default flicker seed of the second channel while triggered
///
/// Differs from [`DEFAULT_SEED`] so two flickering channels never move in
/// lockstep.
pub const TRIGGERED_CHANNEL2_SEED: u16 = 0x6C4A;

const EXIT_KEY: &str = "exit";
const DURATION_KEY: &str = "duration_ms";
const EXIT_AUDIO_END: &str = "audio-end";
const EXIT_FIXED_DURATION: &str = "fixed-duration";

/// Longest accepted `duration_ms`, a little under 50 days
const MAX_DURATION_MS: i64 = 0xFFFF_FFFF;

/// A value as stored by the configuration source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValue<'a> {
    Integer(i64),
    Text(&'a str),
}

/// Backing store for the actor configuration
///
/// Tables are named after the states (`ambient`, `triggered`).
pub trait ConfigSource {
    type Error: fmt::Debug;

    /// Look up `key` in `table`
    ///
    /// `Ok(None)` means the key is absent. `Err` means the source itself
    /// could not be read.
    fn fetch(&self, table: &str, key: &str) -> Result<Option<ConfigValue<'_>>, Self::Error>;
}

/// Single `table.key = value` entry
#[derive(Debug, Clone, Copy)]
pub struct ConfigEntry<'a> {
    pub table: &'a str,
    pub key: &'a str,
    pub value: ConfigValue<'a>,
}

impl<'a> ConfigEntry<'a> {
    pub const fn integer(table: &'a str, key: &'a str, value: i64) -> Self {
        Self {
            table,
            key,
            value: ConfigValue::Integer(value),
        }
    }

    pub const fn text(table: &'a str, key: &'a str, value: &'a str) -> Self {
        Self {
            table,
            key,
            value: ConfigValue::Text(value),
        }
    }
}

/// In-memory configuration source
///
/// Later entries override earlier ones.
#[derive(Debug, Clone, Copy)]
pub struct ConfigTable<'a> {
    entries: &'a [ConfigEntry<'a>],
}

impl<'a> ConfigTable<'a> {
    pub const fn new(entries: &'a [ConfigEntry<'a>]) -> Self {
        Self { entries }
    }
}

impl ConfigSource for ConfigTable<'_> {
    type Error = Infallible;

    fn fetch(&self, table: &str, key: &str) -> Result<Option<ConfigValue<'_>>, Infallible> {
        Ok(self
            .entries
            .iter()
            .rev()
            .find(|entry| entry.table == table && entry.key == key)
            .map(|entry| entry.value))
    }
}

/// Keys describing one channel's effect
struct ChannelKeys {
    effect: &'static str,
    dim: &'static str,
    strobe: &'static str,
    seed: &'static str,
}

const fn channel_keys(channel: ChannelId) -> ChannelKeys {
    match channel {
        ChannelId::Channel1 => ChannelKeys {
            effect: "effect1",
            dim: "effect1.dim",
            strobe: "effect1.strobe",
            seed: "effect1.seed",
        },
        ChannelId::Channel2 => ChannelKeys {
            effect: "effect2",
            dim: "effect2.dim",
            strobe: "effect2.strobe",
            seed: "effect2.seed",
        },
    }
}

/// Effect settings for one channel in one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectConfig {
    pub kind: EffectKind,
    /// 0-255 for the dimmer, 0-5 for the flicker
    pub dim: u8,
    /// Strobe frequency in Hz, dimmer only
    pub strobe_hz: u16,
    /// LFSR seed, flicker only
    pub seed: u16,
}

impl EffectConfig {
    /// Dark, non-strobing dimmer
    pub const fn new(seed: u16) -> Self {
        Self {
            kind: EffectKind::Dimmer,
            dim: 0,
            strobe_hz: 0,
            seed,
        }
    }

    /// Build the configured effect
    pub fn build(&self, gamma: f32) -> EffectSlot {
        match self.kind {
            EffectKind::Dimmer => SteadyStrobeEffect::new(GammaTable::new(gamma))
                .with_dim(self.dim)
                .with_strobe(self.strobe_hz)
                .into(),
            EffectKind::Flicker => FlickerEffect::new(self.seed).with_level(self.dim).into(),
        }
    }

    fn apply<S: ConfigSource>(
        &mut self,
        source: &S,
        table: &str,
        keys: &ChannelKeys,
    ) -> Result<(), S::Error> {
        // An unrecognized effect leaves the channel dark, ignoring its settings
        match source.fetch(table, keys.effect)? {
            Some(ConfigValue::Text(name)) => match EffectKind::parse_from_str(name) {
                Some(kind) => self.kind = kind,
                None => {
                    #[cfg(feature = "esp32-log")]
                    println!("[config] {}.{}: unknown effect {:?}", table, keys.effect, name);
                    *self = Self::new(self.seed);
                    return Ok(());
                }
            },
            Some(_other) => {
                #[cfg(feature = "esp32-log")]
                println!("[config] {}.{}: expected text, got {:?}", table, keys.effect, _other);
                *self = Self::new(self.seed);
                return Ok(());
            }
            None => {}
        }

        if let Some(value) = fetch_integer(source, table, keys.dim)? {
            self.dim = clamp_to_u8(value);
        }
        if let Some(value) = fetch_integer(source, table, keys.strobe)? {
            self.strobe_hz = clamp_to(value, MAX_STROBE_HZ);
        }
        if let Some(value) = fetch_integer(source, table, keys.seed)? {
            self.seed = clamp_to(value, u16::MAX);
        }
        Ok(())
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Effect settings for every channel of one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateConfig {
    pub channels: [EffectConfig; CHANNEL_COUNT],
}

impl StateConfig {
    /// Defaults for the given state
    pub const fn defaults_for(state: StateId) -> Self {
        let channel2_seed = match state {
            StateId::Ambient => DEFAULT_SEED,
            StateId::Triggered => TRIGGERED_CHANNEL2_SEED,
        };
        Self {
            channels: [EffectConfig::new(DEFAULT_SEED), EffectConfig::new(channel2_seed)],
        }
    }

    pub const fn channel(&self, channel: ChannelId) -> &EffectConfig {
        &self.channels[channel.index()]
    }

    /// Build one effect per channel
    pub fn build_effects(&self, gamma: f32) -> EffectList {
        let mut effects = EffectList::new();
        for channel in ChannelId::ALL {
            // One entry per channel always fits
            let _ = effects.push(BoundEffect::new(channel, self.channel(channel).build(gamma)));
        }
        effects
    }

    fn apply<S: ConfigSource>(&mut self, source: &S, table: &str) -> Result<(), S::Error> {
        for channel in ChannelId::ALL {
            self.channels[channel.index()].apply(source, table, &channel_keys(channel))?;
        }
        Ok(())
    }
}

/// Complete startup configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorConfig {
    pub ambient: StateConfig,
    pub triggered: StateConfig,
    pub exit_policy: TriggeredExitPolicy,
    pub gamma: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            ambient: StateConfig::defaults_for(StateId::Ambient),
            triggered: StateConfig::defaults_for(StateId::Triggered),
            exit_policy: TriggeredExitPolicy::default(),
            gamma: DEFAULT_GAMMA,
        }
    }
}

impl ActorConfig {
    /// Resolve the configuration, propagating source errors
    pub fn try_resolve<S: ConfigSource>(source: &S) -> Result<Self, S::Error> {
        let mut config = Self::default();
        config.ambient.apply(source, StateId::Ambient.as_str())?;
        config.triggered.apply(source, StateId::Triggered.as_str())?;
        config.exit_policy = resolve_exit_policy(source)?;
        Ok(config)
    }

    /// Resolve the configuration, falling back to defaults if the source
    /// cannot be read
    pub fn resolve<S: ConfigSource>(source: &S) -> Self {
        Self::try_resolve(source).unwrap_or_else(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[config] {} not readable: {:?}", CONFIG_FILE, _err);
            Self::default()
        })
    }

    pub const fn state(&self, id: StateId) -> &StateConfig {
        match id {
            StateId::Ambient => &self.ambient,
            StateId::Triggered => &self.triggered,
        }
    }
}

fn resolve_exit_policy<S: ConfigSource>(source: &S) -> Result<TriggeredExitPolicy, S::Error> {
    let table = StateId::Triggered.as_str();
    let fixed = match source.fetch(table, EXIT_KEY)? {
        Some(ConfigValue::Text(EXIT_FIXED_DURATION)) => true,
        Some(ConfigValue::Text(EXIT_AUDIO_END)) | None => false,
        Some(_other) => {
            #[cfg(feature = "esp32-log")]
            println!("[config] {}.{}: unknown exit policy {:?}", table, EXIT_KEY, _other);
            false
        }
    };
    if !fixed {
        return Ok(TriggeredExitPolicy::AudioEnd);
    }

    let duration = fetch_integer(source, table, DURATION_KEY)?
        .map(|ms| Duration::from_millis(ms.clamp(0, MAX_DURATION_MS).unsigned_abs()))
        .unwrap_or(DEFAULT_TRIGGER_DURATION);
    Ok(TriggeredExitPolicy::FixedDuration(duration))
}

fn fetch_integer<S: ConfigSource>(
    source: &S,
    table: &str,
    key: &str,
) -> Result<Option<i64>, S::Error> {
    Ok(match source.fetch(table, key)? {
        Some(ConfigValue::Integer(value)) => Some(value),
        Some(ConfigValue::Text(_text)) => {
            #[cfg(feature = "esp32-log")]
            println!("[config] {}.{}: expected integer, got {:?}", table, key, _text);
            None
        }
        None => None,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to(value: i64, max: u16) -> u16 {
    value.clamp(0, i64::from(max)) as u16
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_to_u8(value: i64) -> u8 {
    clamp_to(value, u16::from(u8::MAX)) as u8
}
