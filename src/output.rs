//! PWM output channels
//!
//! Effects never own hardware: the controller holds one sink per channel and
//! lends the bound sink to an effect on each update.

use embedded_hal::pwm::SetDutyCycle;

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Number of lighting channels on the board
pub const CHANNEL_COUNT: usize = 2;

/// Full scale duty cycle
pub const MAX_DUTY: u16 = u16::MAX;

/// Hardware sink for a 16-bit duty cycle
///
/// Implement this trait to support different PWM peripherals.
pub trait PwmSink {
    /// Write a duty cycle (0 = off, 65535 = fully on)
    fn set_duty_cycle(&mut self, duty: u16);
}

/// Lighting channel identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelId {
    Channel1 = 0,
    Channel2 = 1,
}

impl ChannelId {
    /// All channels in output order
    pub const ALL: [Self; CHANNEL_COUNT] = [Self::Channel1, Self::Channel2];

    /// Index into the controller output array
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Adapter from an `embedded-hal` PWM channel to [`PwmSink`]
///
/// Scales the 16-bit duty cycle to the channel's own resolution. Write
/// errors are dropped so rendering never faults.
#[derive(Debug)]
pub struct PwmOutput<T> {
    channel: T,
}

impl<T: SetDutyCycle> PwmOutput<T> {
    pub const fn new(channel: T) -> Self {
        Self { channel }
    }

    /// Release the wrapped channel
    pub fn into_inner(self) -> T {
        self.channel
    }
}

impl<T: SetDutyCycle> PwmSink for PwmOutput<T> {
    #[allow(clippy::cast_possible_truncation)]
    fn set_duty_cycle(&mut self, duty: u16) {
        let max = u32::from(self.channel.max_duty_cycle());
        let scaled = (u32::from(duty) * max + u32::from(MAX_DUTY) / 2) / u32::from(MAX_DUTY);
        if let Err(_err) = self.channel.set_duty_cycle(scaled as u16) {
            #[cfg(feature = "esp32-log")]
            println!("[PwmOutput] duty cycle write failed: {:?}", _err);
        }
    }
}
