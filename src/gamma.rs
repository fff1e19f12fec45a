//! Gamma correction lookup
//!
//! Maps a linear 0-255 brightness (DMX compatible) onto a perceptually
//! linear 16-bit PWM duty cycle.

/// Default gamma exponent used by the dimmer channels
pub const DEFAULT_GAMMA: f32 = 2.2;

const MAX_IN: f64 = 255.0;
const MAX_OUT: f64 = 65535.0;

/// Precomputed `linear -> gamma` table
///
/// Built once per effect and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable {
    lut: [u16; 256],
}

impl GammaTable {
    /// Build the table for the given gamma exponent
    ///
    /// Each entry is `floor((i / 255) ^ gamma * 65535 + 0.5)`.
    pub fn new(gamma: f32) -> Self {
        Self { lut: build(gamma) }
    }

    /// Gamma corrected duty cycle for a linear brightness
    #[inline]
    pub const fn get(&self, value: u8) -> u16 {
        self.lut[value as usize]
    }

    /// Raw table
    pub const fn as_array(&self) -> &[u16; 256] {
        &self.lut
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}

/// Build a 256 entry gamma table
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn build(gamma: f32) -> [u16; 256] {
    let gamma = f64::from(gamma);
    let mut lut = [0u16; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let linear = i as f64 / MAX_IN;
        let corrected = libm::floor(libm::pow(linear, gamma) * MAX_OUT + 0.5);
        *entry = corrected.clamp(0.0, MAX_OUT) as u16;
    }
    lut
}
