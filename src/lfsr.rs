//! Linear-feedback shift register used by the candle flicker
//!
//! Galois form: shift right, XOR the tap mask in when the dropped bit was set.
//! A nonzero state can never step to zero, so the register keeps producing
//! values forever.

/// Feedback mask applied when the low bit shifts out
pub const FEEDBACK_MASK: u16 = 0x822B;

/// Seed used when none (or zero) is supplied
pub const DEFAULT_SEED: u16 = 0x55CE;

/// Pseudo-random bit generator with a guaranteed nonzero state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfsr {
    state: u16,
}

impl Lfsr {
    /// Create a register from a seed
    ///
    /// Zero is an absorbing state, so it is replaced with [`DEFAULT_SEED`].
    pub const fn new(seed: u16) -> Self {
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state }
    }

    /// Current register value
    #[inline]
    pub const fn state(self) -> u16 {
        self.state
    }

    /// Advance one step and return the new state
    #[inline]
    pub const fn step(&mut self) -> u16 {
        self.state = if self.state & 1 == 1 {
            (self.state >> 1) ^ FEEDBACK_MASK
        } else {
            self.state >> 1
        };
        self.state
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
