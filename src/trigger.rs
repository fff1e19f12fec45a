//! Trigger input
//!
//! The controller only needs edge events. Two sources are provided: a
//! polled software debouncer over a GPIO pin and an interrupt-fed latch.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

/// Time the raw level must stay put before it is accepted
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(10);

/// Edge-detecting input
pub trait TriggerInput {
    /// Refresh the input; edges reported afterwards belong to this tick
    fn update(&mut self);

    /// The input went from high to low during the last `update`
    fn fell(&self) -> bool;

    /// The input went from low to high during the last `update`
    fn rose(&self) -> bool;
}

/// Polled debouncer over a digital input
///
/// The pin is expected to idle high (pull-up), so a press reads as a fall.
pub struct Debouncer<P> {
    pin: P,
    interval: Duration,
    debounced: bool,
    unstable: bool,
    last_bounce: Option<Instant>,
    changed: bool,
}

impl<P: InputPin> Debouncer<P> {
    pub fn new(mut pin: P) -> Self {
        let level = pin.is_high().unwrap_or(true);
        Self {
            pin,
            interval: DEFAULT_DEBOUNCE_INTERVAL,
            debounced: level,
            unstable: level,
            last_bounce: None,
            changed: false,
        }
    }

    /// Set the debounce interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Debounced level
    pub const fn value(&self) -> bool {
        self.debounced
    }

    /// Sample the pin at `now`
    ///
    /// A read error counts as "no change" for this tick.
    pub fn update_at(&mut self, now: Instant) {
        self.changed = false;
        let Ok(level) = self.pin.is_high() else {
            return;
        };

        if level != self.unstable {
            self.unstable = level;
            self.last_bounce = Some(now);
            return;
        }

        let settled = self
            .last_bounce
            .is_none_or(|bounce| now >= bounce + self.interval);
        if settled && level != self.debounced {
            self.debounced = level;
            self.last_bounce = Some(now);
            self.changed = true;
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> TriggerInput for Debouncer<P> {
    fn update(&mut self) {
        self.update_at(Instant::now());
    }

    fn fell(&self) -> bool {
        self.changed && !self.debounced
    }

    fn rose(&self) -> bool {
        self.changed && self.debounced
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Edges {
    fell: bool,
    rose: bool,
}

/// Edge latch shared between an interrupt handler and the main loop
///
/// The handler records edges, the loop drains them through a
/// [`LatchedTrigger`]. Each recorded edge is reported exactly once.
pub struct EdgeLatch {
    pending: Mutex<Cell<Edges>>,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(Edges {
                fell: false,
                rose: false,
            })),
        }
    }

    /// Record a high to low transition
    pub fn record_fall(&self) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            cell.set(Edges {
                fell: true,
                ..cell.get()
            });
        });
    }

    /// Record a low to high transition
    pub fn record_rise(&self) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            cell.set(Edges {
                rose: true,
                ..cell.get()
            });
        });
    }

    fn take(&self) -> Edges {
        critical_section::with(|cs| self.pending.borrow(cs).take())
    }

    /// Get the loop side handle for this latch
    pub const fn trigger(&self) -> LatchedTrigger<'_> {
        LatchedTrigger {
            latch: self,
            current: Edges {
                fell: false,
                rose: false,
            },
        }
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop side of an [`EdgeLatch`]
pub struct LatchedTrigger<'a> {
    latch: &'a EdgeLatch,
    current: Edges,
}

impl TriggerInput for LatchedTrigger<'_> {
    fn update(&mut self) {
        self.current = self.latch.take();
    }

    fn fell(&self) -> bool {
        self.current.fell
    }

    fn rose(&self) -> bool {
        self.current.rose
    }
}
