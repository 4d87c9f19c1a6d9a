//! Millisecond clocks for stamping pointer events
//!
//! The stick itself only consumes timestamps. [`ClockedStick`] reads a clock
//! once per incoming event for touch sources that do not carry their own
//! event times.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::stick::{AnalogStick, PointerId};

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start_instant: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start_instant: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

/// A stick that stamps press and move events from a clock
#[derive(Debug)]
pub struct ClockedStick<C: Clock> {
    stick: AnalogStick,
    clock: C,
}

impl<C: Clock> ClockedStick<C> {
    pub fn new(stick: AnalogStick, clock: C) -> Self {
        Self { stick, clock }
    }

    pub fn press(&mut self, pointer_id: PointerId, x: f32, y: f32) -> bool {
        let now = self.clock.now_ms();
        self.stick.press(pointer_id, x, y, now)
    }

    pub fn move_to(&mut self, pointer_id: PointerId, x: f32, y: f32) -> bool {
        let now = self.clock.now_ms();
        self.stick.move_to(pointer_id, x, y, now)
    }

    pub fn release(&mut self, pointer_id: PointerId) -> bool {
        self.stick.release(pointer_id)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_inner(self) -> AnalogStick {
        self.stick
    }
}

impl<C: Clock> Deref for ClockedStick<C> {
    type Target = AnalogStick;

    fn deref(&self) -> &AnalogStick {
        &self.stick
    }
}

impl<C: Clock> DerefMut for ClockedStick<C> {
    fn deref_mut(&mut self) -> &mut AnalogStick {
        &mut self.stick
    }
}
