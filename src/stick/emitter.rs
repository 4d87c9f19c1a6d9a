//! Listener registry and event delivery for the touch stick
//!
//! Listeners are notified synchronously, in the calling thread, in
//! registration order. A listener that returns an error or panics is logged
//! and skipped; delivery continues with the next listener.

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Notification emitted by the stick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StickEvent {
    /// Normalized stick vector, both axes in `[-1.0, 1.0]`
    Movement { x: f64, y: f64 },
    /// Press that is not part of a double click
    Click,
    /// Second press inside the double-click window
    DoubleClick,
    /// Owning pointer released (or stick disposed mid-gesture)
    Revoke,
}

/// Observer of stick events.
///
/// Every method defaults to a no-op so listeners only implement what they use.
pub trait StickListener: Send {
    /// Stick moved outside the deadzone, or returned to center on release
    fn on_movement(&mut self, _x: f64, _y: f64) -> Result<()> {
        Ok(())
    }

    fn on_click(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_double_click(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_revoke(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared listener: the caller keeps a handle to inspect it after registration
impl<T: StickListener> StickListener for Arc<Mutex<T>> {
    fn on_movement(&mut self, x: f64, y: f64) -> Result<()> {
        self.lock().on_movement(x, y)
    }

    fn on_click(&mut self) -> Result<()> {
        self.lock().on_click()
    }

    fn on_double_click(&mut self) -> Result<()> {
        self.lock().on_double_click()
    }

    fn on_revoke(&mut self) -> Result<()> {
        self.lock().on_revoke()
    }
}

/// Adapts a closure taking [`StickEvent`] into a listener
pub struct FnListener<F>(F);

impl<F> FnListener<F>
where
    F: FnMut(StickEvent) -> Result<()> + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> StickListener for FnListener<F>
where
    F: FnMut(StickEvent) -> Result<()> + Send,
{
    fn on_movement(&mut self, x: f64, y: f64) -> Result<()> {
        (self.0)(StickEvent::Movement { x, y })
    }

    fn on_click(&mut self) -> Result<()> {
        (self.0)(StickEvent::Click)
    }

    fn on_double_click(&mut self) -> Result<()> {
        (self.0)(StickEvent::DoubleClick)
    }

    fn on_revoke(&mut self) -> Result<()> {
        (self.0)(StickEvent::Revoke)
    }
}

/// Listener that records every event it receives.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<StickEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<StickEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<StickEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl StickListener for EventRecorder {
    fn on_movement(&mut self, x: f64, y: f64) -> Result<()> {
        self.events.lock().push(StickEvent::Movement { x, y });
        Ok(())
    }

    fn on_click(&mut self) -> Result<()> {
        self.events.lock().push(StickEvent::Click);
        Ok(())
    }

    fn on_double_click(&mut self) -> Result<()> {
        self.events.lock().push(StickEvent::DoubleClick);
        Ok(())
    }

    fn on_revoke(&mut self) -> Result<()> {
        self.events.lock().push(StickEvent::Revoke);
        Ok(())
    }
}

/// Ordered list of listeners
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Box<dyn StickListener>>,
    failed_deliveries: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Notification order is registration order.
    pub fn add_listener(&mut self, listener: impl StickListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of listener calls that failed or panicked so far
    pub fn failed_deliveries(&self) -> u64 {
        self.failed_deliveries
    }

    /// Deliver an event to every listener
    pub fn emit(&mut self, event: StickEvent) {
        match event {
            StickEvent::Movement { x, y } => debug!("movement x: {:.4} y: {:.4}", x, y),
            StickEvent::Click => debug!("click"),
            StickEvent::DoubleClick => debug!("double click"),
            StickEvent::Revoke => debug!("revoke"),
        }

        for (index, listener) in self.listeners.iter_mut().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| deliver(listener.as_mut(), event)));

            match outcome {
                Ok(Ok(())) => {},
                Ok(Err(e)) => {
                    self.failed_deliveries += 1;
                    warn!("Listener {} failed on {:?}: {:#}", index, event, e);
                },
                Err(payload) => {
                    self.failed_deliveries += 1;
                    warn!(
                        "Listener {} panicked on {:?}: {}",
                        index,
                        event,
                        panic_message(payload.as_ref())
                    );
                },
            }
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .field("failed_deliveries", &self.failed_deliveries)
            .finish()
    }
}

fn deliver(listener: &mut dyn StickListener, event: StickEvent) -> Result<()> {
    match event {
        StickEvent::Movement { x, y } => listener.on_movement(x, y),
        StickEvent::Click => listener.on_click(),
        StickEvent::DoubleClick => listener.on_double_click(),
        StickEvent::Revoke => listener.on_revoke(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
