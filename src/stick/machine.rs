//! Touch stick state machine
//!
//! Owns the gesture session, stick state and click state. Press, move and
//! release events from the touch source drive it; every transition is
//! committed before listeners are notified.
//!
//! ```text
//! AtRest ──press──▶ MovedInDeadzone ──move (outside deadzone or held long enough)──▶ MovedActive
//!    ▲                     │                                                             │
//!    └──────release────────┴──────────────────────release────────────────────────────────┘
//! ```

use tracing::{debug, trace};

use super::emitter::{EventEmitter, StickEvent, StickListener};
use super::geometry;
use super::input::PointerEvent;
use super::state::{ClickState, GestureSession, Point, PointerId, StickState};
use crate::config::StickConfig;

/// A virtual analog stick driven by one pointer at a time
#[derive(Debug)]
pub struct AnalogStick {
    config: StickConfig,
    state: StickState,
    click_state: ClickState,
    session: Option<GestureSession>,
    /// Timestamp of the last accepted press, used for double-click detection
    last_press_at: Option<u64>,
    /// Last normalized vector reported to listeners
    vector: (f64, f64),
    emitter: EventEmitter,
}

impl AnalogStick {
    pub fn new(config: StickConfig) -> Self {
        Self {
            config,
            state: StickState::AtRest,
            click_state: ClickState::Single,
            session: None,
            last_press_at: None,
            vector: (0.0, 0.0),
            emitter: EventEmitter::new(),
        }
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: impl StickListener + 'static) {
        self.emitter.add_listener(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.emitter.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.len()
    }

    /// Listener calls that returned an error or panicked
    pub fn failed_deliveries(&self) -> u64 {
        self.emitter.failed_deliveries()
    }

    pub fn config(&self) -> &StickConfig {
        &self.config
    }

    pub fn stick_state(&self) -> StickState {
        self.state
    }

    pub fn click_state(&self) -> ClickState {
        self.click_state
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn is_pressed(&self) -> bool {
        self.session.is_some()
    }

    /// Held press that started as a double click
    pub fn is_double_click_held(&self) -> bool {
        self.is_pressed() && self.click_state == ClickState::Double
    }

    /// Where the current gesture started
    pub fn anchor(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.anchor_point)
    }

    /// Handle position in surface units, `None` at rest
    pub fn handle_position(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.handle_point)
    }

    /// Last reported normalized vector
    pub fn vector(&self) -> (f64, f64) {
        self.vector
    }

    /// Dispatch a pointer event. Returns whether the stick consumed it.
    pub fn handle(&mut self, event: &PointerEvent) -> bool {
        match *event {
            PointerEvent::Press { pointer, x, y, at_ms } => self.press(pointer, x, y, at_ms),
            PointerEvent::Move { pointer, x, y, at_ms } => self.move_to(pointer, x, y, at_ms),
            PointerEvent::Release { pointer } => self.release(pointer),
        }
    }

    /// A pointer touched down.
    ///
    /// Starts a session if none is active and emits a click or double click.
    /// Presses from other pointers during a session, or at a non-finite
    /// position, are ignored.
    pub fn press(&mut self, pointer_id: PointerId, x: f32, y: f32, timestamp_ms: u64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            trace!("press from pointer {} at non-finite ({}, {}) ignored", pointer_id, x, y);
            return false;
        }
        if let Some(session) = &self.session {
            if session.owning_pointer_id == pointer_id {
                trace!("repeated press from owning pointer {} ignored", pointer_id);
                return true;
            }
            trace!(
                "press from pointer {} ignored, stick owned by pointer {}",
                pointer_id,
                session.owning_pointer_id
            );
            return false;
        }

        let at = Point::new(x, y);
        self.session = Some(GestureSession::new(pointer_id, at, timestamp_ms));
        self.state = StickState::MovedInDeadzone;
        debug!("pointer {} took the stick at ({}, {})", pointer_id, x, y);

        let window = self.config.double_click_window_ms();
        let is_double = self.click_state == ClickState::Single
            && self
                .last_press_at
                .is_some_and(|last| timestamp_ms.saturating_sub(last) < window);
        self.last_press_at = Some(timestamp_ms);

        if is_double {
            self.click_state = ClickState::Double;
            self.emitter.emit(StickEvent::DoubleClick);
        } else {
            self.click_state = ClickState::Single;
            self.emitter.emit(StickEvent::Click);
        }

        true
    }

    /// The owning pointer moved.
    ///
    /// Recomputes the displacement and emits the normalized vector once the
    /// stick is active. Moves from any other pointer, or to a non-finite
    /// position, are ignored.
    pub fn move_to(&mut self, pointer_id: PointerId, x: f32, y: f32, timestamp_ms: u64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            trace!("move from pointer {} to non-finite ({}, {}) ignored", pointer_id, x, y);
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            trace!("move from pointer {} ignored, no active session", pointer_id);
            return false;
        };
        if session.owning_pointer_id != pointer_id {
            trace!("move from non-owning pointer {} ignored", pointer_id);
            return false;
        }

        session.current_point = Point::new(x, y);

        let travel = self.config.travel();
        let (dx, dy) = session.displacement();
        let radius = geometry::clamp_radius(geometry::radius(dx, dy), travel);
        let angle = geometry::angle(dx, dy);

        let (correlated_x, correlated_y) = geometry::correlated(radius, angle);
        session.handle_point = Point::new(
            (f64::from(session.anchor_point.x) - correlated_x) as f32,
            (f64::from(session.anchor_point.y) - correlated_y) as f32,
        );

        // Once active the stick stays active until release, even back inside the deadzone.
        // Holding the press long enough lifts the deadzone for precise small movements.
        let elapsed = session.elapsed_ms(timestamp_ms);
        self.state = if self.state == StickState::MovedActive
            || radius > self.config.deadzone_radius()
            || elapsed >= self.config.deadzone_release_ms()
        {
            StickState::MovedActive
        } else {
            StickState::MovedInDeadzone
        };

        if self.state == StickState::MovedActive {
            let (nx, ny) = geometry::to_normalized_vector(radius, angle, travel);
            self.vector = (nx, ny);
            self.emitter.emit(StickEvent::Movement { x: nx, y: ny });
        }

        true
    }

    /// A pointer lifted. Only the owning pointer ends the session.
    pub fn release(&mut self, pointer_id: PointerId) -> bool {
        match &self.session {
            Some(session) if session.owning_pointer_id == pointer_id => {},
            Some(_) => {
                trace!("release from non-owning pointer {} ignored", pointer_id);
                return false;
            },
            None => {
                trace!("release from pointer {} ignored, no active session", pointer_id);
                return false;
            },
        }

        debug!("pointer {} released the stick", pointer_id);
        self.end_session();
        true
    }

    /// Tear the stick down.
    ///
    /// An active session is revoked first so no axis stays deflected, then
    /// all listeners are dropped.
    pub fn dispose(&mut self) {
        if self.session.is_some() {
            debug!("stick disposed during an active session");
            self.end_session();
        }
        self.emitter.clear();
    }

    fn end_session(&mut self) {
        self.session = None;
        self.state = StickState::AtRest;
        self.vector = (0.0, 0.0);

        self.emitter.emit(StickEvent::Revoke);
        self.emitter.emit(StickEvent::Movement { x: 0.0, y: 0.0 });
    }
}

impl Drop for AnalogStick {
    fn drop(&mut self) {
        // A listener panicking during an unwind would abort the process
        if std::thread::panicking() {
            self.session = None;
            self.emitter.clear();
            return;
        }
        self.dispose();
    }
}
