//! Stick, click and gesture-session state

use serde::{Deserialize, Serialize};

/// Pointer identifier as reported by the touch-input source
pub type PointerId = i32;

/// A coordinate on the input surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Movement state of the stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StickState {
    /// No pointer is driving the stick
    #[default]
    AtRest,
    /// Pressed, displacement still suppressed by the deadzone
    MovedInDeadzone,
    /// Reporting movement. Sticky until release.
    MovedActive,
}

/// Kind of the most recent press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickState {
    #[default]
    Single,
    Double,
}

/// One continuous touch gesture, from press to release
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    /// Touch point driving the stick
    pub owning_pointer_id: PointerId,

    /// Where the owning pointer touched down. Fixed for the session.
    pub anchor_point: Point,

    /// Latest reported position of the owning pointer
    pub current_point: Point,

    /// Timestamp (ms) of the press that began the session
    pub press_started_at: u64,

    /// Handle position in surface units
    pub handle_point: Point,
}

impl GestureSession {
    pub fn new(pointer_id: PointerId, at: Point, timestamp_ms: u64) -> Self {
        Self {
            owning_pointer_id: pointer_id,
            anchor_point: at,
            current_point: at,
            press_started_at: timestamp_ms,
            handle_point: at,
        }
    }

    /// Displacement of the current point from the anchor
    pub fn displacement(&self) -> (f64, f64) {
        (
            f64::from(self.current_point.x) - f64::from(self.anchor_point.x),
            f64::from(self.current_point.y) - f64::from(self.anchor_point.y),
        )
    }

    /// Milliseconds since the session began
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.press_started_at)
    }
}
