//! Pointer lifecycle events fed to the stick by the touch source

use serde::{Deserialize, Serialize};

use super::state::PointerId;

/// One pointer lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PointerEvent {
    Press {
        pointer: PointerId,
        x: f32,
        y: f32,
        at_ms: u64,
    },
    Move {
        pointer: PointerId,
        x: f32,
        y: f32,
        at_ms: u64,
    },
    Release {
        pointer: PointerId,
    },
}

impl PointerEvent {
    pub fn pointer_id(&self) -> PointerId {
        match *self {
            PointerEvent::Press { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Release { pointer } => pointer,
        }
    }

    /// Event timestamp, if the event carries one
    pub fn timestamp_ms(&self) -> Option<u64> {
        match *self {
            PointerEvent::Press { at_ms, .. } | PointerEvent::Move { at_ms, .. } => Some(at_ms),
            PointerEvent::Release { .. } => None,
        }
    }
}
