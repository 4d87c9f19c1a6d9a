//! Virtual analog stick driven by touch gestures
//!
//! - [`geometry`]: displacement to polar coordinates and back to a normalized vector
//! - [`machine`]: deadzone hysteresis, click timing and pointer ownership
//! - [`emitter`]: listener registry and event delivery

pub mod emitter;
pub mod geometry;
pub mod input;
pub mod machine;
pub mod state;

#[cfg(test)]
mod tests;

pub use emitter::{EventEmitter, EventRecorder, FnListener, StickEvent, StickListener};
pub use input::PointerEvent;
pub use machine::AnalogStick;
pub use state::{ClickState, GestureSession, Point, PointerId, StickState};
