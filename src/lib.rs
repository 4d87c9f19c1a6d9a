//! Touch Stick
//!
//! Turns a touch gesture on a flat surface into a normalized analog-stick
//! vector plus click, double-click and revoke events for a game-controller
//! protocol.

pub mod clock;
pub mod config;
pub mod controller;
pub mod replay;
pub mod stick;

pub use clock::{Clock, ClockedStick, ManualClock, MonotonicClock};
pub use config::{AppConfig, ConfigError, StickConfig, StickLayout, StickSettings};
pub use controller::{ControllerInputContext, ControllerStateSink, StickSide};
pub use stick::{AnalogStick, PointerEvent, StickEvent, StickListener, StickState};
