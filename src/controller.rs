//! Controller-state sink
//!
//! Translates stick events into the state a game-controller packet is built
//! from: signed 16-bit stick axes and a button bitfield. Packing and sending
//! the packet is left to the caller; the sink bumps
//! [`ControllerInputContext::revision`] every time the state should be sent.

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::stick::StickListener;

/// Left stick click (L3)
pub const LS_CLK_FLAG: u32 = 0x0040;

/// Right stick click (R3)
pub const RS_CLK_FLAG: u32 = 0x0080;

/// Full-scale axis value
pub const AXIS_MAX: f64 = 0x7FFE as f64;

/// Which physical stick a virtual stick drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StickSide {
    #[default]
    Left,
    Right,
}

impl StickSide {
    /// Button flag pressed by this stick
    pub fn click_flag(self) -> u32 {
        match self {
            StickSide::Left => LS_CLK_FLAG,
            StickSide::Right => RS_CLK_FLAG,
        }
    }
}

/// Controller state shared by every element of one virtual controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ControllerInputContext {
    pub button_flags: u32,
    pub left_stick_x: i16,
    pub left_stick_y: i16,
    pub right_stick_x: i16,
    pub right_stick_y: i16,
    /// Incremented on every send request
    pub revision: u64,
}

/// Shared handle to a controller context
pub type SharedContext = Arc<Mutex<ControllerInputContext>>;

/// Convert a normalized axis value to a protocol axis value
pub fn to_axis(value: f64) -> i16 {
    (value.clamp(-1.0, 1.0) * AXIS_MAX) as i16
}

/// Listener that writes one stick's events into a controller context
#[derive(Debug, Clone)]
pub struct ControllerStateSink {
    side: StickSide,
    separate_l3r3: bool,
    context: SharedContext,
}

impl ControllerStateSink {
    /// # Arguments
    /// * `side` - Stick this sink writes
    /// * `separate_l3r3` - Stick clicks are mapped to dedicated buttons elsewhere,
    ///   so a double click leaves the button flags alone
    /// * `context` - Context shared with the other controller elements
    pub fn new(side: StickSide, separate_l3r3: bool, context: SharedContext) -> Self {
        Self {
            side,
            separate_l3r3,
            context,
        }
    }

    fn send(context: &mut ControllerInputContext) {
        context.revision += 1;
        trace!("controller context ready to send: {:?}", context);
    }
}

impl StickListener for ControllerStateSink {
    fn on_movement(&mut self, x: f64, y: f64) -> Result<()> {
        let mut context = self.context.lock();
        match self.side {
            StickSide::Left => {
                context.left_stick_x = to_axis(x);
                context.left_stick_y = to_axis(y);
            },
            StickSide::Right => {
                context.right_stick_x = to_axis(x);
                context.right_stick_y = to_axis(y);
            },
        }
        Self::send(&mut context);
        Ok(())
    }

    fn on_double_click(&mut self) -> Result<()> {
        if self.separate_l3r3 {
            return Ok(());
        }
        let mut context = self.context.lock();
        context.button_flags |= self.side.click_flag();
        Self::send(&mut context);
        Ok(())
    }

    fn on_revoke(&mut self) -> Result<()> {
        let mut context = self.context.lock();
        context.button_flags &= !self.side.click_flag();
        Self::send(&mut context);
        Ok(())
    }
}
