//! Scripted pointer-event replay
//!
//! A script is a YAML file with a list of pointer events:
//!
//! ```yaml
//! events:
//!   - { action: press, pointer: 0, x: 150.0, y: 150.0, at_ms: 0 }
//!   - { action: move, pointer: 0, x: 190.0, y: 150.0, at_ms: 40 }
//!   - { action: release, pointer: 0 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::stick::{AnalogStick, PointerEvent};

/// Pointer events to feed into a stick
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplayScript {
    pub events: Vec<PointerEvent>,
}

/// Outcome of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events the stick consumed
    pub consumed: usize,
    /// Events from non-owning pointers or without a session
    pub ignored: usize,
}

impl ReplayScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse replay script: {}", path.display()))
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        let script: ReplayScript = serde_yaml::from_str(yaml)?;
        script.validate()?;
        Ok(script)
    }

    /// Timestamps must not run backwards
    pub fn validate(&self) -> Result<()> {
        let mut last = 0;
        for (index, event) in self.events.iter().enumerate() {
            if let Some(at) = event.timestamp_ms() {
                if at < last {
                    anyhow::bail!(
                        "Event {} at {} ms is earlier than the previous event at {} ms",
                        index,
                        at,
                        last
                    );
                }
                last = at;
            }
        }
        Ok(())
    }

    /// Feed every event into the stick, in order
    pub fn run(&self, stick: &mut AnalogStick) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for event in &self.events {
            if stick.handle(event) {
                summary.consumed += 1;
            } else {
                debug!("Replay event ignored: {:?}", event);
                summary.ignored += 1;
            }
        }
        summary
    }
}
