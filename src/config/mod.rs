//! Configuration management for the touch stick
//!
//! Two layers:
//! - [`StickSettings`]: the user-facing options (deadzone percentage, click and
//!   deadzone timings), loaded from YAML.
//! - [`StickConfig`]: the immutable construction-time configuration of one
//!   stick, with radii in surface units.
//!
//! [`AppConfig`] is the YAML file read by the replay CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::controller::StickSide;

/// Largest deadzone, as a fraction of travel, reachable at 100%
pub const MAX_DEADZONE_FRACTION: f64 = 0.75;

/// Handle radius as a fraction of the element's half size
pub const STICK_RADIUS_FRACTION: f64 = 0.20;

/// Invalid stick configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("outer radius must be positive, got {0}")]
    NonPositiveOuterRadius(f64),

    #[error("stick radius must not be negative, got {0}")]
    NegativeStickRadius(f64),

    #[error("stick radius {stick} must be smaller than outer radius {outer}")]
    NoTravel { outer: f64, stick: f64 },

    #[error("deadzone percentage must be 0-100, got {0}")]
    DeadzonePercentage(u8),
}

/// User-configurable stick options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StickSettings {
    /// Deadzone size, 0-100, mapped linearly to 0-75% of travel
    #[serde(default = "default_deadzone_percentage")]
    pub deadzone_percentage: u8,

    /// Maximum gap between two presses that counts as a double click
    #[serde(default = "default_double_click_window")]
    pub double_click_window_ms: u64,

    /// How long a press is held before the deadzone is lifted
    #[serde(default = "default_deadzone_release")]
    pub deadzone_release_ms: u64,
}

impl Default for StickSettings {
    fn default() -> Self {
        Self {
            deadzone_percentage: default_deadzone_percentage(),
            double_click_window_ms: default_double_click_window(),
            deadzone_release_ms: default_deadzone_release(),
        }
    }
}

impl StickSettings {
    /// Deadzone as a fraction of travel, in `[0.0, 0.75]`
    pub fn deadzone_fraction(&self) -> f64 {
        let percentage = f64::from(self.deadzone_percentage.min(100));
        MAX_DEADZONE_FRACTION * percentage / 100.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadzone_percentage > 100 {
            return Err(ConfigError::DeadzonePercentage(self.deadzone_percentage));
        }
        Ok(())
    }
}

/// On-screen size of the stick element
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StickLayout {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for StickLayout {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            stroke_width: default_stroke_width(),
        }
    }
}

impl StickLayout {
    /// Half of the element's smaller side
    fn half_size(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    /// Travel boundary: the half size minus room for the ring stroke
    pub fn outer_radius(&self) -> f64 {
        self.half_size() - 2.0 * self.stroke_width
    }

    pub fn stick_radius(&self) -> f64 {
        self.half_size() * STICK_RADIUS_FRACTION
    }
}

/// Immutable configuration of one stick.
///
/// Only built through [`StickConfig::new`] or [`StickConfig::from_layout`], so
/// every instance has positive travel and a deadzone within range.
#[derive(Debug, Clone, PartialEq)]
pub struct StickConfig {
    outer_radius: f64,
    stick_radius: f64,
    deadzone_fraction: f64,
    double_click_window_ms: u64,
    deadzone_release_ms: u64,
}

impl StickConfig {
    /// Build and validate a configuration from radii and user settings
    pub fn new(
        outer_radius: f64,
        stick_radius: f64,
        settings: &StickSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        for (name, value) in [("outer radius", outer_radius), ("stick radius", stick_radius)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        if outer_radius <= 0.0 {
            return Err(ConfigError::NonPositiveOuterRadius(outer_radius));
        }
        if stick_radius < 0.0 {
            return Err(ConfigError::NegativeStickRadius(stick_radius));
        }
        if stick_radius >= outer_radius {
            return Err(ConfigError::NoTravel {
                outer: outer_radius,
                stick: stick_radius,
            });
        }

        Ok(Self {
            outer_radius,
            stick_radius,
            deadzone_fraction: settings.deadzone_fraction(),
            double_click_window_ms: settings.double_click_window_ms,
            deadzone_release_ms: settings.deadzone_release_ms,
        })
    }

    /// Derive radii from the element size
    pub fn from_layout(layout: &StickLayout, settings: &StickSettings) -> Result<Self, ConfigError> {
        Self::new(layout.outer_radius(), layout.stick_radius(), settings)
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn stick_radius(&self) -> f64 {
        self.stick_radius
    }

    /// Deadzone as a fraction of travel
    pub fn deadzone_fraction(&self) -> f64 {
        self.deadzone_fraction
    }

    pub fn double_click_window_ms(&self) -> u64 {
        self.double_click_window_ms
    }

    pub fn deadzone_release_ms(&self) -> u64 {
        self.deadzone_release_ms
    }

    /// Usable travel before the handle would overlap the boundary ring
    pub fn travel(&self) -> f64 {
        self.outer_radius - self.stick_radius
    }

    pub fn deadzone_radius(&self) -> f64 {
        self.deadzone_fraction * self.travel()
    }
}

/// Replay CLI configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stick: StickSettings,
    #[serde(default)]
    pub layout: StickLayout,
    #[serde(default)]
    pub side: StickSide,
    /// L3/R3 are separate buttons, so a double click does not press the stick button
    #[serde(default)]
    pub separate_l3r3: bool,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.layout.width <= 0.0 || self.layout.height <= 0.0 {
            anyhow::bail!(
                "Layout size {}x{} must be positive",
                self.layout.width,
                self.layout.height
            );
        }
        if self.layout.stroke_width < 0.0 {
            anyhow::bail!("Layout stroke_width cannot be negative");
        }

        self.stick_config().context("Invalid stick configuration")?;

        Ok(())
    }

    /// Stick configuration derived from layout and settings
    pub fn stick_config(&self) -> Result<StickConfig, ConfigError> {
        StickConfig::from_layout(&self.layout, &self.stick)
    }
}

// Default value functions
fn default_deadzone_percentage() -> u8 { 30 }
fn default_double_click_window() -> u64 { 350 }
fn default_deadzone_release() -> u64 { 150 }
fn default_stroke_width() -> f64 { 3.0 }
