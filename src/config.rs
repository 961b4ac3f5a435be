//! YAML-backed run configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, WatchError};
use crate::geometry::{Anchor, Point, Zone};
use crate::tracker::{
    DEFAULT_FPS_FALLBACK, DisplacementReference, FrameRate, RegistryConfig,
};
use crate::zone::ZoneClassifier;

/// What to do with a frame in which the tracker reported the same identity twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Surface the error to the caller
    #[default]
    Abort,
    /// Log the frame and continue with the next one
    SkipFrame,
}

fn default_fps_fallback() -> Option<f64> {
    Some(DEFAULT_FPS_FALLBACK)
}

fn default_zone_anchor() -> Anchor {
    Anchor::BottomCenter
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Max distance in pixels an object may move and still count as stationary
    pub stationary_threshold_distance: f32,
    /// Seconds an object must stay put before a stationary alert fires
    pub time_threshold_seconds: f64,
    /// Frames to wait before forgetting an object that disappeared
    pub frames_to_disappear: u32,
    /// Frame rate as reported by the video source; may be zero
    pub frames_per_second: f64,
    /// Rate used when `frames_per_second` is unusable; `null` disables the fallback
    #[serde(default = "default_fps_fallback")]
    pub fps_fallback: Option<f64>,
    /// Category ids forwarded to the detector, e.g. COCO 24 backpack, 26 handbag, 28 suitcase
    pub classes_to_track: Vec<u32>,
    #[serde(default)]
    pub displacement_reference: DisplacementReference,
    #[serde(default)]
    pub zone: Option<Vec<[f32; 2]>>,
    #[serde(default = "default_zone_anchor")]
    pub zone_anchor: Anchor,
    #[serde(default)]
    pub snap_to_pixel_grid: bool,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

impl WatchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: WatchConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        info!(
            distance = config.stationary_threshold_distance,
            seconds = config.time_threshold_seconds,
            frames_to_disappear = config.frames_to_disappear,
            zone = config.zone.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Check every numeric parameter and the zone before any frame is processed.
    pub fn validate(&self) -> Result<()> {
        let seconds = self.time_threshold_seconds;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(WatchError::InvalidConfiguration(format!(
                "time_threshold_seconds must be positive, got {seconds}"
            )));
        }
        let distance = self.stationary_threshold_distance;
        if !distance.is_finite() || distance <= 0.0 {
            return Err(WatchError::InvalidConfiguration(format!(
                "stationary_threshold_distance must be positive, got {distance}"
            )));
        }
        self.frame_rate().effective()?;
        self.zone_classifier()?;
        Ok(())
    }

    pub fn frame_rate(&self) -> FrameRate {
        FrameRate {
            reported: self.frames_per_second,
            fallback: self.fps_fallback,
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(
            self.stationary_threshold_distance,
            self.frames_to_disappear,
            self.frame_rate(),
        )
        .with_displacement_reference(self.displacement_reference)
    }

    pub fn zone(&self) -> Result<Option<Zone>> {
        self.zone
            .as_ref()
            .map(|points| {
                let points: Vec<Point> = points.iter().map(|&[x, y]| Point::new(x, y)).collect();
                Zone::new(&points)
            })
            .transpose()
    }

    pub fn zone_classifier(&self) -> Result<Option<ZoneClassifier>> {
        Ok(self
            .zone()?
            .map(|zone| {
                ZoneClassifier::with_anchor(zone, self.zone_anchor)
                    .with_snap_to_pixel(self.snap_to_pixel_grid)
            }))
    }
}
