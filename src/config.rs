use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Settings of a whole analysis run. Every section falls back to its
/// defaults, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub team: TeamConfig,
    pub possession: PossessionConfig,
    pub render: RenderConfig,
    pub stub: StubConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

impl AnalysisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Frames handed to the detector at once.
    pub batch_size: usize,
    pub min_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            min_confidence: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Gate on `1 - IoU` when matching detections to tracks.
    pub max_iou_distance: f32,
    /// Missed frames after which a track is dropped.
    pub max_age: u32,
    /// Consecutive hits before a track is reported.
    pub n_init: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_iou_distance: 0.7,
            max_age: 30,
            n_init: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Frame the team colours are fitted on.
    pub bootstrap_frame: usize,
    pub max_iterations: usize,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            bootstrap_frame: 0,
            max_iterations: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Pixels between a player's feet and the ball centre, inclusive.
    pub max_player_ball_distance: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            max_player_ball_distance: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub panel_alpha: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { panel_alpha: 0.4 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    pub path: Option<PathBuf>,
    /// Reuse the stub at `path` instead of running detection.
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub output_fps: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self { output_fps: 24.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}
