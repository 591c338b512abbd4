use crate::geometry::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub trail: TrailSettings,
    pub detection: DetectionSettings,
    pub overlay: OverlaySettings,
    pub video: VideoSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailSettings {
    pub max_length: usize,
    pub debounce_delay_ms: f64,
    pub idle_threshold_ms: f64,
    pub left_color: [u8; 3],
    pub right_color: [u8; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub min_confidence: f32,
    pub trace_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    pub enabled: bool,
    pub image_path: String,
    pub proximity_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    pub input_dir: String,
    pub output_dir: String,
    pub save_annotated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

/// One hand reported by the external hand-pose detector for a frame.
///
/// Only `confidence`, `handedness` and the index-fingertip keypoint are read;
/// the rest of the keypoint layout is opaque to this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandDetection {
    pub confidence: f32,
    pub handedness: String,
    pub keypoints: Vec<Point>,
}
