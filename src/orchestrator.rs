// src/orchestrator.rs
//
// Bridges per-frame hand detections to the two Trail instances and evaluates
// the proximity-triggered convergence overlay.

use crate::canvas::Canvas;
use crate::geometry::Point;
use crate::trail::{Trail, TrailConfig};
use crate::types::{Config, HandDetection};
use tracing::debug;

/// Keypoint index of the index fingertip in the hand-pose layout.
const INDEX_FINGERTIP: usize = 8;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Detections below this confidence are discarded.
    pub min_confidence: f32,
    /// Fingertip distance (input units) below which the overlay shows.
    pub proximity_threshold: f32,
    pub left_trail: TrailConfig,
    pub right_trail: TrailConfig,
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        let trail = |color: [u8; 3]| TrailConfig {
            max_length: config.trail.max_length,
            color,
            debounce_delay_ms: config.trail.debounce_delay_ms,
            idle_threshold_ms: config.trail.idle_threshold_ms,
        };

        Self {
            min_confidence: config.detection.min_confidence,
            proximity_threshold: config.overlay.proximity_threshold,
            left_trail: trail(config.trail.left_color),
            right_trail: trail(config.trail.right_color),
        }
    }
}

/// What happened during one frame, for stats and event logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSummary {
    pub detections_routed: usize,
    pub overlay_shown: bool,
    pub fingertip_distance: Option<f32>,
}

pub struct FrameOrchestrator {
    left: Trail,
    right: Trail,
    min_confidence: f32,
    proximity_threshold: f32,
}

impl FrameOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            left: Trail::new(config.left_trail),
            right: Trail::new(config.right_trail),
            min_confidence: config.min_confidence,
            proximity_threshold: config.proximity_threshold,
        }
    }

    /// Run one frame: route detections, render both trails, check proximity.
    pub fn process_frame(
        &mut self,
        detections: &[HandDetection],
        now_ms: f64,
        frame_index: u64,
        canvas: &mut dyn Canvas,
    ) -> FrameSummary {
        let mut routed = 0;

        for detection in detections {
            if detection.confidence < self.min_confidence {
                debug!(
                    "Skipping low-confidence detection ({:.3} < {:.3})",
                    detection.confidence, self.min_confidence
                );
                continue;
            }

            let fingertip = match detection.keypoints.get(INDEX_FINGERTIP) {
                Some(p) => *p,
                None => continue,
            };

            // "Left" routes to the left trail; any other label falls back to
            // the right trail, including unrecognized handedness strings.
            if detection.handedness == "Left" {
                self.left.update(fingertip, now_ms);
            } else {
                self.right.update(fingertip, now_ms);
            }
            routed += 1;
        }

        // Both trails render every frame, updated or not — this is what keeps
        // idle decay running when a hand leaves the feed.
        self.left.render(now_ms, frame_index, canvas);
        self.right.render(now_ms, frame_index, canvas);

        let mut summary = FrameSummary {
            detections_routed: routed,
            ..Default::default()
        };

        // Re-evaluated independently every frame; no hysteresis, so the
        // overlay may flicker right at the threshold boundary.
        if let (Some(left), Some(right)) = (self.left.current(), self.right.current()) {
            let distance = left.distance(right);
            summary.fingertip_distance = Some(distance);

            if distance < self.proximity_threshold {
                canvas.draw_centered_overlay();
                summary.overlay_shown = true;
            }
        }

        summary
    }

    pub fn left_current(&self) -> Option<Point> {
        self.left.current()
    }

    pub fn right_current(&self) -> Option<Point> {
        self.right.current()
    }
}
