// src/trail.rs
//
// Stateful filter + bounded history buffer tracking one hand's smoothed
// fingertip position over time.
//
// Each Trail runs three temporal stages:
//   1. Smoothing — every raw point moves `current` 30% of the remaining
//      distance toward it (exponential moving average, never overshoots).
//   2. Debounced sampling — `current` is recorded into `history` at most
//      once per `debounce_delay_ms`, bounded by `max_length`.
//   3. Idle decay — once no point has been recorded for `idle_threshold_ms`,
//      one history point is dropped every 5 rendered frames. The decay step
//      is count-based on render cadence, not wall-clock time; converting it
//      to time-proportional decay would change the visible fade rate.

use crate::canvas::{Canvas, StrokeStyle};
use crate::geometry::Point;
use crate::spline;
use std::collections::VecDeque;

/// Weight toward the new raw point on every update.
const SMOOTHING_FACTOR: f32 = 0.3;

/// Trail stroke width in input coordinate units.
const STROKE_WIDTH: f32 = 4.0;

/// While idle, one history point is dropped every this many rendered frames.
const DECAY_FRAME_INTERVAL: u64 = 5;

#[derive(Debug, Clone)]
pub struct TrailConfig {
    /// Maximum number of recorded points (> 0).
    pub max_length: usize,
    /// Stroke color (RGB), render-only.
    pub color: [u8; 3],
    /// Minimum interval between recorded points, in milliseconds.
    pub debounce_delay_ms: f64,
    /// Idle time after which the trail starts to fade, in milliseconds.
    pub idle_threshold_ms: f64,
}

pub struct Trail {
    history: VecDeque<Point>,
    current: Option<Point>,
    last_recorded_ms: f64,
    config: TrailConfig,
}

impl Trail {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.max_length),
            current: None,
            // The first update must always record, regardless of its timestamp.
            last_recorded_ms: f64::NEG_INFINITY,
            config,
        }
    }

    /// Live smoothed point; `None` until the first update.
    pub fn current(&self) -> Option<Point> {
        self.current
    }

    #[allow(dead_code)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feed a raw detected point at time `now_ms`.
    ///
    /// Always smooths `current`; records into `history` only when the
    /// debounce interval since the previous recording has elapsed.
    pub fn update(&mut self, raw: Point, now_ms: f64) {
        let smoothed = match self.current {
            None => raw,
            Some(cur) => cur.lerp(raw, SMOOTHING_FACTOR),
        };
        self.current = Some(smoothed);

        if now_ms - self.last_recorded_ms >= self.config.debounce_delay_ms {
            self.history.push_back(smoothed);
            self.last_recorded_ms = now_ms;

            while self.history.len() > self.config.max_length {
                self.history.pop_front();
            }
        }
    }

    /// Render the trail for this frame and apply idle decay.
    ///
    /// `frame_index` is the host's per-frame counter, used only modulo 5 to
    /// pace the decay.
    pub fn render(&mut self, now_ms: f64, frame_index: u64, canvas: &mut dyn Canvas) {
        if !self.history.is_empty()
            && now_ms - self.last_recorded_ms > self.config.idle_threshold_ms
            && frame_index % DECAY_FRAME_INTERVAL == 0
        {
            self.history.pop_front();
        }

        if self.history.len() < 2 {
            return;
        }

        let style = StrokeStyle {
            color: self.config.color,
            width: STROKE_WIDTH,
        };

        if self.history.len() == 2 {
            canvas.stroke_line(self.history[0], self.history[1], style);
            return;
        }

        let points: Vec<Point> = self.history.iter().copied().collect();
        for segment in spline::catmull_rom_segments(&points) {
            canvas.stroke_bezier(segment, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::test_support::RecordingCanvas;

    fn config(max_length: usize) -> TrailConfig {
        TrailConfig {
            max_length,
            color: [0, 255, 0],
            debounce_delay_ms: 100.0,
            idle_threshold_ms: 3000.0,
        }
    }

    fn pt(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_first_update_initializes_current_and_records() {
        let mut trail = Trail::new(config(10));
        assert!(trail.current().is_none());

        trail.update(pt(50.0, 60.0), 0.0);
        assert_eq!(trail.current(), Some(pt(50.0, 60.0)));
        assert_eq!(trail.history_len(), 1);
    }

    #[test]
    fn test_history_never_exceeds_max_length() {
        let mut trail = Trail::new(config(5));
        for i in 0..50 {
            trail.update(pt(i as f32, 0.0), i as f64 * 200.0);
            assert!(trail.history_len() <= 5);
        }
        assert_eq!(trail.history_len(), 5);
    }

    #[test]
    fn test_debounce_records_once_per_window() {
        let mut trail = Trail::new(config(10));

        // All updates land inside one debounce window: only the first records.
        for t in [0.0, 20.0, 40.0, 60.0, 80.0, 99.0] {
            trail.update(pt(1.0, 1.0), t);
        }
        assert_eq!(trail.history_len(), 1);

        trail.update(pt(1.0, 1.0), 100.0);
        assert_eq!(trail.history_len(), 2);
    }

    #[test]
    fn test_smoothing_converges_geometrically() {
        let mut trail = Trail::new(config(10));
        let target = pt(100.0, 0.0);

        trail.update(pt(0.0, 0.0), 0.0);
        let mut prev_distance = trail.current().unwrap().distance(target);

        for i in 1..20 {
            trail.update(target, i as f64 * 10.0);
            let distance = trail.current().unwrap().distance(target);
            // Shrinks by exactly (1 - 0.3) per call, never overshoots.
            assert!((distance - prev_distance * 0.7).abs() < 1e-3);
            assert!(trail.current().unwrap().x <= target.x);
            prev_distance = distance;
        }
    }

    #[test]
    fn test_idle_decay_removes_one_point_per_five_frames() {
        let mut trail = Trail::new(config(10));
        for i in 0..6 {
            trail.update(pt(i as f32 * 10.0, 0.0), i as f64 * 150.0);
        }
        assert_eq!(trail.history_len(), 6);

        // Well past the idle threshold; frame counter keeps incrementing.
        let idle_now = 10_000.0;
        let mut canvas = RecordingCanvas::new();
        let mut expected = 6;
        for frame_index in 1..=30u64 {
            trail.render(idle_now, frame_index, &mut canvas);
            if frame_index % 5 == 0 {
                expected -= 1;
            }
            assert_eq!(trail.history_len(), expected.max(0) as usize);
        }
        assert_eq!(trail.history_len(), 0);
    }

    #[test]
    fn test_no_decay_before_idle_threshold() {
        let mut trail = Trail::new(config(10));
        for i in 0..4 {
            trail.update(pt(i as f32, 0.0), i as f64 * 150.0);
        }

        let mut canvas = RecordingCanvas::new();
        // Last recording at t=450; threshold not yet crossed at t=3450.
        trail.render(3450.0, 5, &mut canvas);
        assert_eq!(trail.history_len(), 4);

        trail.render(3451.0, 10, &mut canvas);
        assert_eq!(trail.history_len(), 3);
    }

    #[test]
    fn test_render_draw_call_shapes() {
        // 0 and 1 points: nothing drawn.
        let mut trail = Trail::new(config(10));
        let mut canvas = RecordingCanvas::new();
        trail.render(0.0, 1, &mut canvas);
        assert!(canvas.calls.is_empty());

        trail.update(pt(0.0, 0.0), 0.0);
        trail.render(0.0, 1, &mut canvas);
        assert!(canvas.calls.is_empty());

        // Exactly 2 points: a single straight segment.
        trail.update(pt(10.0, 0.0), 150.0);
        trail.render(150.0, 2, &mut canvas);
        assert_eq!(canvas.line_count(), 1);
        assert_eq!(canvas.bezier_count(), 0);

        // n >= 3 points: n - 1 curve segments.
        let mut canvas = RecordingCanvas::new();
        for i in 2..5 {
            trail.update(pt(i as f32 * 10.0, 0.0), i as f64 * 150.0);
        }
        trail.render(600.0, 3, &mut canvas);
        assert_eq!(canvas.bezier_count(), trail.history_len() - 1);
        assert_eq!(canvas.line_count(), 0);
    }

    #[test]
    fn test_debounce_and_eviction_scenario() {
        // Three recorded points maximum, 100ms debounce.
        let mut trail = Trail::new(config(3));

        trail.update(pt(0.0, 0.0), 0.0);
        assert_eq!(trail.current(), Some(pt(0.0, 0.0)));
        assert_eq!(trail.history_len(), 1);

        // 50ms later: smoothed 30% toward the new point, but no recording.
        trail.update(pt(10.0, 0.0), 50.0);
        assert_eq!(trail.current(), Some(pt(3.0, 0.0)));
        assert_eq!(trail.history_len(), 1);

        // 150ms: debounce elapsed, the smoothed point is recorded.
        trail.update(pt(10.0, 0.0), 150.0);
        assert_eq!(trail.history_len(), 2);

        // Past 3 recordings the oldest entry is evicted.
        trail.update(pt(10.0, 0.0), 300.0);
        trail.update(pt(10.0, 0.0), 450.0);
        trail.update(pt(10.0, 0.0), 600.0);
        assert_eq!(trail.history_len(), 3);
    }

    #[test]
    fn test_decay_only_on_fifth_frames() {
        let mut trail = Trail::new(config(10));
        for i in 0..3 {
            trail.update(pt(i as f32, 0.0), i as f64 * 150.0);
        }

        let mut canvas = RecordingCanvas::new();
        trail.render(10_000.0, 7, &mut canvas);
        trail.render(10_000.0, 8, &mut canvas);
        trail.render(10_000.0, 9, &mut canvas);
        assert_eq!(trail.history_len(), 3);

        trail.render(10_000.0, 10, &mut canvas);
        assert_eq!(trail.history_len(), 2);
    }
}
