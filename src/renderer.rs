// src/renderer.rs

use crate::canvas::{Canvas, StrokeStyle};
use crate::geometry::Point;
use crate::spline::BezierSegment;
use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Rect, Scalar},
    imgcodecs, imgproc,
    prelude::*,
};

/// Straight pieces each Bézier segment is flattened into for drawing.
const BEZIER_STEPS: usize = 12;

/// Canvas backed by an OpenCV frame Mat (BGR).
///
/// Draw failures are collected rather than propagated — the trail pipeline is
/// total, so errors surface once per frame via `finish`.
pub struct MatCanvas<'a> {
    frame: &'a mut Mat,
    overlay: Option<&'a Mat>,
    error: Option<opencv::Error>,
}

impl<'a> MatCanvas<'a> {
    pub fn new(frame: &'a mut Mat, overlay: Option<&'a Mat>) -> Self {
        Self {
            frame,
            overlay,
            error: None,
        }
    }

    /// Surface the first draw error recorded during this frame, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e).context("Frame draw failed"),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: opencv::Result<()>) {
        if self.error.is_none() {
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
    }

    fn draw_segment(&mut self, p1: Point, p2: Point, style: StrokeStyle) {
        let result = imgproc::line(
            self.frame,
            core::Point::new(p1.x as i32, p1.y as i32),
            core::Point::new(p2.x as i32, p2.y as i32),
            scalar_bgr(style.color),
            style.width as i32,
            imgproc::LINE_AA,
            0,
        );
        self.record(result);
    }
}

impl Canvas for MatCanvas<'_> {
    fn stroke_line(&mut self, p1: Point, p2: Point, style: StrokeStyle) {
        self.draw_segment(p1, p2, style);
    }

    fn stroke_bezier(&mut self, segment: BezierSegment, style: StrokeStyle) {
        // OpenCV has no cubic primitive; approximate with short AA segments.
        let mut prev = segment.eval(0.0);
        for step in 1..=BEZIER_STEPS {
            let t = step as f32 / BEZIER_STEPS as f32;
            let next = segment.eval(t);
            self.draw_segment(prev, next, style);
            prev = next;
        }
    }

    fn draw_centered_overlay(&mut self) {
        let overlay = match self.overlay {
            Some(o) => o,
            None => return,
        };
        let result = blit_centered(self.frame, overlay);
        self.record(result);
    }
}

fn scalar_bgr(color: [u8; 3]) -> Scalar {
    Scalar::new(color[2] as f64, color[1] as f64, color[0] as f64, 0.0)
}

fn blit_centered(frame: &mut Mat, overlay: &Mat) -> opencv::Result<()> {
    let x = (frame.cols() - overlay.cols()) / 2;
    let y = (frame.rows() - overlay.rows()) / 2;

    // Overlay larger than the frame: nothing sensible to draw.
    if x < 0 || y < 0 {
        return Ok(());
    }

    let roi = Rect::new(x, y, overlay.cols(), overlay.rows());
    let mut target = Mat::roi_mut(frame, roi)?;
    overlay.copy_to(&mut *target)?;
    Ok(())
}

pub fn load_overlay_image(path: &str) -> Result<Mat> {
    let image = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)
        .with_context(|| format!("Failed to read overlay image: {}", path))?;
    if image.empty() {
        anyhow::bail!("Overlay image could not be decoded: {}", path);
    }
    Ok(image)
}
