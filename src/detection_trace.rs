// src/detection_trace.rs
//
// Replay source for per-frame hand detections. The external hand-pose model
// runs offline and records its results as JSONL, one line per frame that had
// at least one detection:
//
//   {"frame": 12, "hands": [{"confidence": 0.93, "handedness": "Left",
//    "keypoints": [{"x": 0.0, "y": 0.0}, ...]}]}
//
// Frame numbers are 1-based, matching the video reader's frame counter.
// Frames absent from the trace have no detections.

use crate::types::HandDetection;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
struct TraceRecord {
    frame: u64,
    hands: Vec<HandDetection>,
}

pub struct DetectionTrace {
    frames: HashMap<u64, Vec<HandDetection>>,
}

impl DetectionTrace {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open detection trace: {}", path.display()))?;
        let trace = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded detection trace: {} frame(s) with hands",
            trace.frame_count()
        );
        Ok(trace)
    }

    fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut frames = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(&line)
                .with_context(|| format!("Malformed trace record on line {}", line_no + 1))?;
            frames.insert(record.frame, record.hands);
        }

        Ok(Self { frames })
    }

    pub fn detections_for(&self, frame_index: u64) -> &[HandDetection] {
        self.frames
            .get(&frame_index)
            .map(|hands| hands.as_slice())
            .unwrap_or(&[])
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Trace file sitting next to the video: `<stem><suffix>` in the same dir.
pub fn trace_path(video_path: &Path, suffix: &str) -> PathBuf {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    video_path.with_file_name(format!("{}{}", stem, suffix))
}
