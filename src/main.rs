// src/main.rs

mod canvas;
mod config;
mod detection_trace;
mod geometry;
mod orchestrator;
mod renderer;
mod spline;
mod trail;
mod types;
mod video;

use anyhow::Result;
use detection_trace::DetectionTrace;
use geometry::Point;
use opencv::{core::Mat, prelude::*};
use orchestrator::{FrameOrchestrator, OrchestratorConfig};
use renderer::MatCanvas;
use std::path::Path;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let config = types::Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.clone())
        .init();

    info!("✋ Finger Trail Renderer Starting");
    info!("✓ Configuration loaded");

    info!(
        "Trail settings: max_length={}, debounce={:.0}ms, idle={:.0}ms",
        config.trail.max_length, config.trail.debounce_delay_ms, config.trail.idle_threshold_ms
    );

    let overlay_image = if config.overlay.enabled {
        match renderer::load_overlay_image(&config.overlay.image_path) {
            Ok(image) => {
                info!(
                    "✓ Convergence overlay loaded ({}x{})",
                    image.cols(),
                    image.rows()
                );
                Some(image)
            }
            Err(e) => {
                warn!(
                    "⚠️  Overlay image failed to load: {}. Continuing without it.",
                    e
                );
                None
            }
        }
    } else {
        info!("⚪ Convergence overlay disabled in config");
        None
    };

    let video_processor = video::VideoProcessor::new(config.clone());
    let video_files = video_processor.find_video_files()?;

    if video_files.is_empty() {
        error!("No video files found in {}", config.video.input_dir);
        return Ok(());
    }

    info!("Found {} video file(s) to process", video_files.len());

    for (idx, video_path) in video_files.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            video_files.len(),
            video_path.display()
        );
        info!("========================================\n");

        match process_video(
            video_path,
            &video_processor,
            &config,
            overlay_image.as_ref(),
        ) {
            Ok(stats) => {
                info!("\n✓ Video processed successfully!");
                info!("  Total frames: {}", stats.total_frames);
                info!(
                    "  Frames with hands: {} ({:.1}%)",
                    stats.frames_with_hands,
                    100.0 * stats.frames_with_hands as f64 / stats.total_frames.max(1) as f64
                );
                info!("  Detections routed: {}", stats.detections_routed);
                info!("  ✨ Convergence events: {}", stats.convergence_events);
                info!("  Overlay frames: {}", stats.overlay_frames);
                info!("  Processing Speed: {:.1} FPS", stats.avg_fps);
            }
            Err(e) => {
                error!("Failed to process video: {}", e);
            }
        }
    }

    Ok(())
}

struct ProcessingStats {
    total_frames: u64,
    frames_with_hands: u64,
    detections_routed: u64,
    convergence_events: usize,
    overlay_frames: u64,
    avg_fps: f64,
}

fn process_video(
    video_path: &Path,
    video_processor: &video::VideoProcessor,
    config: &types::Config,
    overlay_image: Option<&Mat>,
) -> Result<ProcessingStats> {
    use std::time::Instant;

    let start_time = Instant::now();

    let mut reader = video_processor.open_video(video_path)?;
    let mut writer =
        video_processor.create_writer(video_path, reader.width, reader.height, reader.fps)?;

    let trace_path = detection_trace::trace_path(video_path, &config.detection.trace_suffix);
    let trace = DetectionTrace::load(&trace_path)?;

    let mut orchestrator = FrameOrchestrator::new(OrchestratorConfig::from_config(config));

    std::fs::create_dir_all(&config.video.output_dir)?;
    let video_name = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let events_path =
        Path::new(&config.video.output_dir).join(format!("{}_convergence.jsonl", video_name));
    let mut events_file = std::fs::File::create(&events_path)?;
    info!("💾 Convergence events will be written to: {}", events_path.display());

    let mut frame_index: u64 = 0;
    let mut frames_with_hands: u64 = 0;
    let mut detections_routed: u64 = 0;
    let mut convergence_events: usize = 0;
    let mut overlay_frames: u64 = 0;
    let mut overlay_was_shown = false;

    while let Some((mut frame, timestamp_ms)) = reader.read_frame()? {
        frame_index += 1;

        let detections = trace.detections_for(frame_index);
        if !detections.is_empty() {
            frames_with_hands += 1;
        }

        let mut frame_canvas = MatCanvas::new(&mut frame, overlay_image);
        let summary =
            orchestrator.process_frame(detections, timestamp_ms, frame_index, &mut frame_canvas);
        frame_canvas.finish()?;

        detections_routed += summary.detections_routed as u64;
        if summary.overlay_shown {
            overlay_frames += 1;
        }

        // Record only the rising edge — the overlay itself is re-evaluated
        // every frame and may flicker at the threshold boundary.
        if summary.overlay_shown && !overlay_was_shown {
            convergence_events += 1;

            if let (Some(left), Some(right), Some(distance)) = (
                orchestrator.left_current(),
                orchestrator.right_current(),
                summary.fingertip_distance,
            ) {
                info!(
                    "✨ Fingertips converged at {:.2}s (distance: {:.1}px)",
                    timestamp_ms / 1000.0,
                    distance
                );
                save_convergence_event(
                    &mut events_file,
                    frame_index,
                    timestamp_ms,
                    left,
                    right,
                    distance,
                )?;
            }
        }
        overlay_was_shown = summary.overlay_shown;

        if frame_index % 50 == 0 {
            info!(
                "Progress: {:.1}% ({}/{}) | Hands routed: {} | Convergences: {}",
                reader.progress(),
                reader.current_frame,
                reader.total_frames,
                detections_routed,
                convergence_events
            );
        }

        if let Some(ref mut w) = writer {
            use opencv::videoio::VideoWriterTrait;
            w.write(&frame)?;
        }
    }

    let duration = start_time.elapsed();
    let avg_fps = frame_index as f64 / duration.as_secs_f64().max(1e-6);

    info!("\n📊 Final Report:");
    info!("  Total frames: {}", frame_index);
    info!("  Frames with hands: {}", frames_with_hands);
    info!("  Detections routed: {}", detections_routed);
    info!("  ✨ Convergence events: {}", convergence_events);
    info!("  Overlay frames: {}", overlay_frames);
    info!("  Processing Speed: {:.1} FPS", avg_fps);

    Ok(ProcessingStats {
        total_frames: frame_index,
        frames_with_hands,
        detections_routed,
        convergence_events,
        overlay_frames,
        avg_fps,
    })
}

fn save_convergence_event(
    file: &mut std::fs::File,
    frame_index: u64,
    timestamp_ms: f64,
    left: Point,
    right: Point,
    distance: f32,
) -> Result<()> {
    use std::io::Write;

    let json_value = serde_json::json!({
        "type": "fingertip_convergence",
        "frame": frame_index,
        "timestamp_ms": timestamp_ms,
        "left": { "x": left.x, "y": left.y },
        "right": { "x": right.x, "y": right.y },
        "distance": distance,
    });

    let json_line = serde_json::to_string(&json_value)?;
    writeln!(file, "{}", json_line)?;
    file.flush()?;
    Ok(())
}
