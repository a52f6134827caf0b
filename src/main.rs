// src/main.rs

mod config;
mod dispatch;
mod engine;
mod replay;
mod smoother;
mod types;

use anyhow::Result;
use dispatch::{AlertSink, AudioDispatcher, NullSink, SimulatedAudioBackend};
use engine::AttentionEngine;
use replay::ReplaySource;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use types::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("driver_monitor={}", config.logging.level))
        .init();

    info!("🚗 Driver Attention Monitor Starting");
    info!("✓ Configuration loaded");
    info!(
        "Thresholds: ear={:.2}, drowsy={:.2}, consec_frames={}, warn={}s, alarm={}s",
        config.thresholds.eye_ar_thresh,
        config.thresholds.drowsy_ar_thresh,
        config.thresholds.consec_frames,
        config.escalation.warn_thresh_s,
        config.escalation.alarm_thresh_s
    );

    let sink: Arc<dyn AlertSink> = match SimulatedAudioBackend::initialize(&config.audio) {
        Some(backend) => {
            info!("✓ Audio dispatcher ready");
            Arc::new(AudioDispatcher::new(Arc::new(backend)))
        }
        None => {
            warn!("⚠️  Audio unavailable, alerts will be logged only");
            Arc::new(NullSink)
        }
    };

    let source = ReplaySource::new(config.replay.clone());
    let session_logs = source.find_session_logs()?;

    if session_logs.is_empty() {
        error!("No session logs found in {}", config.replay.input_dir);
        return Ok(());
    }

    info!("Found {} session(s) to replay", session_logs.len());

    for (idx, log_path) in session_logs.iter().enumerate() {
        info!("========================================");
        info!(
            "Replaying session {}/{}: {}",
            idx + 1,
            session_logs.len(),
            log_path.display()
        );

        match process_session(log_path, &source, &config, sink.clone()) {
            Ok(summary) => {
                info!("✓ Session replayed");
                info!("  Total frames:     {}", summary.total_frames);
                info!("  Duration:         {:.1}s", summary.session_seconds);
                info!("  Distraction ticks: {}", summary.distraction_tick_count);
                info!("  Warnings:         {}", summary.warning_count);
                info!("  Alarms:           {}", summary.alarm_count);
                info!(
                    "  Distraction rate: {:.1}/min",
                    summary.distractions_per_minute
                );
                info!("  Final state:      {}", summary.final_state);

                if config.replay.save_report {
                    if let Err(e) = save_report(&summary, &config.replay.output_dir) {
                        warn!("Failed to save session report: {:#}", e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to replay session: {:#}", e);
            }
        }
    }

    // Let in-flight playback finish before the runtime shuts down.
    tokio::time::sleep(Duration::from_millis(
        config.audio.speech_duration_ms.max(config.audio.tone_duration_ms),
    ))
    .await;

    Ok(())
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    source: String,
    total_frames: u64,
    session_seconds: f64,
    distraction_tick_count: u64,
    warning_count: u64,
    alarm_count: u64,
    distractions_per_minute: f64,
    final_state: &'static str,
}

fn process_session(
    log_path: &Path,
    source: &ReplaySource,
    config: &Config,
    sink: Arc<dyn AlertSink>,
) -> Result<SessionSummary> {
    let mut reader = source.open_session(log_path)?;
    let mut engine = AttentionEngine::new(config, sink);

    let mut frame_count: u64 = 0;
    let mut last_timestamp: f64 = 0.0;

    while let Some(record) = reader.read_record()? {
        last_timestamp = record.timestamp;

        if record.reset {
            engine.request_reset(record.timestamp);
            continue;
        }

        let sample = record.to_sample(
            config.replay.frame_width,
            config.thresholds.center_tolerance_fraction,
        );
        let state = engine.observe(&sample, record.timestamp);
        frame_count += 1;

        if frame_count % 300 == 0 {
            debug!(
                "Frame {}: state={} ear={} inattentive={}s",
                frame_count,
                state.as_str(),
                engine
                    .smoothed_ear()
                    .map(|e| format!("{:.3}", e))
                    .unwrap_or_else(|| "-".to_string()),
                engine.inattentive_seconds()
            );
        }
    }

    let snapshot = engine.stats(last_timestamp);

    Ok(SessionSummary {
        source: log_path.to_string_lossy().to_string(),
        total_frames: frame_count,
        session_seconds: snapshot.session_seconds,
        distraction_tick_count: snapshot.distraction_tick_count,
        warning_count: snapshot.warning_count,
        alarm_count: snapshot.alarm_count,
        distractions_per_minute: snapshot.distractions_per_minute,
        final_state: engine.current_state().as_str(),
    })
}

fn save_report(summary: &SessionSummary, output_dir: &str) -> Result<()> {
    use std::io::Write;

    std::fs::create_dir_all(output_dir)?;

    let stem = Path::new(&summary.source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    let report_path = Path::new(output_dir).join(format!("{}_report.jsonl", stem));

    let mut file = std::fs::File::create(&report_path)?;
    writeln!(file, "{}", serde_json::to_string(summary)?)?;
    info!("💾 Session report saved to {}", report_path.display());
    Ok(())
}
