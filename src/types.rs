// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub escalation: EscalationConfig,
    pub audio: AudioConfig,
    pub replay: ReplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub eye_ar_thresh: f32,
    pub drowsy_ar_thresh: f32,
    pub consec_frames: u32,
    pub center_tolerance_fraction: f32,
    pub smoothing_window_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    pub warn_thresh_s: u32,
    pub alarm_thresh_s: u32,
    pub cooldown_s: f64,
    pub tick_interval_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub enabled: bool,
    pub speech_duration_ms: u64,
    pub tone_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub frame_width: f32,
    pub save_report: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Normalized per-frame observation handed to the engine by the detector
/// side. Immutable, consumed exactly once.
#[derive(Debug, Clone, Copy)]
pub struct SignalSample {
    pub timestamp: f64,
    pub face_detected: bool,
    pub face_centered: bool,
    pub eyes_detected: u8,
    pub eye_openness: Option<f32>,
}

/// Single source of truth for the driver's attention status. Exactly one
/// value is active per frame; transitions are debounced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttentionState {
    NoFace,
    EyesClosed,
    Drowsy,
    Distracted,
    Focused,
}

impl AttentionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttentionState::NoFace => "NO_FACE",
            AttentionState::EyesClosed => "EYES_CLOSED",
            AttentionState::Drowsy => "DROWSY",
            AttentionState::Distracted => "DISTRACTED",
            AttentionState::Focused => "FOCUSED",
        }
    }

    pub fn is_inattentive(&self) -> bool {
        *self != AttentionState::Focused
    }
}

/// Read-only view of the session counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    pub session_seconds: f64,
    pub distraction_tick_count: u64,
    pub warning_count: u64,
    pub alarm_count: u64,
    pub distractions_per_minute: f64,
}
