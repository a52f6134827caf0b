// src/engine/classifier.rs

use crate::smoother::EarSmoother;
use crate::types::{AttentionState, SignalSample, ThresholdConfig};
use tracing::debug;

/// Debounced per-frame attention classifier.
///
/// Converts the noisy detector signal (face presence, eye count, smoothed
/// openness) into a single `AttentionState`. Eye-closure and drowsiness
/// require `consec_frames` consecutive qualifying frames before they fire;
/// one non-qualifying frame resets the run.
///
/// Priority is fixed: EyesClosed > Drowsy > Distracted > Focused.
pub struct FrameClassifier {
    config: ThresholdConfig,
    smoother: EarSmoother,

    closed_frames: u32,
    drowsy_frames: u32,

    state: AttentionState,
    last_smoothed_ear: Option<f32>,
}

impl FrameClassifier {
    pub fn new(config: ThresholdConfig) -> Self {
        let smoother = EarSmoother::new(config.smoothing_window_n);
        Self {
            config,
            smoother,
            closed_frames: 0,
            drowsy_frames: 0,
            state: AttentionState::NoFace,
            last_smoothed_ear: None,
        }
    }

    pub fn current_state(&self) -> AttentionState {
        self.state
    }

    /// Smoothed EAR of the most recent frame that carried one, for display
    /// and debug logging only.
    pub fn smoothed_ear(&self) -> Option<f32> {
        self.last_smoothed_ear
    }

    /// Classify one frame. Never fails: every input, however degraded,
    /// maps to a defined state.
    pub fn classify(&mut self, sample: &SignalSample) -> AttentionState {
        if !sample.face_detected {
            // No geometry at all. Drop the run-lengths so a reappearing
            // face starts debouncing from scratch.
            self.closed_frames = 0;
            self.drowsy_frames = 0;
            self.state = AttentionState::NoFace;
            return self.state;
        }

        let ear = match sample.eye_openness {
            Some(raw) if sample.eyes_detected >= 2 => self.smoother.push(raw),
            _ => {
                // Fewer than two readable eyes: openness cannot be judged,
                // so the frame counts as distracted even with a centered
                // face. Eye confirmation is required for "attentive". The
                // run-lengths are kept; only face loss drops them.
                self.state = AttentionState::Distracted;
                return self.state;
            }
        };
        self.last_smoothed_ear = Some(ear);

        if ear < self.config.eye_ar_thresh {
            self.closed_frames += 1;
        } else {
            self.closed_frames = 0;
        }

        if ear >= self.config.eye_ar_thresh && ear < self.config.drowsy_ar_thresh {
            self.drowsy_frames += 1;
        } else {
            self.drowsy_frames = 0;
        }

        let previous = self.state;
        self.state = if self.closed_frames >= self.config.consec_frames {
            AttentionState::EyesClosed
        } else if self.drowsy_frames >= self.config.consec_frames {
            AttentionState::Drowsy
        } else if !sample.face_centered {
            AttentionState::Distracted
        } else {
            AttentionState::Focused
        };

        if self.state != previous {
            debug!(
                "State: {} → {} (ear={:.3}, closed={}, drowsy={})",
                previous.as_str(),
                self.state.as_str(),
                ear,
                self.closed_frames,
                self.drowsy_frames
            );
        }

        self.state
    }
}
