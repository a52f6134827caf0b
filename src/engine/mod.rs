// src/engine/mod.rs

mod classifier;
mod escalation;
mod stats;

pub use classifier::FrameClassifier;
pub use escalation::{EscalationGate, TickOutcome};
pub use stats::SessionStats;

use crate::dispatch::AlertSink;
use crate::types::{AttentionState, Config, SignalSample, StatsSnapshot};
use std::sync::Arc;

pub const DROWSY_MESSAGE: &str = "Alert! Driver drowsiness detected!";
pub const WARNING_MESSAGE: &str = "Warning! Pay attention!";
pub const ALARM_MESSAGE: &str = "Danger! Focus on road!";

/// The attention engine: owns the classifier, the escalation gate and the
/// session counters exclusively. Single-threaded; one `observe` per frame,
/// alerts handed to the sink as plain messages.
pub struct AttentionEngine {
    classifier: FrameClassifier,
    gate: EscalationGate,
    stats: SessionStats,
    sink: Arc<dyn AlertSink>,
}

impl AttentionEngine {
    pub fn new(config: &Config, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            classifier: FrameClassifier::new(config.thresholds.clone()),
            gate: EscalationGate::new(config.escalation.clone()),
            stats: SessionStats::new(),
            sink,
        }
    }

    /// Process one frame: classify, fire the immediate drowsiness alert if
    /// due, and advance the escalation clock when a tick boundary has
    /// passed. Never fails; every frame yields a defined state.
    pub fn observe(&mut self, sample: &SignalSample, now: f64) -> AttentionState {
        self.stats.mark_started(now);

        let state = self.classifier.classify(sample);

        // Drowsiness is safety-critical and bypasses the tick boundary.
        if state == AttentionState::Drowsy && self.gate.try_drowsy_alert(now) {
            self.sink.voice_alert(DROWSY_MESSAGE);
        }

        if let Some(outcome) = self.gate.maybe_tick(state.is_inattentive(), now) {
            if outcome.counted_distraction {
                self.stats.record_distraction_tick();
            }
            if outcome.fire_warning {
                self.stats.record_warning();
                self.sink.voice_alert(WARNING_MESSAGE);
            }
            if outcome.fire_alarm {
                self.stats.record_alarm();
                self.sink.tone_alarm();
                self.sink.voice_alert(ALARM_MESSAGE);
            }
        }

        state
    }

    /// External reset command: zeroes the session counters and restarts the
    /// session clock. Debounce counters, the current state and the
    /// escalation accumulator are deliberately untouched.
    pub fn request_reset(&mut self, now: f64) {
        self.stats.reset(now);
    }

    pub fn stats(&self, now: f64) -> StatsSnapshot {
        self.stats.snapshot(now)
    }

    pub fn current_state(&self) -> AttentionState {
        self.classifier.current_state()
    }

    pub fn smoothed_ear(&self) -> Option<f32> {
        self.classifier.smoothed_ear()
    }

    pub fn inattentive_seconds(&self) -> u32 {
        self.gate.inattentive_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        voices: Mutex<Vec<String>>,
        tones: Mutex<u32>,
    }

    impl AlertSink for RecordingSink {
        fn voice_alert(&self, message: &str) {
            self.voices.lock().unwrap().push(message.to_string());
        }

        fn tone_alarm(&self) {
            *self.tones.lock().unwrap() += 1;
        }
    }

    fn config() -> Config {
        Config {
            thresholds: ThresholdConfig {
                eye_ar_thresh: 0.25,
                drowsy_ar_thresh: 0.28,
                consec_frames: 3,
                center_tolerance_fraction: 0.3,
                smoothing_window_n: 1,
            },
            escalation: EscalationConfig {
                warn_thresh_s: 5,
                alarm_thresh_s: 10,
                cooldown_s: 3.0,
                tick_interval_s: 1.0,
            },
            audio: AudioConfig {
                enabled: false,
                speech_duration_ms: 0,
                tone_duration_ms: 0,
            },
            replay: ReplayConfig {
                input_dir: String::new(),
                output_dir: String::new(),
                frame_width: 640.0,
                save_report: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    fn engine() -> (AttentionEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = AttentionEngine::new(&config(), sink.clone());
        (engine, sink)
    }

    fn focused(ts: f64) -> SignalSample {
        SignalSample {
            timestamp: ts,
            face_detected: true,
            face_centered: true,
            eyes_detected: 2,
            eye_openness: Some(0.35),
        }
    }

    fn absent(ts: f64) -> SignalSample {
        SignalSample {
            timestamp: ts,
            face_detected: false,
            face_centered: false,
            eyes_detected: 0,
            eye_openness: None,
        }
    }

    fn drowsy(ts: f64) -> SignalSample {
        SignalSample {
            timestamp: ts,
            face_detected: true,
            face_centered: true,
            eyes_detected: 2,
            eye_openness: Some(0.26),
        }
    }

    #[test]
    fn test_escalation_over_continuous_absence() {
        let (mut engine, sink) = engine();

        // One frame per second for 13 seconds of no face: tick 1 anchors,
        // warning past 5 accumulated ticks, alarm past 10.
        for i in 0..=13 {
            engine.observe(&absent(i as f64), i as f64);
        }

        let snap = engine.stats(13.0);
        assert_eq!(snap.warning_count, 1);
        assert_eq!(snap.alarm_count, 1);
        assert_eq!(*sink.tones.lock().unwrap(), 1);

        let voices = sink.voices.lock().unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0], WARNING_MESSAGE);
        assert_eq!(voices[1], ALARM_MESSAGE);
    }

    #[test]
    fn test_recovery_resets_escalation() {
        let (mut engine, sink) = engine();

        for i in 0..=7 {
            engine.observe(&absent(i as f64), i as f64);
        }
        assert_eq!(engine.stats(7.0).warning_count, 1);

        // One attentive tick re-arms
        engine.observe(&focused(8.0), 8.0);
        assert_eq!(engine.inattentive_seconds(), 0);

        for i in 9..=15 {
            engine.observe(&absent(i as f64), i as f64);
        }
        assert_eq!(engine.stats(15.0).warning_count, 2);
        assert_eq!(engine.stats(15.0).alarm_count, 0);
        assert_eq!(*sink.tones.lock().unwrap(), 0);
    }

    #[test]
    fn test_drowsy_alert_respects_cooldown() {
        let (mut engine, sink) = engine();

        // 30 fps drowsy-band frames for 2 seconds; classifier debounces at
        // 3 frames, then the cooldown allows exactly one voice alert.
        for i in 0..60 {
            let ts = i as f64 / 30.0;
            engine.observe(&drowsy(ts), ts);
        }

        let voices = sink.voices.lock().unwrap();
        let drowsy_alerts = voices.iter().filter(|m| *m == DROWSY_MESSAGE).count();
        assert_eq!(drowsy_alerts, 1);
    }

    #[test]
    fn test_drowsy_alert_fires_again_after_cooldown() {
        let (mut engine, sink) = engine();

        for i in 0..3 {
            engine.observe(&drowsy(i as f64 * 0.03), i as f64 * 0.03);
        }
        // Well past the 3s cooldown, still drowsy
        engine.observe(&drowsy(4.0), 4.0);

        let voices = sink.voices.lock().unwrap();
        let drowsy_alerts = voices.iter().filter(|m| *m == DROWSY_MESSAGE).count();
        assert_eq!(drowsy_alerts, 2);
    }

    #[test]
    fn test_distraction_ticks_counted() {
        let (mut engine, _sink) = engine();

        engine.observe(&absent(0.0), 0.0);
        for i in 1..=4 {
            engine.observe(&absent(i as f64), i as f64);
        }
        for i in 5..=8 {
            engine.observe(&focused(i as f64), i as f64);
        }

        let snap = engine.stats(8.0);
        assert_eq!(snap.distraction_tick_count, 4);
        // 4 inattentive ticks over an 8s session
        assert!((snap.distractions_per_minute - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_preserves_state_and_debounce() {
        let (mut engine, _sink) = engine();

        let closed = SignalSample {
            timestamp: 0.0,
            face_detected: true,
            face_centered: true,
            eyes_detected: 2,
            eye_openness: Some(0.1),
        };
        for i in 0..3 {
            engine.observe(&closed, i as f64 * 0.03);
        }
        assert_eq!(engine.current_state(), AttentionState::EyesClosed);

        engine.request_reset(10.0);

        let snap = engine.stats(10.0);
        assert_eq!(snap.distraction_tick_count, 0);
        assert_eq!(snap.session_seconds, 0.0);
        // The classifier did not lose its run
        assert_eq!(engine.current_state(), AttentionState::EyesClosed);
        assert_eq!(
            engine.observe(&closed, 10.1),
            AttentionState::EyesClosed
        );
    }

    #[test]
    fn test_observe_returns_defined_state_for_any_input() {
        let (mut engine, _sink) = engine();

        let degenerate = SignalSample {
            timestamp: 0.0,
            face_detected: true,
            face_centered: true,
            eyes_detected: 2,
            eye_openness: None,
        };
        assert_eq!(engine.observe(&degenerate, 0.0), AttentionState::Distracted);
    }
}
