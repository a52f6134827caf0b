// src/engine/stats.rs

use crate::types::StatsSnapshot;
use tracing::info;

/// Session counters. Monotonically non-decreasing until an explicit reset;
/// never reset automatically.
pub struct SessionStats {
    start_time: Option<f64>,
    distraction_tick_count: u64,
    warning_count: u64,
    alarm_count: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: None,
            distraction_tick_count: 0,
            warning_count: 0,
            alarm_count: 0,
        }
    }

    /// Anchor the session clock on the first observed frame.
    pub fn mark_started(&mut self, now: f64) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    pub fn record_distraction_tick(&mut self) {
        self.distraction_tick_count += 1;
    }

    pub fn record_warning(&mut self) {
        self.warning_count += 1;
    }

    pub fn record_alarm(&mut self) {
        self.alarm_count += 1;
    }

    /// Zero the counters and restart the session clock. Triggered only by
    /// an external user command.
    pub fn reset(&mut self, now: f64) {
        self.distraction_tick_count = 0;
        self.warning_count = 0;
        self.alarm_count = 0;
        self.start_time = Some(now);
        info!("🔄 Session counters reset");
    }

    pub fn snapshot(&self, now: f64) -> StatsSnapshot {
        let session_seconds = self.start_time.map(|start| (now - start).max(0.0)).unwrap_or(0.0);
        let distractions_per_minute = if session_seconds > 0.0 {
            self.distraction_tick_count as f64 / (session_seconds / 60.0)
        } else {
            0.0
        };

        StatsSnapshot {
            session_seconds,
            distraction_tick_count: self.distraction_tick_count,
            warning_count: self.warning_count,
            alarm_count: self.alarm_count,
            distractions_per_minute,
        }
    }
}
