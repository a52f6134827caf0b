// src/engine/escalation.rs

use crate::types::EscalationConfig;
use tracing::{debug, info, warn};

/// What a single escalation tick decided. The engine owns dispatch and
/// statistics; the gate only decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub counted_distraction: bool,
    pub fire_warning: bool,
    pub fire_alarm: bool,
}

/// Escalation timer and alert gate.
///
/// Accumulates inattentive exposure on a fixed wall-clock tick, independent
/// of frame rate, and arms the warning/alarm exactly once per continuous
/// inattentive episode. Any attentive tick zeroes the accumulator and
/// re-arms both tiers. A separate cooldown window gates the immediate
/// drowsiness voice alert, which must not wait for a tick boundary.
pub struct EscalationGate {
    config: EscalationConfig,

    inattentive_seconds: u32,
    warning_armed: bool,
    alarm_armed: bool,

    last_tick: Option<f64>,
    last_alert_time: f64,
}

impl EscalationGate {
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            inattentive_seconds: 0,
            warning_armed: false,
            alarm_armed: false,
            last_tick: None,
            last_alert_time: f64::NEG_INFINITY,
        }
    }

    pub fn inattentive_seconds(&self) -> u32 {
        self.inattentive_seconds
    }

    /// Advance the tick clock. Returns an outcome only when a full tick
    /// interval has elapsed since the last one; at most one tick fires per
    /// call. The first call anchors the clock and never ticks.
    pub fn maybe_tick(&mut self, is_inattentive: bool, now: f64) -> Option<TickOutcome> {
        let last = match self.last_tick {
            Some(t) => t,
            None => {
                self.last_tick = Some(now);
                return None;
            }
        };

        if now - last < self.config.tick_interval_s {
            return None;
        }
        self.last_tick = Some(now);

        let mut outcome = TickOutcome::default();

        if is_inattentive {
            self.inattentive_seconds += 1;
            outcome.counted_distraction = true;

            if self.inattentive_seconds > self.config.warn_thresh_s && !self.warning_armed {
                self.warning_armed = true;
                outcome.fire_warning = true;
                warn!(
                    "⚠️  Warning tier reached after {} inattentive tick(s)",
                    self.inattentive_seconds
                );
            }

            if self.inattentive_seconds > self.config.alarm_thresh_s && !self.alarm_armed {
                self.alarm_armed = true;
                outcome.fire_alarm = true;
                warn!(
                    "🚨 Alarm tier reached after {} inattentive tick(s)",
                    self.inattentive_seconds
                );
            }
        } else {
            if self.inattentive_seconds > 0 {
                debug!(
                    "Attention recovered after {} inattentive tick(s)",
                    self.inattentive_seconds
                );
            }
            self.inattentive_seconds = 0;
            self.warning_armed = false;
            self.alarm_armed = false;
        }

        Some(outcome)
    }

    /// Cooldown gate for the immediate drowsiness voice alert. Consuming
    /// the window starts the cooldown whether or not playback succeeds, so
    /// a failed alert does not retry inside the same window.
    pub fn try_drowsy_alert(&mut self, now: f64) -> bool {
        if now - self.last_alert_time > self.config.cooldown_s {
            self.last_alert_time = now;
            info!("💤 Drowsiness detected, dispatching voice alert");
            true
        } else {
            false
        }
    }
}
