use crate::types::Config;
use anyhow::Result;
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Threshold sanity checks. Bad orderings are fatal before the frame
    /// loop starts; nothing here is recoverable at runtime.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        let e = &self.escalation;

        if t.eye_ar_thresh >= t.drowsy_ar_thresh {
            anyhow::bail!(
                "eye_ar_thresh ({}) must be below drowsy_ar_thresh ({})",
                t.eye_ar_thresh,
                t.drowsy_ar_thresh
            );
        }
        if t.eye_ar_thresh <= 0.0 {
            anyhow::bail!("eye_ar_thresh must be positive");
        }
        if t.consec_frames == 0 {
            anyhow::bail!("consec_frames must be at least 1");
        }
        if t.smoothing_window_n == 0 {
            anyhow::bail!("smoothing_window_n must be at least 1");
        }
        if t.center_tolerance_fraction <= 0.0 || t.center_tolerance_fraction >= 1.0 {
            anyhow::bail!(
                "center_tolerance_fraction ({}) must be in (0, 1)",
                t.center_tolerance_fraction
            );
        }
        if e.warn_thresh_s >= e.alarm_thresh_s {
            anyhow::bail!(
                "warn_thresh_s ({}) must be below alarm_thresh_s ({})",
                e.warn_thresh_s,
                e.alarm_thresh_s
            );
        }
        if e.tick_interval_s <= 0.0 {
            anyhow::bail!("tick_interval_s must be positive");
        }
        if e.cooldown_s < 0.0 {
            anyhow::bail!("cooldown_s must not be negative");
        }
        if self.replay.frame_width <= 0.0 {
            anyhow::bail!("replay.frame_width must be positive");
        }

        Ok(())
    }
}
