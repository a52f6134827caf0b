// src/smoother.rs

use std::collections::VecDeque;

/// Temporal smoother for the eye-openness signal using a sliding window.
///
/// Single-frame cascade detections are noisy; the mean over the last N
/// frames is what the classifier thresholds against.
pub struct EarSmoother {
    history: VecDeque<f32>,
    window_size: usize,
}

impl EarSmoother {
    /// Create a new smoother with specified window size
    ///
    /// # Arguments
    /// * `window_size` - Number of frames to average over (e.g., 5 frames)
    pub fn new(window_size: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Append a raw openness value and return the mean of the window.
    ///
    /// The oldest value is evicted once the window is full. Callers must
    /// gate on two detected eyes before pushing; an eyeless frame carries
    /// no openness signal.
    pub fn push(&mut self, raw: f32) -> f32 {
        self.history.push_back(raw);

        if self.history.len() > self.window_size {
            self.history.pop_front();
        }

        let sum: f32 = self.history.iter().sum();
        sum / self.history.len() as f32
    }

    /// Reset the window (e.g., when a new session starts)
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Number of raw values currently in the window
    pub fn history_size(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_partial_window() {
        let mut smoother = EarSmoother::new(5);
        assert!((smoother.push(0.2) - 0.2).abs() < 1e-6);
        assert!((smoother.push(0.4) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_window_mean() {
        let mut smoother = EarSmoother::new(5);
        let mut last = 0.0;
        for v in [0.1, 0.1, 0.1, 0.1, 0.4] {
            last = smoother.push(v);
        }
        assert!((last - 0.16).abs() < 1e-6);
        assert_eq!(smoother.history_size(), 5);
    }

    #[test]
    fn test_eviction_beyond_capacity() {
        let mut smoother = EarSmoother::new(5);
        for v in [0.1, 0.1, 0.1, 0.1, 0.4] {
            smoother.push(v);
        }

        // Sixth push evicts the first 0.1: mean of [0.1, 0.1, 0.1, 0.4, 0.4]
        let mean = smoother.push(0.4);
        assert!((mean - 0.22).abs() < 1e-6);
        assert_eq!(smoother.history_size(), 5);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut smoother = EarSmoother::new(3);
        smoother.push(0.5);
        smoother.push(0.5);
        smoother.reset();
        assert_eq!(smoother.history_size(), 0);

        // Post-reset mean must not see stale values
        assert!((smoother.push(0.1) - 0.1).abs() < 1e-6);
    }
}
