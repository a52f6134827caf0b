// src/replay.rs
//
// Session replay source. Sessions are JSONL detection logs, one raw
// detector record per frame. This layer performs the detector-adjacent
// centering check and hands normalized samples to the engine.

use crate::types::{ReplayConfig, SignalSample, ThresholdConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// One raw detector observation as written by the geometry stage. A record
/// without `face_center_x` means no face was found in the frame.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionRecord {
    pub timestamp: f64,
    #[serde(default)]
    pub face_center_x: Option<f32>,
    #[serde(default)]
    pub eyes_detected: u8,
    #[serde(default)]
    pub eye_openness: Option<f32>,
    /// Control record: the external reset command ('R' on the console).
    #[serde(default)]
    pub reset: bool,
}

impl DetectionRecord {
    pub fn to_sample(&self, frame_width: f32, tolerance_fraction: f32) -> SignalSample {
        let face_centered = self
            .face_center_x
            .map(|x| is_face_centered(x, frame_width, tolerance_fraction))
            .unwrap_or(false);

        SignalSample {
            timestamp: self.timestamp,
            face_detected: self.face_center_x.is_some(),
            face_centered,
            eyes_detected: self.eyes_detected.min(2),
            eye_openness: self.eye_openness,
        }
    }
}

/// Horizontal centering check: the face center must sit within the
/// configured fraction of the frame width from the frame center.
pub fn is_face_centered(face_center_x: f32, frame_width: f32, tolerance_fraction: f32) -> bool {
    let frame_center_x = frame_width / 2.0;
    (face_center_x - frame_center_x).abs() < tolerance_fraction * frame_width
}

pub struct ReplaySource {
    config: ReplayConfig,
}

impl ReplaySource {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn find_session_logs(&self) -> Result<Vec<PathBuf>> {
        let mut logs = Vec::new();

        for entry in WalkDir::new(&self.config.input_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if let Some(ext) = path.extension() {
                if ext.to_str() == Some("jsonl") {
                    logs.push(path.to_path_buf());
                }
            }
        }

        logs.sort();
        info!("Found {} session log(s)", logs.len());
        Ok(logs)
    }

    pub fn open_session(&self, path: &Path) -> Result<SessionReader> {
        info!("Opening session log: {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open session log {}", path.display()))?;

        Ok(SessionReader {
            lines: BufReader::new(file).lines(),
            path: path.to_path_buf(),
            current_line: 0,
        })
    }
}

pub struct SessionReader {
    lines: std::io::Lines<BufReader<File>>,
    path: PathBuf,
    pub current_line: u64,
}

impl SessionReader {
    /// Next record, or `None` at end of log. Blank lines are skipped; a
    /// malformed line is a hard error, the log is not a lossy format.
    pub fn read_record(&mut self) -> Result<Option<DetectionRecord>> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            self.current_line += 1;

            if line.trim().is_empty() {
                continue;
            }

            let record: DetectionRecord = serde_json::from_str(&line).with_context(|| {
                format!("Malformed record at {}:{}", self.path.display(), self.current_line)
            })?;
            return Ok(Some(record));
        }
    }
}
