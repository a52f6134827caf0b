// src/dispatch.rs
//
// Alert delivery. The engine decides *whether* to alert; this module only
// delivers, off the frame loop, and swallows playback failures.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::types::AudioConfig;

/// Fire-and-forget alert sink. Implementations must return immediately;
/// the frame loop never waits on playback.
pub trait AlertSink: Send + Sync {
    fn voice_alert(&self, message: &str);
    fn tone_alarm(&self);
}

/// Playback capability behind the dispatcher. Speech and tone calls may
/// block for the duration of playback; the dispatcher keeps them off the
/// processing thread.
pub trait AudioBackend: Send + Sync + 'static {
    fn speak(&self, message: &str) -> Result<()>;
    fn play_tone(&self) -> Result<()>;
}

/// Dispatcher enforcing the voice-channel invariant: at most one speech
/// playback in flight, new requests dropped while one is active. The tone
/// channel is independent and may overlap with speech.
pub struct AudioDispatcher {
    backend: Arc<dyn AudioBackend>,
    voice_slot: Arc<Semaphore>,
}

impl AudioDispatcher {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            voice_slot: Arc::new(Semaphore::new(1)),
        }
    }
}

impl AlertSink for AudioDispatcher {
    fn voice_alert(&self, message: &str) {
        let permit = match self.voice_slot.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("Voice channel busy, dropping alert: {}", message);
                return;
            }
        };

        let backend = self.backend.clone();
        let message = message.to_string();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || backend.speak(&message)).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Voice alert failed: {:#}", e),
                Err(e) => warn!("Voice alert task panicked: {}", e),
            }
            drop(permit);
        });
    }

    fn tone_alarm(&self) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || backend.play_tone()).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Alarm tone failed: {:#}", e),
                Err(e) => warn!("Alarm tone task panicked: {}", e),
            }
        });
    }
}

/// Sink for runs without an audio capability. Alert decisions are still
/// visible in the logs.
pub struct NullSink;

impl AlertSink for NullSink {
    fn voice_alert(&self, message: &str) {
        info!("🔇 (audio unavailable) voice alert: {}", message);
    }

    fn tone_alarm(&self) {
        info!("🔇 (audio unavailable) alarm tone");
    }
}

/// Stand-in backend that models playback latency. A real TTS/tone device
/// plugs in behind the same trait.
pub struct SimulatedAudioBackend {
    speech_duration: Duration,
    tone_duration: Duration,
}

impl SimulatedAudioBackend {
    /// Capability-style construction: `None` means audio is unavailable and
    /// the caller should fall back to `NullSink` instead of catching errors
    /// at every alert site.
    pub fn initialize(config: &AudioConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self {
            speech_duration: Duration::from_millis(config.speech_duration_ms),
            tone_duration: Duration::from_millis(config.tone_duration_ms),
        })
    }
}

impl AudioBackend for SimulatedAudioBackend {
    fn speak(&self, message: &str) -> Result<()> {
        info!("🔊 Speaking: \"{}\"", message);
        std::thread::sleep(self.speech_duration);
        Ok(())
    }

    fn play_tone(&self) -> Result<()> {
        info!("🔊 Playing alarm tone");
        std::thread::sleep(self.tone_duration);
        Ok(())
    }
}
