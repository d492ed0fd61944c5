//! TTS (Text-to-Speech) Module
//!
//! The speech engine is a single shared resource: one utterance at a time,
//! completion reported asynchronously through an [`EventSender`]. Only the
//! announcement controller drives it.

use crate::announce::{EventSender, SessionId};
use crate::config::Config;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub mod speechd;
pub mod system;
pub mod unsupported;

pub const DEFAULT_RATE: f32 = 0.8;
pub const DEFAULT_VOLUME: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;

/// Voice parameters applied to every utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub rate: f32,
    pub volume: f32,
    pub pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
            pitch: DEFAULT_PITCH,
        }
    }
}

impl VoiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rate: config.speech_rate,
            volume: config.speech_volume,
            pitch: config.speech_pitch,
        }
    }
}

/// One request to vocalize a string
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub volume: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, voice: VoiceSettings) -> Self {
        Self {
            text: text.into(),
            rate: voice.rate,
            volume: voice.volume,
            pitch: voice.pitch,
        }
    }
}

/// Trait for speech engines
pub trait SpeechEngine: Send + Sync + std::fmt::Debug {
    /// Whether speech synthesis is available at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Start speaking. Completion or failure is reported later with `handle`.
    fn submit(&self, handle: SessionId, utterance: Utterance) -> Result<()>;

    /// Stop whatever is being spoken. Cancelled utterances report nothing.
    fn cancel_all(&self);

    /// Whether an utterance is in flight
    fn is_busy(&self) -> bool;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// The single in-flight utterance task of a backend
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InFlight {
    /// Track a new task, aborting the previous one
    pub(crate) fn replace(&self, task: JoinHandle<()>) {
        if let Ok(mut slot) = self.task.lock() {
            if let Some(old) = slot.replace(task) {
                old.abort();
            }
        }
    }

    /// Abort the in-flight task. Returns whether one was still running.
    pub(crate) fn abort(&self) -> bool {
        let Ok(mut slot) = self.task.lock() else {
            return false;
        };
        match slot.take() {
            Some(task) => {
                let running = !task.is_finished();
                task.abort();
                running
            }
            None => false,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.task
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|t| !t.is_finished()))
            .unwrap_or(false)
    }
}

/// Backends that can stand behind a configured engine name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    System,
    Speechd,
}

/// Backends to try, in order, for a configured engine name.
///
/// speechd-ng has no call to stop a message once it is speaking, so a system
/// synthesizer that can be interrupted wins even when speechd is configured.
fn backend_order(name: &str) -> &'static [Backend] {
    match name {
        "speechd_ng" | "speechd" => &[Backend::System, Backend::Speechd],
        "none" => &[],
        _ => &[Backend::System],
    }
}

/// Factory to create the configured speech engine
pub async fn create_engine(
    config: &Config,
    events: EventSender,
) -> Result<Arc<dyn SpeechEngine>> {
    info!("🛠️ Creating speech engine: {}", config.tts_engine);
    if !matches!(
        config.tts_engine.as_str(),
        "system" | "speechd_ng" | "speechd" | "none"
    ) {
        warn!(
            "  - Unknown engine '{}', falling back to System",
            config.tts_engine
        );
    }

    let mut engine: Arc<dyn SpeechEngine> = Arc::new(unsupported::UnsupportedEngine);
    for backend in backend_order(&config.tts_engine) {
        match backend {
            Backend::System => {
                if let Some(system) = system::SystemEngine::detect(events.clone()) {
                    if config.tts_engine != "system" {
                        info!("  - Using interruptible System engine instead of speechd-ng");
                    }
                    engine = Arc::new(system);
                    break;
                }
            }
            Backend::Speechd => match speechd::SpeechdEngine::connect(events.clone()).await {
                Ok(speechd) => {
                    warn!("  - speechd-ng cannot interrupt; stops wait for the current message");
                    engine = Arc::new(speechd);
                    break;
                }
                Err(e) => warn!("  - speechd-ng unavailable ({})", e),
            },
        }
    }

    if engine.is_supported() {
        info!("✅ Speech engine '{}' initialized", engine.name());
    } else {
        warn!("🔇 No speech engine available");
    }
    Ok(engine)
}
