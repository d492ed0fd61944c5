//! Announcement service
//!
//! Runs an [`AnnouncementController`] on its own task. User requests arrive
//! through [`Announcer`] handles, engine callbacks and timer firings through
//! an [`EventSender`]; both feed the same single-threaded loop. State is
//! published read-only over a watch channel.

use super::controller::AnnouncementController;
use super::state::{AnnouncementState, ControllerEvent};
use super::timer::TokioResumeTimer;
use super::{EventReceiver, EventSender};
use crate::config::Config;
use crate::error::{VoiceAidError, VoiceAidResult};
use crate::notify::Notifier;
use crate::tts::{self, SpeechEngine, VoiceSettings};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle for requesting speech. Cheap to clone.
///
/// When the last handle is dropped the service tears down the active session
/// and exits.
#[derive(Debug, Clone)]
pub struct Announcer {
    requests: mpsc::UnboundedSender<ControllerEvent>,
    state: watch::Receiver<AnnouncementState>,
}

impl Announcer {
    /// Speak `text` repeatedly, or stop it if `phrase_id` is already active
    pub fn speak(
        &self,
        phrase_id: impl Into<String>,
        text: impl Into<String>,
    ) -> VoiceAidResult<()> {
        self.send(ControllerEvent::SpeakRequested {
            phrase_id: phrase_id.into(),
            text: text.into(),
        })
    }

    /// Stop `phrase_id` if it is the one repeating
    pub fn stop(&self, phrase_id: impl Into<String>) -> VoiceAidResult<()> {
        self.send(ControllerEvent::StopRequested(phrase_id.into()))
    }

    /// Stop whatever is repeating
    pub fn teardown(&self) -> VoiceAidResult<()> {
        self.send(ControllerEvent::Teardown)
    }

    /// Latest published state
    pub fn state(&self) -> AnnouncementState {
        self.state.borrow().clone()
    }

    /// Phrase currently repeating, if any
    pub fn active_phrase(&self) -> Option<String> {
        self.state.borrow().phrase_id().map(str::to_string)
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<AnnouncementState> {
        self.state.clone()
    }

    fn send(&self, event: ControllerEvent) -> VoiceAidResult<()> {
        self.requests
            .send(event)
            .map_err(|_| VoiceAidError::Engine("announcement service stopped".to_string()))
    }
}

pub struct AnnouncementService;

impl AnnouncementService {
    /// Build the configured engine and start the service
    pub async fn start(
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<(Announcer, JoinHandle<()>)> {
        let (events, inbox) = EventSender::channel();
        let engine = tts::create_engine(config, events.clone()).await?;
        Ok(Self::spawn(
            engine,
            notifier,
            VoiceSettings::from_config(config),
            Duration::from_millis(config.repeat_pause_ms),
            events,
            inbox,
        ))
    }

    /// Start the service around an existing engine.
    ///
    /// `events`/`inbox` must be the pair the engine reports into.
    pub fn spawn(
        engine: Arc<dyn SpeechEngine>,
        notifier: Arc<dyn Notifier>,
        voice: VoiceSettings,
        pause: Duration,
        events: EventSender,
        mut inbox: EventReceiver,
    ) -> (Announcer, JoinHandle<()>) {
        let (requests_tx, mut requests) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(AnnouncementState::Idle);

        let timer = TokioResumeTimer::new(events);
        let mut controller = AnnouncementController::new(engine, notifier, Box::new(timer))
            .with_voice(voice)
            .with_pause(pause);

        let task = tokio::spawn(async move {
            info!("🔁 Announcement service started");
            loop {
                let event = tokio::select! {
                    // User requests go first so a new request wins over
                    // callbacks that are already queued.
                    biased;
                    request = requests.recv() => match request {
                        Some(event) => event,
                        None => break,
                    },
                    Some(event) = inbox.recv() => event,
                };
                debug!("Announcement event: {:?}", event);
                controller.handle(event);
                state_tx.send_if_modified(|state| {
                    if state != controller.state() {
                        *state = controller.state().clone();
                        true
                    } else {
                        false
                    }
                });
            }
            controller.teardown();
            state_tx.send_replace(AnnouncementState::Idle);
            info!("🔁 Announcement service stopped");
        });

        (
            Announcer {
                requests: requests_tx,
                state: state_rx,
            },
            task,
        )
    }
}
