//! Repeating announcement state machine
//!
//! Single-threaded: the owner feeds [`ControllerEvent`]s in one at a time.
//! The controller is the only caller of the engine's submit and cancel.

use super::state::{ActiveSession, AnnouncementState, ControllerEvent, SessionId};
use super::timer::ResumeTimer;
use crate::i18n::tr;
use crate::notify::{Notice, Notifier};
use crate::tts::{SpeechEngine, Utterance, VoiceSettings};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause between the end of one utterance and the start of the next
pub const DEFAULT_REPEAT_PAUSE: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub struct AnnouncementController {
    engine: Arc<dyn SpeechEngine>,
    notifier: Arc<dyn Notifier>,
    timer: Box<dyn ResumeTimer>,
    voice: VoiceSettings,
    pause: Duration,
    state: AnnouncementState,
    last_session: u64,
}

impl AnnouncementController {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        notifier: Arc<dyn Notifier>,
        timer: Box<dyn ResumeTimer>,
    ) -> Self {
        Self {
            engine,
            notifier,
            timer,
            voice: VoiceSettings::default(),
            pause: DEFAULT_REPEAT_PAUSE,
            state: AnnouncementState::Idle,
            last_session: 0,
        }
    }

    pub fn with_voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn state(&self) -> &AnnouncementState {
        &self.state
    }

    /// Process one event
    pub fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::SpeakRequested { phrase_id, text } => {
                self.request_speak(&phrase_id, &text)
            }
            ControllerEvent::StopRequested(phrase_id) => self.cancel(&phrase_id),
            ControllerEvent::Completed(session) => self.on_utterance_complete(session),
            ControllerEvent::Errored(session, reason) => self.on_utterance_error(session, &reason),
            ControllerEvent::ResumeDue(session) => self.on_resume_due(session),
            ControllerEvent::Teardown => self.teardown(),
        }
    }

    /// Start repeating `text`, or stop if `phrase_id` is already repeating
    pub fn request_speak(&mut self, phrase_id: &str, text: &str) {
        if self.state.phrase_id() == Some(phrase_id) {
            debug!("Phrase '{}' already active, toggling off", phrase_id);
            self.cancel(phrase_id);
            return;
        }

        if text.trim().is_empty() {
            warn!("Ignoring speak request for '{}' with empty text", phrase_id);
            return;
        }

        if let Some(old) = self.end_session() {
            debug!(
                "Session {} for '{}' superseded by '{}'",
                old.id, old.phrase_id, phrase_id
            );
        }

        if !self.engine.is_supported() {
            self.notifier.notify(Notice::error(
                tr("phrases.notSupported"),
                tr("phrases.notSupportedDescription"),
            ));
            return;
        }

        self.last_session += 1;
        let session = ActiveSession {
            id: SessionId(self.last_session),
            phrase_id: phrase_id.to_string(),
            text: text.to_string(),
        };

        if let Err(e) = self
            .engine
            .submit(session.id, Utterance::new(text, self.voice))
        {
            warn!("❌ Engine rejected '{}': {}", text, e);
            self.notifier
                .notify(Notice::error(tr("phrases.speechError"), e.to_string()));
            return;
        }

        info!("📢 Session {} repeating '{}'", session.id, text);
        self.state = AnnouncementState::Speaking(session);
        self.notifier.notify(Notice::info(
            tr("phrases.speaking"),
            format!("{}: \"{}\"", tr("phrases.repeating"), text),
        ));
    }

    /// Stop the active session if it belongs to `phrase_id`
    pub fn cancel(&mut self, phrase_id: &str) {
        if self.state.phrase_id() != Some(phrase_id) {
            debug!("Stop for '{}' ignored, not active", phrase_id);
            return;
        }
        if let Some(old) = self.end_session() {
            info!("⏹️ Session {} stopped", old.id);
            self.notifier
                .notify(Notice::info(tr("phrases.stopped"), old.text));
        }
    }

    /// Stop whatever is active
    pub fn teardown(&mut self) {
        if let Some(old) = self.end_session() {
            info!("⏹️ Session {} torn down", old.id);
        }
    }

    pub fn on_utterance_complete(&mut self, session: SessionId) {
        match &self.state {
            AnnouncementState::Speaking(active) if active.id == session => {
                let active = active.clone();
                debug!("Session {} utterance done, pausing {:?}", session, self.pause);
                self.timer.schedule(session, self.pause);
                self.state = AnnouncementState::Pausing(active);
            }
            _ => debug!("Discarding stale completion for session {}", session),
        }
    }

    pub fn on_utterance_error(&mut self, session: SessionId, reason: &str) {
        if self.state.session_id() != Some(session) {
            debug!("Discarding stale error for session {}: {}", session, reason);
            return;
        }
        warn!("❌ Session {} failed: {}", session, reason);
        self.end_session();
        self.notifier
            .notify(Notice::error(tr("phrases.speechError"), reason));
    }

    pub fn on_resume_due(&mut self, session: SessionId) {
        let active = match &self.state {
            AnnouncementState::Pausing(active) if active.id == session => active.clone(),
            _ => {
                debug!("Discarding stale resume for session {}", session);
                return;
            }
        };

        match self
            .engine
            .submit(session, Utterance::new(active.text.as_str(), self.voice))
        {
            Ok(()) => self.state = AnnouncementState::Speaking(active),
            Err(e) => {
                warn!("❌ Engine rejected repeat of session {}: {}", session, e);
                self.end_session();
                self.notifier
                    .notify(Notice::error(tr("phrases.speechError"), e.to_string()));
            }
        }
    }

    /// Cancel engine and timer, invalidate the session, go idle
    fn end_session(&mut self) -> Option<ActiveSession> {
        let old = match std::mem::take(&mut self.state) {
            AnnouncementState::Idle => return None,
            AnnouncementState::Speaking(s) | AnnouncementState::Pausing(s) => s,
        };
        self.engine.cancel_all();
        self.timer.cancel();
        Some(old)
    }
}

impl Drop for AnnouncementController {
    fn drop(&mut self) {
        self.teardown();
    }
}
