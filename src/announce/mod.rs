//! Repeating announcements
//!
//! Speak a phrase, wait for the engine to finish, pause, speak it again,
//! until stopped. One session at a time; every engine callback and timer
//! firing carries the session id it was issued for and is dropped once that
//! session is no longer the active one.

pub mod controller;
pub mod service;
pub mod state;
pub mod timer;

pub use controller::{AnnouncementController, DEFAULT_REPEAT_PAUSE};
pub use service::{AnnouncementService, Announcer};
pub use state::{ActiveSession, AnnouncementState, ControllerEvent, SessionId};
pub use timer::{ResumeTimer, TokioResumeTimer};

use tokio::sync::mpsc;

/// Receiving side for engine and timer events
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Sending side handed to speech engines and resume timers.
///
/// Everything posted here is processed by the controller one event at a time.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<ControllerEvent>,
}

impl EventSender {
    /// Create a connected sender/receiver pair
    pub fn channel() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// The utterance tagged `session` finished speaking
    pub fn completed(&self, session: SessionId) {
        self.send(ControllerEvent::Completed(session));
    }

    /// The utterance tagged `session` failed
    pub fn errored(&self, session: SessionId, reason: impl Into<String>) {
        self.send(ControllerEvent::Errored(session, reason.into()));
    }

    /// The pause after `session`'s last utterance has elapsed
    pub fn resume_due(&self, session: SessionId) {
        self.send(ControllerEvent::ResumeDue(session));
    }

    pub fn send(&self, event: ControllerEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Announcement service gone, dropping event");
        }
    }
}
