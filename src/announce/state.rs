//! Announcement state and events

use std::fmt;

/// Generation token of one announcement session.
///
/// Allocated in strictly increasing order by the controller, so a token from
/// a superseded session never equals the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One "repeat this phrase until stopped" task
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub id: SessionId,
    pub phrase_id: String,
    pub text: String,
}

/// Controller state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnnouncementState {
    #[default]
    Idle,
    /// An utterance was submitted and has not completed or failed yet
    Speaking(ActiveSession),
    /// The last utterance completed; the next one is scheduled
    Pausing(ActiveSession),
}

impl AnnouncementState {
    pub fn session(&self) -> Option<&ActiveSession> {
        match self {
            AnnouncementState::Idle => None,
            AnnouncementState::Speaking(s) | AnnouncementState::Pausing(s) => Some(s),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session().map(|s| s.id)
    }

    /// Phrase currently being repeated, if any
    pub fn phrase_id(&self) -> Option<&str> {
        self.session().map(|s| s.phrase_id.as_str())
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AnnouncementState::Idle)
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self, AnnouncementState::Speaking(_))
    }

    pub fn is_pausing(&self) -> bool {
        matches!(self, AnnouncementState::Pausing(_))
    }
}

/// Everything the controller reacts to, processed one at a time
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// User asked to speak (or toggle off) a phrase
    SpeakRequested { phrase_id: String, text: String },
    /// User asked to stop a phrase
    StopRequested(String),
    /// Engine finished an utterance
    Completed(SessionId),
    /// Engine failed an utterance
    Errored(SessionId, String),
    /// Pause between repeats elapsed
    ResumeDue(SessionId),
    /// Owning view went away
    Teardown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let session = ActiveSession {
            id: SessionId(3),
            phrase_id: "1".to_string(),
            text: "I need help".to_string(),
        };
        let speaking = AnnouncementState::Speaking(session.clone());
        assert_eq!(speaking.phrase_id(), Some("1"));
        assert_eq!(speaking.session_id(), Some(SessionId(3)));
        assert!(speaking.is_speaking());

        let pausing = AnnouncementState::Pausing(session);
        assert!(pausing.is_pausing());
        assert!(!pausing.is_idle());

        assert_eq!(AnnouncementState::default().phrase_id(), None);
    }

    #[test]
    fn test_session_ids_order() {
        assert!(SessionId(1) < SessionId(2));
        assert_eq!(SessionId(7).to_string(), "#7");
    }
}
