//! VoiceAid Error Types
//!
//! Centralized error handling for the announcement, phrase and emergency modules.

use thiserror::Error;

/// Central error type for VoiceAid
#[derive(Error, Debug)]
pub enum VoiceAidError {
    #[error("Speech synthesis is not supported on this system")]
    EngineUnsupported,

    #[error("Speech engine error: {0}")]
    Engine(String),

    #[error("Default phrase '{0}' cannot be deleted")]
    DeleteDefaultPhrase(String),

    #[error("Default phrase '{0}' cannot be edited")]
    EditDefaultPhrase(String),

    #[error("Phrase '{0}' not found")]
    PhraseNotFound(String),

    #[error("Phrase text must not be empty")]
    EmptyPhrase,

    #[error("Phrase store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Emergency alert error: {0}")]
    Emergency(String),

    #[error("No exercise number {0}")]
    ExerciseNotFound(usize),

    #[error("Unknown emotion '{0}' (expected Happy, Neutral, Sad or Anxious)")]
    UnknownEmotion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for VoiceAid operations
pub type VoiceAidResult<T> = Result<T, VoiceAidError>;

impl VoiceAidError {
    /// True for refusals caused by the protected seeded phrases
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            VoiceAidError::DeleteDefaultPhrase(_) | VoiceAidError::EditDefaultPhrase(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_classification() {
        assert!(VoiceAidError::DeleteDefaultPhrase("1".into()).is_refusal());
        assert!(VoiceAidError::EditDefaultPhrase("1".into()).is_refusal());
        assert!(!VoiceAidError::EmptyPhrase.is_refusal());
    }

    #[test]
    fn test_io_and_json_errors_convert() {
        fn parse(text: &str) -> VoiceAidResult<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }
        assert!(matches!(parse("{oops"), Err(VoiceAidError::Json(_))));

        let missing = std::fs::read_to_string("/nonexistent/voiceaid/file")
            .map_err(VoiceAidError::from)
            .unwrap_err();
        assert!(matches!(missing, VoiceAidError::Io(_)));
    }
}
