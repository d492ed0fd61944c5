//! Engine for runtimes without speech synthesis

use super::{SpeechEngine, Utterance};
use crate::announce::SessionId;
use anyhow::Result;

#[derive(Debug, Default)]
pub struct UnsupportedEngine;

impl SpeechEngine for UnsupportedEngine {
    fn is_supported(&self) -> bool {
        false
    }

    fn submit(&self, _handle: SessionId, _utterance: Utterance) -> Result<()> {
        Err(crate::error::VoiceAidError::EngineUnsupported.into())
    }

    fn cancel_all(&self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}
