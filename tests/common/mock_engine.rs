//! Mock Speech Engine for Testing
//!
//! Records every submission and cancel. Completion and error events are only
//! delivered when the test asks for them, in whatever order it wants.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use voiceaid::announce::{EventSender, SessionId};
use voiceaid::tts::{SpeechEngine, Utterance};

#[derive(Debug, Default)]
struct Inner {
    submitted: Vec<(SessionId, Utterance)>,
    cancels: usize,
    speaking: Option<SessionId>,
}

/// Mock engine that records spoken text
#[derive(Debug, Clone)]
pub struct MockEngine {
    inner: Arc<Mutex<Inner>>,
    events: EventSender,
}

impl MockEngine {
    pub fn new(events: EventSender) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
        }
    }

    /// Texts submitted so far, in order
    pub fn spoken(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .submitted
            .iter()
            .map(|(_, u)| u.text.clone())
            .collect()
    }

    pub fn submissions(&self) -> Vec<(SessionId, Utterance)> {
        self.inner.lock().unwrap().submitted.clone()
    }

    pub fn cancels(&self) -> usize {
        self.inner.lock().unwrap().cancels
    }

    /// Handle of the most recent submission
    pub fn last_handle(&self) -> Option<SessionId> {
        self.inner
            .lock()
            .unwrap()
            .submitted
            .last()
            .map(|(id, _)| *id)
    }

    /// Report the in-flight utterance as finished
    pub fn finish_current(&self) {
        let handle = self.inner.lock().unwrap().speaking.take();
        if let Some(handle) = handle {
            self.events.completed(handle);
        }
    }

    /// Deliver a completion for any handle, stale or not
    pub fn deliver_completion(&self, handle: SessionId) {
        self.events.completed(handle);
    }

    pub fn deliver_error(&self, handle: SessionId, reason: &str) {
        self.events.errored(handle, reason);
    }
}

impl SpeechEngine for MockEngine {
    fn submit(&self, handle: SessionId, utterance: Utterance) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.submitted.push((handle, utterance));
        inner.speaking = Some(handle);
        Ok(())
    }

    fn cancel_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.cancels += 1;
        inner.speaking = None;
    }

    fn is_busy(&self) -> bool {
        self.inner.lock().unwrap().speaking.is_some()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
