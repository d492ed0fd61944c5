pub mod mock_engine;

use mock_engine::MockEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use voiceaid::announce::{AnnouncementService, Announcer, EventSender};
use voiceaid::notify::RecordingNotifier;
use voiceaid::tts::VoiceSettings;

pub const PAUSE: Duration = Duration::from_millis(1000);

pub struct TestContext {
    pub engine: MockEngine,
    pub notifier: RecordingNotifier,
    pub announcer: Announcer,
    pub service: JoinHandle<()>,
}

impl TestContext {
    pub fn new() -> Self {
        let (events, inbox) = EventSender::channel();
        let engine = MockEngine::new(events.clone());
        let notifier = RecordingNotifier::new();
        let (announcer, service) = AnnouncementService::spawn(
            Arc::new(engine.clone()),
            Arc::new(notifier.clone()),
            VoiceSettings::default(),
            PAUSE,
            events,
            inbox,
        );
        Self {
            engine,
            notifier,
            announcer,
            service,
        }
    }
}

/// Let the service drain its queues. With paused time this only advances the
/// clock by a millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
