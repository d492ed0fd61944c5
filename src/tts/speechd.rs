//! Speechd-ng TTS backend using D-Bus

use super::{InFlight, SpeechEngine, Utterance};
use crate::announce::{EventSender, SessionId};
use anyhow::Result;
use tracing::{debug, info, warn};
use zbus::{proxy, Connection};

#[proxy(
    interface = "org.speech.Service",
    default_service = "org.speech.Service",
    default_path = "/org/speech/Service"
)]
trait SpeechService {
    fn speak(&self, text: &str) -> zbus::Result<()>;
    fn ping(&self) -> zbus::Result<String>;
}

/// speechd-ng voices its own defaults; rate, volume and pitch are not sent.
///
/// The service exposes no stop call. `cancel_all` only abandons the pending
/// `Speak` reply, so a message already playing runs to its end.
/// [`create_engine`](super::create_engine) picks the system engine over this
/// one whenever a synthesizer binary is available.
pub struct SpeechdEngine {
    proxy: SpeechServiceProxy<'static>,
    events: EventSender,
    in_flight: InFlight,
}

impl std::fmt::Debug for SpeechdEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechdEngine").finish()
    }
}

impl SpeechdEngine {
    pub async fn connect(events: EventSender) -> Result<Self> {
        let connection = Connection::session().await?;
        let proxy = SpeechServiceProxy::new(&connection).await?;

        match proxy.ping().await {
            Ok(response) => {
                info!("🔊 Connected to speechd-ng: {}", response);
            }
            Err(e) => {
                warn!("⚠️ speechd-ng not responding: {}", e);
                return Err(anyhow::anyhow!("speechd-ng not responding: {}", e));
            }
        }

        Ok(Self {
            proxy,
            events,
            in_flight: InFlight::default(),
        })
    }
}

impl SpeechEngine for SpeechdEngine {
    fn submit(&self, handle: SessionId, utterance: Utterance) -> Result<()> {
        debug!("speechd-ng speaking {}: {}", handle, utterance.text);

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| anyhow::anyhow!("No async runtime for speechd-ng: {}", e))?;

        let proxy = self.proxy.clone();
        let events = self.events.clone();
        let task = runtime.spawn(async move {
            match proxy.speak(&utterance.text).await {
                Ok(()) => events.completed(handle),
                Err(e) => events.errored(handle, e.to_string()),
            }
        });
        self.in_flight.replace(task);
        Ok(())
    }

    fn cancel_all(&self) {
        if self.in_flight.abort() {
            debug!("⏹️ speechd-ng call abandoned, current message will finish");
        }
    }

    fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    fn name(&self) -> &str {
        "speechd_ng"
    }
}
