//! Resume timer for the pause between repeats

use super::{EventSender, SessionId};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Schedules `ResumeDue` events. At most one resumption is pending.
pub trait ResumeTimer: Send + std::fmt::Debug {
    /// Schedule a resume for `session`, replacing any pending one
    fn schedule(&mut self, session: SessionId, delay: Duration);

    /// Drop the pending resume, if any
    fn cancel(&mut self);
}

/// Timer backed by a tokio task that posts into the controller's inbox
#[derive(Debug)]
pub struct TokioResumeTimer {
    events: EventSender,
    pending: Option<JoinHandle<()>>,
}

impl TokioResumeTimer {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            pending: None,
        }
    }
}

impl ResumeTimer for TokioResumeTimer {
    fn schedule(&mut self, session: SessionId, delay: Duration) {
        self.cancel();
        let events = self.events.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            events.resume_due(session);
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            if !task.is_finished() {
                debug!("⏹️ Cancelling pending resume");
            }
            task.abort();
        }
    }
}

impl Drop for TokioResumeTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::ControllerEvent;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (events, mut rx) = EventSender::channel();
        let mut timer = TokioResumeTimer::new(events);
        timer.schedule(SessionId(1), Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().unwrap(), ControllerEvent::ResumeDue(SessionId(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (events, mut rx) = EventSender::channel();
        let mut timer = TokioResumeTimer::new(events);
        timer.schedule(SessionId(1), Duration::from_millis(1000));
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let (events, mut rx) = EventSender::channel();
        let mut timer = TokioResumeTimer::new(events);
        timer.schedule(SessionId(1), Duration::from_millis(1000));
        timer.schedule(SessionId(2), Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(rx.try_recv().unwrap(), ControllerEvent::ResumeDue(SessionId(2)));
        assert!(rx.try_recv().is_err());
    }
}
