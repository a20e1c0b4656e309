//! Status and progress reporting.
//!
//! Pipeline stages never draw anything themselves. They push [`StatusEvent`]s
//! into a [`StatusSender`], and exactly one consumer owns the
//! [`StatusReceiver`] and renders the events (a terminal progress bar in the
//! CLI, a `Vec` in tests). This keeps every presentation update on a single
//! task no matter which thread a network or blocking callback runs on.
//!
//! ```rust
//! use tor_browser_launcher::status::{StatusEvent, StatusSender};
//!
//! let (sender, mut receiver) = StatusSender::channel();
//! sender.status("Getting update URL.");
//! sender.progress(512, Some(1024));
//!
//! assert_eq!(receiver.drain_statuses(), vec!["Getting update URL.".to_string()]);
//! ```

use tokio::sync::mpsc;
use tracing::info;

/// One presentation update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Human-readable description of the step about to run.
    Status(String),
    /// Bytes written so far and total bytes, when the server announced them.
    Progress {
        /// Bytes written so far
        written: u64,
        /// Expected total
        expected: Option<u64>,
    },
}

/// Producer side of the status channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: Option<mpsc::UnboundedSender<StatusEvent>>,
}

impl StatusSender {
    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, StatusReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(tx),
            },
            StatusReceiver {
                rx,
            },
        )
    }

    /// A sender whose events are only logged.
    pub fn disconnected() -> Self {
        Self {
            tx: None,
        }
    }

    /// Report the step about to run.
    pub fn status(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.send(StatusEvent::Status(message));
    }

    /// Report transfer progress.
    pub fn progress(&self, written: u64, expected: Option<u64>) {
        self.send(StatusEvent::Progress {
            written,
            expected,
        });
    }

    fn send(&self, event: StatusEvent) {
        if let Some(tx) = &self.tx {
            // The consumer going away must not fail the pipeline.
            let _ = tx.send(event);
        }
    }
}

/// Consumer side of the status channel.
#[derive(Debug)]
pub struct StatusReceiver {
    rx: mpsc::UnboundedReceiver<StatusEvent>,
}

impl StatusReceiver {
    /// Wait for the next event. `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<StatusEvent> {
        self.rx.recv().await
    }

    /// Take every event queued so far without waiting.
    pub fn drain(&mut self) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Like [`drain`](Self::drain) but keeps only status messages.
    pub fn drain_statuses(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                StatusEvent::Status(message) => Some(message),
                StatusEvent::Progress {
                    ..
                } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sender, mut receiver) = StatusSender::channel();
        sender.status("one");
        sender.progress(1, None);
        sender.status("two");

        assert_eq!(
            receiver.drain(),
            vec![
                StatusEvent::Status("one".to_string()),
                StatusEvent::Progress {
                    written: 1,
                    expected: None
                },
                StatusEvent::Status("two".to_string()),
            ]
        );
    }

    #[test]
    fn test_disconnected_sender_does_not_panic() {
        let sender = StatusSender::disconnected();
        sender.status("nobody listens");
        sender.progress(10, Some(20));
    }

    #[test]
    fn test_dropped_receiver_does_not_panic() {
        let (sender, receiver) = StatusSender::channel();
        drop(receiver);
        sender.status("late");
    }

    #[tokio::test]
    async fn test_recv_ends_when_senders_dropped() {
        let (sender, mut receiver) = StatusSender::channel();
        let clone = sender.clone();
        clone.status("from clone");
        drop(sender);
        drop(clone);

        assert_eq!(receiver.recv().await, Some(StatusEvent::Status("from clone".to_string())));
        assert_eq!(receiver.recv().await, None);
    }
}
