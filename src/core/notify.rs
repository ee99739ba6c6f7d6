//! Outcome notifications for mutating store calls
//!
//! The store reports every create/update/delete outcome to an optional
//! [`Notifier`] injected at construction. A UI typically forwards these to a
//! toast area; headless callers can use [`TracingNotifier`] or subscribe to a
//! [`ChannelNotifier`].
//!
//! ```rust,ignore
//! let notifier = ChannelNotifier::new(64);
//! let mut rx = notifier.subscribe();
//! let store = RemoteSyncStore::new(resource, transport).with_notifier(Arc::new(notifier));
//!
//! store.delete(&id).await?;
//! if let Ok(n) = rx.recv().await {
//!     println!("{}: {}", n.kind, n.message);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    Success,
    Error,
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyKind::Success => f.write_str("success"),
            NotifyKind::Error => f.write_str("error"),
        }
    }
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotifyKind,
}

/// Receiver of mutation outcomes
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotifyKind);
}

impl<F> Notifier for F
where
    F: Fn(&str, NotifyKind) + Send + Sync,
{
    fn notify(&self, message: &str, kind: NotifyKind) {
        self(message, kind)
    }
}

/// Reports outcomes as log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NotifyKind) {
        match kind {
            NotifyKind::Success => tracing::info!(kind = %kind, "{}", message),
            NotifyKind::Error => tracing::warn!(kind = %kind, "{}", message),
        }
    }
}

/// Fans notifications out to any number of subscribers
///
/// Publishing never blocks; with no subscribers the notification is dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, kind: NotifyKind) {
        let _ = self.sender.send(Notification {
            message: message.to_string(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_notifier() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let notifier = move |message: &str, kind: NotifyKind| {
            sink.lock().unwrap().push((message.to_string(), kind));
        };

        notifier.notify("Supplier created", NotifyKind::Success);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("Supplier created".to_string(), NotifyKind::Success));
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let notifier = ChannelNotifier::new(8);
        let mut rx = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.notify("boom", NotifyKind::Error);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "boom");
        assert_eq!(received.kind, NotifyKind::Error);
    }

    #[test]
    fn test_channel_notifier_without_subscribers() {
        let notifier = ChannelNotifier::new(0);
        notifier.notify("dropped", NotifyKind::Success);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NotifyKind::Success.to_string(), "success");
        assert_eq!(NotifyKind::Error.to_string(), "error");
    }
}
