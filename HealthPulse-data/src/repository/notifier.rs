use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::debug;

/// Per-user change feed.
///
/// Every successful write bumps the user's version; subscribers hold a
/// `watch::Receiver` and re-query the store when it changes. Receivers only
/// ever observe the latest version, so a burst of writes collapses into a
/// single wake-up.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    channels: Arc<Mutex<HashMap<String, watch::Sender<u64>>>>,
}

impl ChangeNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes of a user's metric collection
    pub fn subscribe(&self, user_id: &str) -> watch::Receiver<u64> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| watch::channel(0).0)
            .subscribe()
    }

    /// Signal that a user's metric collection changed
    pub fn notify(&self, user_id: &str) {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels.retain(|_, sender| sender.receiver_count() > 0);

        if let Some(sender) = channels.get(user_id) {
            sender.send_modify(|version| *version += 1);
            debug!("Published change for user {} (version {})", user_id, *sender.borrow());
        }
    }
}
