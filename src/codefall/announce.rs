//! Announcement dispatcher.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::format_codes;
use crate::db::Code;
use crate::network::ChatHandle;
use crate::state::ChannelRegistry;

/// Posts each resolved entry to every joined channel.
pub struct Announcer {
    registry: ChannelRegistry,
    chat: ChatHandle,
    base_url: String,
}

impl Announcer {
    pub fn new(registry: ChannelRegistry, chat: ChatHandle, base_url: impl Into<String>) -> Self {
        Self {
            registry,
            chat,
            base_url: base_url.into(),
        }
    }

    /// Drain the queue until every sender is gone.
    pub async fn run(self, mut rx: mpsc::Receiver<Code>) {
        while let Some(code) = rx.recv().await {
            self.announce(&code);
        }
        debug!("Announcement queue closed");
    }

    /// Queue the announcement for each channel. Returns how many were queued.
    pub fn announce(&self, code: &Code) -> usize {
        if !self.chat.is_connected() {
            debug!(key = %code.key, "Not connected, skipping announcement");
            return 0;
        }

        let channels = self.registry.snapshot();
        if channels.is_empty() {
            return 0;
        }

        let text = format_codes(std::slice::from_ref(code), &self.base_url);
        let sent = channels
            .iter()
            .filter(|channel| self.chat.say(channel, &text))
            .count();
        info!(description = %code.description, channels = sent, "Announced codefall entry");
        sent
    }
}
