//! Fixed-text commands (`help`, `bingo`).

use async_trait::async_trait;

use super::{ChatContext, Handler};

/// Replies with the same text every time.
pub struct StaticReplyHandler {
    text: String,
}

impl StaticReplyHandler {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn help(url: &str) -> Self {
        Self::new(format!("Pump19 commands: {url}"))
    }

    pub fn bingo(url: &str) -> Self {
        Self::new(format!("Play along with LRR Bingo: {url}"))
    }
}

#[async_trait]
impl Handler for StaticReplyHandler {
    async fn handle(&self, _ctx: &ChatContext, _args: &str) -> Option<String> {
        Some(self.text.clone())
    }
}
