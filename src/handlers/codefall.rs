//! `codefall [N]`: list some of the sender's unclaimed entries.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ChatContext, Handler};
use crate::codefall::format_codes;
use crate::db::EntryStore;

const DEFAULT_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 3;

pub struct CodefallHandler {
    store: Arc<dyn EntryStore>,
    base_url: String,
}

impl CodefallHandler {
    pub fn new(store: Arc<dyn EntryStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }
}

/// Requested entry count; anything outside `1..=3` falls back to 1.
pub fn parse_limit(args: &str) -> i64 {
    match args.parse::<i64>() {
        Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
        _ => DEFAULT_LIMIT,
    }
}

#[async_trait]
impl Handler for CodefallHandler {
    async fn handle(&self, ctx: &ChatContext, args: &str) -> Option<String> {
        let codes = self.store.fetch_random(&ctx.nick, parse_limit(args)).await;
        if codes.is_empty() {
            return Some(format!(
                "Could not find any unclaimed codes. Visit {} to add new entries.",
                self.base_url
            ));
        }
        Some(format_codes(&codes, &self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ChatHandle;
    use crate::testing::{FakeStore, code};

    const URL: &str = "https://pump19.eu/codefall";

    fn context(nick: &str) -> ChatContext {
        let (chat, _rx) = ChatHandle::new(1);
        ChatContext {
            chat,
            nick: nick.into(),
            channel: "#pump19".into(),
        }
    }

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(""), 1);
        assert_eq!(parse_limit("2"), 2);
        assert_eq!(parse_limit("3"), 3);
        assert_eq!(parse_limit("0"), 1);
        assert_eq!(parse_limit("4"), 1);
        assert_eq!(parse_limit("-1"), 1);
        assert_eq!(parse_limit("abc"), 1);
    }

    #[tokio::test]
    async fn asks_for_more_than_exist() {
        let store = FakeStore::new()
            .with_code("alice", code("Portal 2", "Steam", "k1"))
            .with_code("bob", code("Braid", "GOG", "k2"));
        let handler = CodefallHandler::new(Arc::new(store), URL);

        let reply = handler.handle(&context("alice"), "2").await.unwrap();
        assert_eq!(reply, "Codefall | Portal 2 (Steam) https://pump19.eu/codefall/k1");
    }

    #[tokio::test]
    async fn nothing_to_show() {
        let handler = CodefallHandler::new(Arc::new(FakeStore::new()), URL);
        let reply = handler.handle(&context("carol"), "").await.unwrap();
        assert_eq!(
            reply,
            "Could not find any unclaimed codes. Visit https://pump19.eu/codefall to add new entries."
        );
    }
}
