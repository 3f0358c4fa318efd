//! Codefall: announcing newly added giveaway entries.
//!
//! A [`NotificationListener`] waits on the store's pub/sub channel, resolves
//! each notified key to a [`Code`] and queues it; the [`Announcer`] drains
//! that queue into every joined channel.

mod announce;
mod listener;

pub use announce::Announcer;
pub use listener::NotificationListener;

use async_trait::async_trait;

use crate::db::Code;

/// A pub/sub event: the channel it arrived on and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
}

/// A live subscription delivering [`Notification`]s.
#[async_trait]
pub trait NotificationSource: Send {
    /// Next notification. Transport errors are handled (and retried) by the
    /// implementation; `None` means the source is gone for good.
    ///
    /// Must be cancel-safe: the listener drops this future on idle timeout.
    async fn recv(&mut self) -> Option<Notification>;

    /// Request a keepalive round trip on an idle subscription. Returns
    /// without waiting for it.
    fn ping(&self);
}

/// `Codefall | desc (type) url/key | desc (type) url/key ...`
pub fn format_codes(codes: &[Code], base_url: &str) -> String {
    let mut text = String::from("Codefall");
    for code in codes {
        text.push_str(&format!(
            " | {} ({}) {}",
            code.description,
            code.code_type,
            code.link(base_url)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::code;

    #[test]
    fn single_entry() {
        assert_eq!(
            format_codes(&[code("Portal 2", "Steam", "k1")], "https://pump19.eu/codefall"),
            "Codefall | Portal 2 (Steam) https://pump19.eu/codefall/k1"
        );
    }

    #[test]
    fn several_entries_share_one_prefix() {
        let codes = [code("Portal 2", "Steam", "k1"), code("Braid", "GOG", "k2")];
        assert_eq!(
            format_codes(&codes, "https://pump19.eu/codefall"),
            "Codefall | Portal 2 (Steam) https://pump19.eu/codefall/k1 \
             | Braid (GOG) https://pump19.eu/codefall/k2"
        );
    }
}
