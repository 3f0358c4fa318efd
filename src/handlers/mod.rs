//! Chat command handlers.
//!
//! The [`Registry`] strips a trigger prefix from public channel lines,
//! picks the first matching command pattern and runs that command's
//! [`Handler`] on a bounded worker pool.

mod codefall;
mod info;
mod mult;
mod registry;

pub use codefall::CodefallHandler;
pub use info::StaticReplyHandler;
pub use mult::MultiplesHandler;
pub use registry::Registry;

use async_trait::async_trait;

use crate::network::ChatHandle;

/// Per-line context handed to a handler.
#[derive(Debug, Clone)]
pub struct ChatContext {
    /// Connection the reply goes out on.
    pub chat: ChatHandle,
    /// Nickname of the sender.
    pub nick: String,
    /// Channel the command was sent to.
    pub channel: String,
}

impl ChatContext {
    /// Send `text` to the originating channel.
    pub fn reply(&self, text: &str) -> bool {
        self.chat.say(&self.channel, text)
    }
}

/// A chat command implementation.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Produce the reply for `args` (the pattern's capture, empty if none),
    /// or `None` to stay silent.
    async fn handle(&self, ctx: &ChatContext, args: &str) -> Option<String>;
}
