//! # golem-proto
//!
//! IRC message parsing and serialization for the golem bot.
//!
//! Covers the client side of the protocol the bot speaks: IRCv3 message tags,
//! prefixes, the handful of commands a bot sends and receives, and numeric
//! replies. Anything else survives a round trip as [`Command::Raw`].
//!
//! ```rust
//! use golem_proto::{Command, Message};
//!
//! let msg: Message = "@display-name=Alice :alice!alice@host PRIVMSG #chan :!help"
//!     .parse()
//!     .unwrap();
//! assert_eq!(msg.tag_value("display-name"), Some("Alice"));
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert!(matches!(msg.command, Command::PRIVMSG(_, _)));
//!
//! let reply = Message::privmsg("#chan", "hello there");
//! assert_eq!(reply.to_string(), "PRIVMSG #chan :hello there\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chan;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;
