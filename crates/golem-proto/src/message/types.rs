use crate::chan::ChannelExt;
use crate::command::Command;
use crate::prefix::Prefix;

/// An IRCv3 message tag: key and optional (unescaped) value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tag(pub String, pub Option<String>);

impl Tag {
    /// Create a tag from a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(key.into(), value)
    }
}

/// An owned IRC message.
///
/// ```
/// use golem_proto::Message;
///
/// let msg: Message = ":alice!alice@host PRIVMSG #pump19 :!codefall 2".parse().unwrap();
/// assert!(msg.is_public());
/// assert_eq!(msg.response_target(), Some("#pump19"));
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// IRCv3 message tags.
    pub tags: Option<Vec<Tag>>,
    /// Message source.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Nickname from the prefix, if the source is a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Value of a tag by key. Keys present without a value yield `None`.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// Whether this is a PRIVMSG or NOTICE addressed to a channel.
    pub fn is_public(&self) -> bool {
        match &self.command {
            Command::PRIVMSG(target, _) | Command::NOTICE(target, _) => target.is_channel_name(),
            _ => false,
        }
    }

    /// Where a reply should go: the channel for public messages, the
    /// sender's nick otherwise.
    pub fn response_target(&self) -> Option<&str> {
        match &self.command {
            Command::PRIVMSG(target, _) | Command::NOTICE(target, _)
                if target.is_channel_name() =>
            {
                Some(target.as_str())
            }
            _ => self.source_nickname(),
        }
    }

    /// Attach a tag, creating the tag list if needed.
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: Option<&str>) -> Self {
        self.tags
            .get_or_insert_with(Vec::new)
            .push(Tag::new(key, value.map(str::to_owned)));
        self
    }

    /// Set the message source.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// `PRIVMSG <target> :<text>`
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// `JOIN <channel>`
    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into()).into()
    }

    /// `PONG :<token>`
    #[must_use]
    pub fn pong(token: impl Into<String>) -> Self {
        Command::PONG(token.into(), None).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            tags: None,
            prefix: None,
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_message_is_not_public() {
        let msg = Message::privmsg("golem", "!help").with_prefix(Prefix::parse("a!a@h"));
        assert!(!msg.is_public());
        assert_eq!(msg.response_target(), Some("a"));
    }

    #[test]
    fn tag_without_value() {
        let msg = Message::privmsg("#c", "x")
            .with_tag("flag", None)
            .with_tag("display-name", Some("Alice"));
        assert_eq!(msg.tag_value("flag"), None);
        assert_eq!(msg.tag_value("display-name"), Some("Alice"));
        assert_eq!(msg.tag_value("missing"), None);
    }
}
