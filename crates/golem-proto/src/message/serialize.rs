use std::fmt::{self, Display, Formatter};

use super::tags::escape_tag_value;
use super::types::Message;

/// Renders the full wire line, including the trailing CRLF.
impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(tags) = &self.tags {
            f.write_str("@")?;
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    f.write_str(";")?;
                }
                f.write_str(&tag.0)?;
                if let Some(value) = &tag.1 {
                    f.write_str("=")?;
                    escape_tag_value(f, value)?;
                }
            }
            f.write_str(" ")?;
        }

        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }

        write!(f, "{}\r\n", self.command)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Command, Message, Prefix};

    #[test]
    fn plain_privmsg() {
        assert_eq!(
            Message::privmsg("#pump19", "Codefall | Game (Steam) https://x/y").to_string(),
            "PRIVMSG #pump19 :Codefall | Game (Steam) https://x/y\r\n"
        );
    }

    #[test]
    fn tags_and_prefix_are_written_in_order() {
        let msg = Message::from(Command::JOIN("#c".into()))
            .with_tag("display-name", Some("A B"))
            .with_prefix(Prefix::parse("a!a@h"));
        assert_eq!(msg.to_string(), "@display-name=A\\sB :a!a@h JOIN #c\r\n");
    }
}
