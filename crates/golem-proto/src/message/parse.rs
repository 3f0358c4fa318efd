//! `FromStr` for [`Message`], built on nom combinators.
//!
//! Wire format: `[@tags ][:prefix ]<command>[ params][ :trailing]`.

use std::str::FromStr;

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use super::tags::unescape_tag_value;
use super::types::{Message, Tag};
use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// Upper bound on middle + trailing params, per RFC 2812.
const MAX_PARAMS: usize = 15;

fn tags_section(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_till1(|c: char| c == ' '))(input)
}

fn prefix_section(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_till1(|c: char| c == ' '))(input)
}

fn command_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

/// Tags, prefix and verb: everything before the parameters.
fn message_head(input: &str) -> IResult<&str, (Option<&str>, Option<&str>, &str)> {
    let (input, tags) = opt(tags_section)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(prefix_section)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = command_word(input)?;
    Ok((input, (tags, prefix, command)))
}

/// Split the parameter section. Runs of spaces count as one separator.
fn params_section(mut rest: &str) -> Vec<&str> {
    let mut params = Vec::new();

    while params.len() < MAX_PARAMS {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }
        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

fn split_tags(raw: &str) -> Vec<Tag> {
    raw.split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| match tag.split_once('=') {
            Some((key, value)) => Tag::new(key, Some(unescape_tag_value(value))),
            None => Tag::new(tag, None),
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let line = s.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let (rest, (tags, prefix, command)) = message_head(line).map_err(|err| {
            let position = match &err {
                nom::Err::Error(e) | nom::Err::Failure(e) => line.len() - e.input.len(),
                nom::Err::Incomplete(_) => line.len(),
            };
            invalid(MessageParseError::InvalidCommand(position))
        })?;

        // A parameter section must be separated from the verb by a space.
        if !rest.is_empty() && !rest.starts_with(' ') {
            return Err(invalid(MessageParseError::InvalidCommand(
                line.len() - rest.len(),
            )));
        }

        Ok(Message {
            tags: tags.map(split_tags),
            prefix: prefix.map(Prefix::parse),
            command: Command::new(command, params_section(rest)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_from_server() {
        let msg: Message = "PING :tmi.twitch.tv\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("tmi.twitch.tv".into(), None));
        assert!(msg.prefix.is_none());
    }

    #[test]
    fn twitch_privmsg_with_tags() {
        let raw = "@badge-info=;display-name=Pump\\s19;mod=0 :pump19!pump19@pump19.tmi.twitch.tv PRIVMSG #pump19 :!mult 10";
        let msg: Message = raw.parse().unwrap();
        assert_eq!(msg.tag_value("display-name"), Some("Pump 19"));
        assert_eq!(msg.tag_value("badge-info"), Some(""));
        assert_eq!(msg.source_nickname(), Some("pump19"));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#pump19".into(), "!mult 10".into())
        );
    }

    #[test]
    fn repeated_spaces_between_params() {
        let msg: Message = ":a!a@h JOIN   #chan".parse().unwrap();
        assert_eq!(msg.command, Command::JOIN("#chan".into()));
    }

    #[test]
    fn trailing_may_be_empty() {
        let msg: Message = ":a!a@h PRIVMSG #chan :".parse().unwrap();
        assert_eq!(msg.command, Command::PRIVMSG("#chan".into(), String::new()));
    }

    #[test]
    fn numeric_reply() {
        let msg: Message = ":tmi.twitch.tv 001 golem :Welcome, GLHF!".parse().unwrap();
        assert!(matches!(msg.command, Command::Response(1, _)));
        assert_eq!(msg.prefix, Some(Prefix::ServerName("tmi.twitch.tv".into())));
    }

    #[test]
    fn empty_line_is_rejected() {
        let err = "\r\n".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::EmptyMessage,
                ..
            }
        ));
    }

    #[test]
    fn missing_command_is_rejected() {
        assert!(":only.a.prefix".parse::<Message>().is_err());
        assert!("@a=b".parse::<Message>().is_err());
        assert!("PRIV-MSG #x :y".parse::<Message>().is_err());
    }
}
