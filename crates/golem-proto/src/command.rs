//! IRC commands understood by the bot.
//!
//! Only the commands a client bot sends or reacts to get a typed variant;
//! every other verb is carried verbatim in [`Command::Raw`].

use std::fmt::{self, Display, Formatter};

/// An IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `PASS <password>`
    PASS(String),
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <user> <mode> <realname>`
    USER(String, String, String),
    /// `CAP <subcommand> :<capabilities>`
    CAP(String, String),
    /// `PING <token> [<server>]`
    PING(String, Option<String>),
    /// `PONG <token> [<server>]`
    PONG(String, Option<String>),
    /// `JOIN <channel>`
    JOIN(String),
    /// `PART <channel> [:<reason>]`
    PART(String, Option<String>),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),
    /// `QUIT [:<reason>]`
    QUIT(Option<String>),
    /// `ERROR :<reason>` sent by servers before closing a link.
    ERROR(String),
    /// Three-digit numeric reply and its parameters.
    Response(u16, Vec<String>),
    /// Any other command, kept as-is.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a verb and its parameters.
    ///
    /// Known verbs with the wrong number of parameters fall back to
    /// [`Command::Raw`] instead of failing, so a noisy server never breaks
    /// the read loop.
    pub fn new(cmd: &str, args: Vec<&str>) -> Command {
        fn owned(s: &str) -> String {
            s.to_owned()
        }

        if cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = cmd.parse::<u16>() {
                return Command::Response(code, args.into_iter().map(owned).collect());
            }
        }

        let upper = cmd.to_ascii_uppercase();
        match (upper.as_str(), args.as_slice()) {
            ("PASS", [pass]) => Command::PASS(owned(pass)),
            ("NICK", [nick]) => Command::NICK(owned(nick)),
            ("USER", [user, mode, _, real]) | ("USER", [user, mode, real]) => {
                Command::USER(owned(user), owned(mode), owned(real))
            }
            ("CAP", [sub, caps]) => Command::CAP(owned(sub), owned(caps)),
            ("PING", [token]) => Command::PING(owned(token), None),
            ("PING", [token, server]) => Command::PING(owned(token), Some(owned(server))),
            ("PONG", [token]) => Command::PONG(owned(token), None),
            ("PONG", [token, server]) => Command::PONG(owned(token), Some(owned(server))),
            ("JOIN", [chan]) => Command::JOIN(owned(chan)),
            ("PART", [chan]) => Command::PART(owned(chan), None),
            ("PART", [chan, reason]) => Command::PART(owned(chan), Some(owned(reason))),
            ("PRIVMSG", [target, text]) => Command::PRIVMSG(owned(target), owned(text)),
            ("NOTICE", [target, text]) => Command::NOTICE(owned(target), owned(text)),
            ("QUIT", []) => Command::QUIT(None),
            ("QUIT", [reason]) => Command::QUIT(Some(owned(reason))),
            ("ERROR", [reason]) => Command::ERROR(owned(reason)),
            _ => Command::Raw(owned(cmd), args.into_iter().map(owned).collect()),
        }
    }

    /// The verb as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            Command::PASS(_) => "PASS",
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::CAP(..) => "CAP",
            Command::PING(..) => "PING",
            Command::PONG(..) => "PONG",
            Command::JOIN(_) => "JOIN",
            Command::PART(..) => "PART",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::QUIT(_) => "QUIT",
            Command::ERROR(_) => "ERROR",
            Command::Response(..) => "",
            Command::Raw(cmd, _) => cmd,
        }
    }
}

/// Write `cmd` followed by `middle` params and an optional trailing param.
///
/// The last param is written in trailing form (`:` prefixed) when it is
/// explicitly trailing, empty, contains a space, or starts with a colon.
fn write_parts(
    f: &mut Formatter<'_>,
    cmd: &str,
    middle: &[&str],
    trailing: Option<&str>,
) -> fmt::Result {
    f.write_str(cmd)?;
    for param in middle {
        write!(f, " {param}")?;
    }
    if let Some(last) = trailing {
        write!(f, " :{last}")?;
    }
    Ok(())
}

fn write_list(f: &mut Formatter<'_>, cmd: &str, params: &[String]) -> fmt::Result {
    let Some((last, middle)) = params.split_last() else {
        return f.write_str(cmd);
    };
    let middle: Vec<&str> = middle.iter().map(String::as_str).collect();
    if last.is_empty() || last.contains(' ') || last.starts_with(':') {
        write_parts(f, cmd, &middle, Some(last.as_str()))
    } else {
        write_parts(f, cmd, &middle, None)?;
        write!(f, " {last}")
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(pass) => write_parts(f, "PASS", &[pass.as_str()], None),
            Command::NICK(nick) => write_parts(f, "NICK", &[nick.as_str()], None),
            Command::USER(user, mode, real) => {
                write_parts(f, "USER", &[user.as_str(), mode.as_str(), "*"], Some(real.as_str()))
            }
            Command::CAP(sub, caps) => write_parts(f, "CAP", &[sub.as_str()], Some(caps.as_str())),
            Command::PING(token, None) => write_parts(f, "PING", &[], Some(token.as_str())),
            Command::PING(token, Some(server)) => {
                write_parts(f, "PING", &[token.as_str()], Some(server.as_str()))
            }
            Command::PONG(token, None) => write_parts(f, "PONG", &[], Some(token.as_str())),
            Command::PONG(token, Some(server)) => {
                write_parts(f, "PONG", &[token.as_str()], Some(server.as_str()))
            }
            Command::JOIN(chan) => write_parts(f, "JOIN", &[chan.as_str()], None),
            Command::PART(chan, reason) => {
                write_parts(f, "PART", &[chan.as_str()], reason.as_deref())
            }
            Command::PRIVMSG(target, text) => {
                write_parts(f, "PRIVMSG", &[target.as_str()], Some(text.as_str()))
            }
            Command::NOTICE(target, text) => {
                write_parts(f, "NOTICE", &[target.as_str()], Some(text.as_str()))
            }
            Command::QUIT(reason) => write_parts(f, "QUIT", &[], reason.as_deref()),
            Command::ERROR(reason) => write_parts(f, "ERROR", &[], Some(reason.as_str())),
            Command::Response(code, params) => write_list(f, &format!("{code:03}"), params),
            Command::Raw(cmd, params) => write_list(f, cmd, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_becomes_response() {
        let cmd = Command::new("001", vec!["golem", "Welcome, GLHF!"]);
        assert_eq!(
            cmd,
            Command::Response(1, vec!["golem".into(), "Welcome, GLHF!".into()])
        );
        assert_eq!(cmd.to_string(), "001 golem :Welcome, GLHF!");
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(
            Command::new("privmsg", vec!["#c", "hi"]),
            Command::PRIVMSG("#c".into(), "hi".into())
        );
    }

    #[test]
    fn wrong_arity_falls_back_to_raw() {
        let cmd = Command::new("PRIVMSG", vec!["#c"]);
        assert_eq!(cmd, Command::Raw("PRIVMSG".into(), vec!["#c".into()]));
    }

    #[test]
    fn cap_ack_from_server_is_raw() {
        let cmd = Command::new("CAP", vec!["*", "ACK", "twitch.tv/tags"]);
        assert_eq!(cmd.name(), "CAP");
        assert_eq!(cmd.to_string(), "CAP * ACK twitch.tv/tags");
    }

    #[test]
    fn outgoing_forms() {
        assert_eq!(
            Command::CAP("REQ".into(), "twitch.tv/tags".into()).to_string(),
            "CAP REQ :twitch.tv/tags"
        );
        assert_eq!(
            Command::USER("golem".into(), "0".into(), "golem bot".into()).to_string(),
            "USER golem 0 * :golem bot"
        );
        assert_eq!(
            Command::PONG("tmi.twitch.tv".into(), None).to_string(),
            "PONG :tmi.twitch.tv"
        );
        assert_eq!(Command::QUIT(None).to_string(), "QUIT");
        assert_eq!(Command::JOIN("#pump19".into()).to_string(), "JOIN #pump19");
    }
}
