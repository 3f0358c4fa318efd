//! Chat session loop.
//!
//! Registers with the server, then multiplexes three event sources until
//! the link ends: incoming lines, the outgoing queue fed by [`ChatHandle`]s,
//! and the shutdown broadcast.

use futures_util::{SinkExt, StreamExt};
use golem_proto::line::LineCodec;
use golem_proto::{Command, IrcCodec, Message, ProtocolError};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::ChatHandle;
use crate::config::IrcConfig;
use crate::error::ConnectionError;
use crate::handlers::Registry;
use crate::state::ChannelRegistry;

const TAGS_CAPABILITY: &str = "twitch.tv/tags";
const QUIT_MESSAGE: &str = "Shutting down";

/// One connection's worth of chat state.
pub struct Session {
    irc: IrcConfig,
    commands: Arc<Registry>,
    channels: ChannelRegistry,
    chat: ChatHandle,
}

impl Session {
    pub fn new(
        irc: IrcConfig,
        commands: Arc<Registry>,
        channels: ChannelRegistry,
        chat: ChatHandle,
    ) -> Self {
        Self {
            irc,
            commands,
            channels,
            chat,
        }
    }

    /// Drive the connection until the server closes it, shutdown is
    /// requested, or the transport fails.
    pub async fn run<S>(
        self,
        stream: S,
        outgoing: mpsc::Receiver<Message>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.drive(stream, outgoing, shutdown_rx).await;
        self.chat.set_connected(false);
        result
    }

    async fn drive<S>(
        &self,
        stream: S,
        mut outgoing: mpsc::Receiver<Message>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Lines are parsed here rather than in the codec so one bad line
        // costs a warning instead of a stalled stream.
        let mut framed = Framed::new(stream, LineCodec::new());

        for msg in self.registration() {
            if let Some(line) = wire(&msg) {
                framed.feed(line).await?;
            }
        }
        framed.flush().await?;
        debug!(nick = %self.irc.nick, "Registration sent");

        // A codec error makes the framed stream yield one `None` before it
        // resumes reading; that `None` is not end of stream.
        let mut resuming = false;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Disconnecting from chat");
                    let quit = Message::from(Command::QUIT(Some(QUIT_MESSAGE.to_string())));
                    if let Some(line) = wire(&quit) {
                        framed.send(line).await?;
                    }
                    framed.close().await?;
                    return Ok(());
                }

                Some(msg) = outgoing.recv() => {
                    if let Some(line) = wire(&msg) {
                        framed.send(line).await?;
                    }
                }

                incoming = framed.next() => match incoming {
                    Some(Ok(line)) => {
                        resuming = false;
                        if line.trim().is_empty() {
                            continue;
                        }
                        let msg = match line.parse::<Message>() {
                            Ok(msg) => msg,
                            Err(e) => {
                                warn!(error = %e, "Ignoring malformed line");
                                continue;
                            }
                        };
                        let replies = self.on_message(&msg);
                        if !replies.is_empty() {
                            for reply in &replies {
                                if let Some(line) = wire(reply) {
                                    framed.feed(line).await?;
                                }
                            }
                            framed.flush().await?;
                        }
                    }
                    Some(Err(ProtocolError::Io(e))) => return Err(e.into()),
                    Some(Err(e)) => {
                        warn!(error = %e, "Discarding unreadable line");
                        resuming = true;
                    }
                    None if resuming => resuming = false,
                    None => {
                        info!("Connection closed by server");
                        return Ok(());
                    }
                },
            }
        }
    }

    /// `PASS` (when configured), `NICK`, `USER`.
    fn registration(&self) -> Vec<Message> {
        let nick = &self.irc.nick;
        let mut out = Vec::with_capacity(3);
        if !self.irc.password.is_empty() {
            out.push(Command::PASS(self.irc.password.clone()).into());
        }
        out.push(Command::NICK(nick.clone()).into());
        out.push(Command::USER(nick.clone(), "0".to_string(), nick.clone()).into());
        out
    }

    /// React to one incoming message; returns what must be written back.
    pub fn on_message(&self, msg: &Message) -> Vec<Message> {
        match &msg.command {
            Command::PING(token, _) => vec![Message::pong(token.clone())],

            Command::Response(1, _) => {
                info!(host = %self.irc.host, nick = %self.irc.nick, "Connected to chat");
                self.chat.set_connected(true);

                let mut out = Vec::with_capacity(self.irc.channels.len() + 1);
                if self.irc.request_tags {
                    out.push(Command::CAP("REQ".to_string(), TAGS_CAPABILITY.to_string()).into());
                }
                out.extend(self.irc.channels.iter().map(|c| Message::join(c.clone())));
                out
            }

            Command::JOIN(channel) if self.is_self(msg) => {
                if self.channels.join(channel) {
                    info!(channel = %channel, "Joined channel");
                }
                Vec::new()
            }

            Command::PRIVMSG(..) => {
                self.commands.dispatch(&self.chat, msg);
                Vec::new()
            }

            Command::ERROR(reason) => {
                warn!(reason = %reason, "Server sent ERROR");
                Vec::new()
            }

            _ => Vec::new(),
        }
    }

    fn is_self(&self, msg: &Message) -> bool {
        msg.source_nickname()
            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.irc.nick))
    }
}

/// One outgoing line without its terminator, or `None` (logged) if the
/// message cannot be sent safely.
fn wire(msg: &Message) -> Option<String> {
    match IrcCodec::sanitize(msg.to_string()) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(command = %msg.command.name(), error = %e, "Dropping unsendable message");
            None
        }
    }
}
