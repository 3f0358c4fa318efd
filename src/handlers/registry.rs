//! Command registry and dispatch.

use golem_proto::{Command, Message};
use regex::Regex;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span, info};

use super::{ChatContext, CodefallHandler, Handler, MultiplesHandler, StaticReplyHandler};
use crate::config::CommandConfig;
use crate::db::EntryStore;
use crate::network::ChatHandle;
use crate::workers::WorkerPool;

const CODEFALL_PATTERN: &str = r"^codefall(?: (\S+))?$";
const MULT_PATTERN: &str = r"^mult(?:i(?:pl(?:y|es?)?)?)? \$?([0-9]+(?:\.[0-9]{1,2})?)$";
const HELP_PATTERN: &str = r"^help$";
const BINGO_PATTERN: &str = r"^bingo$";

/// A command pattern and the handler it runs.
pub struct Route {
    name: &'static str,
    pattern: Regex,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn new(
        name: &'static str,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            handler,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The argument capture if `command` matches, `""` when the pattern
    /// matched without one.
    fn matches<'a>(&self, command: &'a str) -> Option<&'a str> {
        let caps = self.pattern.captures(command)?;
        Some(caps.get(1).map_or("", |m| m.as_str()))
    }
}

/// Ordered command table. Earlier routes take precedence.
pub struct Registry {
    triggers: Vec<String>,
    routes: Vec<Route>,
    workers: WorkerPool,
}

impl Registry {
    /// Create an empty registry. Empty triggers are ignored.
    pub fn new(triggers: &[String], workers: WorkerPool) -> Self {
        Self {
            triggers: triggers.iter().filter(|t| !t.is_empty()).cloned().collect(),
            routes: Vec::new(),
            workers,
        }
    }

    /// Registry with the bot's command set.
    pub fn with_defaults(
        config: &CommandConfig,
        codefall_url: &str,
        store: Arc<dyn EntryStore>,
    ) -> Result<Self, regex::Error> {
        let workers = WorkerPool::new("commands", config.workers);
        let mut registry = Self::new(&config.triggers, workers);

        registry.register(Route::new(
            "codefall",
            CODEFALL_PATTERN,
            Arc::new(CodefallHandler::new(store, codefall_url)),
        )?);
        registry.register(Route::new("mult", MULT_PATTERN, Arc::new(MultiplesHandler))?);
        registry.register(Route::new(
            "help",
            HELP_PATTERN,
            Arc::new(StaticReplyHandler::help(&config.help_url)),
        )?);
        registry.register(Route::new(
            "bingo",
            BINGO_PATTERN,
            Arc::new(StaticReplyHandler::bingo(&config.bingo_url)),
        )?);

        Ok(registry)
    }

    /// Append a route after all existing ones.
    pub fn register(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// The command text after the first matching trigger.
    pub fn strip_trigger<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.triggers
            .iter()
            .find_map(|trigger| text.strip_prefix(trigger.as_str()))
    }

    /// First route matching `command`, with its argument capture.
    pub fn resolve<'a>(&self, command: &'a str) -> Option<(&Route, &'a str)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(command).map(|args| (route, args)))
    }

    /// Run the handler for a chat line, if it is a command.
    ///
    /// Returns `true` when a handler was scheduled. Private messages, lines
    /// without a trigger and unknown commands are ignored; a saturated pool
    /// sheds the command.
    pub fn dispatch(&self, chat: &ChatHandle, msg: &Message) -> bool {
        let Command::PRIVMSG(channel, text) = &msg.command else {
            return false;
        };
        if !msg.is_public() {
            return false;
        }
        let Some(command) = self.strip_trigger(text) else {
            return false;
        };
        let Some((route, args)) = self.resolve(command) else {
            return false;
        };

        let nick = msg.source_nickname().unwrap_or_default();
        let display_name = msg
            .tag_value("display-name")
            .filter(|name| !name.is_empty())
            .unwrap_or(nick);
        info!(user = %display_name, command = %command, channel = %channel, "Got command");

        let ctx = ChatContext {
            chat: chat.clone(),
            nick: nick.to_string(),
            channel: channel.clone(),
        };
        let handler = Arc::clone(&route.handler);
        let args = args.to_string();
        let span = debug_span!("command", name = route.name(), channel = %channel);

        self.workers.try_spawn(
            async move {
                match handler.handle(&ctx, &args).await {
                    Some(reply) => {
                        ctx.reply(&reply);
                    }
                    None => debug!("No reply"),
                }
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, code};
    use golem_proto::Prefix;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn config() -> CommandConfig {
        CommandConfig::with_triggers(vec!["!".into(), "?".into()])
    }

    fn registry(store: FakeStore) -> Registry {
        Registry::with_defaults(&config(), "https://pump19.eu/codefall", Arc::new(store)).unwrap()
    }

    fn line(nick: &str, target: &str, text: &str) -> Message {
        Message::privmsg(target, text).with_prefix(Prefix::parse(&format!("{nick}!{nick}@host")))
    }

    async fn reply(rx: &mut mpsc::Receiver<Message>) -> Option<String> {
        match tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            Ok(Some(Message {
                command: Command::PRIVMSG(_, text),
                ..
            })) => Some(text),
            _ => None,
        }
    }

    #[test]
    fn trigger_must_lead() {
        let r = registry(FakeStore::new());
        assert_eq!(r.strip_trigger("!codefall"), Some("codefall"));
        assert_eq!(r.strip_trigger("?help"), Some("help"));
        assert_eq!(r.strip_trigger("codefall"), None);
        assert_eq!(r.strip_trigger(" !codefall"), None);
    }

    #[test]
    fn patterns_are_anchored_and_case_sensitive() {
        let r = registry(FakeStore::new());
        assert_eq!(r.resolve("codefall").map(|(route, a)| (route.name(), a)), Some(("codefall", "")));
        assert_eq!(r.resolve("codefall 2").map(|(_, a)| a), Some("2"));
        assert_eq!(r.resolve("codefall abc").map(|(_, a)| a), Some("abc"));
        assert!(r.resolve("Codefall").is_none());
        assert!(r.resolve("codefalls").is_none());
        assert!(r.resolve("help me").is_none());
        assert!(r.resolve("bingo").is_some());
    }

    #[test]
    fn mult_aliases() {
        let r = registry(FakeStore::new());
        for text in ["mult 10", "multi 10", "multiply 10", "multiple 10", "multiples $10.5"] {
            let (route, args) = r.resolve(text).unwrap();
            assert_eq!(route.name(), "mult", "{text}");
            assert!(args == "10" || args == "10.5");
        }
        assert!(r.resolve("multip 10").is_none());
        assert!(r.resolve("mult abc").is_none());
        assert!(r.resolve("mult 1.234").is_none());
    }

    #[test]
    fn first_match_wins() {
        struct Fixed(&'static str);

        #[async_trait::async_trait]
        impl Handler for Fixed {
            async fn handle(&self, _ctx: &ChatContext, _args: &str) -> Option<String> {
                Some(self.0.to_string())
            }
        }

        let mut r = Registry::new(&["!".to_string()], WorkerPool::new("test", 1));
        r.register(Route::new("first", r"^echo(?: (.*))?$", Arc::new(Fixed("first"))).unwrap());
        r.register(Route::new("second", r"^echo (.*)$", Arc::new(Fixed("second"))).unwrap());
        assert_eq!(r.resolve("echo hi").unwrap().0.name(), "first");
    }

    #[tokio::test]
    async fn untriggered_and_private_lines_run_nothing() {
        let r = registry(FakeStore::new());
        let (chat, mut rx) = ChatHandle::new(8);

        assert!(!r.dispatch(&chat, &line("alice", "#pump19", "help")));
        assert!(!r.dispatch(&chat, &line("alice", "pump19", "!help")));
        assert!(!r.dispatch(&chat, &line("alice", "#pump19", "!unknown")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reply_goes_to_origin_channel() {
        let r = registry(FakeStore::new());
        let (chat, mut rx) = ChatHandle::new(8);

        assert!(r.dispatch(&chat, &line("alice", "#pump19", "!help")));
        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#pump19".into(), "Pump19 commands: https://pump19.eu/commands".into())
        );
    }

    #[tokio::test]
    async fn bad_codefall_counts_clamp_to_one() {
        let store = FakeStore::new()
            .with_code("alice", code("Portal 2", "Steam", "k1"))
            .with_code("alice", code("Braid", "GOG", "k2"));
        let limits = store.limits();
        let r = registry(store);
        let (chat, mut rx) = ChatHandle::new(8);

        for text in ["!codefall", "!codefall 0", "!codefall 4", "!codefall abc"] {
            assert!(r.dispatch(&chat, &line("alice", "#pump19", text)));
            assert_eq!(
                reply(&mut rx).await.as_deref(),
                Some("Codefall | Portal 2 (Steam) https://pump19.eu/codefall/k1")
            );
        }
        assert_eq!(*limits.lock(), vec![1, 1, 1, 1]);
    }

    #[tokio::test]
    async fn codefall_uses_sender_nick_not_display_name() {
        let store = FakeStore::new().with_code("alice", code("Portal 2", "Steam", "k1"));
        let r = registry(store);
        let (chat, mut rx) = ChatHandle::new(8);

        let msg = line("alice", "#pump19", "!codefall 2").with_tag("display-name", Some("Alice"));
        assert!(r.dispatch(&chat, &msg));
        assert_eq!(
            reply(&mut rx).await.as_deref(),
            Some("Codefall | Portal 2 (Steam) https://pump19.eu/codefall/k1")
        );
    }

    #[tokio::test]
    async fn oversized_mult_is_silent() {
        let r = registry(FakeStore::new());
        let (chat, mut rx) = ChatHandle::new(8);

        assert!(r.dispatch(&chat, &line("alice", "#pump19", "!mult 1001")));
        assert_eq!(reply(&mut rx).await, None);

        assert!(r.dispatch(&chat, &line("alice", "#pump19", "!mult 10")));
        let text = reply(&mut rx).await.unwrap();
        assert_eq!(text.split(" | ").count(), 13);
    }
}
