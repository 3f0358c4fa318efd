//! Cloneable handle for sending on the chat connection.

use golem_proto::Message;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Sender side of the connection's outgoing queue.
///
/// Sends never wait on the socket: messages are queued and written by the
/// session loop. `is_connected` turns true once the server has welcomed us
/// and false again when the session ends.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    tx: mpsc::Sender<Message>,
    connected: Arc<AtomicBool>,
}

impl ChatHandle {
    /// Create a handle and the receiver the session loop drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = Self {
            tx,
            connected: Arc::new(AtomicBool::new(false)),
        };
        (handle, rx)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Queue a message. Returns `false` (and logs) if it was dropped.
    pub fn send(&self, msg: Message) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(msg)) => {
                warn!(command = %msg.command.name(), "Outgoing queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Queue `PRIVMSG <target> :<text>`.
    pub fn say(&self, target: &str, text: &str) -> bool {
        self.send(Message::privmsg(target, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use golem_proto::Command;

    #[tokio::test]
    async fn say_queues_privmsg() {
        let (chat, mut rx) = ChatHandle::new(4);
        assert!(chat.say("#pump19", "hello"));
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.command, Command::PRIVMSG("#pump19".into(), "hello".into()));
    }

    #[test]
    fn full_queue_drops() {
        let (chat, _rx) = ChatHandle::new(1);
        assert!(chat.say("#a", "one"));
        assert!(!chat.say("#a", "two"));
    }

    #[test]
    fn connected_flag_is_shared() {
        let (chat, _rx) = ChatHandle::new(1);
        let other = chat.clone();
        assert!(!other.is_connected());
        chat.set_connected(true);
        assert!(other.is_connected());
    }
}
