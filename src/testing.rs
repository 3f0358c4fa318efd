//! In-memory stand-ins for the store and its subscription.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use crate::codefall::{Notification, NotificationSource};
use crate::db::{Code, EntryStore};

pub fn code(description: &str, code_type: &str, key: &str) -> Code {
    Code {
        description: description.into(),
        code_type: code_type.into(),
        key: key.into(),
    }
}

/// Entry store over a fixed list of `(owner, code)` pairs.
#[derive(Default)]
pub struct FakeStore {
    entries: Vec<(String, Code)>,
    limits: Arc<Mutex<Vec<i64>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, owner: &str, code: Code) -> Self {
        self.entries.push((owner.to_string(), code));
        self
    }

    /// Limits passed to `fetch_random`, in call order.
    pub fn limits(&self) -> Arc<Mutex<Vec<i64>>> {
        Arc::clone(&self.limits)
    }
}

#[async_trait]
impl EntryStore for FakeStore {
    async fn fetch_by_key(&self, key: &str) -> Option<Code> {
        self.entries
            .iter()
            .find(|(_, code)| code.key == key)
            .map(|(_, code)| code.clone())
    }

    async fn fetch_random(&self, owner: &str, limit: i64) -> Vec<Code> {
        self.limits.lock().push(limit);
        self.entries
            .iter()
            .filter(|(o, _)| o == owner)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(_, code)| code.clone())
            .collect()
    }
}

/// Notification source fed from a channel; counts pings.
pub struct FakeSource {
    rx: mpsc::UnboundedReceiver<Notification>,
    pings: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            rx,
            pings: Arc::new(AtomicUsize::new(0)),
        };
        (source, tx)
    }

    pub fn pings(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pings)
    }
}

#[async_trait]
impl NotificationSource for FakeSource {
    async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    fn ping(&self) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }
}
