//! Registry of joined channels.

use parking_lot::RwLock;
use std::sync::Arc;

/// Channels the bot occupies, in join order.
///
/// Append-only: the connection task records each confirmed join, the
/// announcement dispatcher reads snapshots. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<RwLock<Vec<String>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a joined channel. Returns `false` if it was already known.
    pub fn join(&self, channel: &str) -> bool {
        let mut channels = self.channels.write();
        if channels.iter().any(|c| c.eq_ignore_ascii_case(channel)) {
            return false;
        }
        channels.push(channel.to_string());
        true
    }

    /// Copy of the current channel list.
    pub fn snapshot(&self) -> Vec<String> {
        self.channels.read().clone()
    }

    #[cfg(test)]
    pub fn contains(&self, channel: &str) -> bool {
        self.channels
            .read()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(channel))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_keep_order() {
        let registry = ChannelRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.join("#loadingreadyrun"));
        assert!(registry.join("#pump19"));
        assert_eq!(registry.snapshot(), vec!["#loadingreadyrun", "#pump19"]);
    }

    #[test]
    fn rejoin_is_a_noop() {
        let registry = ChannelRegistry::new();
        registry.join("#pump19");
        assert!(!registry.join("#pump19"));
        assert!(!registry.join("#Pump19"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("#PUMP19"));
    }

    #[test]
    fn clones_share_state() {
        let registry = ChannelRegistry::new();
        let reader = registry.clone();
        registry.join("#pump19");
        assert_eq!(reader.snapshot(), vec!["#pump19"]);
    }
}
