//! Shared runtime state.
//!
//! - [`ChannelRegistry`]: channels the bot occupies
//! - [`LifecycleManager`]: process-wide shutdown signal

mod channels;
mod lifecycle;

pub use channels::ChannelRegistry;
pub use lifecycle::LifecycleManager;
