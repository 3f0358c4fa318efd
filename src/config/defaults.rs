//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// IRC Defaults
// =============================================================================

pub fn default_irc_port() -> u16 {
    6697
}

// =============================================================================
// Command Defaults
// =============================================================================

pub fn default_command_workers() -> usize {
    16
}

pub fn default_help_url() -> String {
    "https://pump19.eu/commands".to_string()
}

pub fn default_bingo_url() -> String {
    "https://pump19.eu/bingo".to_string()
}

// =============================================================================
// Database Defaults
// =============================================================================

pub fn default_max_connections() -> u32 {
    5
}

// =============================================================================
// Codefall Defaults
// =============================================================================

pub fn default_codefall_url() -> String {
    "https://pump19.eu/codefall".to_string()
}

pub fn default_codefall_channel() -> String {
    "codefall".to_string()
}

pub fn default_keepalive_secs() -> u64 {
    90
}

pub fn default_resolve_workers() -> usize {
    16
}

pub fn default_announce_queue() -> usize {
    64
}
