use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
}

/// Diagnostic logging flags.
///
/// Both flags are disabled by default: the conditions they describe are
/// degraded-but-safe, not errors, and quiet operation is the norm.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Warn when a superseded commit could not be cancelled because the
    /// scheduling primitive does not support cancellation. Correctness is
    /// preserved either way; the fire handler re-checks state at fire time.
    #[serde(default)]
    pub warn_on_uncancellable_async: bool,

    /// Warn when a field getter runs before the host's live state exists
    /// and has to create it. The getter self-heals, but implicit creation
    /// usually means the host component skipped its own state setup.
    #[serde(default)]
    pub warn_on_implicit_state_init: bool,
}
