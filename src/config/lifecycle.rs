//! Lifecycle ledger configuration

use serde::Deserialize;

use crate::domain::lifecycle::PostTerminalPolicy;

/// Lifecycle configuration
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LifecycleConfig {
    /// What may be appended after a terminal status
    #[serde(default)]
    pub post_terminal_policy: PostTerminalPolicy,
}
