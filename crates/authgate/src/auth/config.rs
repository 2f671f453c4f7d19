//! Gate configuration.

use serde::{Deserialize, Serialize};

/// Environment name in which the UI testing bypass may be honoured.
pub const LOCAL_ENVIRONMENT: &str = "local";

/// Process-wide flags read by the gate.
///
/// Injected at construction time; the gate never reads ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Deployment environment name (`local`, `staging`, `production`, ...).
    pub environment_name: String,

    /// Debug mode flag.
    pub debug_enabled: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            environment_name: "production".to_string(),
            debug_enabled: false,
        }
    }
}

impl GateConfig {
    /// Create a gate configuration.
    pub fn new(environment_name: impl Into<String>, debug_enabled: bool) -> Self {
        Self {
            environment_name: environment_name.into(),
            debug_enabled,
        }
    }

    /// Whether this environment permits the mock token.
    ///
    /// The token itself still has to match exactly.
    pub fn allows_bypass(&self) -> bool {
        self.environment_name == LOCAL_ENVIRONMENT && self.debug_enabled
    }
}
