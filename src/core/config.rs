//! Engine configuration: `pacc.toml` plus the one environment flag the
//! engine reads directly (§6, §10.3).

use serde::Deserialize;
use std::path::Path;

const PLUGINS_ENV_VAR: &str = "PACC_ENABLE_PLUGINS";

/// Caller-configured options threaded through a transaction. Distinct from
/// per-invocation `Options` (force/strict) in that this covers engine-wide
/// defaults loaded once at startup; a CLI collaborator overlays per-run flags
/// on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Promote validation warnings to errors.
    pub strict: bool,
    /// Accept conflicting content hashes on install/update.
    pub force: bool,
    /// Budget for `ScopeLock::acquire`, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict: false,
            force: false,
            lock_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Load `pacc.toml` from `dir` if present; absence is not an error.
    pub fn load(dir: &Path) -> Result<Self, crate::core::error::PaccError> {
        let path = dir.join("pacc.toml");
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(toml::from_str(&text).map_err(|e| {
                crate::core::error::PaccError::Validation(crate::core::error::ValidationError::SchemaViolation(
                    format!("malformed {}: {e}", path.display()),
                ))
            })?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn lock_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lock_timeout_ms)
    }

    /// `Plugin` Kind is active only when this env flag is truthy (§6):
    /// `1`, `true`, or `yes`, case-insensitively for the letter forms.
    pub fn plugins_enabled() -> bool {
        std::env::var(PLUGINS_ENV_VAR)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }
}
