//! Shared entities: `Kind`, `Candidate`, `InstalledRecord`.

use crate::core::scope::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// The category of an extension. `Plugin` is a container over the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Kind {
    Hook,
    McpServer,
    Agent,
    Command,
    Plugin,
}

impl Kind {
    /// All non-container kinds, in declaration order.
    pub const COMPONENT_KINDS: [Kind; 4] = [Kind::Hook, Kind::McpServer, Kind::Agent, Kind::Command];

    /// Key used in the preferences/engine-state documents (§6).
    pub fn prefs_key(&self) -> &'static str {
        match self {
            Kind::Hook => "hooks",
            Kind::McpServer => "mcpServers",
            Kind::Agent => "agents",
            Kind::Command => "commands",
            Kind::Plugin => "plugins",
        }
    }

    /// Directory a `Kind`'s installed files live under, relative to a scope root.
    pub fn dir_name(&self) -> &'static str {
        self.prefs_key()
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefs_key())
    }
}

/// Where an `InstalledRecord` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Git,
    Url,
    Plugin,
}

/// A not-yet-committed extension produced by a source adapter (C6), after
/// classification by the validation pipeline (C2).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source_path: PathBuf,
    pub kind: Kind,
    pub logical_name: String,
    pub declared_version: Option<String>,
    pub content_hash: String,
    /// Normalized file bytes, ready to be copied into the scope root.
    pub content: Vec<u8>,
    /// Parsed body used by validators (JSON object for Hook/McpServer, the
    /// metadata-block map plus body for Agent/Command, manifest for Plugin).
    pub metadata: JsonValue,
}

/// The authoritative record of an installed extension: present in both the
/// structured-config store and on disk, required to agree (invariant 1, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledRecord {
    pub kind: Kind,
    pub logical_name: String,
    pub scope: Scope,
    /// Relative to the scope root.
    pub install_path: PathBuf,
    pub origin: Origin,
    pub origin_ref: Option<String>,
    pub content_hash: String,
    pub installed_at: String,
    pub version: Option<String>,
}
