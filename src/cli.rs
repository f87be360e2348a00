//! CLI struct definitions for the `pacc` command-line interface.
//!
//! All clap-derived types live here; dispatch logic lives in `main.rs`. The
//! engine itself is a library with no CLI awareness (§1 Out of scope) — this
//! module is the thin front end that turns argv into the engine's own types
//! and renders its structured results.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "pacc",
    version = env!("CARGO_PKG_VERSION"),
    about = "Installs, lists, removes, updates, and team-synchronizes hooks, MCP servers, agents, commands, and plugins for an AI coding assistant."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Operate on the user-home scope instead of the project scope.
    #[clap(long, global = true)]
    pub user: bool,

    /// Promote validation warnings to errors.
    #[clap(long, global = true)]
    pub strict: bool,

    /// Accept a conflicting content hash instead of aborting.
    #[clap(long, global = true)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install extensions from a local source directory.
    Install {
        /// Path to a directory containing candidate extensions, or a plugin manifest.
        source: PathBuf,
    },
    /// Remove an installed extension by kind and logical name.
    Remove {
        /// One of hook, mcp-server, agent, command, plugin.
        kind: String,
        /// The extension's logical name.
        name: String,
    },
    /// List installed extensions in a scope.
    List {
        /// Restrict the listing to one kind.
        #[clap(long)]
        kind: Option<String>,
    },
    /// Show the full record for one installed extension.
    Show {
        kind: String,
        name: String,
    },
    /// Reconcile a scope against a declarative source directory.
    Sync {
        source: PathBuf,
    },
    /// Verify that every Installed Record's file hashes to its recorded content_hash.
    Doctor,
}
