//! Core engine modules (§2): path safety, validation, the structured-config
//! store, backup/restore, the transaction orchestrator, and source adapters.
//!
//! ## Module overview
//!
//! - **`path_kernel`**: canonicalizes and confines every path (C1)
//! - **`validation`**: per-kind `Validator`s and the pipeline that runs them (C2)
//! - **`store`**: atomic read/merge/write of the two structured-config documents (C3)
//! - **`backup`**: content-addressed snapshots and deterministic restore (C4)
//! - **`orchestrator`**: plans and executes install/remove/sync transactions (C5)
//! - **`source`**: normalizes a local directory into `Candidate`s (C6)
//! - **`doctor`**: read-only integrity check over an installed scope
//! - **`scope`**: resolves the `User`/`Project` roots every other module writes under
//! - **`candidate`**: `Kind`, `Candidate`, `InstalledRecord`
//! - **`report`**: `Issue`, `ValidationReport`
//! - **`lock`**: the per-scope exclusive advisory file lock
//! - **`config`**: `pacc.toml` and the plugin-subsystem environment gate
//! - **`error`**: the canonical error taxonomy for all engine operations
//! - **`output`**: terminal rendering helpers for the CLI collaborator
//! - **`time`**: timestamp and transaction-id helpers

pub mod backup;
pub mod candidate;
pub mod config;
pub mod doctor;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod output;
pub mod path_kernel;
pub mod report;
pub mod scope;
pub mod source;
pub mod store;
pub mod time;
pub mod validation;
