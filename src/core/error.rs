//! Error types for PACC operations.
//!
//! This module defines the canonical error type used throughout the engine.
//! All subsystems return `Result<T, PaccError>` for error handling.

use std::io;
use thiserror::Error;

/// Path-safety failures raised by the canonicalization kernel (`core::path_kernel`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path escapes root: {0}")]
    Traversal(String),
    #[error("symlink resolution exceeded depth limit at {0}")]
    SymlinkLoop(String),
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("resolved path is outside its scope root: {0}")]
    OutsideRoot(String),
}

/// Extension-name validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("invalid name {0:?}")]
    Invalid(String),
    #[error("reserved name {0:?}")]
    Reserved(String),
    #[error("duplicate name {0:?}")]
    Duplicate(String),
}

/// Validation-pipeline failures (C2). These carry a stable code so the CLI
/// collaborator can render actionable diagnostics without parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("could not determine extension kind for {0}")]
    UndetectableKind(String),
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("duplicate logical name {0:?} within source")]
    DuplicateInSource(String),
}

/// Conflicts raised while planning a transaction (C5).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("{logical_name} already installed with a different content hash")]
    ConflictExists { logical_name: String },
    #[error("version mismatch for {logical_name}: expected {expected}, found {found}")]
    VersionMismatch {
        logical_name: String,
        expected: String,
        found: String,
    },
}

/// On-disk consistency failures (C3/C4).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("{path} hashes to {actual}, expected {expected}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("journal is corrupt: {0}")]
    JournalCorrupt(String),
}

/// Canonical error type for all PACC operations.
///
/// Uses `thiserror` for automatic `Display`/`Error` impls. Variants auto-convert
/// from the narrower taxonomies above via `#[from]`, mirroring the way spec §7's
/// taxonomy nests (PathError/NameError/... each carry their own codes).
#[derive(Error, Debug)]
pub enum PaccError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is busy")]
    ScopeBusy(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl PaccError {
    /// Stable error code for CLI rendering, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            PaccError::Path(PathError::Traversal(_)) => "PATH_TRAVERSAL",
            PaccError::Path(PathError::SymlinkLoop(_)) => "SYMLINK_LOOP",
            PaccError::Path(PathError::NotFound(_)) => "PATH_NOT_FOUND",
            PaccError::Path(PathError::OutsideRoot(_)) => "OUTSIDE_ROOT",
            PaccError::Name(NameError::Invalid(_)) => "NAME_INVALID",
            PaccError::Name(NameError::Reserved(_)) => "NAME_RESERVED",
            PaccError::Name(NameError::Duplicate(_)) => "NAME_DUPLICATE",
            PaccError::Validation(ValidationError::SchemaViolation(_)) => "SCHEMA_VIOLATION",
            PaccError::Validation(ValidationError::InvalidReference(_)) => "INVALID_REFERENCE",
            PaccError::Validation(ValidationError::UndetectableKind(_)) => "UNDETECTABLE_KIND",
            PaccError::Validation(ValidationError::UnknownField(_)) => "UNKNOWN_FIELD",
            PaccError::Validation(ValidationError::DuplicateInSource(_)) => "DUPLICATE_IN_SOURCE",
            PaccError::Conflict(ConflictError::ConflictExists { .. }) => "CONFLICT_EXISTS",
            PaccError::Conflict(ConflictError::VersionMismatch { .. }) => "VERSION_MISMATCH",
            PaccError::Integrity(IntegrityError::HashMismatch { .. }) => "HASH_MISMATCH",
            PaccError::Integrity(IntegrityError::JournalCorrupt(_)) => "JOURNAL_CORRUPT",
            PaccError::Io(_) => "IO_ERROR",
            PaccError::Json(_) => "MALFORMED_JSON",
            PaccError::ScopeBusy(_) => "SCOPE_BUSY",
            PaccError::NotFound(_) => "NOT_FOUND",
        }
    }
}
