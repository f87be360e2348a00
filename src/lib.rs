//! PACC: a package manager for an AI coding assistant's extension ecosystem.
//!
//! This crate is the installation engine (§1, §2): the subsystem that takes
//! candidate extensions from a source and commits them into a user-scope or
//! project-scope root such that on-disk files and structured-config
//! documents stay mutually consistent, failures leave the scope unchanged,
//! and concurrent invocations cannot corrupt shared state.
//!
//! # Architecture
//!
//! Six components, each owned by a module under [`core`]:
//!
//! - **C1** [`core::path_kernel`] — canonicalize and confine every path
//! - **C2** [`core::validation`] — per-kind validators and the pipeline
//! - **C3** [`core::store`] — atomic read/merge/write of the config documents
//! - **C4** [`core::backup`] — content-addressed snapshots and restore
//! - **C5** [`core::orchestrator`] — plans and executes transactions
//! - **C6** [`core::source`] — normalizes a source directory into candidates
//!
//! The CLI front end (`main.rs`, [`cli`]) is a thin collaborator: it parses
//! argv, resolves a [`core::scope::Scope`], builds an
//! [`core::orchestrator::Orchestrator`], and renders the
//! [`core::orchestrator::TransactionResult`] it returns. The engine itself
//! performs no rendering and no network I/O (§1 Non-goals).

pub mod cli;
pub mod core;
