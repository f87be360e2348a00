//! Source adapters (C6): normalize a caller-supplied source into an
//! enumerable set of `Candidate`s.

use crate::core::candidate::{Candidate, Kind};
use crate::core::error::{PaccError, ValidationError};
use crate::core::validation::detect::{detect_kind, parse_front_matter};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

const MANIFEST_FILE_NAME: &str = "plugin.json";

/// Normalizes raw file bytes to the canonical form hashes are computed over:
/// UTF-8 with BOM stripped, LF line endings (§4.6).
pub fn normalize_content(raw: &[u8]) -> Vec<u8> {
    let stripped = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw);
    match std::str::from_utf8(stripped) {
        Ok(text) if text.contains('\r') => text.replace("\r\n", "\n").replace('\r', "\n").into_bytes(),
        _ => stripped.to_vec(),
    }
}

pub fn content_hash(normalized: &[u8]) -> String {
    let digest = Sha256::digest(normalized);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Reads a caller-materialized local directory tree (a clone, an extracted
/// archive, or a plain local source all look the same once on disk).
pub struct LocalDirectoryAdapter {
    root: PathBuf,
}

impl LocalDirectoryAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Enumerate candidates. A `plugin.json` manifest at the root switches
    /// this into plugin mode: one Plugin candidate plus one candidate per
    /// listed component, read from the paths the manifest names. Its
    /// absence means "scan the root" for loose Hook/McpServer/Agent/Command
    /// files.
    pub fn enumerate(&self) -> Result<Vec<Candidate>, PaccError> {
        let manifest_path = self.root.join(MANIFEST_FILE_NAME);
        let candidates = if manifest_path.is_file() {
            self.enumerate_plugin(&manifest_path)?
        } else {
            self.scan_loose_files()?
        };
        check_no_duplicates(&candidates)?;
        Ok(candidates)
    }

    fn enumerate_plugin(&self, manifest_path: &Path) -> Result<Vec<Candidate>, PaccError> {
        let raw = std::fs::read(manifest_path)?;
        let normalized = normalize_content(&raw);
        let manifest: JsonValue = serde_json::from_slice(&normalized)?;

        let plugin_name = manifest
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "plugin".to_string())
            });

        let mut candidates = vec![Candidate {
            source_path: manifest_path.to_path_buf(),
            kind: Kind::Plugin,
            logical_name: plugin_name,
            declared_version: manifest.get("version").and_then(|v| v.as_str()).map(str::to_string),
            content_hash: content_hash(&normalized),
            content: normalized,
            metadata: manifest.clone(),
        }];

        let components = manifest.get("components").and_then(|v| v.as_array()).cloned().unwrap_or_default();
        for component in components {
            let Some(relative) = component.get("path").and_then(|v| v.as_str()) else {
                continue;
            };
            let kind_hint = component.get("kind").and_then(|v| v.as_str());
            let explicit_name = component.get("name").and_then(|v| v.as_str()).map(str::to_string);
            let absolute = self.root.join(relative);
            candidates.push(self.classify_file(&absolute, explicit_name, kind_hint)?);
        }

        Ok(candidates)
    }

    fn scan_loose_files(&self) -> Result<Vec<Candidate>, PaccError> {
        let mut files = Vec::new();
        collect_files(&self.root, &mut files)?;

        files
            .into_par_iter()
            .map(|path| self.classify_file(&path, None, None))
            .collect()
    }

    fn classify_file(&self, path: &Path, explicit_name: Option<String>, kind_hint: Option<&str>) -> Result<Candidate, PaccError> {
        let raw = std::fs::read(path)?;
        let normalized = normalize_content(&raw);
        let kind = match kind_hint {
            Some("hook") => Kind::Hook,
            Some("mcpServer") => Kind::McpServer,
            Some("agent") => Kind::Agent,
            Some("command") => Kind::Command,
            _ => detect_kind(&normalized)?,
        };

        let (logical_name, metadata) = match kind {
            Kind::Hook | Kind::McpServer => {
                let parsed: JsonValue = serde_json::from_slice(&normalized)?;
                let name = explicit_name
                    .or_else(|| parsed.get("name").and_then(|v| v.as_str()).map(str::to_string))
                    .unwrap_or_else(|| stem(path));
                (name, parsed)
            }
            Kind::Agent | Kind::Command => {
                let text = std::str::from_utf8(&normalized)
                    .map_err(|_| ValidationError::SchemaViolation("non-UTF-8 content".to_string()))?;
                let name = explicit_name
                    .or_else(|| parse_front_matter(text).and_then(|fm| fm.fields.get("name").cloned()))
                    .unwrap_or_else(|| stem(path));
                (name, JsonValue::Null)
            }
            Kind::Plugin => {
                let parsed: JsonValue = serde_json::from_slice(&normalized)?;
                (explicit_name.unwrap_or_else(|| stem(path)), parsed)
            }
        };

        Ok(Candidate {
            source_path: path.to_path_buf(),
            kind,
            logical_name,
            declared_version: None,
            content_hash: content_hash(&normalized),
            content: normalized,
            metadata,
        })
    }
}

fn stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), PaccError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
            continue;
        }
        if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE_NAME) {
            continue;
        }
        let extension = path.extension().and_then(|e| e.to_str());
        if matches!(extension, Some("json") | Some("md")) {
            out.push(path);
        }
    }
    Ok(())
}

/// §4.6: duplicate `logical_name`s within a single source, for the same
/// `Kind`, must be rejected before the pipeline runs.
fn check_no_duplicates(candidates: &[Candidate]) -> Result<(), PaccError> {
    let mut seen = std::collections::HashSet::new();
    for candidate in candidates {
        let key = (candidate.kind, candidate.logical_name.clone());
        if !seen.insert(key) {
            return Err(ValidationError::DuplicateInSource(candidate.logical_name.clone()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_bom_and_crlf() {
        let raw = b"\xef\xbb\xbf{\"a\":1}\r\n";
        let normalized = normalize_content(raw);
        assert_eq!(normalized, b"{\"a\":1}\n");
    }

    #[test]
    fn scans_loose_hook_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("fmt.json"),
            r#"{"name":"fmt","eventTypes":["PreToolUse"],"commands":["ruff check"]}"#,
        )
        .unwrap();
        let adapter = LocalDirectoryAdapter::new(tmp.path());
        let candidates = adapter.enumerate().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, Kind::Hook);
        assert_eq!(candidates[0].logical_name, "fmt");
    }

    #[test]
    fn duplicate_logical_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(
            tmp.path().join("fmt.json"),
            r#"{"name":"fmt","eventTypes":["PreToolUse"]}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("sub/fmt.json"),
            r#"{"name":"fmt","eventTypes":["Stop"]}"#,
        )
        .unwrap();
        let adapter = LocalDirectoryAdapter::new(tmp.path());
        let err = adapter.enumerate().unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_IN_SOURCE");
    }

    #[test]
    fn plugin_manifest_yields_plugin_and_component_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("hooks")).unwrap();
        std::fs::create_dir_all(tmp.path().join("agents")).unwrap();
        std::fs::create_dir_all(tmp.path().join("commands")).unwrap();
        std::fs::write(
            tmp.path().join("plugin.json"),
            r#"{"name":"linter-pack","components":[
                {"kind":"hook","path":"hooks/fmt.json"},
                {"kind":"agent","path":"agents/reviewer.md"},
                {"kind":"command","path":"commands/lint.md"}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("hooks/fmt.json"),
            r#"{"name":"fmt","eventTypes":["PreToolUse"]}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("agents/reviewer.md"),
            "---\nname: reviewer\ndescription: reviews\n---\nBody.",
        )
        .unwrap();
        std::fs::write(tmp.path().join("commands/lint.md"), "Runs lint.").unwrap();

        let adapter = LocalDirectoryAdapter::new(tmp.path());
        let candidates = adapter.enumerate().unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].kind, Kind::Plugin);
        assert_eq!(candidates[0].logical_name, "linter-pack");
    }
}
