//! Path & I/O safety kernel (C1).
//!
//! Every path the engine considers — whether typed by a caller or read back
//! out of a structured-config document on a later run — passes through here
//! before any other component sees it. A tampered document cannot cause an
//! escape: `load` re-canonicalizes every path-valued field through the same
//! functions a fresh install would use.

use crate::core::candidate::Kind;
use crate::core::error::{NameError, PathError};
use std::path::{Component, Path, PathBuf};

/// Bounded symlink-resolution depth before we declare a loop.
pub const MAX_SYMLINK_DEPTH: usize = 16;

const RESERVED_NAMES: &[&str] = &[
    "help", "exit", "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6",
    "com7", "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Command-kind-specific reserved words, additive to `RESERVED_NAMES` (§4.2).
const RESERVED_COMMAND_NAMES: &[&str] = &["help", "exit", "clear", "quit"];

/// Lexically collapse `.`/`..` components without touching the filesystem,
/// the way `path-clean`-style normalizers do. Never pops past a root/prefix.
fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(component),
            },
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Resolve `user_supplied` (absolute or relative to `root`) to an absolute
/// path, following symlinks up to `MAX_SYMLINK_DEPTH` hops, and verify the
/// result is a descendant of `root`. Missing trailing components are
/// tolerated (the caller may be about to create them); missing intermediate
/// directories on an existing prefix are not resolved further, only checked
/// for traversal once the prefix stops existing.
pub fn canonicalize(root: &Path, user_supplied: &Path) -> Result<PathBuf, PathError> {
    let root_canon =
        std::fs::canonicalize(root).map_err(|_| PathError::NotFound(root.display().to_string()))?;

    let candidate = if user_supplied.is_absolute() {
        user_supplied.to_path_buf()
    } else {
        root_canon.join(user_supplied)
    };

    let normalized = lexically_normalize(&candidate);

    let mut resolved = PathBuf::new();
    let mut hops = 0usize;
    let mut missing = false;

    for component in normalized.components() {
        resolved.push(component.as_os_str());
        if missing {
            continue;
        }
        match std::fs::symlink_metadata(&resolved) {
            Err(_) => missing = true,
            Ok(meta) if meta.file_type().is_symlink() => loop {
                hops += 1;
                if hops > MAX_SYMLINK_DEPTH {
                    return Err(PathError::SymlinkLoop(resolved.display().to_string()));
                }
                let target = std::fs::read_link(&resolved)
                    .map_err(|_| PathError::NotFound(resolved.display().to_string()))?;
                let next = if target.is_absolute() {
                    target
                } else {
                    resolved
                        .parent()
                        .unwrap_or_else(|| Path::new("/"))
                        .join(target)
                };
                resolved = lexically_normalize(&next);
                match std::fs::symlink_metadata(&resolved) {
                    Ok(m) if m.file_type().is_symlink() => continue,
                    Ok(_) => break,
                    Err(_) => {
                        missing = true;
                        break;
                    }
                }
            },
            Ok(_) => {}
        }
    }

    if !resolved.starts_with(&root_canon) {
        return Err(PathError::OutsideRoot(resolved.display().to_string()));
    }

    Ok(resolved)
}

/// Produce a normalized root-relative path for storage in an `InstalledRecord`.
pub fn relative_within(root: &Path, child: &Path) -> Result<PathBuf, PathError> {
    let absolute = canonicalize(root, child)?;
    let root_canon =
        std::fs::canonicalize(root).map_err(|_| PathError::NotFound(root.display().to_string()))?;
    absolute
        .strip_prefix(&root_canon)
        .map(Path::to_path_buf)
        .map_err(|_| PathError::OutsideRoot(absolute.display().to_string()))
}

/// Join `segments` onto `root` and immediately re-canonicalize. Rejects
/// absolute segments and any segment equal to `..` up front, before the
/// general canonicalization pass runs.
pub fn scoped_join(root: &Path, segments: &[&str]) -> Result<PathBuf, PathError> {
    let mut relative = PathBuf::new();
    for segment in segments {
        let component_path = Path::new(segment);
        if component_path.is_absolute() || *segment == ".." || segment.is_empty() {
            return Err(PathError::Traversal(segment.to_string()));
        }
        relative.push(segment);
    }
    canonicalize(root, &relative)
}

/// Per-kind naming rules (§4.1): ASCII letters/digits/hyphen/underscore, no
/// leading dot or hyphen, length <= 64, and not a reserved/platform word.
pub fn validate_name(kind: Kind, name: &str) -> Result<(), NameError> {
    if name.is_empty() || name.len() > 64 {
        return Err(NameError::Invalid(name.to_string()));
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err(NameError::Invalid(name.to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(NameError::Invalid(name.to_string()));
    }

    let lower = name.to_ascii_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) {
        return Err(NameError::Reserved(name.to_string()));
    }
    if kind == Kind::Command && RESERVED_COMMAND_NAMES.contains(&lower.as_str()) {
        return Err(NameError::Reserved(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let err = canonicalize(root, Path::new("../../../etc/passwd")).unwrap_err();
        assert!(matches!(err, PathError::OutsideRoot(_)));
    }

    #[test]
    fn canonicalize_accepts_nonexistent_destination_inside_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let resolved = canonicalize(root, Path::new("hooks/fmt.json")).unwrap();
        assert!(resolved.starts_with(std::fs::canonicalize(root).unwrap()));
    }

    #[test]
    fn canonicalize_follows_symlink_escape() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(&outside, root.join("escape")).unwrap();
            let err = canonicalize(&root, Path::new("escape/x")).unwrap_err();
            assert!(matches!(err, PathError::OutsideRoot(_)));
        }
    }

    #[test]
    fn scoped_join_rejects_absolute_and_parent_segments() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scoped_join(tmp.path(), &["..", "etc"]).is_err());
        assert!(scoped_join(tmp.path(), &["/etc/passwd"]).is_err());
        assert!(scoped_join(tmp.path(), &["hooks", "fmt.json"]).is_ok());
    }

    #[test]
    fn validate_name_rules() {
        assert!(validate_name(Kind::Hook, "fmt").is_ok());
        assert!(validate_name(Kind::Hook, "-leading-hyphen").is_err());
        assert!(validate_name(Kind::Hook, ".hidden").is_err());
        assert!(validate_name(Kind::Hook, "bad name").is_err());
        assert!(validate_name(Kind::Hook, "help").is_err());
        assert!(validate_name(Kind::Command, "exit").is_err());
        assert!(validate_name(Kind::Agent, &"a".repeat(65)).is_err());
    }
}
