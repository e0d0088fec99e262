// src/watch/path_utils.rs

//! Path helpers shared by the glob collaborators and the watcher.

use std::path::{Path, PathBuf};

/// `path` relative to `root`, with forward slashes.
///
/// Tries a plain prefix strip first, then retries on canonicalized paths
/// (symlinked temp dirs on macOS report events under `/private/...`).
/// Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slashed(rel));
    }

    let (root, path) = (root.canonicalize().ok()?, path.canonicalize().ok()?);
    path.strip_prefix(&root).ok().map(slashed)
}

/// Directory to watch for a listed file: its parent, or `"."` for a bare
/// file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Leading components of a glob pattern that contain no glob syntax,
/// excluding the final component.
///
/// `"src/**/*.rs"` gives `"src"`, `"*.rs"` gives `""`.
pub fn literal_prefix(pattern: &str) -> PathBuf {
    let mut parts: Vec<&str> = pattern.split('/').collect();
    parts.pop();
    let mut prefix = PathBuf::new();
    for (i, part) in parts.into_iter().enumerate() {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        if i == 0 && part.is_empty() {
            prefix.push("/");
        } else {
            prefix.push(part);
        }
    }
    prefix
}

fn slashed(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
