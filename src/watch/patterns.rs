// src/watch/patterns.rs

//! Pattern matching and listing collaborators for the watcher.
//!
//! The watcher never interprets patterns itself. It asks a [`Matcher`]
//! whether a changed path matches a pattern, and a [`Lister`] which files a
//! pattern currently covers (to pick directories to watch). Both are traits
//! with blanket impls for closures, so callers can inject plain functions.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher as CompiledGlob};
use tracing::{debug, trace};

use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::path_utils::{literal_prefix, relative_str};

/// Decides whether a changed path matches a watch pattern.
pub trait Matcher: Send + Sync {
    fn matches(&self, pattern: &str, path: &Path) -> Result<bool>;
}

impl<F> Matcher for F
where
    F: Fn(&str, &Path) -> Result<bool> + Send + Sync,
{
    fn matches(&self, pattern: &str, path: &Path) -> Result<bool> {
        self(pattern, path)
    }
}

/// Enumerates the files a watch pattern currently covers.
pub trait Lister: Send + Sync {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

impl<F> Lister for F
where
    F: Fn(&str) -> Result<Vec<PathBuf>> + Send + Sync,
{
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self(pattern)
    }
}

/// Per-pattern cache of compiled globs.
///
/// `*` and `?` do not cross `/`; use `**` for any depth.
#[derive(Debug, Clone, Default)]
struct GlobCache {
    compiled: Arc<Mutex<HashMap<String, CompiledGlob>>>,
}

impl GlobCache {
    fn get(&self, pattern: &str) -> Result<CompiledGlob> {
        let mut compiled = self
            .compiled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(glob) = compiled.get(pattern) {
            return Ok(glob.clone());
        }
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern '{pattern}'"))?
            .compile_matcher();
        compiled.insert(pattern.to_string(), glob.clone());
        Ok(glob)
    }
}

/// Glob matcher over paths relative to a project root.
///
/// Relative patterns match the event path made relative to `root`; absolute
/// patterns match the full path. Paths outside `root` never match a
/// relative pattern.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    root: PathBuf,
    cache: GlobCache,
}

impl GlobMatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root,
            cache: GlobCache::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Matcher for GlobMatcher {
    fn matches(&self, pattern: &str, path: &Path) -> Result<bool> {
        let glob = self.cache.get(pattern)?;
        if Path::new(pattern).is_absolute() {
            return Ok(glob.is_match(path));
        }
        Ok(relative_str(&self.root, path).is_some_and(|rel| glob.is_match(rel)))
    }
}

/// Lists files matching a glob by walking `fs` from the pattern's literal
/// directory prefix.
#[derive(Debug, Clone)]
pub struct GlobLister<F: FileSystem = RealFileSystem> {
    root: PathBuf,
    fs: F,
    cache: GlobCache,
}

impl GlobLister<RealFileSystem> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, RealFileSystem)
    }
}

impl<F: FileSystem> GlobLister<F> {
    pub fn with_fs(root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root: root.into(),
            fs,
            cache: GlobCache::default(),
        }
    }

    /// Walk directories below `start`. Without `**` in the pattern the walk
    /// stops at the depth the pattern can reach.
    ///
    /// Only a failure to read `start` itself is an error; unreadable
    /// subdirectories are skipped.
    fn walk(
        &self,
        start: &Path,
        max_depth: Option<usize>,
        absolute: bool,
        glob: &CompiledGlob,
    ) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(start.to_path_buf(), 1)];

        while let Some((dir, depth)) = stack.pop() {
            // Symlinked directories may loop back on themselves.
            let canonical = self.fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !visited.insert(canonical) {
                continue;
            }
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if dir == start => return Err(err),
                Err(err) => {
                    debug!(dir = ?dir, error = %err, "skipping unreadable directory");
                    continue;
                }
            };
            for entry in entries {
                if self.fs.is_dir(&entry) {
                    if max_depth.is_none_or(|max| depth < max) {
                        stack.push((entry, depth + 1));
                    }
                } else if self.is_match(&entry, absolute, glob) {
                    found.push(entry);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn is_match(&self, path: &Path, absolute: bool, glob: &CompiledGlob) -> bool {
        if absolute {
            return glob.is_match(path);
        }
        relative_str(&self.root, path).is_some_and(|rel| glob.is_match(rel))
    }
}

impl<F: FileSystem> Lister for GlobLister<F> {
    fn list(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let glob = self.cache.get(pattern)?;
        let absolute = Path::new(pattern).is_absolute();
        let prefix = literal_prefix(pattern);
        let max_depth = (!pattern.contains("**")).then(|| {
            let below_prefix = pattern.split('/').count() - prefix.components().count();
            below_prefix.max(1)
        });
        let start = if absolute {
            prefix
        } else {
            self.root.join(prefix)
        };

        trace!(pattern, start = ?start, ?max_depth, "listing pattern");
        if !self.fs.is_dir(&start) {
            return Ok(Vec::new());
        }
        self.walk(&start, max_depth, absolute, &glob)
    }
}
