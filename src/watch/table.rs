// src/watch/table.rs

use std::collections::BTreeMap;

use crate::task::TaskName;

/// Watch patterns and the task names each one triggers.
///
/// A name is listed at most once per pattern; first-registration order is
/// kept.
#[derive(Debug, Clone, Default)]
pub struct WatchTable {
    entries: BTreeMap<String, Vec<TaskName>>,
}

impl WatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tasks` to the entry of every pattern in `patterns`.
    pub fn watch<P, T>(&mut self, patterns: P, tasks: T)
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let tasks: Vec<String> = tasks.into_iter().map(|t| t.as_ref().to_string()).collect();
        for pattern in patterns {
            let listed = self.entries.entry(pattern.as_ref().to_string()).or_default();
            for task in &tasks {
                if !listed.contains(task) {
                    listed.push(task.clone());
                }
            }
        }
    }

    /// Tasks listed under `pattern`.
    pub fn tasks(&self, pattern: &str) -> &[TaskName] {
        self.entries.get(pattern).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TaskName])> {
        self.entries.iter().map(|(p, t)| (p.as_str(), t.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
