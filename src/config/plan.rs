// src/config/plan.rs

//! Static run order for `--dry-run`.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;
use crate::errors::{Result, TaskError, WatchtaskError};
use crate::task::{base_name, parse_flags};

/// One task in a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub name: String,
    pub cmd: String,
    /// Dependencies as written, flags included.
    pub deps: Vec<String>,
}

/// Tasks reachable from `root`, dependencies first.
///
/// Each task appears once even if it is multi-flagged. Dependencies on
/// undeclared tasks are left out.
pub fn execution_order(cfg: &ConfigFile, root: &str) -> Result<Vec<PlannedTask>> {
    let tasks: BTreeMap<&str, _> = cfg
        .tasks()
        .iter()
        .map(|(name, task)| (base_name(name), task))
        .collect();

    if !tasks.contains_key(root) {
        return Err(TaskError::TaskNotFound(root.to_string()).into());
    }

    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let mut reachable = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(name) = stack.pop() {
        if !reachable.insert(name) {
            continue;
        }
        graph.add_node(name);
        let Some(task) = tasks.get(name) else {
            continue;
        };
        for dep in &task.deps {
            let (_, dep) = parse_flags(dep);
            if tasks.contains_key(dep) {
                graph.add_edge(dep, name, ());
                stack.push(dep);
            }
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| {
        WatchtaskError::ConfigError(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))
    })?;

    Ok(order
        .into_iter()
        .filter_map(|name| {
            tasks.get(name).map(|task| PlannedTask {
                name: name.to_string(),
                cmd: task.cmd.clone(),
                deps: task.deps.clone(),
            })
        })
        .collect())
}
