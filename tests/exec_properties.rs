use std::collections::BTreeSet;

use proptest::prelude::*;
use watchtask::Registry;
use watchtask_test_utils::Journal;

/// Random acyclic graphs: task `i` may only depend on tasks `0..i`.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), num_tasks)
            .prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, deps)| {
                        if i == 0 {
                            BTreeSet::new()
                        } else {
                            deps.into_iter().map(|d| d % i).collect()
                        }
                    })
                    .collect()
            })
    })
}

fn name(i: usize) -> String {
    format!("task_{i}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_reachable_task_runs_once_after_its_dependencies(graph in dag_strategy(12)) {
        let journal = Journal::new();
        let mut registry = Registry::new();
        for (i, deps) in graph.iter().enumerate() {
            let deps: Vec<String> = deps.iter().map(|&d| name(d)).collect();
            registry.register(&name(i), journal.record(&name(i)), deps).unwrap();
        }
        // A root that depends on everything.
        let all: Vec<String> = (0..graph.len()).map(name).collect();
        registry.register("root", journal.record("root"), all).unwrap();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(registry.exec("root")).unwrap();

        for (i, deps) in graph.iter().enumerate() {
            prop_assert_eq!(journal.count(&name(i)), 1);
            let at = journal.position(&name(i)).unwrap();
            for &d in deps {
                prop_assert!(journal.position(&name(d)).unwrap() < at);
            }
        }
        let entries = journal.entries();
        prop_assert_eq!(entries.last().map(String::as_str), Some("root"));
    }
}
