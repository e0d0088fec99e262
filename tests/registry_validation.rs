use watchtask::{Registry, TaskError};
use watchtask_test_utils::Counter;

const NO_DEPS: [&str; 0] = [];

#[test]
fn empty_name_is_rejected() {
    let counter = Counter::new();
    let mut registry = Registry::new();

    let err = registry.register("", counter.ok(), NO_DEPS).unwrap_err();
    assert!(matches!(err, TaskError::NoName));

    let mut registry = Registry::new();
    let err = registry.register("?+", counter.ok(), NO_DEPS).unwrap_err();
    assert!(matches!(err, TaskError::NoName));
    assert_eq!(
        err.to_string(),
        "task defined with an empty name (after flag removal)"
    );
}

#[test]
fn duplicate_names_are_rejected_after_flag_removal() {
    let counter = Counter::new();
    let mut registry = Registry::new();
    registry.register("foo", counter.ok(), NO_DEPS).unwrap();

    let err = registry.register("foo+", counter.ok(), NO_DEPS).unwrap_err();
    match err {
        TaskError::DuplicateName(name) => assert_eq!(name, "foo"),
        other => panic!("expected DuplicateName, got {other:?}"),
    }
}

#[test]
fn cycle_reports_participants_in_traversal_order() {
    let counter = Counter::new();
    let mut registry = Registry::new();
    registry.register("foo", counter.ok(), ["bar"]).unwrap();
    registry.register("bar", counter.ok(), ["baz"]).unwrap();

    let err = registry.register("baz", counter.ok(), ["foo"]).unwrap_err();
    match &err {
        TaskError::Cycle(chain) => assert_eq!(chain, &["baz", "foo", "bar"]),
        other => panic!("expected Cycle, got {other:?}"),
    }
    assert_eq!(err.to_string(), "cycle identified: baz, foo, bar");
}

#[test]
fn self_dependency_is_a_cycle_even_when_multi() {
    let counter = Counter::new();

    let mut registry = Registry::new();
    let err = registry.register("foo", counter.ok(), ["foo"]).unwrap_err();
    assert!(matches!(err, TaskError::Cycle(ref chain) if chain == &["foo"]));

    let mut registry = Registry::new();
    let err = registry.register("foo", counter.ok(), ["foo+"]).unwrap_err();
    assert!(matches!(err, TaskError::Cycle(ref chain) if chain == &["foo"]));
}

#[test]
fn dependencies_may_be_registered_later() {
    let counter = Counter::new();
    let mut registry = Registry::new();
    registry.register("a", counter.ok(), ["b"]).unwrap();
    registry.register("b", counter.ok(), NO_DEPS).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.task("a").unwrap().deps(), &["b".to_string()]);
    assert!(!registry.is_poisoned());
}

#[test]
fn registered_flags_are_stored_on_the_task() {
    let counter = Counter::new();
    let mut registry = Registry::new();
    registry.register("gen*", counter.ok(), NO_DEPS).unwrap();

    let task = registry.task("gen").unwrap();
    assert_eq!(task.name(), "gen");
    assert!(task.flags().multi && task.flags().optional);
    assert!(registry.task("gen*").is_none());
}

#[tokio::test]
async fn registration_error_poisons_the_registry() {
    let counter = Counter::new();
    let mut registry = Registry::new();
    registry.register("ok", counter.ok(), NO_DEPS).unwrap();
    registry.register("foo", counter.ok(), ["foo"]).unwrap_err();

    assert!(registry.is_poisoned());
    assert!(matches!(registry.error(), Some(TaskError::Cycle(_))));

    // Further registrations return the stored error, unchanged.
    let err = registry.register("fresh", counter.ok(), NO_DEPS).unwrap_err();
    assert!(matches!(err, TaskError::Cycle(ref chain) if chain == &["foo"]));
    assert!(registry.task("fresh").is_none());

    // Execution is refused too, and no action runs.
    let err = registry.exec("ok").await.unwrap_err();
    assert!(matches!(err, TaskError::Cycle(_)));
    assert_eq!(counter.count(), 0);
}
