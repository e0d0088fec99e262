use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use watchtask::config::{execution_order, load_and_validate};
use watchtask::errors::WatchtaskError;
use watchtask::watch::Watcher;
use watchtask::{ExecOptions, Registry, TaskError};
use watchtask_test_utils::{ConfigFileBuilder, TaskConfigBuilder};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = write_config(
        r#"
[config]
delay_ms = 250
max_parallel = 2
default_task = "build"

[task.build]
cmd = "cargo build"
deps = ["fmt?", "codegen+"]

[task.fmt]
cmd = "cargo fmt"

[task."codegen+"]
cmd = "./gen.sh"
stop_code = 3

[[watch]]
patterns = ["src/**/*.rs", "Cargo.toml"]
tasks = ["build"]
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.delay(), Duration::from_millis(250));
    assert_eq!(cfg.exec_options(), ExecOptions { max_parallel_actions: 2 });
    assert_eq!(cfg.default_task(), "build");
    assert_eq!(cfg.tasks().len(), 3);
    assert_eq!(cfg.tasks()["build"].deps, vec!["fmt?", "codegen+"]);

    let (key, codegen) = cfg.task("codegen").unwrap();
    assert_eq!(key, "codegen+");
    assert_eq!(codegen.stop_code, Some(3));

    assert_eq!(cfg.watches().len(), 1);
    assert_eq!(cfg.watches()[0].tasks, vec!["build"]);
}

#[test]
fn config_section_defaults_apply() {
    let file = write_config(
        r#"
[task.default]
cmd = "true"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.delay(), Duration::from_millis(10));
    assert_eq!(cfg.exec_options(), ExecOptions::default());
    assert_eq!(cfg.default_task(), "default");
    assert!(cfg.watches().is_empty());
}

#[test]
fn config_without_tasks_is_rejected() {
    let file = write_config("[config]\ndelay_ms = 5\n");
    match load_and_validate(file.path()) {
        Err(WatchtaskError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_delay_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .delay_ms(0)
        .build_raw();

    match watchtask::config::ConfigFile::try_from(raw) {
        Err(WatchtaskError::ConfigError(msg)) => assert!(msg.contains("delay_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn unknown_required_dependency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").dep("ghost").build())
        .build_raw();

    match watchtask::config::ConfigFile::try_from(raw) {
        Err(WatchtaskError::ConfigError(msg)) => {
            assert!(msg.contains("'a'") && msg.contains("'ghost'"), "{msg}")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn unknown_optional_dependency_is_allowed() {
    ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").dep("ghost?").build())
        .build();
}

#[test]
fn watch_entries_are_validated() {
    let unknown_task = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_watch(&["*.rs"], &["b"])
        .build_raw();
    match watchtask::config::ConfigFile::try_from(unknown_task) {
        Err(WatchtaskError::ConfigError(msg)) => assert!(msg.contains("unknown task 'b'"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    let no_patterns = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_watch(&[], &["a"])
        .build_raw();
    assert!(watchtask::config::ConfigFile::try_from(no_patterns).is_err());

    // Watch entries name tasks exactly; a flagged key registers as its base name.
    ConfigFileBuilder::new()
        .with_task("a+", TaskConfigBuilder::new("true").build())
        .with_watch(&["*.rs"], &["a"])
        .build();

    let flagged = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_watch(&["*.rs"], &["a?"])
        .build_raw();
    match watchtask::config::ConfigFile::try_from(flagged) {
        Err(WatchtaskError::ConfigError(msg)) => assert!(msg.contains("unknown task 'a?'"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[task.a\ncmd = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(WatchtaskError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Watchtask.toml");
    match load_and_validate(&path) {
        Err(WatchtaskError::ConfigError(msg)) => assert!(msg.contains("Watchtask.toml")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn cycles_are_reported_by_the_registry() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").dep("b").build())
        .with_task("b", TaskConfigBuilder::new("true").dep("a").build())
        .build();

    // Keys register in order: "a" first, then "b" closes the loop.
    let err = Registry::from_config(&cfg).unwrap_err();
    assert!(matches!(err, TaskError::Cycle(ref chain) if chain == &["b", "a"]));
}

#[test]
fn dry_run_order_lists_dependencies_first() {
    let cfg = ConfigFileBuilder::new()
        .with_task("app", TaskConfigBuilder::new("make app").dep("lib").dep("assets?").build())
        .with_task("lib", TaskConfigBuilder::new("make lib").dep("codegen+").build())
        .with_task("assets", TaskConfigBuilder::new("make assets").build())
        .with_task("codegen", TaskConfigBuilder::new("make gen").build())
        .with_task("unrelated", TaskConfigBuilder::new("true").build())
        .build();

    let order: Vec<String> = execution_order(&cfg, "app")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert_eq!(order.len(), 4);
    assert!(pos("codegen") < pos("lib"));
    assert!(pos("lib") < pos("app"));
    assert!(pos("assets") < pos("app"));

    assert!(matches!(
        execution_order(&cfg, "nope"),
        Err(WatchtaskError::Task(TaskError::TaskNotFound(_)))
    ));
    assert!(matches!(
        execution_order(&cfg, "app?"),
        Err(WatchtaskError::Task(TaskError::TaskNotFound(_)))
    ));
}

#[test]
fn watcher_is_built_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConfigFileBuilder::new()
        .with_task("build", TaskConfigBuilder::new("true").build())
        .with_task("test", TaskConfigBuilder::new("true").dep("build").build())
        .with_watch(&["src/**/*.rs"], &["build", "test"])
        .with_watch(&["Cargo.toml"], &["build"])
        .delay_ms(42)
        .build();

    let watcher = Watcher::from_config(&cfg, dir.path()).unwrap();
    assert_eq!(watcher.delay(), Duration::from_millis(42));
    assert_eq!(watcher.table().tasks("src/**/*.rs"), ["build", "test"]);
    assert_eq!(watcher.table().tasks("Cargo.toml"), ["build"]);
    assert_eq!(watcher.registry().len(), 2);
}

#[cfg(unix)]
mod shell {
    use super::*;

    #[tokio::test]
    async fn shell_commands_run_with_exit_status_semantics() {
        let cfg = ConfigFileBuilder::new()
            .with_task("ok", TaskConfigBuilder::new("true").build())
            .with_task("fail", TaskConfigBuilder::new("exit 3").build())
            .with_task("stop", TaskConfigBuilder::new("exit 3").stop_code(3).build())
            .with_task("after_stop", TaskConfigBuilder::new("true").dep("stop").build())
            .build();
        let registry = Registry::from_config(&cfg).unwrap();

        registry.exec("ok").await.unwrap();

        let err = registry.exec("fail").await.unwrap_err();
        assert!(!err.is_intentional());
        assert!(err.to_string().contains("exited with status 3"), "{err}");

        let err = registry.exec("stop").await.unwrap_err();
        assert!(err.is_intentional());

        let err = registry.exec("after_stop").await.unwrap_err();
        assert!(err.is_intentional());
    }

    #[tokio::test]
    async fn shared_shell_dependency_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.txt");
        let append = |line: &str| format!("echo {line} >> '{}'", log.display());

        let cfg = ConfigFileBuilder::new()
            .with_task("all", TaskConfigBuilder::new(&append("all")).dep("a").dep("b").build())
            .with_task("a", TaskConfigBuilder::new(&append("a")).dep("setup").build())
            .with_task("b", TaskConfigBuilder::new(&append("b")).dep("setup").build())
            .with_task("setup", TaskConfigBuilder::new(&append("setup")).build())
            .build();
        let registry = Registry::from_config(&cfg).unwrap();

        registry.exec("all").await.unwrap();

        let lines: Vec<String> = std::fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.first().map(String::as_str), Some("setup"));
        assert_eq!(lines.last().map(String::as_str), Some("all"));
    }
}
