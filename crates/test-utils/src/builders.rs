use std::collections::BTreeMap;

use watchtask::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig, WatchConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
                watch: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_watch(mut self, patterns: &[&str], tasks: &[&str]) -> Self {
        self.config.watch.push(WatchConfig {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.config.delay_ms = delay_ms;
        self
    }

    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.config.config.max_parallel = Some(max_parallel);
        self
    }

    pub fn default_task(mut self, name: &str) -> Self {
        self.config.config.default_task = name.to_string();
        self
    }

    /// The unvalidated config, for exercising validation.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                deps: vec![],
                stop_code: None,
            },
        }
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.task.deps.push(dep.to_string());
        self
    }

    pub fn stop_code(mut self, code: i32) -> Self {
        self.task.stop_code = Some(code);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
