//! Environment variables that select a storage group's member

use std::collections::HashMap;

/// Global variable naming the environment of every storage group
pub const GLOBAL_ENVIRONMENT_VAR: &str = "DATASAURUS_ENVIRONMENT";

/// Source of environment variables
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Per-group variable, e.g. `CommitsStorage_ENVIRONMENT`
pub fn group_variable(group: &str) -> String {
    format!("{}_ENVIRONMENT", group)
}

/// Environment label selected for a group, with the variable that selected it
///
/// The group variable wins over the global one; empty values count as unset.
pub fn selected_environment(group: &str, env: &dyn EnvLookup) -> Option<(String, String)> {
    let group_var = group_variable(group);
    [group_var, GLOBAL_ENVIRONMENT_VAR.to_string()]
        .into_iter()
        .find_map(|key| {
            env.var(&key)
                .filter(|value| !value.is_empty())
                .map(|value| (value, key))
        })
}

/// Writable environment variables
pub trait EnvStore: EnvLookup {
    fn set_var(&mut self, key: &str, value: &str);
}

impl EnvStore for ProcessEnv {
    fn set_var(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl EnvStore for HashMap<String, String> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// Set the global environment in `env`
pub fn set_global_env_in(env: &mut dyn EnvStore, name: &str) {
    log::debug!("Setting {} to '{}'", GLOBAL_ENVIRONMENT_VAR, name);
    env.set_var(GLOBAL_ENVIRONMENT_VAR, name);
}

/// Set the global environment for the current process
pub fn set_global_env(name: &str) {
    set_global_env_in(&mut ProcessEnv, name);
}
