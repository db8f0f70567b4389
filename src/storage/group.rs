//! Storages and storage groups
//!
//! A `StorageGroup` is a closed set of storages keyed by environment label. Models name
//! their storage through a `StorageRef`: the whole group (resolved per environment), one
//! member of a group, or a standalone storage.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use super::backend::StorageBackend;
use super::env::{selected_environment, EnvLookup};

/// A named persistence endpoint
#[derive(Debug, Clone)]
pub struct Storage {
    pub name: String,
    /// Environment label; defaults to the storage name
    pub environment: String,
    pub backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn new(name: impl Into<String>, backend: impl StorageBackend + 'static) -> Self {
        let name = name.into();
        Self {
            environment: name.clone(),
            name,
            backend: Arc::new(backend),
        }
    }

    /// Builder: set an explicit environment label
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<environment={}>", self.name, self.environment)
    }
}

/// A named group of storages with distinct environment labels
#[derive(Debug)]
pub struct StorageGroup {
    pub name: String,
    storages: Vec<Arc<Storage>>,
}

impl StorageGroup {
    pub fn new(name: impl Into<String>, storages: Vec<Storage>) -> Result<Arc<Self>, ConfigError> {
        let name = name.into();
        let mut members: Vec<Arc<Storage>> = Vec::with_capacity(storages.len());
        for storage in storages {
            if members.iter().any(|m| m.environment == storage.environment) {
                return Err(ConfigError::DuplicateEnvironment {
                    group: name,
                    environment: storage.environment,
                });
            }
            members.push(Arc::new(storage));
        }
        Ok(Arc::new(Self { name, storages: members }))
    }

    /// Declared environment labels, in declaration order
    pub fn environments(&self) -> Vec<String> {
        self.storages.iter().map(|s| s.environment.clone()).collect()
    }

    /// Storage for an environment label
    pub fn get(&self, environment: &str) -> Option<&Arc<Storage>> {
        self.storages.iter().find(|s| s.environment == environment)
    }

    /// Storage by member name
    pub fn member(&self, name: &str) -> Option<&Arc<Storage>> {
        self.storages.iter().find(|s| s.name == name)
    }

    pub fn storages(&self) -> &[Arc<Storage>] {
        &self.storages
    }

    /// Storage selected by `{Group}_ENVIRONMENT` or the global environment variable
    ///
    /// `None` when neither variable is set or the selected label is not a member.
    pub fn from_env_with(&self, env: &dyn EnvLookup) -> Option<&Arc<Storage>> {
        let (label, variable) = selected_environment(&self.name, env)?;
        let storage = self.get(&label)?;
        log::debug!(
            "Storage group '{}' resolved to '{}' from {}",
            self.name,
            storage,
            variable
        );
        Some(storage)
    }
}

/// How a model or a call names its storage
#[derive(Debug, Clone)]
pub enum StorageRef {
    /// A whole group; the environment picks the member
    Group(Arc<StorageGroup>),
    /// One member of a group
    Member {
        group: Arc<StorageGroup>,
        storage: Arc<Storage>,
    },
    /// A storage outside any group
    Standalone(Arc<Storage>),
}

impl StorageRef {
    /// Reference a group member by environment label
    pub fn member(group: &Arc<StorageGroup>, environment: &str) -> Option<Self> {
        group.get(environment).map(|storage| StorageRef::Member {
            group: Arc::clone(group),
            storage: Arc::clone(storage),
        })
    }

    pub fn standalone(storage: Storage) -> Self {
        StorageRef::Standalone(Arc::new(storage))
    }
}

impl From<Arc<StorageGroup>> for StorageRef {
    fn from(group: Arc<StorageGroup>) -> Self {
        StorageRef::Group(group)
    }
}

impl From<Storage> for StorageRef {
    fn from(storage: Storage) -> Self {
        StorageRef::standalone(storage)
    }
}

impl fmt::Display for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRef::Group(group) => write!(f, "{}", group.name),
            StorageRef::Member { group, storage } => write!(f, "{}.{}", group.name, storage.name),
            StorageRef::Standalone(storage) => write!(f, "{}", storage.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::collections::HashMap;

    fn group() -> Arc<StorageGroup> {
        StorageGroup::new(
            "Commits",
            vec![
                Storage::new("local", MemoryStorage::new("local")),
                Storage::new("ci", MemoryStorage::new("ci")).with_environment("continuous-integration"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_environment_labels() {
        let group = group();
        assert_eq!(group.environments(), vec!["local", "continuous-integration"]);
        assert_eq!(group.get("continuous-integration").unwrap().name, "ci");
        assert!(group.get("ci").is_none());
        assert_eq!(group.member("ci").unwrap().environment, "continuous-integration");
    }

    #[test]
    fn test_duplicate_environment() {
        let result = StorageGroup::new(
            "Commits",
            vec![
                Storage::new("a", MemoryStorage::new("a")).with_environment("x"),
                Storage::new("b", MemoryStorage::new("b")).with_environment("x"),
            ],
        );
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateEnvironment { environment, .. }) if environment == "x"
        ));
    }

    #[test]
    fn test_from_env() {
        let group = group();
        let mut env: HashMap<String, String> = HashMap::new();
        assert!(group.from_env_with(&env).is_none());

        env.insert("DATASAURUS_ENVIRONMENT".to_string(), "local".to_string());
        assert_eq!(group.from_env_with(&env).unwrap().name, "local");

        env.insert("Commits_ENVIRONMENT".to_string(), "nowhere".to_string());
        assert!(group.from_env_with(&env).is_none());

        env.insert("Commits_ENVIRONMENT".to_string(), "continuous-integration".to_string());
        assert_eq!(group.from_env_with(&env).unwrap().name, "ci");
    }

    #[test]
    fn test_display() {
        let group = group();
        let member = StorageRef::member(&group, "local").unwrap();
        assert_eq!(member.to_string(), "Commits.local");
        assert_eq!(StorageRef::from(group).to_string(), "Commits");
    }
}
