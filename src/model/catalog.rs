//! Registry of storage groups and models declared together

use std::sync::Arc;

use crate::error::ConfigError;
use crate::storage::{StorageGroup, StorageRef};
use super::base::Model;

/// Storage groups and models of a project, in declaration order
#[derive(Debug, Default)]
pub struct Catalog {
    pub storage_groups: Vec<Arc<StorageGroup>>,
    pub models: Vec<Arc<Model>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a storage group by name
    pub fn get_storage_group(&self, name: &str) -> Option<&Arc<StorageGroup>> {
        self.storage_groups.iter().find(|g| g.name == name)
    }

    /// Get a model by name
    pub fn get_model(&self, name: &str) -> Option<&Arc<Model>> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Resolve `Group` or `Group.member` into a storage reference
    pub fn storage_ref(&self, reference: &str) -> Result<StorageRef, ConfigError> {
        let unknown = || ConfigError::UnknownStorageGroup(reference.to_string());
        match reference.split_once('.') {
            None => self
                .get_storage_group(reference)
                .map(|group| StorageRef::Group(Arc::clone(group)))
                .ok_or_else(unknown),
            Some((group_name, member)) => {
                let group = self.get_storage_group(group_name).ok_or_else(unknown)?;
                let storage = group.member(member).ok_or_else(unknown)?;
                Ok(StorageRef::Member {
                    group: Arc::clone(group),
                    storage: Arc::clone(storage),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn catalog() -> Catalog {
        let group = StorageGroup::new(
            "Commits",
            vec![
                Storage::new("local", MemoryStorage::new("local")),
                Storage::new("ci", MemoryStorage::new("ci")).with_environment("continuous-integration"),
            ],
        )
        .unwrap();
        Catalog {
            storage_groups: vec![group],
            models: Vec::new(),
        }
    }

    #[test]
    fn test_storage_ref() {
        let catalog = catalog();
        assert!(matches!(catalog.storage_ref("Commits"), Ok(StorageRef::Group(_))));

        match catalog.storage_ref("Commits.ci").unwrap() {
            StorageRef::Member { storage, .. } => assert_eq!(storage.environment, "continuous-integration"),
            other => panic!("expected a member, got {}", other),
        }

        assert_eq!(
            catalog.storage_ref("Commits.prod").unwrap_err(),
            ConfigError::UnknownStorageGroup("Commits.prod".to_string())
        );
        assert!(catalog.storage_ref("Builds").is_err());
    }
}
