//! Storage and environment resolution

use std::sync::Arc;

use crate::storage::{group_variable, selected_environment, EnvLookup, Storage, StorageGroup, StorageRef};
use super::error::ResolveError;

fn lookup(group: &StorageGroup, environment: &str) -> Result<Arc<Storage>, ResolveError> {
    group
        .get(environment)
        .cloned()
        .ok_or_else(|| ResolveError::UnknownEnvironment {
            group: group.name.clone(),
            environment: environment.to_string(),
            environments: group.environments(),
        })
}

fn from_env(group: &StorageGroup, env: &dyn EnvLookup) -> Result<Arc<Storage>, ResolveError> {
    if let Some(storage) = group.from_env_with(env) {
        return Ok(Arc::clone(storage));
    }
    let selected = selected_environment(&group.name, env);
    Err(ResolveError::CannotResolveEnvironment {
        group: group.name.clone(),
        value: selected.as_ref().map(|(label, _)| label.clone()),
        variable: selected
            .map(|(_, variable)| variable)
            .unwrap_or_else(|| group_variable(&group.name)),
        environments: group.environments(),
    })
}

/// Pick the storage an access goes to
///
/// An explicit storage wins over the model's Meta storage. An explicit environment
/// re-looks the label up in the storage's group; a group without one is resolved from
/// the environment variables.
pub fn resolve_storage(
    model: &str,
    explicit: Option<&StorageRef>,
    meta: Option<&StorageRef>,
    environment: Option<&str>,
    env: &dyn EnvLookup,
) -> Result<Arc<Storage>, ResolveError> {
    let reference = explicit
        .or(meta)
        .ok_or_else(|| ResolveError::MissingStorage { model: model.to_string() })?;

    let storage = match (reference, environment) {
        (StorageRef::Member { group, storage }, Some(environment)) if storage.environment != environment => {
            lookup(group, environment)?
        }
        (StorageRef::Member { storage, .. }, _) => Arc::clone(storage),
        (StorageRef::Standalone(storage), Some(environment)) if storage.environment != environment => {
            log::warn!(
                "Storage '{}' is not part of a group, cannot switch it to environment '{}'",
                storage.name,
                environment
            );
            return Err(ResolveError::UnknownEnvironment {
                group: storage.name.clone(),
                environment: environment.to_string(),
                environments: vec![storage.environment.clone()],
            });
        }
        (StorageRef::Standalone(storage), _) => Arc::clone(storage),
        (StorageRef::Group(group), Some(environment)) => lookup(group, environment)?,
        (StorageRef::Group(group), None) => from_env(group, env)?,
    };

    log::debug!("Model '{}' resolved storage {}", model, storage);
    Ok(storage)
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

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_missing_storage() {
        let result = resolve_storage("Orders", None, None, None, &env(&[]));
        assert_eq!(result.unwrap_err(), ResolveError::MissingStorage { model: "Orders".to_string() });
    }

    #[test]
    fn test_explicit_wins_over_meta() {
        let group = group();
        let explicit = StorageRef::member(&group, "continuous-integration").unwrap();
        let meta = StorageRef::member(&group, "local").unwrap();
        let storage = resolve_storage("Orders", Some(&explicit), Some(&meta), None, &env(&[])).unwrap();
        assert_eq!(storage.name, "ci");
    }

    #[test]
    fn test_member_with_environment_relooks_up() {
        let group = group();
        let member = StorageRef::member(&group, "local").unwrap();
        let storage =
            resolve_storage("Orders", Some(&member), None, Some("continuous-integration"), &env(&[])).unwrap();
        assert_eq!(storage.name, "ci");

        let result = resolve_storage("Orders", Some(&member), None, Some("prod"), &env(&[]));
        assert!(matches!(result, Err(ResolveError::UnknownEnvironment { .. })));
    }

    #[test]
    fn test_group_resolution() {
        let group = StorageRef::Group(group());
        let vars = env(&[("DATASAURUS_ENVIRONMENT", "local"), ("Commits_ENVIRONMENT", "continuous-integration")]);
        assert_eq!(resolve_storage("Orders", None, Some(&group), None, &vars).unwrap().name, "ci");
        assert_eq!(
            resolve_storage("Orders", None, Some(&group), Some("local"), &vars).unwrap().name,
            "local"
        );
        assert!(matches!(
            resolve_storage("Orders", None, Some(&group), None, &env(&[])),
            Err(ResolveError::CannotResolveEnvironment { .. })
        ));
    }

    #[test]
    fn test_group_environment_error_names_the_variable() {
        let group = StorageRef::Group(group());
        let vars = env(&[("DATASAURUS_ENVIRONMENT", "local"), ("Commits_ENVIRONMENT", "nowhere")]);
        match resolve_storage("Orders", None, Some(&group), None, &vars).unwrap_err() {
            ResolveError::CannotResolveEnvironment { variable, value, environments, .. } => {
                assert_eq!(variable, "Commits_ENVIRONMENT");
                assert_eq!(value.as_deref(), Some("nowhere"));
                assert_eq!(environments, vec!["local", "continuous-integration"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match resolve_storage("Orders", None, Some(&group), None, &env(&[])).unwrap_err() {
            ResolveError::CannotResolveEnvironment { variable, value, .. } => {
                assert_eq!(variable, "Commits_ENVIRONMENT");
                assert_eq!(value, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_standalone_storage() {
        let standalone = StorageRef::standalone(Storage::new("scratch", MemoryStorage::new("scratch")));
        let storage = resolve_storage("Orders", Some(&standalone), None, Some("scratch"), &env(&[])).unwrap();
        assert_eq!(storage.name, "scratch");
        assert!(resolve_storage("Orders", Some(&standalone), None, Some("ci"), &env(&[])).is_err());
    }
}
