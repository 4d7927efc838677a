//! Store configuration.
//!
//! # Responsibility
//! - Name the storage keys each registry collection is persisted under.
//!
//! # Invariants
//! - `users_key` and `projects_key` must differ; collections are independent.

/// Default storage key of the users collection.
pub const DEFAULT_USERS_KEY: &str = "resource-mgm-users-v1";
/// Default storage key of the projects collection.
pub const DEFAULT_PROJECTS_KEY: &str = "resource-mgm-data-v1";

/// Storage key layout shared by both registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub users_key: String,
    pub projects_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            users_key: DEFAULT_USERS_KEY.to_string(),
            projects_key: DEFAULT_PROJECTS_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Prefixes both keys with `namespace`, for several dashboards in one store.
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            users_key: format!("{namespace}:{DEFAULT_USERS_KEY}"),
            projects_key: format!("{namespace}:{DEFAULT_PROJECTS_KEY}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;

    #[test]
    fn default_keys_are_distinct() {
        let config = StoreConfig::default();
        assert_ne!(config.users_key, config.projects_key);
    }

    #[test]
    fn namespaced_keys_keep_the_default_suffix() {
        let config = StoreConfig::namespaced("team-a");
        assert_eq!(config.users_key, "team-a:resource-mgm-users-v1");
        assert_eq!(config.projects_key, "team-a:resource-mgm-data-v1");
    }
}
