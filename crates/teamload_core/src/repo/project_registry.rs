//! Project registry.
//!
//! # Responsibility
//! - Own the ordered list of projects and their assignment snapshots.
//! - Upgrade legacy records once, at load, and write the upgrade back.
//!
//! # Invariants
//! - `last_updated` strictly increases on every update of a record.
//! - Reordering never adds, drops or duplicates projects.
//! - After `reset_projects` the storage key is absent, not an empty list.

use crate::clock::{next_timestamp, now_epoch_ms};
use crate::model::project::{Project, ProjectId, ProjectInput, ProjectPatch};
use crate::model::record::{upgrade_all, ProjectRecord};
use crate::repo::{RegistryError, RegistryResult};
use crate::storage::{load_json, save_json, KeyValueStorage};
use log::{error, info};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Persisted collection of `Project` records.
pub struct ProjectRegistry<S: KeyValueStorage> {
    storage: S,
    key: String,
    projects: Vec<Project>,
}

impl<S: KeyValueStorage> ProjectRegistry<S> {
    /// Loads projects from `storage[key]`, upgrading legacy records.
    ///
    /// Read failures fall back to an empty collection.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = match load_json::<Vec<ProjectRecord>>(&storage, &key) {
            Ok(records) => records.unwrap_or_default(),
            Err(err) => {
                error!(
                    "event=projects_load module=repo status=error key={} error={}",
                    key, err
                );
                Vec::new()
            }
        };

        let (projects, upgraded) = upgrade_all(records);
        let registry = Self {
            storage,
            key,
            projects,
        };
        info!(
            "event=projects_load module=repo status=ok count={} legacy_upgraded={}",
            registry.projects.len(),
            upgraded
        );
        if upgraded > 0 {
            registry.persist();
        }
        registry
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// Appends a project with a fresh id and the current timestamp.
    pub fn add_project(&mut self, input: ProjectInput) -> Project {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            assignments: input.assignments,
            last_updated: now_epoch_ms(),
        };
        self.projects.push(project.clone());
        self.persist();
        project
    }

    /// Merges `patch` into the matching project and refreshes its timestamp.
    ///
    /// Returns `false` (and writes nothing) when `id` is unknown.
    pub fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> bool {
        let Some(project) = self.projects.iter_mut().find(|project| project.id == id) else {
            return false;
        };
        project.apply(patch);
        project.last_updated = next_timestamp(project.last_updated);
        self.persist();
        true
    }

    /// Deletes the matching project. Returns whether one was removed.
    pub fn remove_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|project| project.id != id);
        if self.projects.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Replaces the stored sequence with `ordered`.
    ///
    /// # Errors
    /// - `ReorderMismatch` when `ordered` is not a permutation of the stored
    ///   project ids; state is left untouched.
    pub fn reorder_projects(&mut self, ordered: Vec<Project>) -> RegistryResult<()> {
        let stored = id_counts(self.projects.iter().map(|project| project.id.as_str()));
        let received = id_counts(ordered.iter().map(|project| project.id.as_str()));
        if stored != received {
            return Err(RegistryError::ReorderMismatch {
                missing: surplus(&stored, &received),
                unexpected: surplus(&received, &stored),
            });
        }

        self.projects = ordered;
        self.persist();
        Ok(())
    }

    /// Replaces the whole collection (bulk restore).
    pub fn import_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        info!(
            "event=projects_import module=repo status=ok count={}",
            self.projects.len()
        );
        self.persist();
    }

    /// Returns a copy of the collection in stored order.
    pub fn export_projects(&self) -> Vec<Project> {
        self.projects.clone()
    }

    /// Clears the collection and deletes the storage entry.
    pub fn reset_projects(&mut self) {
        self.projects.clear();
        match self.storage.remove(&self.key) {
            Ok(()) => info!(
                "event=projects_reset module=repo status=ok key={}",
                self.key
            ),
            Err(err) => error!(
                "event=projects_reset module=repo status=error key={} error={}",
                self.key, err
            ),
        }
    }

    fn persist(&self) {
        if let Err(err) = save_json(&self.storage, &self.key, &self.projects) {
            error!(
                "event=projects_persist module=repo status=error key={} error={}",
                self.key, err
            );
        }
    }
}

fn id_counts<'a>(ids: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Ids occurring more often in `left` than in `right`.
fn surplus(left: &BTreeMap<&str, usize>, right: &BTreeMap<&str, usize>) -> Vec<ProjectId> {
    left.iter()
        .filter(|(id, count)| right.get(*id).copied().unwrap_or(0) < **count)
        .map(|(id, _)| (*id).to_string())
        .collect()
}
