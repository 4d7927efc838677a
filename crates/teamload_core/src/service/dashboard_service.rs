//! Dashboard use-case service.
//!
//! # Responsibility
//! - Compose the user and project registries over one storage backend.
//! - Gate project create/edit on allocation sum and assignment identity.
//! - Export and import the full dashboard as one JSON document.
//!
//! # Invariants
//! - Create/edit never commits a project whose assignment total exceeds 100.
//! - A rejected import leaves both registries untouched.
//! - Reorder and import bypass the allocation gate.

use crate::clock::now_epoch_ms;
use crate::config::StoreConfig;
use crate::model::bundle::{decode_import, ImportError, TransferBundle};
use crate::model::project::{
    duplicate_assignment_id, total_allocation, AllocationSplit, Project, ProjectInput,
    ProjectPatch, TeamMember, FULL_ALLOCATION,
};
use crate::model::user::{User, UserId, UserPatch};
use crate::repo::project_registry::ProjectRegistry;
use crate::repo::user_registry::UserRegistry;
use crate::repo::RegistryResult;
use crate::service::aggregation::DashboardSummary;
use crate::storage::KeyValueStorage;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Allocation the "Me" member starts with on a new project draft.
pub const DRAFT_ME_ALLOCATION: f64 = 50.0;
/// Allocation a member starts with when added to an existing draft.
pub const DRAFT_MEMBER_ALLOCATION: f64 = 0.0;

/// Refusal reasons of the project create/edit gate.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectGateError {
    /// Project name is blank.
    EmptyName,
    /// Assignment allocations sum above full capacity.
    AllocationExceeded { total: f64 },
    /// The same member is assigned twice.
    DuplicateAssignment(UserId),
}

impl Display for ProjectGateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name cannot be empty"),
            Self::AllocationExceeded { total } => {
                write!(f, "team allocation {total}% exceeds {FULL_ALLOCATION}%")
            }
            Self::DuplicateAssignment(id) => write!(f, "member assigned twice: {id}"),
        }
    }
}

impl Error for ProjectGateError {}

/// Dashboard entry points used by presentation collaborators.
pub struct DashboardService<S: KeyValueStorage> {
    users: UserRegistry<S>,
    projects: ProjectRegistry<S>,
}

impl<S: KeyValueStorage + Clone> DashboardService<S> {
    /// Loads both registries from `storage` using the configured keys.
    pub fn open(storage: S, config: &StoreConfig) -> Self {
        Self::new(
            UserRegistry::load(storage.clone(), config.users_key.as_str()),
            ProjectRegistry::load(storage, config.projects_key.as_str()),
        )
    }
}

impl<S: KeyValueStorage> DashboardService<S> {
    /// Builds the service from already-loaded registries.
    pub fn new(users: UserRegistry<S>, projects: ProjectRegistry<S>) -> Self {
        Self { users, projects }
    }

    pub fn users(&self) -> &[User] {
        self.users.users()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.projects()
    }

    pub fn user_registry(&self) -> &UserRegistry<S> {
        &self.users
    }

    pub fn add_user(&mut self, name: impl Into<String>, color: impl Into<String>) -> User {
        self.users.add_user(name, color)
    }

    pub fn update_user(&mut self, id: &str, patch: &UserPatch) -> bool {
        self.users.update_user(id, patch)
    }

    pub fn remove_user(&mut self, id: &str) -> bool {
        self.users.remove_user(id)
    }

    pub fn remove_project(&mut self, id: &str) -> bool {
        self.projects.remove_project(id)
    }

    pub fn reorder_projects(&mut self, ordered: Vec<Project>) -> RegistryResult<()> {
        self.projects.reorder_projects(ordered)
    }

    /// Default assignments of a new project: "Me" at 50% with an even split.
    pub fn draft_assignments(&self) -> Vec<TeamMember> {
        self.users
            .me()
            .map(|me| TeamMember::from_user(me, DRAFT_ME_ALLOCATION, AllocationSplit::default()))
            .into_iter()
            .collect()
    }

    /// Snapshot of a live user ready to be added to a draft (0%, even split).
    pub fn draft_member(&self, user_id: &str) -> Option<TeamMember> {
        self.users.get(user_id).map(|user| {
            TeamMember::from_user(user, DRAFT_MEMBER_ALLOCATION, AllocationSplit::default())
        })
    }

    /// Creates a project after passing the allocation gate.
    pub fn create_project(&mut self, input: ProjectInput) -> Result<Project, ProjectGateError> {
        check_gate(&input.name, &input.assignments).inspect_err(|err| {
            warn!("event=project_create module=service status=rejected reason={err}");
        })?;

        let project = self.projects.add_project(input);
        info!(
            "event=project_create module=service status=ok id={} assignments={}",
            project.id,
            project.assignments.len()
        );
        Ok(project)
    }

    /// Edits a project after passing the allocation gate.
    ///
    /// The gate checks the assignments the project would have after the
    /// edit. Returns `Ok(false)` when `id` is unknown.
    pub fn edit_project(
        &mut self,
        id: &str,
        patch: &ProjectPatch,
    ) -> Result<bool, ProjectGateError> {
        let Some(current) = self.projects.get(id) else {
            return Ok(false);
        };
        let name = patch.name.as_deref().unwrap_or(current.name.as_str());
        let assignments = patch
            .assignments
            .as_deref()
            .unwrap_or(current.assignments.as_slice());
        check_gate(name, assignments).inspect_err(|err| {
            warn!("event=project_edit module=service status=rejected id={id} reason={err}");
        })?;

        Ok(self.projects.update_project(id, patch))
    }

    /// Derived allocation views for the current state.
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(self.users.users(), self.projects.projects())
    }

    /// Snapshot of the whole dashboard for backup.
    pub fn export_bundle(&self) -> TransferBundle {
        TransferBundle::new(
            self.projects.export_projects(),
            self.users.users().to_vec(),
            now_epoch_ms(),
        )
    }

    /// Pretty-printed JSON backup document.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export_bundle())
    }

    /// Replaces users and projects from a JSON backup document.
    ///
    /// # Errors
    /// - Any `ImportError`; registries are not modified in that case.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let decoded = decode_import(text).inspect_err(|err| {
            warn!("event=dashboard_import module=service status=rejected reason={err}");
        })?;

        info!(
            "event=dashboard_import module=service status=ok projects={} users={} legacy_upgraded={}",
            decoded.projects.len(),
            decoded.users.len(),
            decoded.upgraded_projects
        );
        self.projects.import_projects(decoded.projects);
        self.users.replace_all(decoded.users);
        Ok(())
    }

    /// Drops every project and its storage entry. Users are kept.
    pub fn reset(&mut self) {
        self.projects.reset_projects();
    }
}

fn check_gate(name: &str, assignments: &[TeamMember]) -> Result<(), ProjectGateError> {
    if name.trim().is_empty() {
        return Err(ProjectGateError::EmptyName);
    }
    if let Some(id) = duplicate_assignment_id(assignments) {
        return Err(ProjectGateError::DuplicateAssignment(id.to_string()));
    }
    let total = total_allocation(assignments);
    if total > FULL_ALLOCATION {
        return Err(ProjectGateError::AllocationExceeded { total });
    }
    Ok(())
}
