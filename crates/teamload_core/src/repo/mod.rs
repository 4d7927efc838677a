//! Registries owning the persisted user and project collections.
//!
//! # Responsibility
//! - Hold each collection in memory and mirror every mutation to storage.
//! - Contain persistence failures at the registry boundary.
//!
//! # Invariants
//! - Every successful mutation is followed by a full-collection write.
//! - Unknown ids passed to update/remove are silent no-ops.
//! - Storage errors are logged, never returned to callers.

use crate::model::project::ProjectId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod project_registry;
pub mod user_registry;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Rejected registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A reordered list is not a permutation of the stored projects.
    ReorderMismatch {
        missing: Vec<ProjectId>,
        unexpected: Vec<ProjectId>,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReorderMismatch {
                missing,
                unexpected,
            } => write!(
                f,
                "reordered projects do not match stored projects (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                unexpected.join(", ")
            ),
        }
    }
}

impl Error for RegistryError {}
