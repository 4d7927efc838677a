//! Versioned project records and the legacy -> current upgrade.
//!
//! # Responsibility
//! - Recognize single-assignee legacy project records at deserialization.
//! - Upgrade them into the multi-assignee `Project` shape.
//!
//! # Invariants
//! - A record is legacy iff it has no `assignments` field.
//! - Upgrading is one-way and idempotent on current records.

use crate::model::project::{AllocationSplit, Project, TeamMember};
use crate::model::user::{DEFAULT_COLOR, DEFAULT_ME_NAME};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Assignee id given to the implicit owner of a legacy project.
pub const LEGACY_ASSIGNEE_ID: &str = "me";

/// Project record predating multi-assignee support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub allocation: f64,
    #[serde(default)]
    pub type_split: Option<AllocationSplit>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: i64,
}

/// Any project record shape that may be found in storage or an import.
///
/// The variant is chosen by the presence of `assignments`; a record that has
/// it but fails `Project` decoding is an error, never a legacy fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectRecord {
    Current(Project),
    Legacy(LegacyProject),
}

impl<'de> Deserialize<'de> for ProjectRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let has_assignments = value
            .as_object()
            .is_some_and(|object| object.contains_key("assignments"));

        if has_assignments {
            Project::deserialize(value)
                .map(Self::Current)
                .map_err(D::Error::custom)
        } else {
            LegacyProject::deserialize(value)
                .map(Self::Legacy)
                .map_err(D::Error::custom)
        }
    }
}

impl ProjectRecord {
    /// Returns whether this record still needs the legacy upgrade.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Converts the record into the current `Project` shape.
    pub fn upgrade(self) -> Project {
        match self {
            Self::Current(project) => project,
            Self::Legacy(legacy) => legacy.upgrade(),
        }
    }
}

impl LegacyProject {
    /// Moves the top-level allocation into a single "Me" assignment.
    pub fn upgrade(self) -> Project {
        let owner = TeamMember {
            id: LEGACY_ASSIGNEE_ID.to_string(),
            name: DEFAULT_ME_NAME.to_string(),
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            is_me: true,
            allocation: self.allocation,
            type_split: self.type_split.unwrap_or_default(),
        };

        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            assignments: vec![owner],
            last_updated: self.last_updated,
        }
    }
}

/// Upgrades a whole collection, returning the projects and the upgrade count.
pub fn upgrade_all(records: Vec<ProjectRecord>) -> (Vec<Project>, usize) {
    let upgraded = records.iter().filter(|record| record.is_legacy()).count();
    let projects = records.into_iter().map(ProjectRecord::upgrade).collect();
    (projects, upgraded)
}
