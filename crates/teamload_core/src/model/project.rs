//! Project and assignment model.
//!
//! # Responsibility
//! - Define `Project` with its ordered `TeamMember` assignment snapshots.
//! - Provide input/patch shapes consumed by the project registry.
//!
//! # Invariants
//! - `TeamMember` is a value snapshot; later `User` edits do not propagate.
//! - `last_updated` is Unix epoch milliseconds.

use crate::model::user::{User, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable identifier of a project.
pub type ProjectId = String;

/// Full capacity of one person, in percent.
pub const FULL_ALLOCATION: f64 = 100.0;

/// Frontend/backend division of one assignment, in percent.
///
/// `frontend + backend` is conventionally 100 but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub frontend: f64,
    pub backend: f64,
}

impl Default for AllocationSplit {
    fn default() -> Self {
        Self {
            frontend: 50.0,
            backend: 50.0,
        }
    }
}

/// Snapshot of a `User` assigned to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: UserId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_me: bool,
    /// Percent of the member's capacity committed to the project.
    pub allocation: f64,
    pub type_split: AllocationSplit,
}

impl TeamMember {
    /// Takes a snapshot of `user` with the given allocation and split.
    pub fn from_user(user: &User, allocation: f64, type_split: AllocationSplit) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            color: user.color.clone(),
            is_me: user.is_me,
            allocation,
            type_split,
        }
    }

    /// Effective frontend allocation (percent of full capacity).
    pub fn frontend_share(&self) -> f64 {
        self.allocation * self.type_split.frontend / FULL_ALLOCATION
    }

    /// Effective backend allocation (percent of full capacity).
    pub fn backend_share(&self) -> f64 {
        self.allocation * self.type_split.backend / FULL_ALLOCATION
    }
}

/// Persisted project record (current schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assignments: Vec<TeamMember>,
    pub last_updated: i64,
}

impl Project {
    /// Sum of `allocation` over all assignments.
    pub fn total_allocation(&self) -> f64 {
        total_allocation(&self.assignments)
    }

    /// Merges the populated fields of `patch` into this record.
    ///
    /// Does not touch `last_updated`; the registry owns timestamps.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(assignments) = &patch.assignments {
            self.assignments = assignments.clone();
        }
    }
}

/// Caller-supplied fields for a new project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub assignments: Vec<TeamMember>,
}

/// Partial update for a `Project`.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub assignments: Option<Vec<TeamMember>>,
}

/// Sum of `allocation` over `assignments`.
pub fn total_allocation(assignments: &[TeamMember]) -> f64 {
    assignments.iter().map(|member| member.allocation).sum()
}

/// Returns the first assignment id that occurs more than once.
pub fn duplicate_assignment_id(assignments: &[TeamMember]) -> Option<&str> {
    let mut seen = HashSet::new();
    assignments
        .iter()
        .find(|member| !seen.insert(member.id.as_str()))
        .map(|member| member.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::{duplicate_assignment_id, AllocationSplit, Project, ProjectPatch, TeamMember};
    use crate::model::user::User;

    fn member(id: &str, allocation: f64) -> TeamMember {
        TeamMember {
            id: id.to_string(),
            name: id.to_string(),
            color: "#000000".to_string(),
            is_me: false,
            allocation,
            type_split: AllocationSplit::default(),
        }
    }

    #[test]
    fn snapshot_copies_user_identity() {
        let user = User::default_me();
        let snapshot = TeamMember::from_user(&user, 40.0, AllocationSplit::default());
        assert_eq!(snapshot.id, user.id);
        assert!(snapshot.is_me);
        assert_eq!(snapshot.allocation, 40.0);
    }

    #[test]
    fn shares_follow_type_split() {
        let mut snapshot = member("a", 40.0);
        snapshot.type_split = AllocationSplit {
            frontend: 75.0,
            backend: 25.0,
        };
        assert_eq!(snapshot.frontend_share(), 30.0);
        assert_eq!(snapshot.backend_share(), 10.0);
    }

    #[test]
    fn duplicate_assignment_ids_are_detected() {
        let members = vec![member("a", 10.0), member("b", 10.0), member("a", 5.0)];
        assert_eq!(duplicate_assignment_id(&members), Some("a"));
        assert_eq!(duplicate_assignment_id(&members[..2]), None);
    }

    #[test]
    fn patch_can_clear_description() {
        let mut project = Project {
            id: "p1".to_string(),
            name: "X".to_string(),
            description: Some("old".to_string()),
            assignments: vec![member("a", 60.0)],
            last_updated: 1,
        };
        project.apply(&ProjectPatch {
            description: Some(None),
            ..ProjectPatch::default()
        });
        assert_eq!(project.description, None);
        assert_eq!(project.name, "X");
        assert_eq!(project.total_allocation(), 60.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let project = Project {
            id: "p1".to_string(),
            name: "X".to_string(),
            description: None,
            assignments: vec![member("a", 60.0)],
            last_updated: 7,
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["lastUpdated"], 7);
        assert!(json.get("description").is_none());
        assert_eq!(json["assignments"][0]["typeSplit"]["frontend"], 50.0);
        assert_eq!(json["assignments"][0]["isMe"], false);
    }
}
