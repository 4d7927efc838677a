//! Allocation aggregation.
//!
//! # Responsibility
//! - Compute per-user totals across all projects.
//! - Compute per-project total and unassigned capacity.
//!
//! # Invariants
//! - Pure: recomputed from inputs on every call, nothing cached.
//! - Snapshots whose id has no live user are excluded from user totals.
//! - `unassigned == max(0, 100 - total)`.

use crate::model::project::{Project, ProjectId, TeamMember, FULL_ALLOCATION};
use crate::model::user::{User, UserId};

/// Allocation of one live user across every project.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAllocation {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub is_me: bool,
    /// Sum of assignment allocations, in percent of capacity.
    pub total: f64,
    pub frontend: f64,
    pub backend: f64,
    /// Number of projects the user is assigned to.
    pub project_count: usize,
}

impl UserAllocation {
    pub fn is_over_allocated(&self) -> bool {
        self.total > FULL_ALLOCATION
    }
}

/// Allocation summary of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectAllocation {
    pub project_id: ProjectId,
    pub total: f64,
    pub unassigned: f64,
    pub frontend: f64,
    pub backend: f64,
}

impl ProjectAllocation {
    pub fn is_over_allocated(&self) -> bool {
        self.total > FULL_ALLOCATION
    }
}

/// Assignment snapshot that no longer matches a live user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanedAssignment {
    pub project_id: ProjectId,
    pub member: TeamMember,
}

/// Everything the dashboard renders, derived in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub users: Vec<UserAllocation>,
    pub projects: Vec<ProjectAllocation>,
    pub orphaned: Vec<OrphanedAssignment>,
}

impl DashboardSummary {
    pub fn compute(users: &[User], projects: &[Project]) -> Self {
        Self {
            users: user_allocations(users, projects),
            projects: projects.iter().map(project_allocation).collect(),
            orphaned: orphaned_assignments(users, projects),
        }
    }

    /// Users whose combined allocation exceeds full capacity.
    pub fn over_allocated_users(&self) -> impl Iterator<Item = &UserAllocation> {
        self.users.iter().filter(|user| user.is_over_allocated())
    }
}

/// Per-user totals, in `users` order.
pub fn user_allocations(users: &[User], projects: &[Project]) -> Vec<UserAllocation> {
    users
        .iter()
        .map(|user| {
            let mut allocation = UserAllocation {
                user_id: user.id.clone(),
                name: user.name.clone(),
                color: user.color.clone(),
                is_me: user.is_me,
                total: 0.0,
                frontend: 0.0,
                backend: 0.0,
                project_count: 0,
            };
            for member in projects
                .iter()
                .flat_map(|project| project.assignments.iter())
                .filter(|member| member.id == user.id)
            {
                allocation.total += member.allocation;
                allocation.frontend += member.frontend_share();
                allocation.backend += member.backend_share();
                allocation.project_count += 1;
            }
            allocation
        })
        .collect()
}

/// Total, unassigned and split shares of one project.
pub fn project_allocation(project: &Project) -> ProjectAllocation {
    let total = project.total_allocation();
    ProjectAllocation {
        project_id: project.id.clone(),
        total,
        unassigned: unassigned(total),
        frontend: project
            .assignments
            .iter()
            .map(TeamMember::frontend_share)
            .sum(),
        backend: project
            .assignments
            .iter()
            .map(TeamMember::backend_share)
            .sum(),
    }
}

/// Capacity left on a project with the given assigned `total`.
pub fn unassigned(total: f64) -> f64 {
    (FULL_ALLOCATION - total).max(0.0)
}

/// Snapshots referencing ids with no live user, in project order.
pub fn orphaned_assignments(users: &[User], projects: &[Project]) -> Vec<OrphanedAssignment> {
    projects
        .iter()
        .flat_map(|project| {
            project
                .assignments
                .iter()
                .filter(move |member| !users.iter().any(|user| user.id == member.id))
                .map(move |member| OrphanedAssignment {
                    project_id: project.id.clone(),
                    member: member.clone(),
                })
        })
        .collect()
}
