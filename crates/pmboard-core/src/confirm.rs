//! Two-step destructive actions.
//!
//! A [`PendingAction`] can only be executed after passing through
//! [`Confirmation::confirm`], which yields the [`ConfirmedAction`] that
//! actually talks to the backend.

use crate::api::Backend;
use crate::error::Result;
use crate::model::{TaskId, UserId};
use crate::roles::Capabilities;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteProject { name: String },
    DeleteTask { id: TaskId, name: String },
    RemoveMember { project: String, email: String, name: String },
    DeactivateUser { id: UserId, name: String },
    DeleteUser { id: UserId, name: String },
}

impl PendingAction {
    pub fn request(self) -> Confirmation {
        Confirmation { action: self }
    }

    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteProject { name } => format!(
                "Delete project \"{name}\"? This will delete all tasks in this project."
            ),
            Self::DeleteTask { name, .. } => format!("Delete task \"{name}\"?"),
            Self::RemoveMember { name, email, .. } => {
                let who = if name.is_empty() { email } else { name };
                format!("Remove {who} from the project?")
            }
            Self::DeactivateUser { name, .. } => format!("Deactivate user {name}?"),
            Self::DeleteUser { name, .. } => {
                format!("Delete user {name}? This action cannot be undone.")
            }
        }
    }

    /// Project-scoped actions need the matching capability. Account actions
    /// are not project-scoped and are left to the backend.
    pub fn allowed_by(&self, caps: &Capabilities) -> bool {
        match self {
            Self::DeleteProject { .. } | Self::RemoveMember { .. } => caps.can_manage_members(),
            Self::DeleteTask { .. } => caps.can_edit(),
            Self::DeactivateUser { .. } | Self::DeleteUser { .. } => true,
        }
    }

    /// Message shown when the action succeeds.
    pub fn done_message(&self) -> String {
        match self {
            Self::DeleteProject { name } => format!("Deleted project {name}"),
            Self::DeleteTask { name, .. } => format!("Deleted task {name}"),
            Self::RemoveMember { email, project, .. } => format!("Removed {email} from {project}"),
            Self::DeactivateUser { name, .. } => format!("Deactivated {name}"),
            Self::DeleteUser { name, .. } => format!("Deleted user {name}"),
        }
    }

    /// Fallback shown when the backend gives no reason for a failure.
    pub fn failure_fallback(&self) -> &'static str {
        match self {
            Self::DeleteProject { .. } => "Failed to delete project",
            Self::DeleteTask { .. } => "Failed to delete task",
            Self::RemoveMember { .. } => "Failed to remove member",
            Self::DeactivateUser { .. } => "Failed to deactivate user",
            Self::DeleteUser { .. } => "Failed to delete user",
        }
    }
}

/// An action awaiting an explicit yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    action: PendingAction,
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        self.action.prompt()
    }

    pub fn action(&self) -> &PendingAction {
        &self.action
    }

    pub fn confirm(self) -> ConfirmedAction {
        ConfirmedAction(self.action)
    }

    /// Drop the request, handing back what was asked for.
    pub fn cancel(self) -> PendingAction {
        self.action
    }
}

/// Only obtainable from [`Confirmation::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedAction(PendingAction);

impl ConfirmedAction {
    pub fn action(&self) -> &PendingAction {
        &self.0
    }

    pub async fn execute<B: Backend>(&self, backend: &B) -> Result<()> {
        tracing::info!(action = ?self.0, "executing confirmed action");
        match &self.0 {
            PendingAction::DeleteProject { name } => backend.delete_project(name).await,
            PendingAction::DeleteTask { id, .. } => backend.delete_task(*id).await,
            PendingAction::RemoveMember { project, email, .. } => {
                backend.remove_member(project, email).await
            }
            PendingAction::DeactivateUser { id, .. } => {
                backend.deactivate_user(*id).await.map(|_| ())
            }
            PendingAction::DeleteUser { id, .. } => backend.delete_user(*id).await,
        }
    }
}
