use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::project::ProjectId;
use super::user::UserId;
use crate::error::{PmboardError, Result};

pub type TaskId = i64;

/// Status of a task. Unknown raw values are kept in `Other` so they survive a
/// round trip and still show up in unfiltered views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    pub const KNOWN: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "TODO" => Self::Todo,
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETED" => Self::Completed,
            _ => Self::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        match TaskStatus::from(normalized) {
            TaskStatus::Other(_) => Err(format!("unknown task status: {s}")),
            known => Ok(known),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Priority {
    pub const KNOWN: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Other(raw),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match Priority::from(s.trim().to_uppercase()) {
            Priority::Other(_) => Err(format!("unknown priority: {s}")),
            known => Ok(known),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskId")]
    pub id: TaskId,
    #[serde(rename = "taskName")]
    pub name: String,
    #[serde(rename = "taskDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "taskStatus")]
    pub status: TaskStatus,
    #[serde(rename = "taskPriority", default)]
    pub priority: Priority,
    #[serde(
        rename = "dueDate",
        default,
        with = "super::time::date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "projectId", default)]
    pub project_id: Option<ProjectId>,
    #[serde(rename = "projectName", default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(rename = "assignedTo", default)]
    pub assignee_id: Option<UserId>,
    #[serde(rename = "assignedToName", default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(rename = "createdBy", default)]
    pub creator_id: Option<UserId>,
    #[serde(
        rename = "createdAt",
        default,
        with = "super::time::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        default,
        with = "super::time::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a task. On update only `Some` fields are
/// sent and the backend records one history entry per changed field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(rename = "taskName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "taskDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "taskStatus", skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "taskPriority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(rename = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
}

impl TaskDraft {
    /// A fresh draft with the form defaults: TODO, MEDIUM.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            status: Some(TaskStatus::Todo),
            priority: Some(Priority::Medium),
            ..Default::default()
        }
    }

    /// Pre-fill a draft from an existing task, for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: Some(task.name.clone()),
            description: task.description.clone(),
            status: Some(task.status.clone()),
            priority: Some(task.priority.clone()),
            due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            project_id: task.project_id,
            assignee_id: task.assignee_id,
            creator_id: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(PmboardError::Validation("Task name is required".to_string())),
        }
    }

    /// For partial updates: at least one field set, and a name, if sent,
    /// is not blank.
    pub fn validate_update(&self) -> Result<()> {
        if self.name.is_some() {
            self.validate()?;
        }
        let empty = self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.project_id.is_none()
            && self.assignee_id.is_none();
        if empty {
            return Err(PmboardError::Validation("Nothing to update".to_string()));
        }
        Ok(())
    }
}

/// One recorded field change on a task. Written by the backend only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHistory {
    #[serde(rename = "historyId")]
    pub id: i64,
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    #[serde(rename = "fieldChanged", default)]
    pub field: String,
    #[serde(rename = "oldValue", default)]
    pub old_value: Option<String>,
    #[serde(rename = "newValue", default)]
    pub new_value: Option<String>,
    #[serde(rename = "changedBy", default)]
    pub changed_by: Option<UserId>,
    #[serde(
        rename = "changedAt",
        default,
        with = "super::time::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub changed_at: Option<DateTime<Utc>>,
}

/// Counters and lanes shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_projects: u64,
    #[serde(default)]
    pub todo_tasks: u64,
    #[serde(default)]
    pub in_progress_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub tasks_by_status: HashMap<String, Vec<Task>>,
}

impl DashboardStats {
    pub fn lane(&self, status: &TaskStatus) -> &[Task] {
        self.tasks_by_status
            .get(status.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
