//! In-process stand-in for the backend, used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ProjectApi, TaskApi, UserApi};
use crate::error::{PmboardError, Result};
use crate::model::*;

#[derive(Default)]
pub struct FakeBackend {
    /// (user, password) pairs accepted by `login`.
    pub accounts: Mutex<Vec<(User, String)>>,
    /// (project, email) -> raw role string as the backend would store it.
    pub roles: HashMap<(String, String), String>,
    /// Per-task history and an artificial delay before answering.
    pub histories: HashMap<TaskId, (Vec<TaskHistory>, Duration)>,
    pub tasks: Vec<Task>,
    pub role_calls: AtomicUsize,
}

fn unsupported<T>() -> Result<T> {
    Err(PmboardError::Backend("not supported by the fake backend".to_string()))
}

impl FakeBackend {
    pub fn with_account(user: User, password: &str) -> Self {
        Self {
            accounts: Mutex::new(vec![(user, password.to_string())]),
            ..Default::default()
        }
    }

    pub fn role_calls(&self) -> usize {
        self.role_calls.load(Ordering::SeqCst)
    }
}

pub fn user(id: UserId, email: &str) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: email.to_string(),
        contact: None,
        active: true,
    }
}

pub fn task(id: TaskId, status: &str) -> Task {
    serde_json::from_value(serde_json::json!({
        "taskId": id,
        "taskName": format!("Task {id}"),
        "taskStatus": status,
        "projectId": 1,
        "projectName": "Apollo"
    }))
    .unwrap()
}

pub fn history(id: i64, task_id: TaskId, changed_at: &str) -> TaskHistory {
    serde_json::from_value(serde_json::json!({
        "historyId": id,
        "taskId": task_id,
        "fieldChanged": "taskStatus",
        "oldValue": "TODO",
        "newValue": "IN_PROGRESS",
        "changedBy": 1,
        "changedAt": changed_at
    }))
    .unwrap()
}

impl UserApi for FakeBackend {
    async fn register(&self, _request: &RegisterRequest) -> Result<User> {
        unsupported()
    }

    async fn login(&self, request: &LoginRequest) -> Result<User> {
        request.validate()?;
        let accounts = self.accounts.lock().unwrap();
        let Some((user, password)) = accounts.iter().find(|(u, _)| u.email == request.email)
        else {
            return Err(PmboardError::Transport {
                status: Some(404),
                message: Some("User not found".to_string()),
            });
        };
        if *password != request.password {
            return Err(PmboardError::Transport {
                status: Some(401),
                message: Some("Invalid password".to_string()),
            });
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn get_user(&self, _id: UserId) -> Result<User> {
        unsupported()
    }

    async fn get_user_by_email(&self, _email: &str) -> Result<User> {
        unsupported()
    }

    async fn update_user(&self, id: UserId, changes: &ProfileUpdate) -> Result<User> {
        let mut accounts = self.accounts.lock().unwrap();
        let Some((user, password)) = accounts.iter_mut().find(|(u, _)| u.id == id) else {
            return Err(PmboardError::Backend("User not found".to_string()));
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(contact) = &changes.contact {
            user.contact = Some(contact.clone());
        }
        if let Some(pw) = &changes.password {
            *password = pw.clone();
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, _id: UserId) -> Result<()> {
        unsupported()
    }

    async fn deactivate_user(&self, _id: UserId) -> Result<User> {
        unsupported()
    }
}

impl ProjectApi for FakeBackend {
    async fn create_project(&self, _draft: &ProjectDraft, _creator_email: &str) -> Result<Project> {
        unsupported()
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        unsupported()
    }

    async fn get_project(&self, _name: &str) -> Result<Project> {
        unsupported()
    }

    async fn get_project_by_id(&self, _id: ProjectId) -> Result<Project> {
        unsupported()
    }

    async fn projects_for_user(&self, _email: &str) -> Result<Vec<Project>> {
        unsupported()
    }

    async fn update_project(&self, _name: &str, _draft: &ProjectDraft) -> Result<Project> {
        unsupported()
    }

    async fn delete_project(&self, _name: &str) -> Result<()> {
        unsupported()
    }

    async fn invite_member(&self, _invite: &InviteRequest) -> Result<Invitation> {
        unsupported()
    }

    async fn accept_invite(&self, _email: &str, _project: &str) -> Result<()> {
        unsupported()
    }

    async fn list_members(&self, _project: &str) -> Result<Vec<ProjectMember>> {
        unsupported()
    }

    async fn member_role(&self, project: &str, email: &str) -> Result<RoleLookup> {
        self.role_calls.fetch_add(1, Ordering::SeqCst);
        match self.roles.get(&(project.to_string(), email.to_string())) {
            Some(raw) => Ok(RoleLookup {
                role: Role::parse(raw),
            }),
            None => Err(PmboardError::Transport {
                status: Some(404),
                message: Some("User is not a member of this project".to_string()),
            }),
        }
    }

    async fn update_member_role(&self, _project: &str, _email: &str, _role: Role) -> Result<()> {
        unsupported()
    }

    async fn remove_member(&self, _project: &str, _email: &str) -> Result<()> {
        unsupported()
    }
}

impl TaskApi for FakeBackend {
    async fn create_task(&self, _draft: &TaskDraft) -> Result<Task> {
        unsupported()
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    async fn get_task(&self, _id: TaskId) -> Result<Task> {
        unsupported()
    }

    async fn tasks_for_project(&self, _id: ProjectId) -> Result<Vec<Task>> {
        unsupported()
    }

    async fn tasks_for_project_name(&self, name: &str) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.project_name.as_deref() == Some(name))
            .cloned()
            .collect())
    }

    async fn tasks_for_user(&self, _id: UserId) -> Result<Vec<Task>> {
        unsupported()
    }

    async fn tasks_by_status(&self, _status: &TaskStatus) -> Result<Vec<Task>> {
        unsupported()
    }

    async fn update_task(
        &self,
        _id: TaskId,
        _draft: &TaskDraft,
        _updated_by: Option<UserId>,
    ) -> Result<Task> {
        unsupported()
    }

    async fn delete_task(&self, _id: TaskId) -> Result<()> {
        unsupported()
    }

    async fn task_history(&self, id: TaskId) -> Result<Vec<TaskHistory>> {
        let Some((entries, delay)) = self.histories.get(&id) else {
            return Err(PmboardError::Transport {
                status: Some(500),
                message: None,
            });
        };
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }
        Ok(entries.clone())
    }

    async fn dashboard(&self, _email: &str) -> Result<DashboardStats> {
        unsupported()
    }
}
