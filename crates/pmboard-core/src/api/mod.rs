//! Resource clients for the backend's REST endpoints.
//!
//! Each resource (users, projects, tasks) is its own trait so components can
//! depend on only what they call. [`Backend`] bundles all three and is
//! implemented automatically. The traits use RPITIT, so dispatch is static.

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::HttpBackend;

use std::future::Future;

use crate::error::Result;
use crate::model::*;

pub trait UserApi: Send + Sync {
    fn register(&self, request: &RegisterRequest) -> impl Future<Output = Result<User>> + Send;

    fn login(&self, request: &LoginRequest) -> impl Future<Output = Result<User>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn get_user(&self, id: UserId) -> impl Future<Output = Result<User>> + Send;

    fn get_user_by_email(&self, email: &str) -> impl Future<Output = Result<User>> + Send;

    /// Partial update; fields left `None` are not sent.
    fn update_user(
        &self,
        id: UserId,
        changes: &ProfileUpdate,
    ) -> impl Future<Output = Result<User>> + Send;

    fn delete_user(&self, id: UserId) -> impl Future<Output = Result<()>> + Send;

    fn deactivate_user(&self, id: UserId) -> impl Future<Output = Result<User>> + Send;
}

pub trait ProjectApi: Send + Sync {
    fn create_project(
        &self,
        draft: &ProjectDraft,
        creator_email: &str,
    ) -> impl Future<Output = Result<Project>> + Send;

    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>>> + Send;

    fn get_project(&self, name: &str) -> impl Future<Output = Result<Project>> + Send;

    fn get_project_by_id(&self, id: ProjectId) -> impl Future<Output = Result<Project>> + Send;

    /// Projects the user created or has accepted membership in.
    fn projects_for_user(&self, email: &str) -> impl Future<Output = Result<Vec<Project>>> + Send;

    fn update_project(
        &self,
        name: &str,
        draft: &ProjectDraft,
    ) -> impl Future<Output = Result<Project>> + Send;

    fn delete_project(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    fn invite_member(
        &self,
        invite: &InviteRequest,
    ) -> impl Future<Output = Result<Invitation>> + Send;

    fn accept_invite(&self, email: &str, project: &str)
        -> impl Future<Output = Result<()>> + Send;

    fn list_members(&self, project: &str)
        -> impl Future<Output = Result<Vec<ProjectMember>>> + Send;

    /// The user's role in a project. Fails unless the membership is accepted.
    fn member_role(
        &self,
        project: &str,
        email: &str,
    ) -> impl Future<Output = Result<RoleLookup>> + Send;

    fn update_member_role(
        &self,
        project: &str,
        email: &str,
        role: Role,
    ) -> impl Future<Output = Result<()>> + Send;

    fn remove_member(&self, project: &str, email: &str)
        -> impl Future<Output = Result<()>> + Send;
}

pub trait TaskApi: Send + Sync {
    fn create_task(&self, draft: &TaskDraft) -> impl Future<Output = Result<Task>> + Send;

    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn get_task(&self, id: TaskId) -> impl Future<Output = Result<Task>> + Send;

    fn tasks_for_project(&self, id: ProjectId)
        -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn tasks_for_project_name(&self, name: &str)
        -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn tasks_for_user(&self, id: UserId) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn tasks_by_status(&self, status: &TaskStatus)
        -> impl Future<Output = Result<Vec<Task>>> + Send;

    /// `updated_by` is recorded as `changedBy` on the history entries the
    /// update produces.
    fn update_task(
        &self,
        id: TaskId,
        draft: &TaskDraft,
        updated_by: Option<UserId>,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<()>> + Send;

    fn task_history(&self, id: TaskId) -> impl Future<Output = Result<Vec<TaskHistory>>> + Send;

    fn dashboard(&self, email: &str) -> impl Future<Output = Result<DashboardStats>> + Send;
}

/// Every resource client at once.
pub trait Backend: UserApi + ProjectApi + TaskApi {}

impl<T: UserApi + ProjectApi + TaskApi> Backend for T {}
