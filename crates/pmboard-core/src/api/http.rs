use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ProjectApi, TaskApi, UserApi};
use crate::config::ApiConfig;
use crate::envelope::{extract_error_message, Envelope};
use crate::error::{PmboardError, Result};
use crate::model::*;

/// `reqwest` implementation of the resource clients.
///
/// One attempt per call: no retries, and no timeout unless configured.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<std::time::Duration>) -> Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PmboardError::Config(format!("invalid api.base_url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(PmboardError::Config(format!(
                "api.base_url '{base_url}' cannot be used as a base URL"
            )));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PmboardError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base, http })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so names and emails containing `/` or spaces stay one segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn url_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.url(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send once and decode the envelope. A non-2xx answer becomes a
    /// transport error carrying whatever message the body had.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Envelope<T>> {
        let req = req.build()?;
        let method = req.method().clone();
        let url = req.url().clone();
        tracing::debug!(%method, %url, "backend request");

        let resp = self.http.execute(req).await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "backend request failed");
            PmboardError::from(e)
        })?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::debug!(%method, %url, status = status.as_u16(), "backend returned error status");
            return Err(PmboardError::Transport {
                status: Some(status.as_u16()),
                message: extract_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview = if body.len() > 300 {
                body.get(..300).unwrap_or(&body)
            } else {
                &body
            };
            tracing::debug!(%url, error = %e, body = preview, "failed to decode envelope");
            PmboardError::Serialization(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let req = self.request(Method::GET, self.url(segments));
        self.send(req).await?.into_result()
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::POST, url).json(body);
        self.send(req).await?.into_result()
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T> {
        let req = self.request(Method::PUT, url).json(body);
        self.send(req).await?.into_result()
    }

    /// For endpoints that answer with an empty payload on success.
    async fn send_unit(&self, method: Method, url: Url) -> Result<()> {
        let req = self.request(method, url);
        self.send::<serde_json::Value>(req).await?.into_unit()
    }
}

impl UserApi for HttpBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<User> {
        request.validate()?;
        self.post(self.url(&["user", "register"]), request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<User> {
        request.validate()?;
        self.post(self.url(&["user", "login"]), request).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.get(&["user", "all"]).await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.get(&["user", &id.to_string()]).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.get(&["user", "email", email]).await
    }

    async fn update_user(&self, id: UserId, changes: &ProfileUpdate) -> Result<User> {
        self.put(self.url(&["user", &id.to_string()]), changes).await
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.send_unit(Method::DELETE, self.url(&["user", &id.to_string()]))
            .await
    }

    async fn deactivate_user(&self, id: UserId) -> Result<User> {
        let url = self.url(&["user", &id.to_string(), "deactivate"]);
        let req = self.request(Method::PUT, url);
        self.send(req).await?.into_result()
    }
}

impl ProjectApi for HttpBackend {
    async fn create_project(&self, draft: &ProjectDraft, creator_email: &str) -> Result<Project> {
        draft.validate_create()?;
        let url = self.url_with_query(&["project", "create"], &[("creatorEmail", creator_email)]);
        self.post(url, draft).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get(&["project", "all"]).await
    }

    async fn get_project(&self, name: &str) -> Result<Project> {
        self.get(&["project", "name", name]).await
    }

    async fn get_project_by_id(&self, id: ProjectId) -> Result<Project> {
        self.get(&["project", &id.to_string()]).await
    }

    async fn projects_for_user(&self, email: &str) -> Result<Vec<Project>> {
        self.get(&["project", "user", email]).await
    }

    async fn update_project(&self, name: &str, draft: &ProjectDraft) -> Result<Project> {
        self.put(self.url(&["project", name]), draft).await
    }

    async fn delete_project(&self, name: &str) -> Result<()> {
        self.send_unit(Method::DELETE, self.url(&["project", name]))
            .await
    }

    async fn invite_member(&self, invite: &InviteRequest) -> Result<Invitation> {
        invite.validate()?;
        self.post(self.url(&["project", "invite"]), invite).await
    }

    async fn accept_invite(&self, email: &str, project: &str) -> Result<()> {
        let url = self.url(&["project", "accept-invite", email, project]);
        self.send_unit(Method::GET, url).await
    }

    async fn list_members(&self, project: &str) -> Result<Vec<ProjectMember>> {
        self.get(&["project", project, "members"]).await
    }

    async fn member_role(&self, project: &str, email: &str) -> Result<RoleLookup> {
        self.get(&["project", project, "member-role", email]).await
    }

    async fn update_member_role(&self, project: &str, email: &str, role: Role) -> Result<()> {
        let url = self.url_with_query(
            &["project", project, "member-role", email],
            &[("role", role.as_str())],
        );
        self.send_unit(Method::PUT, url).await
    }

    async fn remove_member(&self, project: &str, email: &str) -> Result<()> {
        let url = self.url(&["project", project, "member", email]);
        self.send_unit(Method::DELETE, url).await
    }
}

impl TaskApi for HttpBackend {
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;
        self.post(self.url(&["task", "create"]), draft).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get(&["task", "all"]).await
    }

    async fn get_task(&self, id: TaskId) -> Result<Task> {
        self.get(&["task", &id.to_string()]).await
    }

    async fn tasks_for_project(&self, id: ProjectId) -> Result<Vec<Task>> {
        self.get(&["task", "project", &id.to_string()]).await
    }

    async fn tasks_for_project_name(&self, name: &str) -> Result<Vec<Task>> {
        self.get(&["task", "project", "name", name]).await
    }

    async fn tasks_for_user(&self, id: UserId) -> Result<Vec<Task>> {
        self.get(&["task", "user", &id.to_string()]).await
    }

    async fn tasks_by_status(&self, status: &TaskStatus) -> Result<Vec<Task>> {
        self.get(&["task", "status", status.as_str()]).await
    }

    async fn update_task(
        &self,
        id: TaskId,
        draft: &TaskDraft,
        updated_by: Option<UserId>,
    ) -> Result<Task> {
        let id = id.to_string();
        let url = match updated_by {
            Some(user) => self.url_with_query(&["task", &id], &[("updatedBy", &user.to_string())]),
            None => self.url(&["task", &id]),
        };
        self.put(url, draft).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.send_unit(Method::DELETE, self.url(&["task", &id.to_string()]))
            .await
    }

    async fn task_history(&self, id: TaskId) -> Result<Vec<TaskHistory>> {
        self.get(&["task", &id.to_string(), "history"]).await
    }

    async fn dashboard(&self, email: &str) -> Result<DashboardStats> {
        self.get(&["task", "dashboard", email]).await
    }
}
