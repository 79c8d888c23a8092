//! `HttpBackend` against an in-process fake server.
//!
//! Run: `cargo test -p pmboard-core --test http_backend`

mod common;

use std::sync::Arc;

use common::spawn_backend;
use pmboard_core::api::{HttpBackend, ProjectApi, TaskApi, UserApi};
use pmboard_core::board::{StatusFilter, TaskBoard};
use pmboard_core::confirm::PendingAction;
use pmboard_core::error::PmboardError;
use pmboard_core::guard::{Navigator, RouteGuard};
use pmboard_core::history::project_history;
use pmboard_core::model::*;
use pmboard_core::roles::RoleResolver;
use pmboard_core::session::{MemoryStorage, SessionStore};

async fn backend() -> (HttpBackend, Arc<common::FakeState>) {
    let (url, state) = spawn_backend().await;
    (HttpBackend::new(&url, None).unwrap(), state)
}

#[tokio::test]
async fn test_login_roundtrip_establishes_session() {
    let (backend, _) = backend().await;
    let mut session = SessionStore::restore(MemoryStorage::new());

    session
        .login(&backend, &LoginRequest::new("ana@example.com", "pw"))
        .await
        .expect("login");
    let user = session.current_user().unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn test_login_rejection_surfaces_server_message() {
    let (backend, _) = backend().await;
    let mut session = SessionStore::restore(MemoryStorage::new());

    let err = session
        .login(&backend, &LoginRequest::new("ana@example.com", "nope"))
        .await
        .unwrap_err();
    match &err {
        PmboardError::Transport { status, message } => {
            assert_eq!(*status, Some(401));
            assert_eq!(message.as_deref(), Some("Invalid password"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(err.user_message("Login failed. Please try again."), "Invalid password");
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_login_null_data_keeps_existing_session() {
    let (backend, _) = backend().await;
    let mut session = SessionStore::restore(MemoryStorage::new());
    session
        .login(&backend, &LoginRequest::new("ana@example.com", "pw"))
        .await
        .expect("login");

    let err = session
        .login(&backend, &LoginRequest::new("bo@example.com", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, PmboardError::Backend(_)), "got {err:?}");
    assert_eq!(err.user_message("Login failed. Please try again."), "Invalid credentials");
    assert_eq!(session.current_user().unwrap().email, "ana@example.com");
}

#[derive(Default)]
struct RecordingNav {
    redirected: bool,
}

impl Navigator for RecordingNav {
    fn redirect_to_login(&mut self) {
        self.redirected = true;
    }
}

#[tokio::test]
async fn test_guard_passes_after_login() {
    let (backend, _) = backend().await;
    let mut session = SessionStore::restore(MemoryStorage::new());
    let guard = RouteGuard::new();

    let mut nav = RecordingNav::default();
    assert!(!guard.can_activate(&session, &mut nav));
    assert!(nav.redirected);

    session
        .login(&backend, &LoginRequest::new("ana@example.com", "pw"))
        .await
        .expect("login");
    let mut nav = RecordingNav::default();
    assert!(guard.can_activate(&session, &mut nav));
    assert!(!nav.redirected);
}

#[tokio::test]
async fn test_non_json_error_body_uses_fallback() {
    let (backend, _) = backend().await;
    let err = backend.list_users().await.unwrap_err();
    assert!(matches!(err, PmboardError::Transport { status: Some(500), message: None }));
    assert_eq!(err.user_message("Failed to load users"), "Failed to load users");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9/api", None).unwrap();
    let err = backend.list_projects().await.unwrap_err();
    assert!(matches!(err, PmboardError::Transport { status: None, .. }));
    assert_eq!(err.user_message("Failed to load projects"), "Failed to load projects");
}

#[tokio::test]
async fn test_role_lookup_with_encoded_segments() {
    let (backend, state) = backend().await;
    let mut resolver = RoleResolver::new();

    let caps = resolver.resolve(&backend, "Big Plan", "ana@example.com").await;
    assert!(caps.is_member());
    assert!(caps.can_edit());
    assert!(!caps.can_manage_members());

    let outsider = resolver.resolve(&backend, "Other", "ana@example.com").await;
    assert!(!outsider.can_edit());

    let seen = state.seen.lock().unwrap();
    assert!(seen.contains(&"member-role Big Plan ana@example.com".to_string()));
}

#[tokio::test]
async fn test_update_member_role_sends_query() {
    let (backend, state) = backend().await;
    backend
        .update_member_role("Big Plan", "bo@example.com", Role::Observer)
        .await
        .unwrap();
    let seen = state.seen.lock().unwrap();
    assert_eq!(seen.last().unwrap(), "set-role Big Plan bo@example.com OBSERVER");
}

#[tokio::test]
async fn test_create_project_passes_creator_and_defaults() {
    let (backend, state) = backend().await;
    let project = backend
        .create_project(&ProjectDraft::new("Launch"), "ana@example.com")
        .await
        .unwrap();
    assert_eq!(project.name, "Launch");
    assert_eq!(project.status, DEFAULT_PROJECT_STATUS);
    assert_eq!(project.creator_email.as_deref(), Some("ana@example.com"));
    assert_eq!(
        state.seen.lock().unwrap().last().unwrap(),
        "create-project ana@example.com"
    );

    let err = backend
        .create_project(&ProjectDraft::new("Taken"), "ana@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Failed to create project"), "Project name already exists");
}

#[tokio::test]
async fn test_board_from_project_tasks() {
    let (backend, _) = backend().await;
    let tasks = backend.tasks_for_project_name("Big Plan").await.unwrap();
    let board = TaskBoard::new(tasks);

    assert_eq!(board.filter_by_status(StatusFilter::All).len(), 4);
    assert_eq!(board.filter_by_status(StatusFilter::Todo)[0].id, 1);
    assert_eq!(board.lane_counts().other, 1);
    let first = &board.all()[0];
    assert_eq!(first.priority, Priority::High);
    assert_eq!(first.due_date.unwrap().to_string(), "2024-06-01");
}

#[tokio::test]
async fn test_update_task_records_editor() {
    let (backend, state) = backend().await;
    let draft = TaskDraft {
        name: Some("Renamed".into()),
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    let task = backend.update_task(3, &draft, Some(1)).await.unwrap();
    assert_eq!(task.name, "Renamed");
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(state.seen.lock().unwrap().last().unwrap(), "update-task 3 by 1");
}

#[tokio::test]
async fn test_project_history_skips_failed_task() {
    let (backend, _) = backend().await;
    let entries = project_history(Arc::new(backend), "Big Plan").await.unwrap();
    // Task 2's history endpoint fails; tasks 1, 3 and 4 remain, newest first.
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![40, 30, 10]);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (backend, _) = backend().await;
    let stats = backend.dashboard("ana@example.com").await.unwrap();
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.lane(&TaskStatus::InProgress).len(), 1);
}

#[tokio::test]
async fn test_confirmed_delete_treats_null_data_as_success() {
    let (backend, _) = backend().await;
    let confirmed = PendingAction::DeleteProject {
        name: "Big Plan".into(),
    }
    .request()
    .confirm();
    confirmed.execute(&backend).await.unwrap();

    let missing = PendingAction::DeleteProject {
        name: "Ghost".into(),
    }
    .request()
    .confirm();
    let err = missing.execute(&backend).await.unwrap_err();
    assert_eq!(err.user_message("Failed to delete project"), "Project not found");
}
