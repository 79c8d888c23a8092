#![allow(dead_code)]

//! A throwaway backend served by axum on an ephemeral port. It mimics the
//! real server's envelope and status-code conventions closely enough to
//! exercise `HttpBackend` end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
pub struct FakeState {
    /// Every request path seen, in order.
    pub seen: Mutex<Vec<String>>,
}

type Shared = Arc<FakeState>;
type Reply = (StatusCode, Json<Value>);

fn ok(message: &str, data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"status": "OK", "message": message, "data": data})),
    )
}

fn fail(code: StatusCode, status: &str, message: &str) -> Reply {
    (
        code,
        Json(json!({"status": status, "message": message, "data": null})),
    )
}

fn seen(state: &Shared, path: String) {
    state.seen.lock().unwrap().push(path);
}

pub fn ana() -> Value {
    json!({"userId": 1, "name": "Ana", "email": "ana@example.com", "isActive": true})
}

fn task(id: i64, status: &str) -> Value {
    json!({
        "taskId": id,
        "taskName": format!("Task {id}"),
        "taskStatus": status,
        "taskPriority": "HIGH",
        "projectId": 1,
        "projectName": "Big Plan",
        "dueDate": "2024-06-01T00:00:00.000+00:00",
        "createdAt": "2024-03-01T09:00:00.000+00:00"
    })
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    seen(&state, "login".into());
    match (body["email"].as_str(), body["password"].as_str()) {
        (Some("ana@example.com"), Some("pw")) => ok("Login successful", ana()),
        (Some("ana@example.com"), _) => {
            fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid password")
        }
        // Rejected with a 2xx transport status; only the envelope says no.
        (Some("bo@example.com"), _) => {
            fail(StatusCode::OK, "UNAUTHORIZED", "Invalid credentials")
        }
        _ => fail(StatusCode::NOT_FOUND, "NOT_FOUND", "User not found"),
    }
}

async fn all_users() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>")
}

async fn member_role(
    State(state): State<Shared>,
    Path((project, email)): Path<(String, String)>,
) -> Reply {
    seen(&state, format!("member-role {project} {email}"));
    if project == "Big Plan" && email == "ana@example.com" {
        ok("", json!({"role": "MEMBRE", "email": email, "projectName": project}))
    } else {
        fail(StatusCode::NOT_FOUND, "NOT_FOUND", "User is not a member of this project")
    }
}

async fn update_member_role(
    State(state): State<Shared>,
    Path((project, email)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    seen(
        &state,
        format!(
            "set-role {project} {email} {}",
            query.get("role").cloned().unwrap_or_default()
        ),
    );
    ok("Role updated successfully", Value::Null)
}

async fn create_project(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Reply {
    let creator = query.get("creatorEmail").cloned().unwrap_or_default();
    seen(&state, format!("create-project {creator}"));
    if body["projectName"] == "Taken" {
        return fail(StatusCode::CONFLICT, "CONFLICT", "Project name already exists");
    }
    ok(
        "Project created successfully",
        json!({
            "projectId": 2,
            "projectName": body["projectName"],
            "projectDescription": body["projectDescription"],
            "projectStartDate": null,
            "projectStatus": body["projectStatus"],
            "createdBy": 1,
            "creatorEmail": creator
        }),
    )
}

async fn delete_project(State(state): State<Shared>, Path(name): Path<String>) -> Reply {
    seen(&state, format!("delete-project {name}"));
    if name == "Big Plan" {
        ok("Project deleted successfully", Value::Null)
    } else {
        fail(StatusCode::NOT_FOUND, "NOT_FOUND", "Project not found")
    }
}

async fn project_tasks(Path(name): Path<String>) -> Reply {
    if name != "Big Plan" {
        return ok("", json!([]));
    }
    ok(
        "",
        json!([task(1, "TODO"), task(2, "IN_PROGRESS"), task(3, "COMPLETED"), task(4, "ARCHIVED")]),
    )
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Reply {
    seen(
        &state,
        format!(
            "update-task {id} by {}",
            query.get("updatedBy").cloned().unwrap_or_default()
        ),
    );
    let mut updated = task(id, body["taskStatus"].as_str().unwrap_or("TODO"));
    if let Some(name) = body["taskName"].as_str() {
        updated["taskName"] = json!(name);
    }
    ok("Task updated successfully", updated)
}

async fn task_history(Path(id): Path<i64>) -> Reply {
    if id == 2 {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", "db down");
    }
    ok(
        "",
        json!([
            {
                "historyId": id * 10,
                "taskId": id,
                "fieldChanged": "taskStatus",
                "oldValue": "TODO",
                "newValue": "IN_PROGRESS",
                "changedBy": 1,
                "changedAt": format!("2024-03-0{id}T10:00:00.000+00:00")
            }
        ]),
    )
}

async fn dashboard(Path(email): Path<String>) -> Reply {
    if email != "ana@example.com" {
        return fail(StatusCode::NOT_FOUND, "NOT_FOUND", "User not found");
    }
    ok(
        "",
        json!({
            "totalProjects": 1,
            "todoTasks": 1,
            "inProgressTasks": 1,
            "completedTasks": 1,
            "totalTasks": 4,
            "tasksByStatus": {
                "TODO": [task(1, "TODO")],
                "IN_PROGRESS": [task(2, "IN_PROGRESS")],
                "COMPLETED": [task(3, "COMPLETED")]
            }
        }),
    )
}

/// Serve the fake backend and return its `/api` base URL and shared state.
pub async fn spawn_backend() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/api/user/login", post(login))
        .route("/api/user/all", get(all_users))
        .route("/api/project/create", post(create_project))
        .route("/api/project/{name}", delete(delete_project))
        .route(
            "/api/project/{name}/member-role/{email}",
            get(member_role).put(update_member_role),
        )
        .route("/api/task/project/name/{name}", get(project_tasks))
        .route("/api/task/{id}", put(update_task))
        .route("/api/task/{id}/history", get(task_history))
        .route("/api/task/dashboard/{email}", get(dashboard))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), state)
}
