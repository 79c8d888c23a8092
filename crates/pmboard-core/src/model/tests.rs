use crate::model::*;
use serde_json::json;

#[test]
fn test_user_defaults_active_when_absent() {
    let user: User = serde_json::from_value(json!({
        "userId": 7,
        "name": "Ana",
        "email": "ana@example.com"
    }))
    .unwrap();
    assert!(user.active);
    assert!(user.contact.is_none());
}

#[test]
fn test_user_roundtrips_wire_names() {
    let user = User {
        id: 3,
        name: "Bo".into(),
        email: "bo@example.com".into(),
        contact: Some("555".into()),
        active: false,
    };
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["userId"], 3);
    assert_eq!(value["contactNumber"], "555");
    assert_eq!(value["isActive"], false);
}

#[test]
fn test_login_request_requires_both_fields() {
    assert!(LoginRequest::new("a@b.c", "pw").validate().is_ok());
    let err = LoginRequest::new("  ", "pw").validate().unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all fields");
    assert!(LoginRequest::new("a@b.c", "").validate().is_err());
}

#[test]
fn test_register_request_contact_optional() {
    let req = RegisterRequest {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        password: "secret".into(),
        contact: None,
    };
    assert!(req.validate().is_ok());
    let body = serde_json::to_value(&req).unwrap();
    assert!(body.get("contactNumber").is_none());

    let missing = RegisterRequest {
        name: String::new(),
        ..req
    };
    assert_eq!(
        missing.validate().unwrap_err().to_string(),
        "Please fill in all required fields"
    );
}

#[test]
fn test_profile_update_sends_only_set_fields() {
    let update = ProfileUpdate {
        name: Some("New".into()),
        ..Default::default()
    };
    assert!(!update.is_empty());
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "New"}));
    assert!(ProfileUpdate::default().is_empty());
}

#[test]
fn test_project_draft_defaults_active() {
    let draft = ProjectDraft::new("Apollo");
    assert_eq!(draft.status.as_deref(), Some(DEFAULT_PROJECT_STATUS));
    assert!(draft.validate_create().is_ok());

    let blank = ProjectDraft::new("   ");
    assert_eq!(
        blank.validate_create().unwrap_err().to_string(),
        "Project name is required"
    );
}

#[test]
fn test_project_decodes_lenient_start_date() {
    let project: Project = serde_json::from_value(json!({
        "projectId": 1,
        "projectName": "Apollo",
        "projectDescription": null,
        "projectStartDate": "2024-05-01T00:00:00.000+00:00",
        "projectStatus": "ACTIVE",
        "createdBy": 4
    }))
    .unwrap();
    assert_eq!(project.start_date.unwrap().to_string(), "2024-05-01");
    assert_eq!(project.owner_id, Some(4));
}

#[test]
fn test_role_parse_is_case_sensitive() {
    assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    assert_eq!(Role::parse("admin"), None);
    assert_eq!(Role::parse("Member"), None);
    assert_eq!(Role::parse(""), None);
}

#[test]
fn test_role_parse_localized_synonyms() {
    assert_eq!(Role::parse("ADMINISTRATEUR"), Some(Role::Admin));
    assert_eq!(Role::parse("MEMBRE"), Some(Role::Member));
    assert_eq!(Role::parse("OBSERVATEUR"), Some(Role::Observer));
}

#[test]
fn test_role_from_str_is_lenient() {
    assert_eq!("observer".parse::<Role>().unwrap(), Role::Observer);
    assert!("owner".parse::<Role>().is_err());
}

#[test]
fn test_member_unknown_role_is_none() {
    let member: ProjectMember = serde_json::from_value(json!({
        "userId": 2,
        "email": "x@y.z",
        "name": "X",
        "role": "OWNER",
        "status": "ACCEPTED"
    }))
    .unwrap();
    assert!(member.role.is_none());

    let member: ProjectMember = serde_json::from_value(json!({
        "email": "x@y.z",
        "role": "MEMBRE"
    }))
    .unwrap();
    assert_eq!(member.role, Some(Role::Member));
}

#[test]
fn test_invite_request_wire_shape() {
    let invite = InviteRequest {
        email: "new@example.com".into(),
        project_name: "Apollo".into(),
        role: Role::Observer,
        invited_by: "lead@example.com".into(),
    };
    assert!(invite.validate().is_ok());
    assert_eq!(
        serde_json::to_value(&invite).unwrap(),
        json!({
            "email": "new@example.com",
            "projectName": "Apollo",
            "role": "OBSERVER",
            "invitedBy": "lead@example.com"
        })
    );
}

#[test]
fn test_task_preserves_unknown_status() {
    let task: Task = serde_json::from_value(json!({
        "taskId": 9,
        "taskName": "Ship",
        "taskStatus": "BLOCKED",
        "taskPriority": "URGENT"
    }))
    .unwrap();
    assert_eq!(task.status, TaskStatus::Other("BLOCKED".into()));
    assert_eq!(task.priority, Priority::Other("URGENT".into()));
    assert!(!task.status.is_known());

    let back = serde_json::to_value(&task).unwrap();
    assert_eq!(back["taskStatus"], "BLOCKED");
}

#[test]
fn test_task_status_from_str_normalizes() {
    assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
    assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
    assert!("blocked".parse::<TaskStatus>().is_err());
}

#[test]
fn test_task_timestamps_accept_millis() {
    let task: Task = serde_json::from_value(json!({
        "taskId": 1,
        "taskName": "A",
        "taskStatus": "TODO",
        "createdAt": 1_700_000_000_000_i64,
        "updatedAt": "not a date"
    }))
    .unwrap();
    assert_eq!(task.created_at.unwrap().timestamp(), 1_700_000_000);
    assert!(task.updated_at.is_none());
    assert_eq!(task.priority, Priority::Medium);
}

#[test]
fn test_task_odd_timestamp_shapes_do_not_fail_decode() {
    let task: Task = serde_json::from_value(json!({
        "taskId": 2,
        "taskName": "B",
        "taskStatus": "TODO",
        "createdAt": 1.5,
        "updatedAt": true,
        "dueDate": [2024, 3, 1]
    }))
    .unwrap();
    assert!(task.created_at.is_none());
    assert!(task.updated_at.is_none());
    assert_eq!(task.due_date.unwrap().to_string(), "2024-03-01");
}

#[test]
fn test_task_draft_validation_and_body() {
    let draft = TaskDraft {
        project_id: Some(3),
        ..TaskDraft::new("Write docs")
    };
    assert!(draft.validate().is_ok());
    let body = serde_json::to_value(&draft).unwrap();
    assert_eq!(body["taskStatus"], "TODO");
    assert_eq!(body["taskPriority"], "MEDIUM");
    assert_eq!(body["projectId"], 3);
    assert!(body.get("assignedTo").is_none());

    assert_eq!(
        TaskDraft::default().validate().unwrap_err().to_string(),
        "Task name is required"
    );
}

#[test]
fn test_task_draft_update_validation() {
    let status_only = TaskDraft {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    assert!(status_only.validate_update().is_ok());

    let blank_name = TaskDraft {
        name: Some("  ".into()),
        ..Default::default()
    };
    assert_eq!(
        blank_name.validate_update().unwrap_err().to_string(),
        "Task name is required"
    );
    assert_eq!(
        TaskDraft::default().validate_update().unwrap_err().to_string(),
        "Nothing to update"
    );
}

#[test]
fn test_history_entry_nullable_values() {
    let entry: TaskHistory = serde_json::from_value(json!({
        "historyId": 5,
        "taskId": 9,
        "fieldChanged": "assignedTo",
        "oldValue": null,
        "newValue": "4",
        "changedBy": 1,
        "changedAt": "2024-03-01T10:00:00"
    }))
    .unwrap();
    assert!(entry.old_value.is_none());
    assert_eq!(entry.new_value.as_deref(), Some("4"));
    assert!(entry.changed_at.is_some());
}

#[test]
fn test_dashboard_stats_missing_counters_default() {
    let stats: DashboardStats = serde_json::from_value(json!({
        "totalProjects": 2,
        "tasksByStatus": {
            "TODO": [{"taskId": 1, "taskName": "A", "taskStatus": "TODO"}]
        }
    }))
    .unwrap();
    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.completed_tasks, 0);
    assert_eq!(stats.lane(&TaskStatus::Todo).len(), 1);
    assert!(stats.lane(&TaskStatus::Completed).is_empty());
}
