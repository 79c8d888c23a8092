use pmboard_core::confirm::ConfirmedAction;
use pmboard_core::model::*;

/// Identifies the screen load that issued a request. Bumped on every
/// navigation and reload; results carrying an older generation are dropped.
pub type Generation = u64;

/// Actions the UI sends to the async worker task.
#[derive(Debug)]
pub enum AsyncAction {
    Login { email: String, password: String },
    LoadDashboard { email: String },
    LoadProjects { email: String },
    LoadTasks { project: String },
    LoadMembers { project: String },
    ResolveRole { project: String, email: String },
    /// Fetch the project's tasks, then every task's history concurrently.
    /// Each task's history is sent back as soon as it arrives.
    LoadHistory { project: String },
    CreateProject { draft: ProjectDraft, creator_email: String },
    CreateTask { draft: TaskDraft },
    UpdateTask {
        id: TaskId,
        draft: TaskDraft,
        updated_by: UserId,
    },
    Invite { invite: InviteRequest },
    UpdateMemberRole {
        project: String,
        email: String,
        role: Role,
    },
    Execute(ConfirmedAction),
}

/// An action tagged with the generation of the screen that issued it.
#[derive(Debug)]
pub struct Request {
    pub generation: Generation,
    pub action: AsyncAction,
}

/// Results the async worker sends back to the UI.
#[derive(Debug)]
pub enum AsyncResult {
    LoggedIn(User),
    Dashboard(DashboardStats),
    Projects(Vec<Project>),
    Tasks(Vec<Task>),
    Members(Vec<ProjectMember>),
    /// The backend answered; `role` is `None` for an unknown role string.
    RoleResolved { project: String, role: Option<Role> },
    /// The lookup failed. No permissions, and nothing is cached.
    RoleUnresolved { project: String },
    /// How many per-task history results to expect.
    HistoryExpected(usize),
    HistoryChunk {
        task_id: TaskId,
        result: pmboard_core::error::Result<Vec<TaskHistory>>,
    },
    /// A mutation succeeded; the current screen should reload.
    Saved(String),
    /// The open project is gone; go back to the project list.
    ProjectDeleted(String),
    /// An error occurred during an async operation, already phrased for
    /// the user.
    Error(String),
}

#[derive(Debug)]
pub struct Response {
    pub generation: Generation,
    pub result: AsyncResult,
}
