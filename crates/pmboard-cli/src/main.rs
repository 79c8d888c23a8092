mod tui;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use pmboard_core::api::{HttpBackend, ProjectApi, TaskApi, UserApi};
use pmboard_core::board::{StatusFilter, TaskBoard};
use pmboard_core::config::{self, LoggingConfig, PmboardConfig};
use pmboard_core::confirm::{ConfirmedAction, PendingAction};
use pmboard_core::error::PmboardError;
use pmboard_core::guard::{Navigator, Route, RouteGuard};
use pmboard_core::history;
use pmboard_core::model::*;
use pmboard_core::roles::{Capabilities, RoleResolver};
use pmboard_core::session::{FileStorage, SessionStore};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pmboard",
    about = "pmboard: projects, task boards and team membership from the terminal",
    version
)]
enum Cli {
    /// Log in and remember the session
    Login {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an account
    Register {
        name: String,
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Contact number
        #[arg(long)]
        contact: Option<String>,
    },
    /// Update your name, password or contact number
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Project and task counts for the logged-in user
    Dashboard {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Show a project's tasks grouped by status
    Board {
        project: String,
        /// Only show one lane (all, todo, in_progress, completed)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage project members
    Members {
        #[command(subcommand)]
        command: MembersCommand,
    },
    /// Show your role and permissions in a project
    Role {
        project: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Change history of every task in a project, newest first
    History {
        project: String,
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Print the effective configuration
    Config,
    /// Launch the interactive TUI
    Tui,
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// List your projects (or every project with --all)
    List {
        #[arg(long)]
        all: bool,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one project
    Show {
        name: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a project; you become its admin
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a project's details (admin only)
    Update {
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a project and all its tasks (admin only)
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Accept a pending invitation
    Accept { name: String },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Show one task
    Show {
        id: TaskId,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Tasks assigned to you
    Mine {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task in a project
    Create {
        project: String,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// todo, in_progress, completed
        #[arg(short, long, default_value = "todo", value_parser = str::parse::<TaskStatus>)]
        status: TaskStatus,
        /// low, medium, high
        #[arg(short, long, default_value = "medium", value_parser = str::parse::<Priority>)]
        priority: Priority,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Assignee user id
        #[arg(long)]
        assignee: Option<UserId>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Change some fields of a task
    Update {
        id: TaskId,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// todo, in_progress, completed
        #[arg(short, long, value_parser = str::parse::<TaskStatus>)]
        status: Option<TaskStatus>,
        /// low, medium, high
        #[arg(short, long, value_parser = str::parse::<Priority>)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assignee: Option<UserId>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum MembersCommand {
    /// List a project's members
    List {
        project: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Invite someone to a project (admin only)
    Invite {
        project: String,
        email: String,
        /// admin, member, observer
        #[arg(short, long, default_value = "member")]
        role: Role,
    },
    /// Change a member's role (admin only)
    SetRole {
        project: String,
        email: String,
        role: Role,
    },
    /// Remove a member (admin only)
    Remove {
        project: String,
        email: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    /// List all users
    List {
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user by id or email
    Show {
        user: String,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Deactivate an account
    Deactivate {
        id: UserId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete an account
    Delete {
        id: UserId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

type Session = SessionStore<FileStorage>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let (config, load_error) = match PmboardConfig::load(Some(&cwd)) {
        Ok(config) => (config, None),
        Err(e) => (PmboardConfig::default_config(), Some(e)),
    };

    init_logging(&config.logging, matches!(cli, Cli::Tui));
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "could not load config, using defaults");
    }

    if let Err(err) = run(cli, &config).await {
        eprintln!("{} {}", "error:".red(), format_error(&err));
        std::process::exit(1);
    }
    Ok(())
}

/// Console logging for commands; the TUI owns the terminal, so it logs to
/// a file under the config directory instead.
fn init_logging(config: &LoggingConfig, tui: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if tui {
        match open_log_file() {
            Some(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init(),
            None => tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .init(),
        }
        return;
    }

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = config::config_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tui.log"))
        .ok()
}

/// Backend and validation errors carry text meant for the user; show it
/// without the debug chain.
fn format_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PmboardError>() {
        Some(e) => e.user_message(&e.to_string()),
        None => format!("{err:#}"),
    }
}

async fn run(cli: Cli, config: &PmboardConfig) -> Result<()> {
    match cli {
        Cli::Tui => tui::run_tui(config).await,
        Cli::Config => cmd_config(config),
        Cli::Logout => {
            let mut session = open_session(config)?;
            cmd_logout(&mut session);
            Ok(())
        }
        Cli::Whoami { json } => {
            let session = open_session(config)?;
            cmd_whoami(&session, json)
        }
        cli => {
            let backend = make_backend(config)?;
            let mut session = open_session(config)?;
            run_remote(cli, &backend, &mut session).await
        }
    }
}

async fn run_remote(cli: Cli, backend: &HttpBackend, session: &mut Session) -> Result<()> {
    match cli {
        Cli::Login { email, password } => cmd_login(backend, session, email, password).await,
        Cli::Register {
            name,
            email,
            password,
            contact,
        } => cmd_register(backend, name, email, password, contact).await,
        Cli::Profile {
            name,
            password,
            contact,
            json,
        } => {
            let changes = ProfileUpdate {
                name,
                password,
                contact,
            };
            cmd_profile(backend, session, &changes, json).await
        }
        Cli::Dashboard { json } => cmd_dashboard(backend, session, json).await,
        Cli::Projects { command } => cmd_projects(backend, session, command).await,
        Cli::Board {
            project,
            status,
            json,
        } => {
            require_login(session, Route::ProjectDetail)?;
            cmd_board(backend, &project, status, json).await
        }
        Cli::Task { command } => cmd_task(backend, session, command).await,
        Cli::Members { command } => cmd_members(backend, session, command).await,
        Cli::Role { project, json } => cmd_role(backend, session, &project, json).await,
        Cli::History {
            project,
            limit,
            json,
        } => {
            require_login(session, Route::History)?;
            cmd_history(backend, &project, limit, json).await
        }
        Cli::Users { command } => {
            require_login(session, Route::Users)?;
            cmd_users(backend, command).await
        }
        Cli::Tui | Cli::Config | Cli::Logout | Cli::Whoami { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// plumbing
// ---------------------------------------------------------------------------

fn make_backend(config: &PmboardConfig) -> Result<HttpBackend> {
    HttpBackend::from_config(&config.api).context("failed to create API client")
}

fn open_session(config: &PmboardConfig) -> Result<Session> {
    let path = config
        .session
        .resolve_path()
        .context("failed to locate the session file")?;
    Ok(SessionStore::restore(FileStorage::new(path)))
}

/// Records the guard's redirect so the command can fail with a hint.
#[derive(Default)]
struct LoginHint {
    redirected: bool,
}

impl Navigator for LoginHint {
    fn redirect_to_login(&mut self) {
        self.redirected = true;
    }
}

fn require_login(session: &Session, route: Route) -> Result<User> {
    let mut hint = LoginHint::default();
    let allowed = RouteGuard::new().check(route, session, &mut hint);
    match session.current_user() {
        Some(user) if allowed => Ok(user.clone()),
        _ => {
            tracing::debug!(%route, redirected = hint.redirected, "not logged in");
            anyhow::bail!("not logged in. Run `pmboard login <email>` first")
        }
    }
}

/// Map a core error to the message the user sees, falling back when the
/// backend gave no reason.
fn friendly<T>(result: pmboard_core::error::Result<T>, fallback: &str) -> Result<T> {
    result.map_err(|e| {
        tracing::debug!(error = ?e, "request failed");
        anyhow::anyhow!(e.user_message(fallback))
    })
}

fn read_password(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask before a destructive action. `--yes` skips the prompt.
fn confirm(pending: PendingAction, yes: bool) -> Result<Option<ConfirmedAction>> {
    let request = pending.request();
    if yes {
        return Ok(Some(request.confirm()));
    }
    eprint!("{} [y/N] ", request.prompt());
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        Ok(Some(request.confirm()))
    } else {
        let action = request.cancel();
        tracing::debug!(?action, "cancelled");
        println!("Cancelled.");
        Ok(None)
    }
}

/// Resolve the caller's role in `project` and fail unless `check` passes.
async fn require_capability(
    backend: &HttpBackend,
    user: &User,
    project: &str,
    check: impl Fn(&Capabilities) -> bool,
) -> Result<Capabilities> {
    let caps = RoleResolver::new()
        .resolve(backend, project, &user.email)
        .await;
    if !check(&caps) {
        let role = caps
            .role()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "no role".to_string());
        anyhow::bail!("your role in {project} ({role}) does not allow this");
    }
    Ok(caps)
}

async fn execute(backend: &HttpBackend, confirmed: ConfirmedAction) -> Result<()> {
    let action = confirmed.action();
    friendly(confirmed.execute(backend).await, action.failure_fallback())?;
    println!("{} {}", "✓".green(), action.done_message());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn rule() {
    println!("{}", "─".repeat(78).dimmed());
}

fn status_label(status: &TaskStatus) -> String {
    match status {
        TaskStatus::Todo => status.to_string().yellow().to_string(),
        TaskStatus::InProgress => status.to_string().cyan().to_string(),
        TaskStatus::Completed => status.to_string().green().to_string(),
        TaskStatus::Other(raw) => raw.dimmed().to_string(),
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

// ---------------------------------------------------------------------------
// session
// ---------------------------------------------------------------------------

async fn cmd_login(
    backend: &HttpBackend,
    session: &mut Session,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password("Password: ")?,
    };
    let credentials = LoginRequest::new(email, password);
    let user = friendly(
        session.login(backend, &credentials).await,
        "Login failed. Please try again.",
    )?;
    println!(
        "{} Logged in as {} <{}>",
        "✓".green(),
        user.name.bold(),
        user.email.cyan()
    );
    Ok(())
}

fn cmd_logout(session: &mut Session) {
    let was = session.current_user().map(|u| u.email.clone());
    session.logout();
    match was {
        Some(email) => println!("Logged out {}", email.cyan()),
        None => println!("Not logged in."),
    }
}

fn cmd_whoami(session: &Session, json: bool) -> Result<()> {
    let user = require_login(session, Route::Dashboard)?;
    if json {
        return print_json(&user);
    }
    println!("  {} {}", "Name: ".dimmed(), user.name.bold());
    println!("  {} {}", "Email:".dimmed(), user.email.cyan());
    println!("  {} {}", "Id:   ".dimmed(), user.id);
    if let Some(contact) = &user.contact {
        println!("  {} {}", "Phone:".dimmed(), contact);
    }
    Ok(())
}

async fn cmd_register(
    backend: &HttpBackend,
    name: String,
    email: String,
    password: Option<String>,
    contact: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password("Choose a password: ")?,
    };
    let request = RegisterRequest {
        name,
        email,
        password,
        contact,
    };
    let user = friendly(
        backend.register(&request).await,
        "Registration failed. Please try again.",
    )?;
    println!(
        "{} Registered {} <{}>. Log in with `pmboard login {}`.",
        "✓".green(),
        user.name.bold(),
        user.email.cyan(),
        user.email
    );
    Ok(())
}

async fn cmd_profile(
    backend: &HttpBackend,
    session: &mut Session,
    changes: &ProfileUpdate,
    json: bool,
) -> Result<()> {
    require_login(session, Route::Dashboard)?;
    let user = friendly(
        session.update_profile(backend, changes).await,
        "Failed to update profile",
    )?;
    if json {
        return print_json(user);
    }
    println!("{} Profile updated for {}", "✓".green(), user.email.cyan());
    Ok(())
}

fn cmd_config(config: &PmboardConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render config")?;
    if let Some(dir) = config::config_dir() {
        println!("{}", format!("# config dir: {}", dir.display()).dimmed());
    }
    print!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// dashboard
// ---------------------------------------------------------------------------

async fn cmd_dashboard(backend: &HttpBackend, session: &Session, json: bool) -> Result<()> {
    let user = require_login(session, Route::Dashboard)?;
    let stats = friendly(backend.dashboard(&user.email).await, "Failed to load dashboard")?;
    if json {
        return print_json(&stats);
    }

    println!("  Welcome, {}", user.name.bold());
    rule();
    println!("  {:<13} {}", "Projects:".dimmed(), stats.total_projects.magenta());
    println!("  {:<13} {}", "Tasks:".dimmed(), stats.total_tasks.bold());
    println!("  {:<13} {}", "To do:".dimmed(), stats.todo_tasks.yellow());
    println!("  {:<13} {}", "In progress:".dimmed(), stats.in_progress_tasks.cyan());
    println!("  {:<13} {}", "Completed:".dimmed(), stats.completed_tasks.green());

    for status in TaskStatus::KNOWN.iter() {
        let lane = stats.lane(status);
        if lane.is_empty() {
            continue;
        }
        println!();
        println!("  {} ({})", status_label(status), lane.len());
        for task in lane {
            println!(
                "    {} {}",
                task.name,
                task.project_name.as_deref().unwrap_or("").dimmed()
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// projects
// ---------------------------------------------------------------------------

async fn cmd_projects(
    backend: &HttpBackend,
    session: &Session,
    command: ProjectsCommand,
) -> Result<()> {
    let user = require_login(session, Route::Projects)?;
    match command {
        ProjectsCommand::List { all, json } => {
            let projects = if all {
                backend.list_projects().await
            } else {
                backend.projects_for_user(&user.email).await
            };
            let projects = friendly(projects, "Failed to load projects")?;
            if json {
                return print_json(&projects);
            }
            print_projects(&projects);
            Ok(())
        }
        ProjectsCommand::Show { name, json } => {
            let project = friendly(backend.get_project(&name).await, "Failed to load project")?;
            if json {
                return print_json(&project);
            }
            print_project(&project);
            Ok(())
        }
        ProjectsCommand::Create {
            name,
            description,
            start_date,
            json,
        } => {
            let mut draft = ProjectDraft::new(name);
            draft.description = description;
            draft.start_date = start_date;
            let project = friendly(
                backend.create_project(&draft, &user.email).await,
                "Failed to create project",
            )?;
            if json {
                return print_json(&project);
            }
            println!("{} Created project {}", "✓".green(), project.name.bold());
            Ok(())
        }
        ProjectsCommand::Update {
            name,
            rename,
            description,
            start_date,
            status,
            json,
        } => {
            require_capability(backend, &user, &name, Capabilities::can_manage_members).await?;
            let draft = ProjectDraft {
                name: rename,
                description,
                start_date,
                status,
            };
            let project = friendly(
                backend.update_project(&name, &draft).await,
                "Failed to update project",
            )?;
            if json {
                return print_json(&project);
            }
            println!("{} Updated project {}", "✓".green(), project.name.bold());
            Ok(())
        }
        ProjectsCommand::Delete { name, yes } => {
            let caps = require_capability(backend, &user, &name, |_| true).await?;
            let pending = PendingAction::DeleteProject { name };
            if !pending.allowed_by(&caps) {
                anyhow::bail!("only a project admin can delete it");
            }
            match confirm(pending, yes)? {
                Some(confirmed) => execute(backend, confirmed).await,
                None => Ok(()),
            }
        }
        ProjectsCommand::Accept { name } => {
            friendly(
                backend.accept_invite(&user.email, &name).await,
                "Failed to accept invitation",
            )?;
            println!("{} Joined {}", "✓".green(), name.bold());
            Ok(())
        }
    }
}

fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    println!(
        "  {}  {}  {}  {}",
        format!("{:<5}", "ID").dimmed(),
        format!("{:<24}", "Name").dimmed(),
        format!("{:<10}", "Start").dimmed(),
        "Status".dimmed(),
    );
    rule();
    for p in projects {
        println!(
            "  {}  {:<24}  {:<10}  {}",
            format!("{:<5}", p.id).cyan(),
            p.name,
            date_or_dash(p.start_date),
            p.status.magenta(),
        );
    }
    rule();
    println!(
        "  {} project{}",
        projects.len(),
        if projects.len() == 1 { "" } else { "s" }
    );
}

fn print_project(project: &Project) {
    println!("  {}", project.name.bold());
    rule();
    println!(
        "  {} {}",
        "Description:".dimmed(),
        project.description.as_deref().unwrap_or("No description")
    );
    println!(
        "  {} {}",
        "Start date: ".dimmed(),
        project
            .start_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Not set".to_string())
    );
    println!("  {} {}", "Status:     ".dimmed(), project.status.magenta());
    if let Some(email) = &project.creator_email {
        println!("  {} {}", "Created by: ".dimmed(), email.cyan());
    }
}

// ---------------------------------------------------------------------------
// board
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct BoardView<'a> {
    project: &'a str,
    filter: String,
    counts: pmboard_core::board::LaneCounts,
    tasks: &'a [Task],
}

async fn cmd_board(
    backend: &HttpBackend,
    project: &str,
    filter: StatusFilter,
    json: bool,
) -> Result<()> {
    let tasks = friendly(
        backend.tasks_for_project_name(project).await,
        "Failed to load tasks",
    )?;
    let board = TaskBoard::new(tasks);

    if json {
        return print_json(&BoardView {
            project,
            filter: filter.to_string(),
            counts: board.lane_counts(),
            tasks: board.filter_by_status(filter),
        });
    }

    println!("  {}", project.bold());
    let lanes: Vec<StatusFilter> = match filter {
        StatusFilter::All => StatusFilter::ALL[1..].to_vec(),
        one => vec![one],
    };
    for lane in lanes {
        let tasks = board.filter_by_status(lane);
        rule();
        println!("  {} ({})", lane.label().bold(), tasks.len());
        for task in tasks {
            print_task_row(task);
        }
    }

    let counts = board.lane_counts();
    if filter == StatusFilter::All && counts.other > 0 {
        rule();
        println!("  {} ({})", "Other".dimmed(), counts.other);
        for task in board.all().iter().filter(|t| !t.status.is_known()) {
            print_task_row(task);
        }
    }
    Ok(())
}

fn print_task_row(task: &Task) {
    println!(
        "    {}  {:<36}  {:<8}  {}",
        format!("#{:<4}", task.id).cyan(),
        task.name,
        task.priority.to_string().magenta(),
        date_or_dash(task.due_date).dimmed(),
    );
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

/// Project name of a task, for role checks. Falls back to a lookup by id
/// when the task payload carries no name.
async fn task_project(backend: &HttpBackend, task: &Task) -> Result<String> {
    if let Some(name) = &task.project_name {
        return Ok(name.clone());
    }
    let Some(id) = task.project_id else {
        anyhow::bail!("task {} belongs to no project", task.id);
    };
    let project = friendly(backend.get_project_by_id(id).await, "Failed to load project")?;
    Ok(project.name)
}

async fn cmd_task(backend: &HttpBackend, session: &Session, command: TaskCommand) -> Result<()> {
    let user = require_login(session, Route::ProjectDetail)?;
    match command {
        TaskCommand::Show { id, json } => {
            let task = friendly(backend.get_task(id).await, "Failed to load task")?;
            if json {
                return print_json(&task);
            }
            print_task(&task);
            Ok(())
        }
        TaskCommand::Mine { json } => {
            let tasks = friendly(backend.tasks_for_user(user.id).await, "Failed to load tasks")?;
            if json {
                return print_json(&tasks);
            }
            if tasks.is_empty() {
                println!("No tasks assigned to you.");
                return Ok(());
            }
            for task in &tasks {
                print_task_row(task);
            }
            Ok(())
        }
        TaskCommand::Create {
            project,
            name,
            description,
            status,
            priority,
            due,
            assignee,
            json,
        } => {
            require_capability(backend, &user, &project, Capabilities::can_edit).await?;
            let target = friendly(backend.get_project(&project).await, "Failed to load project")?;
            let draft = TaskDraft {
                name: Some(name),
                description,
                status: Some(status),
                priority: Some(priority),
                due_date: due,
                project_id: Some(target.id),
                assignee_id: assignee,
                creator_id: Some(user.id),
            };
            let task = friendly(backend.create_task(&draft).await, "Failed to create task")?;
            if json {
                return print_json(&task);
            }
            println!("{} Created task #{} {}", "✓".green(), task.id, task.name.bold());
            Ok(())
        }
        TaskCommand::Update {
            id,
            name,
            description,
            status,
            priority,
            due,
            assignee,
            json,
        } => {
            let draft = TaskDraft {
                name,
                description,
                status,
                priority,
                due_date: due,
                assignee_id: assignee,
                ..Default::default()
            };
            draft.validate_update()?;
            let current = friendly(backend.get_task(id).await, "Failed to load task")?;
            let project = task_project(backend, &current).await?;
            require_capability(backend, &user, &project, Capabilities::can_edit).await?;
            let task = friendly(
                backend.update_task(id, &draft, Some(user.id)).await,
                "Failed to update task",
            )?;
            if json {
                return print_json(&task);
            }
            println!("{} Updated task #{} {}", "✓".green(), task.id, task.name.bold());
            Ok(())
        }
        TaskCommand::Delete { id, yes } => {
            let current = friendly(backend.get_task(id).await, "Failed to load task")?;
            let project = task_project(backend, &current).await?;
            let caps = require_capability(backend, &user, &project, |_| true).await?;
            let pending = PendingAction::DeleteTask {
                id,
                name: current.name,
            };
            if !pending.allowed_by(&caps) {
                anyhow::bail!("your role in {project} does not allow deleting tasks");
            }
            match confirm(pending, yes)? {
                Some(confirmed) => execute(backend, confirmed).await,
                None => Ok(()),
            }
        }
    }
}

fn print_task(task: &Task) {
    println!("  {} {}", format!("#{}", task.id).cyan(), task.name.bold());
    rule();
    println!("  {} {}", "Status:  ".dimmed(), status_label(&task.status));
    println!("  {} {}", "Priority:".dimmed(), task.priority.magenta());
    println!("  {} {}", "Due:     ".dimmed(), date_or_dash(task.due_date));
    if let Some(project) = &task.project_name {
        println!("  {} {}", "Project: ".dimmed(), project);
    }
    if let Some(assignee) = &task.assignee_name {
        println!("  {} {}", "Assignee:".dimmed(), assignee);
    } else if let Some(id) = task.assignee_id {
        println!("  {} #{}", "Assignee:".dimmed(), id);
    }
    if let Some(description) = &task.description {
        println!();
        println!("  {description}");
    }
}

// ---------------------------------------------------------------------------
// members
// ---------------------------------------------------------------------------

async fn cmd_members(
    backend: &HttpBackend,
    session: &Session,
    command: MembersCommand,
) -> Result<()> {
    let user = require_login(session, Route::ProjectDetail)?;
    match command {
        MembersCommand::List { project, json } => {
            let members = friendly(
                backend.list_members(&project).await,
                "Failed to load members",
            )?;
            if json {
                return print_json(&members);
            }
            if members.is_empty() {
                println!("No members.");
                return Ok(());
            }
            for m in &members {
                let status = if m.status == "ACCEPTED" {
                    m.status.green().to_string()
                } else {
                    m.status.yellow().to_string()
                };
                println!(
                    "  {:<20}  {:<28}  {:<9}  {}",
                    m.name,
                    m.email.cyan(),
                    m.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
                    status
                );
            }
            Ok(())
        }
        MembersCommand::Invite {
            project,
            email,
            role,
        } => {
            require_capability(backend, &user, &project, Capabilities::can_manage_members).await?;
            let invite = InviteRequest {
                email,
                project_name: project,
                role,
                invited_by: user.email.clone(),
            };
            let invitation = friendly(
                backend.invite_member(&invite).await,
                "Failed to send invitation",
            )?;
            println!(
                "{} Invitation sent successfully! {} is {} until they accept.",
                "✓".green(),
                invitation.email.cyan(),
                invitation.status.yellow()
            );
            Ok(())
        }
        MembersCommand::SetRole {
            project,
            email,
            role,
        } => {
            require_capability(backend, &user, &project, Capabilities::can_manage_members).await?;
            friendly(
                backend.update_member_role(&project, &email, role).await,
                "Failed to update role",
            )?;
            println!("{} {} is now {}", "✓".green(), email.cyan(), role.magenta());
            Ok(())
        }
        MembersCommand::Remove {
            project,
            email,
            yes,
        } => {
            let caps = require_capability(backend, &user, &project, |_| true).await?;
            let pending = PendingAction::RemoveMember {
                project,
                email,
                name: String::new(),
            };
            if !pending.allowed_by(&caps) {
                anyhow::bail!("only a project admin can remove members");
            }
            match confirm(pending, yes)? {
                Some(confirmed) => execute(backend, confirmed).await,
                None => Ok(()),
            }
        }
    }
}

#[derive(Serialize)]
struct RoleView<'a> {
    project: &'a str,
    role: Option<Role>,
    can_edit: bool,
    can_manage_members: bool,
}

async fn cmd_role(
    backend: &HttpBackend,
    session: &Session,
    project: &str,
    json: bool,
) -> Result<()> {
    let user = require_login(session, Route::ProjectDetail)?;
    let caps = RoleResolver::new()
        .resolve(backend, project, &user.email)
        .await;
    if json {
        return print_json(&RoleView {
            project,
            role: caps.role(),
            can_edit: caps.can_edit(),
            can_manage_members: caps.can_manage_members(),
        });
    }
    let yes_no = |b: bool| if b { "yes".green().to_string() } else { "no".red().to_string() };
    println!(
        "  {} {}",
        "Role:          ".dimmed(),
        caps.role()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".to_string())
            .magenta()
    );
    println!("  {} {}", "Edit tasks:    ".dimmed(), yes_no(caps.can_edit()));
    println!(
        "  {} {}",
        "Manage members:".dimmed(),
        yes_no(caps.can_manage_members())
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

async fn cmd_history(
    backend: &HttpBackend,
    project: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    // The gather needs an owned handle it can share across spawned fetches.
    let shared = Arc::new(backend.clone());
    let mut entries = friendly(
        history::project_history(shared, project).await,
        "Failed to load history",
    )?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No changes recorded for {project}.");
        return Ok(());
    }
    for entry in &entries {
        let when = entry
            .changed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----------------".to_string());
        println!(
            "  {}  {}  {}: {} → {}{}",
            when.dimmed(),
            format!("#{:<4}", entry.task_id).cyan(),
            entry.field.magenta(),
            entry.old_value.as_deref().unwrap_or("∅"),
            entry.new_value.as_deref().unwrap_or("∅"),
            entry
                .changed_by
                .map(|id| format!(" (by #{id})"))
                .unwrap_or_default()
                .dimmed(),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

async fn cmd_users(backend: &HttpBackend, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List { json } => {
            let users = friendly(backend.list_users().await, "Failed to load users")?;
            if json {
                return print_json(&users);
            }
            for u in &users {
                let state = if u.active {
                    "active".green().to_string()
                } else {
                    "inactive".red().to_string()
                };
                println!(
                    "  {}  {:<20}  {:<28}  {:<14}  {}",
                    format!("{:<5}", u.id).cyan(),
                    u.name,
                    u.email,
                    u.contact.as_deref().unwrap_or("-"),
                    state
                );
            }
            Ok(())
        }
        UsersCommand::Show { user, json } => {
            let found = match user.parse::<UserId>() {
                Ok(id) => backend.get_user(id).await,
                Err(_) => backend.get_user_by_email(&user).await,
            };
            let found = friendly(found, "Failed to load user")?;
            if json {
                return print_json(&found);
            }
            println!("  {} <{}>", found.name.bold(), found.email.cyan());
            println!(
                "  {} {}",
                "Active:".dimmed(),
                if found.active { "yes" } else { "no" }
            );
            Ok(())
        }
        UsersCommand::Deactivate { id, yes } => {
            let target = friendly(backend.get_user(id).await, "Failed to load user")?;
            let pending = PendingAction::DeactivateUser {
                id,
                name: target.name,
            };
            match confirm(pending, yes)? {
                Some(confirmed) => execute(backend, confirmed).await,
                None => Ok(()),
            }
        }
        UsersCommand::Delete { id, yes } => {
            let target = friendly(backend.get_user(id).await, "Failed to load user")?;
            let pending = PendingAction::DeleteUser {
                id,
                name: target.name,
            };
            match confirm(pending, yes)? {
                Some(confirmed) => execute(backend, confirmed).await,
                None => Ok(()),
            }
        }
    }
}
