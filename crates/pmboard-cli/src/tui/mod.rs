pub mod app;
pub mod event;
mod form;
mod views;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self as ct_event, Event};
use pmboard_core::api::{HttpBackend, ProjectApi, TaskApi, UserApi};
use pmboard_core::config::PmboardConfig;
use pmboard_core::confirm::PendingAction;
use pmboard_core::model::LoginRequest;
use pmboard_core::session::{FileStorage, SessionStorage, SessionStore};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use self::app::{App, Screen, Session};
use self::event::{AsyncAction, AsyncResult, Request, Response};

/// Entry point for the interactive TUI mode.
pub async fn run_tui(config: &PmboardConfig) -> Result<()> {
    let backend =
        Arc::new(HttpBackend::from_config(&config.api).context("failed to create API client")?);
    let session_path = config
        .session
        .resolve_path()
        .context("failed to locate the session file")?;
    let storage: Box<dyn SessionStorage> = Box::new(FileStorage::new(session_path));
    let session: Session = SessionStore::restore(storage);

    // Channels for async communication
    let (request_tx, request_rx) = mpsc::unbounded_channel::<Request>();
    let (response_tx, mut response_rx) = mpsc::unbounded_channel::<Response>();

    tokio::spawn(worker_loop(Arc::clone(&backend), request_rx, response_tx));

    let mut app = App::new(session, config.tui.error_ticks);
    dispatch(&request_tx, app.start());

    // Initialize terminal
    let mut terminal = ratatui::init();

    let result = run_loop(
        &mut terminal,
        &mut app,
        &request_tx,
        &mut response_rx,
        Duration::from_millis(config.tui.tick_ms),
        backend.base_url(),
    );

    // Restore terminal
    ratatui::restore();

    result
}

fn dispatch(request_tx: &mpsc::UnboundedSender<Request>, requests: Vec<Request>) {
    for request in requests {
        if request_tx.send(request).is_err() {
            tracing::warn!("worker stopped, dropping request");
        }
    }
}

fn run_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    request_tx: &mpsc::UnboundedSender<Request>,
    response_rx: &mut mpsc::UnboundedReceiver<Response>,
    tick: Duration,
    base_url: &str,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, base_url))?;

        // Poll for async results (non-blocking)
        while let Ok(response) = response_rx.try_recv() {
            let follow_up = app.handle_response(response);
            dispatch(request_tx, follow_up);
        }

        if ct_event::poll(tick)? {
            if let Event::Key(key) = ct_event::read()? {
                let requests = app.handle_key(key);
                dispatch(request_tx, requests);
            }
        }

        app.tick_error();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render(frame: &mut Frame, app: &App, base_url: &str) {
    let area = frame.area();

    match app.screen() {
        Screen::Login => views::login::render(frame, app, area, base_url),
        Screen::Dashboard => views::dashboard::render(frame, app, area),
        Screen::Projects => views::projects::render(frame, app, area),
        Screen::Board => views::board::render(frame, app, area),
        Screen::History => views::history::render(frame, app, area),
    }

    if let Some(form) = &app.form {
        views::form::render(frame, form);
    }
    if let Some(confirmation) = &app.confirmation {
        views::confirm::render(frame, confirmation);
    }

    // Render error toast overlay if present
    if let Some(ref msg) = app.error_message {
        render_error_toast(frame, msg);
    }
}

fn render_error_toast(frame: &mut Frame, msg: &str) {
    use ratatui::{
        layout::{Constraint, Flex, Layout},
        style::{Color, Style},
        widgets::{Block, Borders, Clear, Paragraph},
    };

    let area = frame.area();
    let [toast_area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);
    let [toast_area] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::End)
        .areas(toast_area);

    frame.render_widget(Clear, toast_area);
    let toast = Paragraph::new(format!(" ✗ {msg}"))
        .style(Style::default().fg(Color::White).bg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
    frame.render_widget(toast, toast_area);
}

/// Async worker loop: each request runs on its own task so a slow call does
/// not hold up the rest.
async fn worker_loop(
    backend: Arc<HttpBackend>,
    mut request_rx: mpsc::UnboundedReceiver<Request>,
    response_tx: mpsc::UnboundedSender<Response>,
) {
    while let Some(request) = request_rx.recv().await {
        let backend = Arc::clone(&backend);
        let response_tx = response_tx.clone();
        tokio::spawn(run_action(backend, request, response_tx));
    }
}

async fn run_action(
    backend: Arc<HttpBackend>,
    request: Request,
    response_tx: mpsc::UnboundedSender<Response>,
) {
    let Request { generation, action } = request;
    let send = |result: AsyncResult| {
        if response_tx.send(Response { generation, result }).is_err() {
            tracing::debug!("UI closed, dropping response");
        }
    };

    let result = match action {
        AsyncAction::Login { email, password } => {
            match backend.login(&LoginRequest::new(email, password)).await {
                Ok(user) => AsyncResult::LoggedIn(user),
                Err(e) => AsyncResult::Error(e.user_message("Login failed. Please try again.")),
            }
        }
        AsyncAction::LoadDashboard { email } => match backend.dashboard(&email).await {
            Ok(stats) => AsyncResult::Dashboard(stats),
            Err(e) => AsyncResult::Error(e.user_message("Failed to load dashboard")),
        },
        AsyncAction::LoadProjects { email } => match backend.projects_for_user(&email).await {
            Ok(projects) => AsyncResult::Projects(projects),
            Err(e) => AsyncResult::Error(e.user_message("Failed to load projects")),
        },
        AsyncAction::LoadTasks { project } => match backend.tasks_for_project_name(&project).await
        {
            Ok(tasks) => AsyncResult::Tasks(tasks),
            Err(e) => AsyncResult::Error(e.user_message("Failed to load tasks")),
        },
        AsyncAction::LoadMembers { project } => match backend.list_members(&project).await {
            Ok(members) => AsyncResult::Members(members),
            Err(e) => AsyncResult::Error(e.user_message("Failed to load members")),
        },
        AsyncAction::ResolveRole { project, email } => {
            match backend.member_role(&project, &email).await {
                Ok(lookup) => AsyncResult::RoleResolved {
                    project,
                    role: lookup.role,
                },
                Err(e) => {
                    tracing::debug!(project, error = %e, "role lookup failed");
                    AsyncResult::RoleUnresolved { project }
                }
            }
        }
        AsyncAction::LoadHistory { project } => {
            match backend.tasks_for_project_name(&project).await {
                Ok(tasks) => {
                    send(AsyncResult::HistoryExpected(tasks.len()));
                    let mut set = JoinSet::new();
                    for task in tasks {
                        let backend = Arc::clone(&backend);
                        set.spawn(async move { (task.id, backend.task_history(task.id).await) });
                    }
                    while let Some(joined) = set.join_next().await {
                        match joined {
                            Ok((task_id, result)) => {
                                send(AsyncResult::HistoryChunk { task_id, result })
                            }
                            Err(e) => tracing::warn!(error = %e, "history fetch task panicked"),
                        }
                    }
                    return;
                }
                Err(e) => AsyncResult::Error(e.user_message("Failed to load history")),
            }
        }
        AsyncAction::CreateProject {
            draft,
            creator_email,
        } => match backend.create_project(&draft, &creator_email).await {
            Ok(project) => AsyncResult::Saved(format!("Created project {}", project.name)),
            Err(e) => AsyncResult::Error(e.user_message("Failed to create project")),
        },
        AsyncAction::CreateTask { draft } => match backend.create_task(&draft).await {
            Ok(task) => AsyncResult::Saved(format!("Created task {}", task.name)),
            Err(e) => AsyncResult::Error(e.user_message("Failed to create task")),
        },
        AsyncAction::UpdateTask {
            id,
            draft,
            updated_by,
        } => match backend.update_task(id, &draft, Some(updated_by)).await {
            Ok(task) => AsyncResult::Saved(format!("Updated task {}", task.name)),
            Err(e) => AsyncResult::Error(e.user_message("Failed to update task")),
        },
        AsyncAction::Invite { invite } => match backend.invite_member(&invite).await {
            Ok(_) => AsyncResult::Saved("Invitation sent successfully!".to_string()),
            Err(e) => AsyncResult::Error(e.user_message("Failed to send invitation")),
        },
        AsyncAction::UpdateMemberRole {
            project,
            email,
            role,
        } => match backend.update_member_role(&project, &email, role).await {
            Ok(()) => AsyncResult::Saved(format!("{email} is now {role}")),
            Err(e) => AsyncResult::Error(e.user_message("Failed to update role")),
        },
        AsyncAction::Execute(confirmed) => {
            let action = confirmed.action();
            match confirmed.execute(backend.as_ref()).await {
                Ok(()) => match action {
                    PendingAction::DeleteProject { .. } => {
                        AsyncResult::ProjectDeleted(action.done_message())
                    }
                    _ => AsyncResult::Saved(action.done_message()),
                },
                Err(e) => AsyncResult::Error(e.user_message(action.failure_fallback())),
            }
        }
    };
    send(result);
}
