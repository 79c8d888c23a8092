use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pmboard_core::board::{StatusFilter, TaskBoard};
use pmboard_core::confirm::{Confirmation, PendingAction};
use pmboard_core::guard::{Navigator, Route, RouteGuard};
use pmboard_core::history::HistoryFeed;
use pmboard_core::model::*;
use pmboard_core::roles::{Capabilities, RoleResolver};
use pmboard_core::session::{SessionStorage, SessionStore};

use super::event::{AsyncAction, AsyncResult, Generation, Request, Response};
use super::form::{Form, FormOutcome, FormPurpose};

const NOT_ALLOWED: &str = "Your role in this project does not allow that";

/// Which screen is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Projects,
    Board,
    History,
}

impl Screen {
    pub fn route(self) -> Route {
        match self {
            Self::Login => Route::Login,
            Self::Dashboard => Route::Dashboard,
            Self::Projects => Route::Projects,
            Self::Board => Route::ProjectDetail,
            Self::History => Route::History,
        }
    }
}

/// Input mode within the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTab {
    Tasks,
    Members,
}

/// Current screen plus the generation its requests are tagged with.
#[derive(Debug)]
pub struct Nav {
    pub screen: Screen,
    pub generation: Generation,
}

impl Navigator for Nav {
    fn redirect_to_login(&mut self) {
        self.screen = Screen::Login;
        self.generation += 1;
    }
}

pub type Session = SessionStore<Box<dyn SessionStorage>>;

/// Central application state.
pub struct App {
    pub nav: Nav,
    pub input_mode: InputMode,
    pub should_quit: bool,
    pub loading: bool,

    pub session: Session,
    guard: RouteGuard,
    /// Lives while a project's board or history is open.
    pub roles: RoleResolver,

    pub form: Option<Form>,
    pub confirmation: Option<Confirmation>,

    // -- Dashboard --
    pub stats: Option<DashboardStats>,

    // -- Projects --
    pub projects: Vec<Project>,
    pub selected: usize,

    // -- Board --
    pub project: Option<Project>,
    pub tab: BoardTab,
    pub board: TaskBoard,
    pub filter: StatusFilter,
    pub task_selected: usize,
    pub members: Vec<ProjectMember>,
    pub member_selected: usize,
    pub caps: Capabilities,

    // -- History --
    pub history: HistoryFeed,
    pub history_expected: Option<usize>,
    pub history_scroll: u16,

    pub notice: Option<String>,

    // -- Error toast --
    pub error_message: Option<String>,
    pub error_timer: u16,
    error_ticks: u16,
}

impl App {
    pub fn new(session: Session, error_ticks: u16) -> Self {
        Self {
            nav: Nav {
                screen: Screen::Login,
                generation: 0,
            },
            input_mode: InputMode::Normal,
            should_quit: false,
            loading: false,

            session,
            guard: RouteGuard::new(),
            roles: RoleResolver::new(),

            form: None,
            confirmation: None,

            stats: None,

            projects: Vec::new(),
            selected: 0,

            project: None,
            tab: BoardTab::Tasks,
            board: TaskBoard::default(),
            filter: StatusFilter::All,
            task_selected: 0,
            members: Vec::new(),
            member_selected: 0,
            caps: Capabilities::none(),

            history: HistoryFeed::new(),
            history_expected: None,
            history_scroll: 0,

            notice: None,

            error_message: None,
            error_timer: 0,
            error_ticks,
        }
    }

    pub fn screen(&self) -> Screen {
        self.nav.screen
    }

    /// Land on the dashboard; the guard sends a logged-out user to login.
    pub fn start(&mut self) -> Vec<Request> {
        self.navigate(Screen::Dashboard)
    }

    /// Switch screens. Bumps the generation so in-flight results for the
    /// previous screen are dropped, then asks the guard.
    pub fn navigate(&mut self, screen: Screen) -> Vec<Request> {
        self.nav.generation += 1;
        self.nav.screen = screen;
        self.loading = false;
        self.notice = None;
        self.confirmation = None;

        let allowed = self
            .guard
            .check(screen.route(), &self.session, &mut self.nav);
        if !allowed || self.nav.screen == Screen::Login {
            self.roles.clear();
            self.show_login();
            return Vec::new();
        }

        self.form = None;
        self.input_mode = InputMode::Normal;
        if !matches!(screen, Screen::Board | Screen::History) {
            self.roles.clear();
            self.caps = Capabilities::none();
        }
        self.reload()
    }

    fn show_login(&mut self) {
        self.form = Some(Form::login());
        self.input_mode = InputMode::Form;
    }

    fn request(&self, action: AsyncAction) -> Request {
        Request {
            generation: self.nav.generation,
            action,
        }
    }

    fn email(&self) -> Option<String> {
        self.session.current_user().map(|u| u.email.clone())
    }

    fn project_name(&self) -> Option<String> {
        self.project.as_ref().map(|p| p.name.clone())
    }

    /// Fetch everything the current screen shows. Each fetch gets its own
    /// generation so results of an earlier one cannot mix into it.
    pub fn reload(&mut self) -> Vec<Request> {
        self.nav.generation += 1;
        let Some(email) = self.email() else {
            return Vec::new();
        };
        let actions = match self.nav.screen {
            Screen::Login => Vec::new(),
            Screen::Dashboard => vec![AsyncAction::LoadDashboard { email }],
            Screen::Projects => vec![AsyncAction::LoadProjects { email }],
            Screen::Board => {
                let Some(project) = self.project_name() else {
                    return Vec::new();
                };
                let mut actions = vec![
                    AsyncAction::LoadTasks {
                        project: project.clone(),
                    },
                    AsyncAction::LoadMembers {
                        project: project.clone(),
                    },
                ];
                match self.roles.cached(&project) {
                    Some(caps) => self.caps = caps,
                    None => {
                        self.caps = Capabilities::none();
                        actions.push(AsyncAction::ResolveRole { project, email });
                    }
                }
                actions
            }
            Screen::History => {
                let Some(project) = self.project_name() else {
                    return Vec::new();
                };
                self.history = HistoryFeed::new();
                self.history_expected = None;
                self.history_scroll = 0;
                vec![AsyncAction::LoadHistory { project }]
            }
        };
        self.loading = !actions.is_empty();
        actions.into_iter().map(|a| self.request(a)).collect()
    }

    /// Process a response from the worker. Responses from an older
    /// generation are dropped.
    pub fn handle_response(&mut self, response: Response) -> Vec<Request> {
        if response.generation != self.nav.generation {
            tracing::debug!(
                stale = response.generation,
                current = self.nav.generation,
                "dropping stale response"
            );
            return Vec::new();
        }

        match response.result {
            AsyncResult::LoggedIn(user) => match self.session.establish(user).map(|_| ()) {
                Ok(()) => return self.navigate(Screen::Dashboard),
                Err(e) => self.show_error(e.user_message("Could not save the session")),
            },
            AsyncResult::Dashboard(stats) => {
                self.stats = Some(stats);
                self.loading = false;
            }
            AsyncResult::Projects(projects) => {
                self.projects = projects;
                self.selected = self.selected.min(self.projects.len().saturating_sub(1));
                self.loading = false;
            }
            AsyncResult::Tasks(tasks) => {
                self.board = TaskBoard::new(tasks);
                self.clamp_task_selection();
                self.loading = false;
            }
            AsyncResult::Members(members) => {
                self.members = members;
                self.member_selected = self
                    .member_selected
                    .min(self.members.len().saturating_sub(1));
            }
            AsyncResult::RoleResolved { project, role } => {
                let caps = self.roles.record(&project, role);
                if self.project_name().as_deref() == Some(project.as_str()) {
                    self.caps = caps;
                }
            }
            AsyncResult::RoleUnresolved { project } => {
                if self.project_name().as_deref() == Some(project.as_str()) {
                    self.caps = Capabilities::none();
                }
            }
            AsyncResult::HistoryExpected(count) => {
                self.history_expected = Some(count);
                if count == 0 {
                    self.loading = false;
                }
            }
            AsyncResult::HistoryChunk { task_id, result } => {
                self.history.merge(task_id, result);
                if matches!(self.history_expected, Some(n) if self.history.received() >= n) {
                    self.loading = false;
                }
            }
            AsyncResult::Saved(message) => {
                self.notice = Some(message);
                self.form = None;
                self.input_mode = InputMode::Normal;
                return self.reload();
            }
            AsyncResult::ProjectDeleted(message) => {
                self.project = None;
                let requests = self.navigate(Screen::Projects);
                self.notice = Some(message);
                return requests;
            }
            AsyncResult::Error(message) => self.show_error(message),
        }
        Vec::new()
    }

    /// Handle a key event. Returns the requests to dispatch.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Request> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }

        match self.input_mode {
            InputMode::Form => return self.handle_form(key),
            InputMode::Confirm => return self.handle_confirm(key),
            InputMode::Normal => {}
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('L') => return self.logout(),
            KeyCode::Char('r') => return self.reload(),
            _ => {}
        }

        match self.nav.screen {
            Screen::Login => {
                self.show_login();
                Vec::new()
            }
            Screen::Dashboard => self.handle_dashboard(key),
            Screen::Projects => self.handle_projects(key),
            Screen::Board => self.handle_board(key),
            Screen::History => self.handle_history(key),
        }
    }

    fn logout(&mut self) -> Vec<Request> {
        self.session.logout();
        self.stats = None;
        self.projects.clear();
        self.project = None;
        self.board = TaskBoard::default();
        self.members.clear();
        self.history = HistoryFeed::new();
        self.navigate(Screen::Login)
    }

    fn handle_dashboard(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Tab | KeyCode::Char('p') => self.navigate(Screen::Projects),
            _ => Vec::new(),
        }
    }

    fn handle_projects(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected = step(self.selected, 1, self.projects.len());
                Vec::new()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = step(self.selected, -1, self.projects.len());
                Vec::new()
            }
            KeyCode::Enter => self.open_project(Screen::Board),
            KeyCode::Char('h') => self.open_project(Screen::History),
            KeyCode::Char('n') => self.open_form(Form::new_project()),
            KeyCode::Tab | KeyCode::Esc => self.navigate(Screen::Dashboard),
            _ => Vec::new(),
        }
    }

    fn open_project(&mut self, screen: Screen) -> Vec<Request> {
        let Some(project) = self.projects.get(self.selected).cloned() else {
            return Vec::new();
        };
        self.project = Some(project);
        self.tab = BoardTab::Tasks;
        self.filter = StatusFilter::All;
        self.task_selected = 0;
        self.member_selected = 0;
        self.board = TaskBoard::default();
        self.members.clear();
        self.navigate(screen)
    }

    fn handle_board(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Esc => self.navigate(Screen::Projects),
            KeyCode::Char('h') => self.navigate(Screen::History),
            KeyCode::Tab => {
                self.tab = match self.tab {
                    BoardTab::Tasks => BoardTab::Members,
                    BoardTab::Members => BoardTab::Tasks,
                };
                Vec::new()
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_board_selection(1);
                Vec::new()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_board_selection(-1);
                Vec::new()
            }
            KeyCode::Char('f') => {
                self.filter = self.filter.next();
                self.task_selected = 0;
                Vec::new()
            }
            KeyCode::Char('n') if self.allowed(self.caps.can_edit()) => {
                self.open_form(Form::new_task())
            }
            KeyCode::Char('e') if self.allowed(self.caps.can_edit()) => {
                match self.selected_task() {
                    Some(task) => {
                        let form = Form::edit_task(task);
                        self.open_form(form)
                    }
                    None => Vec::new(),
                }
            }
            KeyCode::Char('s') if self.allowed(self.caps.can_edit()) => self.advance_status(),
            KeyCode::Char('i') if self.allowed(self.caps.can_manage_members()) => {
                self.open_form(Form::invite())
            }
            KeyCode::Char('o') if self.allowed(self.caps.can_manage_members()) => {
                self.cycle_member_role()
            }
            KeyCode::Char('d') => {
                let pending = match self.tab {
                    BoardTab::Tasks => self.selected_task().map(|t| PendingAction::DeleteTask {
                        id: t.id,
                        name: t.name.clone(),
                    }),
                    BoardTab::Members => {
                        let project = self.project_name().unwrap_or_default();
                        self.selected_member().map(|m| PendingAction::RemoveMember {
                            project,
                            email: m.email.clone(),
                            name: m.name.clone(),
                        })
                    }
                };
                if let Some(pending) = pending {
                    self.ask(pending);
                }
                Vec::new()
            }
            KeyCode::Char('D') => {
                if let Some(name) = self.project_name() {
                    self.ask(PendingAction::DeleteProject { name });
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_history(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.history_scroll = self.history_scroll.saturating_add(1);
                Vec::new()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
                Vec::new()
            }
            KeyCode::PageDown => {
                self.history_scroll = self.history_scroll.saturating_add(20);
                Vec::new()
            }
            KeyCode::PageUp => {
                self.history_scroll = self.history_scroll.saturating_sub(20);
                Vec::new()
            }
            KeyCode::Esc | KeyCode::Backspace => self.navigate(Screen::Board),
            _ => Vec::new(),
        }
    }

    /// `true` when permitted; otherwise shows the denial toast.
    fn allowed(&mut self, permitted: bool) -> bool {
        if !permitted {
            self.show_error(NOT_ALLOWED.to_string());
        }
        permitted
    }

    fn ask(&mut self, pending: PendingAction) {
        if !pending.allowed_by(&self.caps) {
            self.show_error(NOT_ALLOWED.to_string());
            return;
        }
        self.confirmation = Some(pending.request());
        self.input_mode = InputMode::Confirm;
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> Vec<Request> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match self.confirmation.take() {
                    Some(confirmation) => {
                        let action = AsyncAction::Execute(confirmation.confirm());
                        vec![self.request(action)]
                    }
                    None => Vec::new(),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                if let Some(confirmation) = self.confirmation.take() {
                    tracing::debug!(action = ?confirmation.cancel(), "cancelled");
                }
                self.input_mode = InputMode::Normal;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn open_form(&mut self, form: Form) -> Vec<Request> {
        self.form = Some(form);
        self.input_mode = InputMode::Form;
        Vec::new()
    }

    fn handle_form(&mut self, key: KeyEvent) -> Vec<Request> {
        let Some(form) = self.form.as_mut() else {
            self.input_mode = InputMode::Normal;
            return Vec::new();
        };
        match form.handle_key(key) {
            FormOutcome::Editing => Vec::new(),
            FormOutcome::Cancel if form.purpose == FormPurpose::Login => {
                self.show_login();
                Vec::new()
            }
            FormOutcome::Cancel => {
                self.form = None;
                self.input_mode = InputMode::Normal;
                Vec::new()
            }
            FormOutcome::Submit => match self.submit_form() {
                Ok(action) => vec![self.request(action)],
                Err(message) => {
                    self.show_error(message);
                    Vec::new()
                }
            },
        }
    }

    /// Turn the open form into an action. Required fields are checked here
    /// so a bad form never reaches the worker.
    fn submit_form(&self) -> std::result::Result<AsyncAction, String> {
        let Some(form) = &self.form else {
            return Err("Nothing to submit".to_string());
        };

        match form.purpose {
            FormPurpose::Login => {
                let request = LoginRequest::new(form.raw("Email").trim(), form.raw("Password"));
                request.validate().map_err(|e| e.user_message(""))?;
                Ok(AsyncAction::Login {
                    email: request.email,
                    password: request.password,
                })
            }
            FormPurpose::NewProject => {
                let user = self.require_user()?;
                let mut draft = ProjectDraft::new(form.value("Name").unwrap_or_default());
                draft.description = form.value("Description");
                draft.start_date = form.value("Start date");
                draft.validate_create().map_err(|e| e.user_message(""))?;
                Ok(AsyncAction::CreateProject {
                    draft,
                    creator_email: user.email.clone(),
                })
            }
            FormPurpose::NewTask => {
                let user = self.require_user()?;
                let mut draft = form.task_draft();
                draft.validate().map_err(|e| e.user_message(""))?;
                draft.project_id = self.project.as_ref().map(|p| p.id);
                draft.creator_id = Some(user.id);
                Ok(AsyncAction::CreateTask { draft })
            }
            FormPurpose::EditTask(id) => {
                let user = self.require_user()?;
                let draft = form.task_draft();
                draft.validate_update().map_err(|e| e.user_message(""))?;
                Ok(AsyncAction::UpdateTask {
                    id,
                    draft,
                    updated_by: user.id,
                })
            }
            FormPurpose::Invite => {
                let user = self.require_user()?;
                let invite = InviteRequest {
                    email: form.value("Email").unwrap_or_default(),
                    project_name: self.project_name().unwrap_or_default(),
                    role: form.role(),
                    invited_by: user.email.clone(),
                };
                invite.validate().map_err(|e| e.user_message(""))?;
                Ok(AsyncAction::Invite { invite })
            }
        }
    }

    fn require_user(&self) -> std::result::Result<&User, String> {
        self.session
            .current_user()
            .ok_or_else(|| "You must be logged in".to_string())
    }

    /// TODO -> IN_PROGRESS -> COMPLETED -> TODO. Unknown statuses restart
    /// at TODO.
    fn advance_status(&mut self) -> Vec<Request> {
        let Some(user_id) = self.session.current_user().map(|u| u.id) else {
            return Vec::new();
        };
        let Some(task) = self.selected_task() else {
            return Vec::new();
        };
        let next = match task.status {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed | TaskStatus::Other(_) => TaskStatus::Todo,
        };
        let action = AsyncAction::UpdateTask {
            id: task.id,
            draft: TaskDraft {
                status: Some(next),
                ..Default::default()
            },
            updated_by: user_id,
        };
        vec![self.request(action)]
    }

    fn cycle_member_role(&mut self) -> Vec<Request> {
        if self.tab != BoardTab::Members {
            return Vec::new();
        }
        let (Some(project), Some(member)) = (self.project_name(), self.selected_member()) else {
            return Vec::new();
        };
        let role = match member.role {
            Some(Role::Admin) => Role::Member,
            Some(Role::Member) => Role::Observer,
            Some(Role::Observer) | None => Role::Admin,
        };
        let email = member.email.clone();
        if self.email().as_deref() == Some(email.as_str()) {
            // Own role changes; resolve again on the next reload.
            self.roles.invalidate(&project);
        }
        let action = AsyncAction::UpdateMemberRole {
            project,
            email,
            role,
        };
        vec![self.request(action)]
    }

    /// Tasks under the current filter.
    pub fn visible_tasks(&self) -> &[Task] {
        self.board.filter_by_status(self.filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.task_selected)
    }

    pub fn selected_member(&self) -> Option<&ProjectMember> {
        self.members.get(self.member_selected)
    }

    fn move_board_selection(&mut self, delta: i32) {
        match self.tab {
            BoardTab::Tasks => {
                self.task_selected = step(self.task_selected, delta, self.visible_tasks().len())
            }
            BoardTab::Members => {
                self.member_selected = step(self.member_selected, delta, self.members.len())
            }
        }
    }

    fn clamp_task_selection(&mut self) {
        let len = self.visible_tasks().len();
        self.task_selected = self.task_selected.min(len.saturating_sub(1));
    }

    pub fn show_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timer = self.error_ticks;
        self.loading = false;
    }

    /// Tick the error timer down.
    pub fn tick_error(&mut self) {
        if self.error_timer > 0 {
            self.error_timer -= 1;
            if self.error_timer == 0 {
                self.error_message = None;
            }
        }
    }
}

fn step(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as i64 + delta as i64).clamp(0, len as i64 - 1) as usize
}
