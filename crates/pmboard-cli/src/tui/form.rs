use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pmboard_core::model::{Priority, Role, Task, TaskDraft, TaskId, TaskStatus};

const STATUS_CHOICES: &[&str] = &["TODO", "IN_PROGRESS", "COMPLETED"];
const PRIORITY_CHOICES: &[&str] = &["LOW", "MEDIUM", "HIGH"];
const ROLE_CHOICES: &[&str] = &["ADMIN", "MEMBER", "OBSERVER"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered masked.
    Secret,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    /// Selected option; `None` keeps a value that is not among the options.
    pub choice: Option<usize>,
    /// What the field held when the form opened.
    initial: String,
}

impl Field {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            value: String::new(),
            choice: None,
            initial: String::new(),
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(label)
        }
    }

    fn choice(label: &'static str, options: &'static [&'static str], selected: &str) -> Self {
        let choice = options.iter().position(|o| *o == selected);
        Self {
            kind: FieldKind::Choice(options),
            choice,
            value: if choice.is_some() { String::new() } else { selected.to_string() },
            ..Self::text(label)
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// What the field currently holds: typed text or the selected option.
    pub fn current(&self) -> &str {
        match self.kind {
            FieldKind::Choice(options) => self
                .choice
                .and_then(|i| options.get(i).copied())
                .unwrap_or(self.value.as_str()),
            FieldKind::Text | FieldKind::Secret => &self.value,
        }
    }

    /// Text as it should appear on screen.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            _ => self.current().to_string(),
        }
    }

    fn cycle(&mut self, forward: bool) {
        if let FieldKind::Choice(options) = self.kind {
            let len = options.len();
            self.choice = Some(match (self.choice, forward) {
                (Some(i), true) => (i + 1) % len,
                (Some(i), false) => (i + len - 1) % len,
                (None, true) => 0,
                (None, false) => len - 1,
            });
        }
    }

    pub fn changed(&self) -> bool {
        self.current() != self.initial
    }
}

/// What submitting the form will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPurpose {
    Login,
    NewProject,
    NewTask,
    EditTask(TaskId),
    Invite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Editing,
    Submit,
    Cancel,
}

/// A modal field-by-field editor.
#[derive(Debug, Clone)]
pub struct Form {
    pub purpose: FormPurpose,
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    fn new(purpose: FormPurpose, mut fields: Vec<Field>) -> Self {
        for field in &mut fields {
            field.initial = field.current().to_string();
        }
        Self {
            purpose,
            fields,
            focus: 0,
        }
    }

    pub fn login() -> Self {
        Self::new(
            FormPurpose::Login,
            vec![Field::text("Email"), Field::secret("Password")],
        )
    }

    pub fn new_project() -> Self {
        Self::new(
            FormPurpose::NewProject,
            vec![
                Field::text("Name"),
                Field::text("Description"),
                Field::text("Start date"),
            ],
        )
    }

    pub fn new_task() -> Self {
        Self::new(
            FormPurpose::NewTask,
            vec![
                Field::text("Name"),
                Field::text("Description"),
                Field::choice("Status", STATUS_CHOICES, TaskStatus::Todo.as_str()),
                Field::choice("Priority", PRIORITY_CHOICES, Priority::Medium.as_str()),
                Field::text("Due date"),
            ],
        )
    }

    pub fn edit_task(task: &Task) -> Self {
        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        Self::new(
            FormPurpose::EditTask(task.id),
            vec![
                Field::text("Name").with_value(task.name.clone()),
                Field::text("Description").with_value(task.description.clone().unwrap_or_default()),
                Field::choice("Status", STATUS_CHOICES, task.status.as_str()),
                Field::choice("Priority", PRIORITY_CHOICES, task.priority.as_str()),
                Field::text("Due date").with_value(due),
            ],
        )
    }

    pub fn invite() -> Self {
        Self::new(
            FormPurpose::Invite,
            vec![
                Field::text("Email"),
                Field::choice("Role", ROLE_CHOICES, Role::Member.as_str()),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        match self.purpose {
            FormPurpose::Login => " Log in ",
            FormPurpose::NewProject => " New project ",
            FormPurpose::NewTask => " New task ",
            FormPurpose::EditTask(_) => " Edit task ",
            FormPurpose::Invite => " Invite member ",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return FormOutcome::Submit;
        }
        let len = self.fields.len();
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % len,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + len - 1) % len,
            KeyCode::Right => self.fields[self.focus].cycle(true),
            KeyCode::Left => self.fields[self.focus].cycle(false),
            KeyCode::Backspace => {
                self.fields[self.focus].value.pop();
            }
            KeyCode::Char(c) => {
                let field = &mut self.fields[self.focus];
                if field.kind == FieldKind::Text || field.kind == FieldKind::Secret {
                    field.value.push(c);
                } else if c == ' ' {
                    field.cycle(true);
                }
            }
            _ => {}
        }
        FormOutcome::Editing
    }

    /// Untrimmed contents of the field with this label.
    pub fn raw(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(Field::current)
            .unwrap_or("")
    }

    /// Trimmed value of the field with this label; `None` when blank.
    pub fn value(&self, label: &str) -> Option<String> {
        Some(self.raw(label).trim().to_string()).filter(|v| !v.is_empty())
    }

    fn changed(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.label == label && f.changed())
    }

    /// Task fields as a draft. Project and user ids are filled in by the
    /// caller. When editing, only the fields the user touched are set; a
    /// cleared name is kept blank so validation rejects it.
    pub fn task_draft(&self) -> TaskDraft {
        let editing = matches!(self.purpose, FormPurpose::EditTask(_));
        let pick = |label: &str| {
            if editing && !self.changed(label) {
                None
            } else {
                self.value(label)
            }
        };
        let name = if editing && self.changed("Name") {
            Some(self.raw("Name").trim().to_string())
        } else {
            pick("Name")
        };
        TaskDraft {
            name,
            description: pick("Description"),
            status: pick("Status").map(TaskStatus::from),
            priority: pick("Priority").map(Priority::from),
            due_date: pick("Due date"),
            ..Default::default()
        }
    }

    pub fn role(&self) -> Role {
        self.value("Role")
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::Member)
    }
}
