//! Task board: status lanes over a fetched task list.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{DashboardStats, Task, TaskStatus};

/// Which slice of the board to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Todo,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Todo,
        StatusFilter::InProgress,
        StatusFilter::Completed,
    ];

    /// Cycle All -> TODO -> IN_PROGRESS -> COMPLETED -> All.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Todo,
            Self::Todo => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    pub fn status(self) -> Option<TaskStatus> {
        match self {
            Self::All => None,
            Self::Todo => Some(TaskStatus::Todo),
            Self::InProgress => Some(TaskStatus::InProgress),
            Self::Completed => Some(TaskStatus::Completed),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{status}"),
            None => f.write_str("ALL"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<TaskStatus>()? {
            TaskStatus::Todo => Ok(Self::Todo),
            TaskStatus::InProgress => Ok(Self::InProgress),
            TaskStatus::Completed => Ok(Self::Completed),
            TaskStatus::Other(_) => Err(format!("unknown status filter: {s}")),
        }
    }
}

/// Per-lane counts. `other` counts tasks whose status matched no lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LaneCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub other: usize,
    pub total: usize,
}

/// Tasks partitioned by exact status match. Lanes keep input order; tasks
/// with any other status belong to no lane but still appear under
/// [`StatusFilter::All`]. Rebuilt wholesale on every fetch.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    todo: Vec<Task>,
    in_progress: Vec<Task>,
    completed: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut todo = Vec::new();
        let mut in_progress = Vec::new();
        let mut completed = Vec::new();
        for task in &tasks {
            match task.status {
                TaskStatus::Todo => todo.push(task.clone()),
                TaskStatus::InProgress => in_progress.push(task.clone()),
                TaskStatus::Completed => completed.push(task.clone()),
                TaskStatus::Other(_) => {}
            }
        }
        Self {
            tasks,
            todo,
            in_progress,
            completed,
        }
    }

    pub fn filter_by_status(&self, filter: StatusFilter) -> &[Task] {
        match filter {
            StatusFilter::All => &self.tasks,
            StatusFilter::Todo => &self.todo,
            StatusFilter::InProgress => &self.in_progress,
            StatusFilter::Completed => &self.completed,
        }
    }

    pub fn todo(&self) -> &[Task] {
        &self.todo
    }

    pub fn in_progress(&self) -> &[Task] {
        &self.in_progress
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn lane_counts(&self) -> LaneCounts {
        let laned = self.todo.len() + self.in_progress.len() + self.completed.len();
        LaneCounts {
            todo: self.todo.len(),
            in_progress: self.in_progress.len(),
            completed: self.completed.len(),
            other: self.tasks.len() - laned,
            total: self.tasks.len(),
        }
    }
}

impl DashboardStats {
    /// Dashboard figures computed locally from a board, for when the server
    /// summary is unavailable.
    pub fn from_board(board: &TaskBoard, total_projects: u64) -> Self {
        let counts = board.lane_counts();
        let mut tasks_by_status = HashMap::new();
        for filter in [
            StatusFilter::Todo,
            StatusFilter::InProgress,
            StatusFilter::Completed,
        ] {
            if let Some(status) = filter.status() {
                tasks_by_status.insert(
                    status.as_str().to_string(),
                    board.filter_by_status(filter).to_vec(),
                );
            }
        }
        Self {
            total_projects,
            todo_tasks: counts.todo as u64,
            in_progress_tasks: counts.in_progress as u64,
            completed_tasks: counts.completed as u64,
            total_tasks: counts.total as u64,
            tasks_by_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::task;

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn sample() -> TaskBoard {
        TaskBoard::new(vec![
            task(1, "TODO"),
            task(2, "COMPLETED"),
            task(3, "IN_PROGRESS"),
            task(4, "TODO"),
            task(5, "BLOCKED"),
            task(6, "todo"),
        ])
    }

    #[test]
    fn test_lanes_keep_insertion_order() {
        let board = sample();
        assert_eq!(ids(board.todo()), vec![1, 4]);
        assert_eq!(ids(board.in_progress()), vec![3]);
        assert_eq!(ids(board.completed()), vec![2]);
    }

    #[test]
    fn test_filter_all_returns_full_input_in_order() {
        let board = sample();
        assert_eq!(
            ids(board.filter_by_status(StatusFilter::All)),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_filter_lane_matches_lane() {
        let board = sample();
        for filter in StatusFilter::ALL {
            if filter == StatusFilter::All {
                continue;
            }
            let lane = board.filter_by_status(filter);
            let status = filter.status().unwrap();
            assert!(lane.iter().all(|t| t.status == status));
        }
    }

    #[test]
    fn test_unknown_and_miscased_statuses_belong_to_no_lane() {
        let counts = sample().lane_counts();
        assert_eq!(counts.other, 2);
        assert_eq!(counts.total, 6);
        assert_eq!(counts.todo + counts.in_progress + counts.completed + counts.other, 6);
    }

    #[test]
    fn test_empty_board() {
        let board = TaskBoard::new(Vec::new());
        assert!(board.is_empty());
        assert!(board.filter_by_status(StatusFilter::Todo).is_empty());
        assert_eq!(board.lane_counts(), LaneCounts::default());
    }

    #[test]
    fn test_filter_cycle() {
        let mut f = StatusFilter::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(f);
            f = f.next();
        }
        assert_eq!(seen, StatusFilter::ALL.to_vec());
        assert_eq!(f, StatusFilter::All);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "in_progress".parse::<StatusFilter>().unwrap(),
            StatusFilter::InProgress
        );
        assert!("blocked".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn test_dashboard_from_board() {
        let stats = DashboardStats::from_board(&sample(), 3);
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.todo_tasks, 2);
        assert_eq!(stats.total_tasks, 6);
        assert_eq!(ids(stats.lane(&TaskStatus::InProgress)), vec![3]);
    }
}
