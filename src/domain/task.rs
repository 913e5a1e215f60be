//! Task domain model
//!
//! Tasks are dated units of work. They can depend on other tasks and can be
//! grouped under a parent task (the parent is encoded in the task ID).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::due_index::Dated;
use super::id::TaskId;

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Checkbox marker used in text output
    pub fn marker(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "[ ]",
            TaskStatus::InProgress => "[~]",
            TaskStatus::Done => "[x]",
        }
    }
}

/// A dated task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Date the task is due to start
    pub due: NaiveDate,

    /// Current status
    pub status: TaskStatus,

    /// Tasks that must be completed first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (if done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    /// Creates a new task with the given ID, title and due date
    pub fn new(id: TaskId, title: impl Into<String>, due: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            due,
            status: TaskStatus::Todo,
            depends_on: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            description: None,
        }
    }

    /// Returns the parent grouping's ID, if any
    pub fn parent(&self) -> Option<TaskId> {
        self.id.parent()
    }

    /// Returns true if the task is done
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Display line: `Title - Parent title` when grouped
    pub fn summary(&self, parent_title: Option<&str>) -> String {
        match parent_title {
            Some(parent) => format!("{} - {}", self.title, parent),
            None => self.title.clone(),
        }
    }

    /// Marks the task as in progress
    pub fn start(&mut self) {
        self.status = TaskStatus::InProgress;
        self.touch();
    }

    /// Marks the task as done
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Reopens a completed task
    pub fn reopen(&mut self) {
        self.status = TaskStatus::Todo;
        self.completed_at = None;
        self.touch();
    }

    /// Moves the task to another due date
    pub fn reschedule(&mut self, due: NaiveDate) {
        self.due = due;
        self.touch();
    }

    /// Adds a prerequisite, ignoring duplicates
    pub fn add_dependency(&mut self, task_id: TaskId) -> bool {
        if self.depends_on.contains(&task_id) {
            return false;
        }
        self.depends_on.push(task_id);
        self.touch();
        true
    }

    /// Removes a prerequisite
    pub fn remove_dependency(&mut self, task_id: &TaskId) -> bool {
        let before = self.depends_on.len();
        self.depends_on.retain(|dep| dep != task_id);
        let removed = self.depends_on.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Sets the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Dated for Task {
    fn due_date(&self) -> NaiveDate {
        self.due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(title: &str) -> Task {
        let due = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Task::new(TaskId::new(title, Utc::now()), title, due)
    }

    #[test]
    fn new_task_has_todo_status() {
        let task = make_task("Write report");
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.depends_on.is_empty());
        assert!(task.completed_at.is_none());
        assert!(task.parent().is_none());
    }

    #[test]
    fn task_status_transitions() {
        let mut task = make_task("Write report");

        task.start();
        assert_eq!(task.status, TaskStatus::InProgress);

        task.complete();
        assert!(task.is_complete());
        assert!(task.completed_at.is_some());

        task.reopen();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn task_dependencies() {
        let mut task = make_task("Deploy");
        let dep = TaskId::new("Build", Utc::now());

        assert!(task.add_dependency(dep.clone()));
        assert!(!task.add_dependency(dep.clone()));
        assert_eq!(task.depends_on, vec![dep.clone()]);

        assert!(task.remove_dependency(&dep));
        assert!(!task.remove_dependency(&dep));
        assert!(task.depends_on.is_empty());
    }

    #[test]
    fn summary_includes_parent_title() {
        let task = make_task("Pour foundation");
        assert_eq!(task.summary(None), "Pour foundation");
        assert_eq!(
            task.summary(Some("Build house")),
            "Pour foundation - Build house"
        );
    }

    #[test]
    fn reschedule_changes_due_date() {
        let mut task = make_task("Call plumber");
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        task.reschedule(later);
        assert_eq!(task.due_date(), later);
    }

    #[test]
    fn subtask_knows_parent() {
        let parent = make_task("Build house");
        let child = Task::new(parent.id.subtask(1), "Pour foundation", parent.due);
        assert_eq!(child.parent(), Some(parent.id));
    }

    #[test]
    fn updated_at_changes_on_modifications() {
        let mut task = make_task("Write report");
        let created = task.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        task.set_description("Include the appendix");
        assert!(task.updated_at > created);
    }

    #[test]
    fn serde_roundtrip() {
        let mut task = make_task("Write report");
        task.set_description("Quarterly numbers");
        task.add_dependency(TaskId::new("Collect data", Utc::now()));

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"due\":\"2024-05-01\""));
        assert!(json.contains("\"status\":\"todo\""));

        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, parsed);
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let json = r#"{"id":"t-1234567","title":"Bare","due":"2024-01-02","status":"done","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.depends_on.is_empty());
        assert!(task.description.is_none());
        assert!(task.is_complete());
    }
}
