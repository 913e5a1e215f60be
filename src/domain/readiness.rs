//! Readiness predicate
//!
//! A task is ready when it is not complete and its prerequisite chain is
//! satisfied: every direct prerequisite is done, and the same holds for its
//! parent grouping, the grouping's parent, and so on up to a top-level task.

use std::collections::HashMap;

use super::id::TaskId;
use super::task::Task;

/// Evaluates readiness against a snapshot of all tasks
#[derive(Debug, Clone, Copy)]
pub struct Readiness<'a> {
    tasks: &'a HashMap<TaskId, Task>,
}

impl<'a> Readiness<'a> {
    pub fn new(tasks: &'a HashMap<TaskId, Task>) -> Self {
        Self { tasks }
    }

    /// Returns true if the task is open and nothing in its chain blocks it
    pub fn is_ready(&self, task: &Task) -> bool {
        !task.is_complete() && self.prerequisites_satisfied(task)
    }

    /// Returns true if every prerequisite along the parent chain is done
    ///
    /// Unknown prerequisites and missing parents count as unsatisfied.
    pub fn prerequisites_satisfied(&self, task: &Task) -> bool {
        let mut current = task;
        loop {
            if !self.direct_prerequisites_complete(current) {
                return false;
            }
            let Some(parent_id) = current.parent() else {
                return true;
            };
            match self.tasks.get(&parent_id) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Incomplete prerequisites along the parent chain, nearest first
    pub fn blockers(&self, task: &Task) -> Vec<TaskId> {
        let mut blockers = Vec::new();
        let mut current = Some(task);

        while let Some(t) = current {
            blockers.extend(
                t.depends_on
                    .iter()
                    .filter(|dep| !self.is_done(dep))
                    .cloned(),
            );
            current = t.parent().and_then(|parent_id| self.tasks.get(&parent_id));
        }

        blockers
    }

    fn direct_prerequisites_complete(&self, task: &Task) -> bool {
        task.depends_on.iter().all(|dep| self.is_done(dep))
    }

    fn is_done(&self, task_id: &TaskId) -> bool {
        self.tasks
            .get(task_id)
            .map(|t| t.is_complete())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn make_task(title: &str) -> Task {
        Task::new(TaskId::new(title, Utc::now()), title, due())
    }

    fn index(tasks: &[&Task]) -> HashMap<TaskId, Task> {
        tasks.iter().map(|t| (t.id.clone(), (*t).clone())).collect()
    }

    #[test]
    fn task_without_prerequisites_is_ready() {
        let task = make_task("Standalone");
        let tasks = index(&[&task]);
        assert!(Readiness::new(&tasks).is_ready(&task));
    }

    #[test]
    fn completed_task_is_not_ready() {
        let mut task = make_task("Done already");
        task.complete();
        let tasks = index(&[&task]);
        assert!(!Readiness::new(&tasks).is_ready(&task));
    }

    #[test]
    fn open_prerequisite_blocks() {
        let mut first = make_task("Pour foundation");
        let mut second = make_task("Frame walls");
        second.add_dependency(first.id.clone());

        let tasks = index(&[&first, &second]);
        let readiness = Readiness::new(&tasks);
        assert!(!readiness.is_ready(&second));
        assert_eq!(readiness.blockers(&second), vec![first.id.clone()]);

        first.complete();
        let tasks = index(&[&first, &second]);
        let readiness = Readiness::new(&tasks);
        assert!(readiness.is_ready(&second));
        assert!(readiness.blockers(&second).is_empty());
    }

    #[test]
    fn unknown_prerequisite_blocks() {
        let mut task = make_task("Orphan");
        task.add_dependency(TaskId::new("Missing", Utc::now()));
        let tasks = index(&[&task]);
        assert!(!Readiness::new(&tasks).is_ready(&task));
    }

    #[test]
    fn parent_prerequisites_block_subtasks() {
        let permit = make_task("Get permit");
        let mut house = make_task("Build house");
        house.add_dependency(permit.id.clone());
        let foundation = Task::new(house.id.subtask(1), "Pour foundation", due());

        let tasks = index(&[&permit, &house, &foundation]);
        let readiness = Readiness::new(&tasks);
        assert!(!readiness.is_ready(&foundation));
        assert_eq!(readiness.blockers(&foundation), vec![permit.id.clone()]);
    }

    #[test]
    fn grandparent_prerequisites_block_too() {
        let permit = make_task("Get permit");
        let mut house = make_task("Build house");
        house.add_dependency(permit.id.clone());
        let shell = Task::new(house.id.subtask(1), "Shell", due());
        let walls = Task::new(shell.id.subtask(1), "Walls", due());

        let tasks = index(&[&permit, &house, &shell, &walls]);
        assert!(!Readiness::new(&tasks).is_ready(&walls));

        let mut permit = permit;
        permit.complete();
        let tasks = index(&[&permit, &house, &shell, &walls]);
        assert!(Readiness::new(&tasks).is_ready(&walls));
    }

    #[test]
    fn missing_parent_blocks() {
        let ghost = TaskId::new("Deleted parent", Utc::now());
        let child = Task::new(ghost.subtask(1), "Left behind", due());
        let tasks = index(&[&child]);
        assert!(!Readiness::new(&tasks).is_ready(&child));
    }
}
