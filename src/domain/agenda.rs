//! The agenda: which open tasks are due, and which of those can start
//!
//! Only open leaf tasks are indexed. Grouping tasks (tasks with subtasks)
//! stay out of the index; they only matter through the prerequisites their
//! subtasks inherit.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::due_index::DueIndex;
use super::id::TaskId;
use super::readiness::Readiness;
use super::task::Task;

/// Date index over a snapshot of tasks
pub struct Agenda<'a> {
    tasks: &'a HashMap<TaskId, Task>,
    index: DueIndex<&'a Task>,
}

impl<'a> Agenda<'a> {
    /// Indexes the open leaf tasks of `tasks`
    pub fn new(tasks: &'a HashMap<TaskId, Task>) -> Self {
        let groupings: HashSet<TaskId> = tasks.values().filter_map(Task::parent).collect();

        // Stable order for tasks that share a due date
        let mut open: Vec<&Task> = tasks
            .values()
            .filter(|task| !task.is_complete() && !groupings.contains(&task.id))
            .collect();
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Self {
            tasks,
            index: open.into_iter().collect(),
        }
    }

    /// Ready tasks due on or before `pivot`, earliest first
    pub fn due(&self, pivot: NaiveDate) -> Vec<&'a Task> {
        let readiness = Readiness::new(self.tasks);
        self.index
            .threshold_scan(pivot, |task| readiness.is_ready(task))
            .into_iter()
            .copied()
            .collect()
    }

    /// Open tasks due on or before `pivot` that are still waiting on something
    pub fn blocked(&self, pivot: NaiveDate) -> Vec<(&'a Task, Vec<TaskId>)> {
        let readiness = Readiness::new(self.tasks);
        self.index
            .threshold_scan(pivot, |task| !readiness.is_ready(task))
            .into_iter()
            .map(|task| (*task, readiness.blockers(task)))
            .collect()
    }

    /// Open tasks due exactly on `date`, whether ready or not
    pub fn on(&self, date: NaiveDate) -> Vec<&'a Task> {
        self.index
            .exact_lookup(date)
            .map(|tasks| tasks.to_vec())
            .unwrap_or_default()
    }

    /// Earliest due date among open tasks
    pub fn next_date(&self) -> Option<NaiveDate> {
        self.index.earliest().map(|slot| slot.due())
    }

    /// Latest due date among open tasks
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.index.latest().map(|slot| slot.due())
    }

    /// Number of indexed (open leaf) tasks
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no open leaf tasks
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Display line for a task, optionally suffixed with its parent's title
    pub fn summary(&self, task: &Task, show_parent: bool) -> String {
        let parent_title = show_parent
            .then(|| task.parent())
            .flatten()
            .and_then(|id| self.tasks.get(&id))
            .map(|parent| parent.title.as_str());
        task.summary(parent_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use proptest::sample::Index;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn make_task(title: &str, d: u32) -> Task {
        Task::new(TaskId::new(title, Utc::now()), title, day(d))
    }

    fn snapshot(tasks: Vec<Task>) -> HashMap<TaskId, Task> {
        tasks.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn due_returns_ready_tasks_up_to_pivot() {
        let gate = make_task("Gate", 20);
        let ready = make_task("Ready", 3);
        let mut waiting = make_task("Waiting", 4);
        waiting.add_dependency(gate.id.clone());
        let later = make_task("Later", 15);

        let tasks = snapshot(vec![gate, ready, waiting, later]);
        let agenda = Agenda::new(&tasks);

        assert_eq!(titles(&agenda.due(day(10))), vec!["Ready"]);

        let blocked = agenda.blocked(day(10));
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].0.title, "Waiting");
        assert_eq!(blocked[0].1.len(), 1);
    }

    #[test]
    fn completed_and_grouping_tasks_are_not_indexed() {
        let mut done = make_task("Done", 1);
        done.complete();
        let parent = make_task("Parent", 1);
        let child = Task::new(parent.id.subtask(1), "Child", day(2));

        let tasks = snapshot(vec![done, parent, child]);
        let agenda = Agenda::new(&tasks);

        assert_eq!(agenda.len(), 1);
        assert_eq!(titles(&agenda.due(day(30))), vec!["Child"]);
    }

    #[test]
    fn on_lists_tasks_for_one_day() {
        let a = make_task("A", 5);
        let mut b = make_task("B", 5);
        b.add_dependency(TaskId::new("missing", Utc::now()));
        let c = make_task("C", 6);

        let tasks = snapshot(vec![a, b, c]);
        let agenda = Agenda::new(&tasks);

        let mut on_fifth = titles(&agenda.on(day(5)));
        on_fifth.sort();
        assert_eq!(on_fifth, vec!["A", "B"]);
        assert!(agenda.on(day(7)).is_empty());
        assert_eq!(agenda.next_date(), Some(day(5)));
        assert_eq!(agenda.last_date(), Some(day(6)));
    }

    #[test]
    fn empty_snapshot() {
        let tasks = HashMap::new();
        let agenda = Agenda::new(&tasks);
        assert!(agenda.is_empty());
        assert!(agenda.on(day(1)).is_empty());
        assert!(agenda.due(day(1)).is_empty());
        assert_eq!(agenda.next_date(), None);
    }

    #[test]
    fn summary_names_parent() {
        let parent = make_task("Build house", 1);
        let child = Task::new(parent.id.subtask(1), "Pour foundation", day(2));
        let child_id = child.id.clone();

        let tasks = snapshot(vec![parent, child]);
        let agenda = Agenda::new(&tasks);
        let child = &tasks[&child_id];

        assert_eq!(agenda.summary(child, true), "Pour foundation - Build house");
        assert_eq!(agenda.summary(child, false), "Pour foundation");
    }

    /// One generated task: parent pick, done flag, due day, prerequisite
    /// picks, and whether it also waits on a task that does not exist
    type Blueprint = (Option<Index>, bool, u32, Vec<Index>, bool);

    /// Builds a forest where task `i` may only hang under an earlier task
    fn forest(blueprints: &[Blueprint]) -> HashMap<TaskId, Task> {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ids: Vec<TaskId> = Vec::with_capacity(blueprints.len());
        for (i, (parent, ..)) in blueprints.iter().enumerate() {
            let id = match parent {
                Some(pick) if i > 0 => ids[pick.index(i)].subtask(i as u32),
                _ => TaskId::new(&format!("task {}", i), stamp),
            };
            ids.push(id);
        }

        let mut tasks = HashMap::new();
        for (i, (_, done, d, prereqs, dangling)) in blueprints.iter().enumerate() {
            let mut task = Task::new(ids[i].clone(), format!("task {}", i), day(*d));
            for pick in prereqs {
                let dep = &ids[pick.index(ids.len())];
                if *dep != task.id {
                    task.add_dependency(dep.clone());
                }
            }
            if *dangling {
                task.add_dependency(TaskId::new("never added", stamp));
            }
            if *done {
                task.complete();
            }
            tasks.insert(task.id.clone(), task);
        }
        tasks
    }

    /// Reference readiness, written recursively over the parent chain
    fn chain_clear(tasks: &HashMap<TaskId, Task>, task: &Task) -> bool {
        let prerequisites_done = task
            .depends_on
            .iter()
            .all(|dep| tasks.get(dep).is_some_and(Task::is_complete));
        prerequisites_done
            && match task.parent() {
                None => true,
                Some(parent) => tasks.get(&parent).is_some_and(|p| chain_clear(tasks, p)),
            }
    }

    proptest! {
        #[test]
        fn due_matches_recursive_readiness(
            blueprints in prop::collection::vec(
                (
                    prop::option::of(any::<Index>()),
                    any::<bool>(),
                    1u32..=10,
                    prop::collection::vec(any::<Index>(), 0..3),
                    prop::bool::weighted(0.1),
                ),
                1..16,
            ),
            pivot in 1u32..=10,
        ) {
            let tasks = forest(&blueprints);
            let agenda = Agenda::new(&tasks);
            let due = agenda.due(day(pivot));

            prop_assert!(due.windows(2).all(|pair| pair[0].due <= pair[1].due));

            let has_subtasks = |task: &Task| tasks.keys().any(|id| id.is_child_of(&task.id));
            let mut expected: Vec<&TaskId> = tasks
                .values()
                .filter(|t| !t.is_complete() && !has_subtasks(t))
                .filter(|t| day(pivot) >= t.due && chain_clear(&tasks, t))
                .map(|t| &t.id)
                .collect();
            expected.sort();

            let mut actual: Vec<&TaskId> = due.iter().map(|t| &t.id).collect();
            actual.sort();
            prop_assert_eq!(actual, expected);
        }
    }
}
