//! Task CLI commands

use std::collections::HashMap;

use anyhow::Result;
use clap::Subcommand;
use chrono::Utc;

use super::output::Output;
use crate::domain::{self, DependencyGraph, Readiness, Task, TaskId};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task, optionally as a subtask of another task
    ///
    /// Examples:
    ///   agenda task add "Book venue" --due 2024-09-01
    ///   agenda task add "Send invites" --due +7 --parent t-1a2b3c4
    Add {
        /// Task title
        title: String,

        /// Due date (YYYY-MM-DD, today, tomorrow, +N, -N)
        #[arg(long, default_value = "today", allow_hyphen_values = true)]
        due: String,

        /// Parent task ID (the new task becomes its subtask)
        #[arg(long)]
        parent: Option<String>,

        /// Optional description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// List tasks by due date
    List {
        /// Hide completed tasks
        #[arg(long)]
        open: bool,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Mark task as in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Mark task as done
    Done {
        /// Task ID
        id: String,
    },

    /// Reopen a completed task
    Reopen {
        /// Task ID
        id: String,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that will be blocked
        task: String,

        /// Task that must be completed first
        depends_on: String,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: String,

        /// Dependency to remove
        depends_on: String,
    },

    /// Move a task to another due date
    Reschedule {
        /// Task ID
        id: String,

        /// New due date (YYYY-MM-DD, today, tomorrow, +N, -N)
        #[arg(allow_hyphen_values = true)]
        date: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            due,
            parent,
            description,
        } => add_task(output, &title, &due, parent.as_deref(), description),
        TaskCommands::List { open } => list_tasks(output, open),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Start { id } => update_status(output, &id, Task::start, "Started"),
        TaskCommands::Done { id } => update_status(output, &id, Task::complete, "Completed"),
        TaskCommands::Reopen { id } => update_status(output, &id, Task::reopen, "Reopened"),
        TaskCommands::Dep { task, depends_on } => add_dependency(output, &task, &depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dependency(output, &task, &depends_on),
        TaskCommands::Reschedule { id, date } => reschedule_task(output, &id, &date),
        TaskCommands::Rm { id } => remove_task(output, &id),
    }
}

fn add_task(
    output: &Output,
    title: &str,
    due_str: &str,
    parent_str: Option<&str>,
    description: Option<String>,
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Task title cannot be empty");
    }

    let due = domain::parse_date(due_str, domain::today())?;

    let task_id = match parent_str {
        None => TaskId::new(title, Utc::now()),
        Some(parent) => {
            let parent_id: TaskId = parent.parse()?;
            let tasks = store.load()?;

            if !tasks.contains_key(&parent_id) {
                anyhow::bail!("Parent task not found: {}", parent_id);
            }

            next_subtask_id(&tasks, &parent_id)?
        }
    };
    output.verbose_ctx("task", &format!("Assigned ID {} due {}", task_id, due));

    let mut task = Task::new(task_id, title, due);
    if let Some(description) = description {
        task.set_description(description);
    }
    store.append(&task)?;

    if output.is_json() {
        output.data(&task)?;
    } else {
        output.success(&format!(
            "Created task: {} - {} (due {})",
            task.id,
            task.title,
            project.config().project.format_date(task.due)
        ));
    }

    Ok(())
}

fn list_tasks(output: &Output, open_only: bool) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().load()?;
    let config = &project.config().project;

    let mut sorted: Vec<_> = tasks
        .values()
        .filter(|t| !open_only || !t.is_complete())
        .collect();
    sorted.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));

    output.verbose_ctx("task", &format!("Listing {} of {} tasks", sorted.len(), tasks.len()));

    output.render(&sorted, || {
        if sorted.is_empty() {
            println!("No tasks");
            return;
        }
        println!("{:<20} {:<12} {:<5} TITLE", "ID", "DUE", "");
        println!("{}", "-".repeat(60));
        for task in &sorted {
            println!(
                "{:<20} {:<12} {:<5} {}",
                task.id,
                config.format_date(task.due),
                task.status.marker(),
                task.title
            );
        }
    })
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let config = &project.config().project;

    let id: TaskId = id_str.parse()?;
    let tasks = project.task_store().load()?;

    let task = tasks
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let readiness = Readiness::new(&tasks);
    let is_ready = readiness.is_ready(task);
    let blockers = readiness.blockers(task);
    let graph = DependencyGraph::from_tasks(tasks.values())?;
    let subtasks = graph.children(&task.id);
    let gates = graph.dependents(&task.id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "parent": task.parent(),
            "subtasks": subtasks,
            "is_ready": is_ready,
            "blocked_by": blockers,
            "blocks": gates,
        }))?;
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Due: {}", config.format_date(task.due));
        println!("Status: {:?}", task.status);
        if let Some(parent_id) = task.parent() {
            let parent_title = tasks
                .get(&parent_id)
                .map(|p| p.title.as_str())
                .unwrap_or("?");
            println!("Parent: {} ({})", parent_id, parent_title);
        }
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

        if let Some(completed) = task.completed_at {
            println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
        }

        if !task.depends_on.is_empty() {
            println!("\nDepends on:");
            for dep in &task.depends_on {
                let dep_status = tasks
                    .get(dep)
                    .map(|t| format!("{:?}", t.status))
                    .unwrap_or_else(|| "missing".to_string());
                println!("  {} ({})", dep, dep_status);
            }
        }

        if !gates.is_empty() {
            println!("\nBlocks:");
            for dependent in &gates {
                if let Some(t) = tasks.get(dependent) {
                    println!("  {} {} {}", t.status.marker(), t.id, t.title);
                }
            }
        }

        if !subtasks.is_empty() {
            println!("\nSubtasks:");
            for child in &subtasks {
                if let Some(t) = tasks.get(child) {
                    println!("  {} {} {}", t.status.marker(), t.id, t.title);
                }
            }
        }

        if let Some(desc) = &task.description {
            println!("\nDescription:");
            println!("{}", desc);
        }

        println!();
        if task.is_complete() {
            println!("Status: DONE");
        } else if is_ready {
            println!("Status: READY (all prerequisites complete)");
        } else {
            println!("Status: BLOCKED (waiting on prerequisites)");
        }
    }

    Ok(())
}

fn update_status(output: &Output, id_str: &str, apply: fn(&mut Task), verb: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let mut tasks = store.load()?;

    let task = tasks
        .get_mut(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    apply(task);
    store.update(task)?;
    output.verbose_ctx("task", &format!("{} is now {:?}", task.id, task.status));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "status": task.status,
            "completed_at": task.completed_at,
        }))?;
    } else {
        output.success(&format!("{} task: {}", verb, task.id));
    }

    Ok(())
}

fn add_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let mut tasks = store.load()?;

    if !tasks.contains_key(&task_id) {
        anyhow::bail!("Task not found: {}", task_id);
    }
    if !tasks.contains_key(&depends_on_id) {
        anyhow::bail!("Dependency task not found: {}", depends_on_id);
    }

    // Check for cycles using the graph
    let mut graph = DependencyGraph::from_tasks(tasks.values())?;
    graph.add_dependency(&task_id, &depends_on_id)?;
    output.verbose_ctx("dep", &format!("No cycle across {} tasks", graph.len()));

    let task = tasks
        .get_mut(&task_id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;
    if task.add_dependency(depends_on_id.clone()) {
        store.update(task)?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "depends_on": depends_on_id,
        }))?;
    } else {
        output.success(&format!("{} now depends on {}", task_id, depends_on_id));
    }

    Ok(())
}

fn remove_dependency(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let mut tasks = store.load()?;

    let task = tasks
        .get_mut(&task_id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;

    if !task.remove_dependency(&depends_on_id) {
        anyhow::bail!("{} does not depend on {}", task_id, depends_on_id);
    }
    store.update(task)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task_id,
            "removed_dependency": depends_on_id,
        }))?;
    } else {
        output.success(&format!(
            "Removed dependency: {} no longer depends on {}",
            task_id, depends_on_id
        ));
    }

    Ok(())
}

fn reschedule_task(output: &Output, id_str: &str, date_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let due = domain::parse_date(date_str, domain::today())?;
    let mut tasks = store.load()?;

    let task = tasks
        .get_mut(&id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let previous = task.due;
    task.reschedule(due);
    store.update(task)?;
    output.verbose_ctx("task", &format!("{} moved from {} to {}", id, previous, due));

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "previous_due": previous,
            "due": task.due,
        }))?;
    } else {
        output.success(&format!(
            "Rescheduled {} to {}",
            task.id,
            project.config().project.format_date(task.due)
        ));
    }

    Ok(())
}

fn remove_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let mut tasks = store.load()?;

    if !tasks.contains_key(&id) {
        anyhow::bail!("Task not found: {}", id);
    }

    // Orphaned subtasks could never become ready again
    let subtasks = DependencyGraph::from_tasks(tasks.values())?.children(&id);
    if !subtasks.is_empty() {
        anyhow::bail!(
            "Task {} has {} subtask(s); remove them first",
            id,
            subtasks.len()
        );
    }

    tasks.remove(&id);
    let unblocked = strip_dependency(&mut tasks, &id);
    store.replace_all(&tasks)?;
    output.verbose_ctx(
        "task",
        &format!("Removed {} and cleared it from {} task(s)", id, unblocked.len()),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "removed": true,
            "updated": unblocked,
        }))?;
    } else {
        output.success(&format!("Removed task: {}", id));
    }

    Ok(())
}

/// Next free subtask ID under `parent`
fn next_subtask_id(tasks: &HashMap<TaskId, Task>, parent: &TaskId) -> Result<TaskId> {
    let max_seq = tasks
        .keys()
        .filter(|id| id.is_child_of(parent))
        .filter_map(|id| id.segments().last().copied())
        .max()
        .unwrap_or(0);

    let seq = max_seq
        .checked_add(1)
        .ok_or_else(|| anyhow::anyhow!("No subtask numbers left under {}", parent))?;
    Ok(parent.subtask(seq))
}

/// Drops `id` from every task's prerequisites, returning the tasks touched
fn strip_dependency(tasks: &mut HashMap<TaskId, Task>, id: &TaskId) -> Vec<TaskId> {
    let mut touched: Vec<TaskId> = tasks
        .values_mut()
        .filter_map(|task| task.remove_dependency(id).then(|| task.id.clone()))
        .collect();
    touched.sort();
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn strip_dependency_clears_references() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let gone = Task::new(TaskId::new("gone", Utc::now()), "gone", due);
        let mut a = Task::new(TaskId::new("a", Utc::now()), "a", due);
        let b = Task::new(TaskId::new("b", Utc::now()), "b", due);
        a.add_dependency(gone.id.clone());

        let mut tasks: HashMap<_, _> = [a.clone(), b]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        assert_eq!(strip_dependency(&mut tasks, &gone.id), vec![a.id.clone()]);
        assert!(tasks[&a.id].depends_on.is_empty());
        assert!(strip_dependency(&mut tasks, &gone.id).is_empty());
    }

    #[test]
    fn subtask_ids_follow_the_highest_sequence() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let parent = Task::new(TaskId::new("parent", Utc::now()), "parent", due);
        let mut tasks: HashMap<_, _> = [(parent.id.clone(), parent.clone())].into();

        assert_eq!(next_subtask_id(&tasks, &parent.id).unwrap(), parent.id.subtask(1));

        let third = Task::new(parent.id.subtask(3), "third", due);
        tasks.insert(third.id.clone(), third);
        assert_eq!(next_subtask_id(&tasks, &parent.id).unwrap(), parent.id.subtask(4));
    }

    #[test]
    fn subtask_sequence_exhausted() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let parent = Task::new(TaskId::new("parent", Utc::now()), "parent", due);
        let last = Task::new(parent.id.subtask(u32::MAX), "last", due);
        let tasks: HashMap<_, _> = [parent.clone(), last]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let err = next_subtask_id(&tasks, &parent.id).unwrap_err();
        assert!(err.to_string().contains("No subtask numbers left"));
    }
}
