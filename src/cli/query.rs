//! Query commands (due, blocked, on, status)
//!
//! Every query loads the task file once and indexes the open tasks by date.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{self, Agenda, Task, TaskStatus};
use crate::storage::{Project, ProjectConfig};

use super::output::Output;

/// Works out the cut-off date for `due` style queries
fn resolve_pivot(
    config: &ProjectConfig,
    on: Option<&str>,
    days: Option<u32>,
    today: NaiveDate,
) -> Result<NaiveDate> {
    if let Some(on) = on {
        return Ok(domain::parse_date(on, today)?);
    }
    let days = days.unwrap_or(config.lookahead_days);
    domain::offset(today, i64::from(days), &format!("+{}", days))
        .context("Lookahead does not fit in the calendar")
}

fn task_json(agenda: &Agenda<'_>, task: &Task, show_parent: bool) -> serde_json::Value {
    json!({
        "id": task.id,
        "title": task.title,
        "summary": agenda.summary(task, show_parent),
        "due": task.due,
        "status": task.status,
    })
}

/// Show ready tasks due on or before the cut-off
pub fn due(output: &Output, on: Option<&str>, days: Option<u32>) -> Result<()> {
    let project = Project::open_current()?;
    let config = &project.config().project;
    output.verbose_ctx(
        "due",
        &format!("Opened project at: {}", project.root().display()),
    );

    let pivot = resolve_pivot(config, on, days, domain::today())?;
    let tasks = project.task_store().load()?;
    let agenda = Agenda::new(&tasks);
    output.verbose_ctx(
        "due",
        &format!("Indexed {} open tasks, pivot {}", agenda.len(), pivot),
    );

    let due = agenda.due(pivot);
    output.verbose_ctx("due", &format!("Found {} ready tasks", due.len()));

    let items: Vec<_> = due
        .iter()
        .map(|t| task_json(&agenda, t, config.show_parent))
        .collect();
    output.render(&json!({ "pivot": pivot, "tasks": items }), || {
        if due.is_empty() {
            println!("Nothing due by {}.", config.format_date(pivot));
            return;
        }
        println!("Due by {} ({}):", config.format_date(pivot), due.len());
        println!("{:<20} {:<12} TASK", "ID", "DUE");
        println!("{}", "-".repeat(60));
        for task in &due {
            println!(
                "{:<20} {:<12} {}",
                task.id,
                config.format_date(task.due),
                agenda.summary(task, config.show_parent)
            );
        }
    })
}

/// Show due tasks still waiting on prerequisites
pub fn blocked(output: &Output, on: Option<&str>, days: Option<u32>) -> Result<()> {
    let project = Project::open_current()?;
    let config = &project.config().project;

    let pivot = resolve_pivot(config, on, days, domain::today())?;
    let tasks = project.task_store().load()?;
    let agenda = Agenda::new(&tasks);

    let blocked = agenda.blocked(pivot);
    output.verbose_ctx(
        "blocked",
        &format!("Found {} blocked tasks due by {}", blocked.len(), pivot),
    );

    let items: Vec<_> = blocked
        .iter()
        .map(|(task, blockers)| {
            let mut item = task_json(&agenda, task, config.show_parent);
            item["blocked_by"] = json!(blockers);
            item
        })
        .collect();
    output.render(&json!({ "pivot": pivot, "tasks": items }), || {
        if blocked.is_empty() {
            println!("No blocked tasks due by {}.", config.format_date(pivot));
            return;
        }
        println!("Blocked tasks ({}):", blocked.len());
        println!("{:<20} {:<30} BLOCKED BY", "ID", "TASK");
        println!("{}", "-".repeat(80));
        for (task, blockers) in &blocked {
            let blockers: Vec<_> = blockers.iter().map(ToString::to_string).collect();
            println!(
                "{:<20} {:<30} {}",
                task.id,
                agenda.summary(task, config.show_parent),
                blockers.join(", ")
            );
        }
    })
}

/// Show every open task due on exactly one date
pub fn on(output: &Output, date_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let config = &project.config().project;

    let date = domain::parse_date(date_str, domain::today())?;
    let tasks = project.task_store().load()?;
    let agenda = Agenda::new(&tasks);

    let on_date = agenda.on(date);
    output.verbose_ctx("on", &format!("{} tasks on {}", on_date.len(), date));

    let items: Vec<_> = on_date
        .iter()
        .map(|t| task_json(&agenda, t, config.show_parent))
        .collect();
    output.render(&json!({ "date": date, "tasks": items }), || {
        if on_date.is_empty() {
            println!("Nothing scheduled on {}.", config.format_date(date));
            return;
        }
        println!("{}:", config.format_date(date));
        for task in &on_date {
            println!(
                "  {} {} {}",
                task.status.marker(),
                task.id,
                agenda.summary(task, config.show_parent)
            );
        }
    })
}

/// Show project status overview
pub fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let config = &project.config().project;

    let tasks = project.task_store().load()?;
    let count = |status: TaskStatus| tasks.values().filter(|t| t.status == status).count();
    let (todo, in_progress, done) = (
        count(TaskStatus::Todo),
        count(TaskStatus::InProgress),
        count(TaskStatus::Done),
    );

    let today = domain::today();
    let agenda = Agenda::new(&tasks);
    let ready_tasks = agenda.due(today);
    let ready = ready_tasks.len();
    let overdue = ready_tasks.iter().filter(|t| t.due < today).count();
    let blocked = agenda.blocked(today).len();
    let next = agenda.next_date();
    let last = agenda.last_date();

    let summary = json!({
        "tasks": {
            "total": tasks.len(),
            "todo": todo,
            "in_progress": in_progress,
            "done": done,
        },
        "today": {
            "date": today,
            "ready": ready,
            "blocked": blocked,
            "overdue": overdue,
        },
        "open": agenda.len(),
        "next_due": next,
        "last_due": last,
    });
    output.render(&summary, || {
        println!("Project Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Tasks: {} total", tasks.len());
        println!("  [ ] Todo:        {}", todo);
        println!("  [~] In Progress: {}", in_progress);
        println!("  [x] Done:        {}", done);
        println!();
        println!("Today ({}):", config.format_date(today));
        println!("  Ready to start:  {}", ready);
        println!("  Overdue:         {}", overdue);
        println!("  Blocked:         {}", blocked);

        if let (Some(next), Some(last)) = (next, last) {
            println!();
            println!(
                "Open tasks span {} to {}",
                config.format_date(next),
                config.format_date(last)
            );
        }
    })
}
