//! Append-only task log
//!
//! `.agenda/tasks.jsonl` holds one JSON task per line. Every change is
//! appended as a fresh copy of the task and the last copy of an ID wins.
//! Once superseded copies outnumber the live tasks the log is rewritten
//! in due-date order, one line per task.
//!
//! Readers take a shared `fs2` lock, writers an exclusive one.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Task, TaskId};

/// Superseded lines tolerated before `update` rewrites the log
const MIN_STALE_LINES: usize = 32;

/// Tasks recovered from the log, plus how many lines were overwritten
#[derive(Debug, Default)]
struct Replay {
    tasks: HashMap<TaskId, Task>,
    stale: usize,
}

impl Replay {
    fn needs_rewrite(&self) -> bool {
        self.stale >= MIN_STALE_LINES && self.stale > self.tasks.len()
    }
}

fn replay(reader: impl BufRead) -> Result<Replay> {
    let mut replay = Replay::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let task: Task = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse task at line {}", line_no))?;
        if replay.tasks.insert(task.id.clone(), task).is_some() {
            replay.stale += 1;
        }
    }

    Ok(replay)
}

/// The project's task log
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log inside a project's `.agenda/` directory
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".agenda").join("tasks.jsonl"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current version of every task
    pub fn load(&self) -> Result<HashMap<TaskId, Task>> {
        Ok(self.replay()?.tasks)
    }

    fn replay(&self) -> Result<Replay> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Replay::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open task log: {}", self.path.display()))
            }
        };
        file.lock_shared()
            .context("Failed to acquire read lock on task log")?;

        replay(BufReader::new(&file))
            .with_context(|| format!("Corrupt task log: {}", self.path.display()))
    }

    /// Records a new task or a new version of an existing one
    pub fn append(&self, task: &Task) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open task log: {}", self.path.display()))?;
        file.lock_exclusive()
            .context("Failed to acquire write lock on task log")?;

        let line = serde_json::to_string(task).context("Failed to serialize task")?;
        let mut writer = BufWriter::new(&file);
        writeln!(writer, "{}", line)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to append task {}", task.id))
    }

    /// Appends the changed task, rewriting the log once it is mostly history
    ///
    /// Returns true when the log was rewritten.
    pub fn update(&self, task: &Task) -> Result<bool> {
        self.append(task)?;

        let replay = self.replay()?;
        if !replay.needs_rewrite() {
            return Ok(false);
        }
        self.replace_all(&replay.tasks)?;
        Ok(true)
    }

    /// Replaces the whole log with `tasks`, ordered by due date then ID
    ///
    /// The new log is written next to the old one and renamed over it.
    pub fn replace_all(&self, tasks: &HashMap<TaskId, Task>) -> Result<()> {
        self.ensure_parent_dir()?;
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            file.lock_exclusive()
                .context("Failed to acquire write lock on task log")?;

            let mut ordered: Vec<&Task> = tasks.values().collect();
            ordered.sort_by(|a, b| a.due.cmp(&b.due).then_with(|| a.id.cmp(&b.id)));

            let mut writer = BufWriter::new(&file);
            for task in ordered {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task log")?;
            }
            writer.flush().context("Failed to flush task log")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to move {} over {}",
                temp_path.display(),
                self.path.display()
            )
        })
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) => fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display())),
            None => Ok(()),
        }
    }
}
