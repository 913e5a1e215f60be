//! Hierarchical task IDs
//!
//! ID Format:
//! - Top-level tasks: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//! - Subtasks: `{parent-id}.{sequence}` (e.g., `t-9d3e5f2.1` or `t-9d3e5f2.1.2`)
//!
//! Hash is derived from title + creation timestamp, ensuring uniqueness.
//! A subtask's parent grouping is read straight off its ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{7-char-hash}}[.{{sequence}}...]', got '{0}'")]
    InvalidTaskId(String),

    #[error("Invalid sequence number: {0}")]
    InvalidSequence(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Task ID: `t-{hash}` with optional subtask segments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
    /// Subtask sequence segments (empty for a top-level task)
    segments: Vec<u32>,
}

impl TaskId {
    /// Creates a new top-level task ID from title and timestamp
    pub fn new(title: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(title, timestamp),
            segments: vec![],
        }
    }

    /// Returns the sequence segments (e.g., `[1, 2]` for `t-1234567.1.2`)
    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Returns the parent grouping's ID, or None for a top-level task
    pub fn parent(&self) -> Option<TaskId> {
        let (_, rest) = self.segments.split_last()?;
        Some(TaskId {
            hash: self.hash.clone(),
            segments: rest.to_vec(),
        })
    }

    /// Returns true if `self` is a direct subtask of `other`
    pub fn is_child_of(&self, other: &TaskId) -> bool {
        self.hash == other.hash
            && self.segments.len() == other.segments.len() + 1
            && self.segments.starts_with(&other.segments)
    }

    /// Creates a subtask ID under this task
    pub fn subtask(&self, sequence: u32) -> TaskId {
        let mut segments = self.segments.clone();
        segments.push(sequence);
        TaskId {
            hash: self.hash.clone(),
            segments,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)?;
        for seg in &self.segments {
            write!(f, ".{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        let mut parts = rest.split('.');
        let hash = parts.next().unwrap_or_default();
        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        let segments = parts
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| IdError::InvalidSequence(p.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
            segments,
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generation_is_unique_for_different_timestamps() {
        let title = "Same Title";
        let ts1 = Utc::now();
        let ts2 = ts1 + chrono::Duration::nanoseconds(1);

        assert_ne!(TaskId::new(title, ts1), TaskId::new(title, ts2));
    }

    #[test]
    fn id_format_is_correct() {
        let id = TaskId::new("Fix typo", Utc::now());
        let s = id.to_string();

        assert!(s.starts_with("t-"));
        assert_eq!(s.len(), 9); // "t-" + 7 chars
        assert!(id.segments().is_empty());
        assert_eq!(id.parent(), None);
    }

    #[test]
    fn id_parses_correctly() {
        let original = TaskId::new("Test", Utc::now());
        let parsed: TaskId = original.to_string().parse().unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn subtask_id_works() {
        let task = TaskId::new("Main task", Utc::now());
        let subtask = task.subtask(2);

        assert_eq!(subtask.segments(), &[2]);
        assert!(subtask.is_child_of(&task));
        assert!(!task.is_child_of(&subtask));
        assert_eq!(subtask.parent(), Some(task.clone()));
        assert!(subtask.to_string().ends_with(".2"));
    }

    #[test]
    fn subtask_parent_chain() {
        let subtask: TaskId = "t-1234567.1.2".parse().unwrap();
        assert_eq!(subtask.segments(), &[1, 2]);

        let parent = subtask.parent().unwrap();
        assert_eq!(parent.to_string(), "t-1234567.1");

        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent.to_string(), "t-1234567");
        assert!(grandparent.parent().is_none());
    }

    #[test]
    fn grandchild_is_not_direct_child() {
        let root: TaskId = "t-1234567".parse().unwrap();
        let grandchild: TaskId = "t-1234567.1.1".parse().unwrap();
        let other: TaskId = "t-7654321.1".parse().unwrap();

        assert!(!grandchild.is_child_of(&root));
        assert!(!other.is_child_of(&root));
    }

    #[test]
    fn rejects_invalid_format() {
        assert!("invalid".parse::<TaskId>().is_err());
        assert!("a-1234567.1".parse::<TaskId>().is_err()); // wrong prefix
        assert!("t-123456".parse::<TaskId>().is_err()); // hash too short
        assert!("t-gggggg1".parse::<TaskId>().is_err()); // 'g' is not hex
        assert_eq!(
            "t-1234567.abc".parse::<TaskId>(),
            Err(IdError::InvalidSequence("abc".to_string()))
        );
    }

    #[test]
    fn serde_roundtrip() {
        let original = TaskId::new("Test", Utc::now()).subtask(1).subtask(2);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, format!("\"{}\"", original));

        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }
}
