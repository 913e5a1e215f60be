//! Domain models for agenda
//!
//! Contains the core business logic without any I/O concerns.

mod agenda;
mod date;
mod due_index;
mod graph;
mod id;
mod readiness;
mod task;

pub use agenda::Agenda;
pub use date::{offset, parse_date, today, DateError};
pub use due_index::{Dated, DueIndex, DueSlot};
pub use graph::{DependencyGraph, EdgeKind, GraphError};
pub use id::{IdError, TaskId};
pub use readiness::Readiness;
pub use task::{Task, TaskStatus};
