//! Agenda - a local-first list of the tasks that are due and ready to start
//!
//! Tasks carry a due date, prerequisites and an optional parent grouping.
//! Open tasks are indexed by date in an AVL tree ([`tree::AvlTree`]); the
//! agenda walks that index in date order and keeps the tasks whose
//! prerequisites, and their parents' prerequisites, are all done.

pub mod tree;
pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Agenda, Dated, DueIndex, Task, TaskId, TaskStatus};
pub use tree::AvlTree;
