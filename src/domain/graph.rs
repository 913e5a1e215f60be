//! Dependency graph for tasks
//!
//! Edges point from the task that has to happen first to the task it gates.
//! Two kinds exist: prerequisites (`depends_on`) and groupings (a parent
//! gates each of its subtasks, because a subtask is only ready once its
//! parent's prerequisites are done). Any cycle across either kind would
//! leave its tasks never ready, so cycles are rejected.
//! Uses petgraph for graph operations.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use thiserror::Error;

use super::id::TaskId;
use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding dependency would create a cycle: {0} -> {1}")]
    CycleDetected(TaskId, TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(TaskId),
}

/// Why one task gates another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Prerequisite,
    Grouping,
}

/// A dependency graph for tasks
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<TaskId, EdgeKind>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from a collection of tasks
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        // First pass: add all nodes
        let tasks: Vec<_> = tasks.into_iter().collect();
        for task in &tasks {
            graph.add_task(task.id.clone());
        }

        // Second pass: groupings, then prerequisites
        for task in &tasks {
            if let Some(parent) = task.parent() {
                if graph.contains(&parent) {
                    graph.add_edge(&parent, &task.id, EdgeKind::Grouping)?;
                }
            }
        }
        // Dangling prerequisites stay out; they only ever block
        for task in &tasks {
            let known: Vec<&TaskId> = task
                .depends_on
                .iter()
                .filter(|id| graph.contains(id))
                .collect();
            for dep_id in known {
                graph.add_dependency(&task.id, dep_id)?;
            }
        }

        Ok(graph)
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task_id: TaskId) {
        if !self.node_map.contains_key(&task_id) {
            let idx = self.graph.add_node(task_id.clone());
            self.node_map.insert(task_id, idx);
        }
    }

    /// Adds a prerequisite edge: `task` depends on `depends_on`
    pub fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<(), GraphError> {
        self.add_edge(depends_on, task, EdgeKind::Prerequisite)
    }

    fn add_edge(&mut self, from: &TaskId, to: &TaskId, kind: EdgeKind) -> Result<(), GraphError> {
        if from == to {
            return Err(GraphError::SelfDependency(to.clone()));
        }

        let to_idx = *self
            .node_map
            .get(to)
            .ok_or_else(|| GraphError::TaskNotFound(to.clone()))?;

        let from_idx = *self
            .node_map
            .get(from)
            .ok_or_else(|| GraphError::TaskNotFound(from.clone()))?;

        if self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|edge| *edge.weight() == kind)
        {
            return Ok(());
        }

        let edge = self.graph.add_edge(from_idx, to_idx, kind);

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(GraphError::CycleDetected(to.clone(), from.clone()));
        }

        Ok(())
    }

    /// Returns the tasks that list this task as a prerequisite
    pub fn dependents(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.targets(task_id, EdgeKind::Prerequisite)
    }

    /// Returns the subtasks grouped under this task
    pub fn children(&self, task_id: &TaskId) -> Vec<TaskId> {
        self.targets(task_id, EdgeKind::Grouping)
    }

    fn targets(&self, task_id: &TaskId, kind: EdgeKind) -> Vec<TaskId> {
        let Some(&idx) = self.node_map.get(task_id) else {
            return vec![];
        };

        let mut ids: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .filter_map(|edge| self.graph.node_weight(edge.target()).cloned())
            .collect();
        ids.sort();
        ids
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.node_map.contains_key(task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
