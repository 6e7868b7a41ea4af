use super::agent::Agent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A unit of delegated work.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub expected_output: String,
    pub agent: Arc<Agent>,
    /// Tasks whose output becomes this task's context, in context order.
    pub prerequisites: Vec<TaskId>,
    /// Artifact name the result is written to.
    pub output_sink: String,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
        output_sink: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            prerequisites: Vec::new(),
            output_sink: output_sink.into(),
        }
    }

    pub fn with_prerequisites(mut self, prerequisites: &[&Task]) -> Self {
        self.prerequisites = prerequisites.iter().map(|task| task.id.clone()).collect();
        self
    }
}

/// Output of one completed task. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub agent_role: String,
    pub text: String,
    pub produced_at: DateTime<Utc>,
}

impl TaskResult {
    pub fn new(task: &Task, text: String) -> Self {
        Self {
            task_id: task.id.clone(),
            agent_role: task.agent.role.clone(),
            text,
            produced_at: Utc::now(),
        }
    }
}
