//! Agents, tasks and the runner that drives them.

pub mod agent;
pub mod graph;
pub mod runner;
pub mod sink;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{Agent, AgentProfile, LlmBinding, TaskInput};
pub use graph::TaskGraph;
pub use runner::{PipelineRunner, RunOutput, RunnerOptions};
pub use sink::{FileSink, MemorySink, OutputSink};
pub use task::{Task, TaskId, TaskResult};
