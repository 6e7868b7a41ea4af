use super::agent::TaskInput;
use super::graph::TaskGraph;
use super::sink::OutputSink;
use super::task::{Task, TaskId, TaskResult};
use crate::error::{ItineraError, PipelineError, Result};
use crate::prompt::ContextEntry;
use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, TryStreamExt, stream};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_DEADLINE_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Tasks allowed in flight at once. `1` runs strictly in order.
    pub max_concurrency: usize,
    /// Wall-clock bound for a whole run.
    pub deadline: Option<Duration>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            deadline: Some(Duration::from_secs(DEFAULT_DEADLINE_SECS)),
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub final_result: TaskResult,
    /// One result per task, in execution order.
    pub results: Vec<TaskResult>,
}

impl RunOutput {
    pub fn get(&self, id: &TaskId) -> Option<&TaskResult> {
        self.results.iter().find(|result| &result.task_id == id)
    }
}

/// Executes a task graph. Holds no per-run state, so one runner can serve
/// many runs.
pub struct PipelineRunner {
    sink: Arc<dyn OutputSink>,
    options: RunnerOptions,
}

impl PipelineRunner {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            options: RunnerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    /// Run every task in the graph; the first failure aborts the run.
    pub async fn run(&self, graph: &TaskGraph) -> Result<RunOutput> {
        let started = Instant::now();
        tracing::info!(
            tasks = graph.len(),
            max_concurrency = self.options.max_concurrency,
            "pipeline run started"
        );

        let work = async {
            if self.options.max_concurrency <= 1 {
                self.run_ordered(&graph.execution_order()).await
            } else {
                self.run_waves(graph).await
            }
        };

        let outcome = match self.options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, work)
                .await
                .unwrap_or_else(|_| {
                    Err(PipelineError::DeadlineExceeded {
                        secs: deadline.as_secs(),
                    }
                    .into())
                }),
            None => work.await,
        };

        match &outcome {
            Ok(_) => tracing::info!(elapsed_ms = elapsed_ms(started), "pipeline run finished"),
            Err(error) => tracing::warn!(
                elapsed_ms = elapsed_ms(started),
                error = %error,
                "pipeline run failed"
            ),
        }
        outcome
    }

    /// Run tasks strictly one after another in the given order.
    ///
    /// The order must already satisfy every prerequisite; a task whose
    /// prerequisite has not run yet fails with
    /// [`PipelineError::MissingPrerequisite`].
    pub async fn run_ordered(&self, tasks: &[&Task]) -> Result<RunOutput> {
        let mut completed: HashMap<TaskId, TaskResult> = HashMap::with_capacity(tasks.len());
        let mut results = Vec::with_capacity(tasks.len());

        for task in tasks {
            let prior = gather_context(task, &completed)?;
            let result = self.execute_task(task, prior).await?;
            completed.insert(task.id.clone(), result.clone());
            results.push(result);
        }

        let final_result = results.last().cloned().ok_or(PipelineError::EmptyGraph)?;
        Ok(RunOutput {
            final_result,
            results,
        })
    }

    /// Each wave holds every task whose prerequisites are complete; a wave
    /// finishes before the next one starts. Artifacts of a wave are written
    /// only after every task in it succeeded, so a failed wave leaves nothing
    /// behind in the sink.
    async fn run_waves(&self, graph: &TaskGraph) -> Result<RunOutput> {
        let order = graph.execution_order();
        let mut completed: HashMap<TaskId, TaskResult> = HashMap::with_capacity(order.len());

        while completed.len() < order.len() {
            let wave = order
                .iter()
                .filter(|task| !completed.contains_key(&task.id))
                .filter(|task| task.prerequisites.iter().all(|p| completed.contains_key(p)))
                .map(|task| -> Result<_> { Ok((*task, gather_context(task, &completed)?)) })
                .collect::<Result<Vec<_>>>()?;

            if wave.is_empty() {
                let stalled = order
                    .iter()
                    .find(|task| !completed.contains_key(&task.id))
                    .map(|task| task.id.to_string())
                    .unwrap_or_default();
                return Err(PipelineError::InvalidGraph(format!(
                    "no runnable task; {stalled} is waiting on unresolved prerequisites"
                ))
                .into());
            }

            tracing::debug!(
                wave = ?wave.iter().map(|(task, _)| task.id.as_str()).collect::<Vec<_>>(),
                "starting wave"
            );

            let tasks: Vec<&Task> = wave.iter().map(|(task, _)| *task).collect();
            let pending: Vec<BoxFuture<'_, Result<TaskResult>>> = wave
                .into_iter()
                .map(|(task, prior)| self.produce(task, prior).boxed())
                .collect();
            let finished: Vec<TaskResult> = stream::iter(pending)
                .buffer_unordered(self.options.max_concurrency)
                .try_collect()
                .await?;

            let mut by_id: HashMap<TaskId, TaskResult> = finished
                .into_iter()
                .map(|result| (result.task_id.clone(), result))
                .collect();
            for task in tasks {
                if let Some(result) = by_id.remove(&task.id) {
                    self.persist(task, &result).await?;
                    completed.insert(task.id.clone(), result);
                }
            }
        }

        let results: Vec<TaskResult> = order
            .iter()
            .filter_map(|task| completed.remove(&task.id))
            .collect();
        let final_result = results.last().cloned().ok_or(PipelineError::EmptyGraph)?;
        Ok(RunOutput {
            final_result,
            results,
        })
    }

    async fn execute_task(&self, task: &Task, prior: Vec<TaskResult>) -> Result<TaskResult> {
        let result = self.produce(task, prior).await?;
        self.persist(task, &result).await?;
        Ok(result)
    }

    /// Run the task's agent; nothing is written yet.
    async fn produce(&self, task: &Task, prior: Vec<TaskResult>) -> Result<TaskResult> {
        let started = Instant::now();
        tracing::info!(task = %task.id, role = %task.agent.role, "task started");

        let context = prior
            .iter()
            .map(|result| ContextEntry {
                task_id: result.task_id.as_str(),
                role: &result.agent_role,
                text: &result.text,
            })
            .collect();
        let input = TaskInput {
            task_id: &task.id,
            description: &task.description,
            expected_output: &task.expected_output,
            context,
        };

        let text = task.agent.execute(&input).await?;
        let result = TaskResult::new(task, text);
        tracing::info!(
            task = %task.id,
            chars = result.text.len(),
            elapsed_ms = elapsed_ms(started),
            "task finished"
        );
        Ok(result)
    }

    async fn persist(&self, task: &Task, result: &TaskResult) -> Result<()> {
        self.sink
            .write(&task.output_sink, &result.text)
            .await
            .map_err(|error| PipelineError::Sink {
                artifact: task.output_sink.clone(),
                message: format!("{error:#}"),
            })?;
        tracing::debug!(task = %task.id, artifact = %task.output_sink, "artifact written");
        Ok(())
    }
}

/// Prerequisite results in the task's declared prerequisite order.
fn gather_context(task: &Task, completed: &HashMap<TaskId, TaskResult>) -> Result<Vec<TaskResult>> {
    task.prerequisites
        .iter()
        .map(|prerequisite| {
            completed.get(prerequisite).cloned().ok_or_else(|| {
                ItineraError::from(PipelineError::MissingPrerequisite {
                    task: task.id.to_string(),
                    prerequisite: prerequisite.to_string(),
                })
            })
        })
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
