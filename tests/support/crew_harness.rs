#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use itinera::crew::{LlmBinding, MemorySink, PipelineRunner, RunnerOptions};
use itinera::error::{GenerationError, SearchError};
use itinera::llm::{ContentBlock, Provider, ProviderMessage, ProviderResponse};
use itinera::tools::{SearchProvider, ToolSpec};
use itinera::trip::{AgentFactory, TripPlanner};

pub enum Step {
    Reply(ProviderResponse),
    Fail(GenerationError),
    Delay(Duration, ProviderResponse),
}

pub fn reply(text: &str) -> Step {
    Step::Reply(ProviderResponse::text_only(text.to_string()))
}

pub fn search(id: &str, query: &str) -> Step {
    Step::Reply(ProviderResponse::tool_calls(vec![(
        id.to_string(),
        "web_search".to_string(),
        serde_json::json!({ "query": query }),
    )]))
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: String,
    pub user_message: String,
    pub tool_results: Vec<String>,
    pub tools_offered: usize,
}

/// Language model stand-in keyed by the agent role in the system prompt.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, role: &str, steps: Vec<Step>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(role.to_string(), steps.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, role: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.role == role)
            .collect()
    }

    /// Roles in first-call order.
    pub fn roles_called(&self) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();
        for call in self.calls() {
            if !roles.contains(&call.role) {
                roles.push(call.role);
            }
        }
        roles
    }
}

fn role_of(system_prompt: Option<&str>) -> String {
    system_prompt
        .and_then(|prompt| prompt.strip_prefix("You are "))
        .and_then(|rest| rest.split(['.', '\n']).next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        _model: &str,
        _temperature: f64,
    ) -> anyhow::Result<ProviderResponse> {
        let role = role_of(system_prompt);
        let tool_results = messages
            .iter()
            .flat_map(|message| message.content.iter())
            .filter_map(|block| match block {
                ContentBlock::ToolResult { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect();
        self.calls.lock().unwrap().push(RecordedCall {
            role: role.clone(),
            user_message: messages.first().map(ProviderMessage::text).unwrap_or_default(),
            tool_results,
            tools_offered: tools.len(),
        });

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&role)
            .and_then(VecDeque::pop_front);

        match step {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(error)) => Err(error.into()),
            Some(Step::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Ok(ProviderResponse::text_only(format!("{role} answer"))),
        }
    }
}

/// Search backend that answers from a fixed template or always fails.
pub struct StubSearch {
    fail: bool,
    calls: AtomicUsize,
}

impl StubSearch {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(&self, query: &str, result_count: usize) -> Result<Vec<String>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::Unreachable("stub search is down".into()));
        }
        Ok((1..=result_count.min(2))
            .map(|n| format!("hit {n} for {query}"))
            .collect())
    }
}

pub fn planner(
    provider: &Arc<ScriptedProvider>,
    search: &Arc<StubSearch>,
    sink: &Arc<MemorySink>,
    options: RunnerOptions,
    max_iterations: u32,
) -> TripPlanner {
    let llm = LlmBinding {
        provider: Arc::clone(provider) as Arc<dyn Provider>,
        model: "test-model".into(),
        temperature: 0.0,
    };
    let factory = AgentFactory::new(llm, max_iterations)
        .with_search(Arc::clone(search) as Arc<dyn SearchProvider>, 5);
    let runner = PipelineRunner::new(Arc::clone(sink) as Arc<dyn itinera::crew::OutputSink>)
        .with_options(options);
    TripPlanner::new(factory, runner)
}

pub fn sequential() -> RunnerOptions {
    RunnerOptions {
        max_concurrency: 1,
        deadline: Some(Duration::from_secs(30)),
    }
}
