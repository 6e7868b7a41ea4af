use super::task::TaskId;
use crate::error::GenerationError;
use crate::llm::{ContentBlock, Provider, ProviderMessage, ProviderResponse, sanitize_api_error};
use crate::prompt::{ContextEntry, PromptBuilder};
use crate::tools::{ExecutionContext, ToolRegistry, ToolResult, ToolSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Absolute upper bound on tool-loop turns, regardless of configuration.
pub const AGENT_ITERATION_HARD_CAP: u32 = 25;

/// Static description of an agent role. `goal_template` may reference
/// `{destination}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: String,
    pub goal_template: String,
    pub backstory: String,
    pub max_iterations: u32,
}

impl AgentProfile {
    pub fn render_goal(&self, destination: &str) -> String {
        self.goal_template.replace("{destination}", destination)
    }
}

/// Which model an agent talks to, and how.
#[derive(Clone)]
pub struct LlmBinding {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub temperature: f64,
}

/// What an agent receives for one task.
#[derive(Debug, Clone)]
pub struct TaskInput<'a> {
    pub task_id: &'a TaskId,
    pub description: &'a str,
    pub expected_output: &'a str,
    pub context: Vec<ContextEntry<'a>>,
}

/// A role-scoped wrapper around the language model, optionally equipped
/// with tools. Built per run and immutable afterwards.
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub max_iterations: u32,
    tools: ToolRegistry,
    llm: LlmBinding,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("model", &self.llm.model)
            .field("tools", &self.tools.tool_names())
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn new(
        profile: &AgentProfile,
        destination: &str,
        llm: LlmBinding,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            role: profile.role.clone(),
            goal: profile.render_goal(destination),
            backstory: profile.backstory.clone(),
            max_iterations: profile.max_iterations.clamp(1, AGENT_ITERATION_HARD_CAP),
            tools,
            llm,
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.tool_names()
    }

    /// Run one task to a non-empty final answer.
    ///
    /// The model may call tools for up to `max_iterations` turns, with at most
    /// `max_iterations` tool calls in total. If it is still asking for tools
    /// after that, one last turn is sent with no tools offered.
    pub async fn execute(&self, input: &TaskInput<'_>) -> Result<String, GenerationError> {
        let prompts = PromptBuilder::new().map_err(|e| self.agent_error(&e))?;
        let tool_names = self.tools.tool_names();
        let system_prompt = prompts
            .agent_system_prompt(&self.role, &self.goal, &self.backstory, &tool_names)
            .map_err(|e| self.agent_error(&e))?;
        let user_message = prompts
            .task_message(input.description, input.expected_output, &input.context)
            .map_err(|e| self.agent_error(&e))?;

        let specs = self.tools.specs();
        let ctx = ExecutionContext::new(input.task_id.as_str(), &self.role, self.max_iterations);
        let mut messages = vec![ProviderMessage::user(user_message)];

        for turn in 0..self.max_iterations {
            let response = self.chat(&system_prompt, &messages, &specs).await?;
            messages.push(response.to_assistant_message());

            if !response.has_tool_use() {
                tracing::debug!(role = %self.role, turn, "agent produced final answer");
                return self.final_text(&response);
            }

            self.run_tool_calls(&response, &mut messages, &ctx).await;
        }

        tracing::info!(
            role = %self.role,
            task = %input.task_id,
            tool_calls = ctx.budget().used(),
            "iteration limit reached; requesting final answer"
        );
        messages.push(ProviderMessage::user(PromptBuilder::final_answer_nudge()));
        let response = self.chat(&system_prompt, &messages, &[]).await?;
        self.final_text(&response)
    }

    async fn run_tool_calls(
        &self,
        response: &ProviderResponse,
        messages: &mut Vec<ProviderMessage>,
        ctx: &ExecutionContext,
    ) {
        for block in response.tool_use_blocks() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let result = match self.tools.execute(name, input.clone(), ctx).await {
                Ok(result) => result,
                Err(error) => ToolResult::failed(error.to_string()),
            };

            tracing::debug!(
                role = %self.role,
                tool = %name,
                success = result.success,
                "tool call finished"
            );

            let content = match &result.error {
                Some(error) => format!("[ERROR] {error}"),
                None => result.output.clone(),
            };
            messages.push(ProviderMessage::tool_result(id, content, !result.success));
        }
    }

    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
    ) -> Result<ProviderResponse, GenerationError> {
        self.llm
            .provider
            .chat_with_tools(
                Some(system_prompt),
                messages,
                tools,
                &self.llm.model,
                self.llm.temperature,
            )
            .await
            .map_err(|error| match error.downcast::<GenerationError>() {
                Ok(typed) => typed,
                Err(other) => self.agent_error(&other),
            })
    }

    fn final_text(&self, response: &ProviderResponse) -> Result<String, GenerationError> {
        let text = response.text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: self.llm.provider.name().to_string(),
            });
        }
        Ok(text.to_string())
    }

    fn agent_error(&self, error: &anyhow::Error) -> GenerationError {
        GenerationError::Agent {
            role: self.role.clone(),
            message: sanitize_api_error(&format!("{error:#}")),
        }
    }
}
