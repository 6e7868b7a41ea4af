//! Scripted provider for unit tests in this module tree.

use crate::error::GenerationError;
use crate::llm::{ContentBlock, Provider, ProviderMessage, ProviderResponse};
use crate::tools::ToolSpec;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) enum Step {
    Reply(ProviderResponse),
    Fail(GenerationError),
    Delay(Duration, ProviderResponse),
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub role: String,
    pub user_message: String,
    pub tool_results: Vec<String>,
    pub tools_offered: usize,
}

/// Replies per agent role, in order. A role with no script left answers
/// `"<role> answer"`.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
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

    pub fn roles_called(&self) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();
        for call in self.calls() {
            if roles.last() != Some(&call.role) {
                roles.push(call.role);
            }
        }
        roles
    }
}

pub(crate) fn role_from_system_prompt(system_prompt: Option<&str>) -> String {
    system_prompt
        .and_then(|prompt| prompt.strip_prefix("You are "))
        .and_then(|rest| rest.split(['.', '\n']).next())
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn search_call(id: &str, query: &str) -> ProviderResponse {
    ProviderResponse::tool_calls(vec![(
        id.to_string(),
        "web_search".to_string(),
        serde_json::json!({ "query": query }),
    )])
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
        let role = role_from_system_prompt(system_prompt);
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
