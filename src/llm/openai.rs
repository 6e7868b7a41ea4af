use super::credentials::SessionCredential;
use super::http_client::{PROVIDER_USER_AGENT, build_client};
use super::scrub::{api_error, scrub_secret_patterns};
use super::traits::Provider;
use super::types::{
    ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason, TokenUsage,
};
use crate::error::GenerationError;
use crate::tools::ToolSpec;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai";

/// OpenAI-compatible `/chat/completions` client with function calling.
pub struct OpenAiProvider {
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value for this session.
    auth_header: Zeroizing<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiTool {
    r#type: &'static str,
    function: OpenAiToolDefinition,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiToolDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, credential: &SessionCredential, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: credential.bearer_header(),
            client: build_client(timeout_secs, PROVIDER_USER_AGENT),
        }
    }

    fn text_message(role: &'static str, content: String) -> Message {
        Message {
            role,
            content: Some(content),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    fn map_provider_message(provider_message: &ProviderMessage) -> Vec<Message> {
        let mut text_parts = Vec::new();
        let mut assistant_tool_calls = Vec::new();
        let mut tool_messages = Vec::new();

        for block in &provider_message.content {
            match block {
                ContentBlock::Text { text } => text_parts.push(text.clone()),
                ContentBlock::ToolUse { id, name, input } => {
                    assistant_tool_calls.push(OpenAiToolCall {
                        id: id.clone(),
                        r#type: "function".to_string(),
                        function: OpenAiToolCallFunction {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    });
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error: _,
                } => tool_messages.push(Message {
                    role: "tool",
                    content: Some(content.clone()),
                    tool_call_id: Some(tool_use_id.clone()),
                    tool_calls: None,
                }),
            }
        }

        let text_content = (!text_parts.is_empty()).then(|| text_parts.join("\n"));
        let mut messages = Vec::new();

        match provider_message.role {
            MessageRole::Assistant => {
                if text_content.is_some() || !assistant_tool_calls.is_empty() {
                    messages.push(Message {
                        role: "assistant",
                        content: text_content,
                        tool_call_id: None,
                        tool_calls: (!assistant_tool_calls.is_empty())
                            .then_some(assistant_tool_calls),
                    });
                }
            }
            MessageRole::User => {
                if let Some(content) = text_content {
                    messages.push(Self::text_message("user", content));
                }
            }
            MessageRole::System => {
                if let Some(content) = text_content {
                    messages.push(Self::text_message("system", content));
                }
            }
        }

        messages.extend(tool_messages);
        messages
    }

    fn build_request(
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> ChatRequest {
        let mut openai_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system_prompt {
            openai_messages.push(Self::text_message("system", sys.to_string()));
        }
        for message in messages {
            openai_messages.extend(Self::map_provider_message(message));
        }

        let tools = (!tools.is_empty()).then(|| {
            tools
                .iter()
                .map(|tool| OpenAiTool {
                    r#type: "function",
                    function: OpenAiToolDefinition {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect()
        });

        ChatRequest {
            model: model.to_string(),
            messages: openai_messages,
            temperature,
            tools,
        }
    }

    fn map_finish_reason(finish_reason: Option<&str>) -> StopReason {
        match finish_reason {
            Some("stop") => StopReason::EndTurn,
            Some("tool_calls") => StopReason::ToolUse,
            Some("length") => StopReason::MaxTokens,
            Some(_) | None => StopReason::Error,
        }
    }

    fn parse_tool_calls(tool_calls: Vec<OpenAiToolCall>) -> anyhow::Result<Vec<ContentBlock>> {
        tool_calls
            .into_iter()
            .map(|tool_call| {
                let input: Value = serde_json::from_str(&tool_call.function.arguments)
                    .with_context(|| {
                        format!(
                            "OpenAI tool call arguments were not valid JSON for {}",
                            tool_call.function.name
                        )
                    })?;
                Ok(ContentBlock::ToolUse {
                    id: tool_call.id,
                    name: tool_call.function.name,
                    input,
                })
            })
            .collect()
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", self.auth_header.as_str())
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Request {
                provider: PROVIDER_NAME.to_string(),
                message: scrub_secret_patterns(&e.to_string()).into_owned(),
            })?;

        if !response.status().is_success() {
            return Err(api_error(PROVIDER_NAME, response).await.into());
        }

        response
            .json()
            .await
            .context("OpenAI response JSON decode failed")
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<ProviderResponse> {
        let request = Self::build_request(system_prompt, messages, tools, model, temperature);
        let chat_response = self.call_api(&request).await?;

        let Some(choice) = chat_response.choices.into_iter().next() else {
            return Err(GenerationError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            }
            .into());
        };

        let text = choice.message.content.unwrap_or_default();
        let mut content_blocks =
            Self::parse_tool_calls(choice.message.tool_calls.unwrap_or_default())?;
        if text.trim().is_empty() && content_blocks.is_empty() {
            return Err(GenerationError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            }
            .into());
        }
        if !text.is_empty() {
            content_blocks.insert(0, ContentBlock::Text { text: text.clone() });
        }

        Ok(ProviderResponse {
            text,
            content_blocks,
            stop_reason: Some(Self::map_finish_reason(choice.finish_reason.as_deref())),
            usage: chat_response.usage.map(|usage| TokenUsage {
                prompt: usage.prompt_tokens,
                completion: usage.completion_tokens,
            }),
            model: chat_response.model,
        })
    }
}
