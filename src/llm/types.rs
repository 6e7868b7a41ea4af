//! Provider-neutral chat messages.
//!
//! Agents build conversations from these types; each provider client maps
//! them to and from its own wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// A tool call requested by the model.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The answer to a `ToolUse` with the same id.
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
}

impl TokenUsage {
    pub fn total(self) -> u64 {
        self.prompt.saturating_add(self.completion)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Concatenated text of the reply; empty for a pure tool-call turn.
    pub text: String,
    pub content_blocks: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
    pub usage: Option<TokenUsage>,
    /// Model name the API reports, which may differ from the requested one.
    pub model: Option<String>,
}

impl ProviderResponse {
    pub fn text_only(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    /// A reply that only requests tool calls, as `(id, name, input)` triples.
    pub fn tool_calls(calls: Vec<(String, String, serde_json::Value)>) -> Self {
        Self {
            content_blocks: calls
                .into_iter()
                .map(|(id, name, input)| ContentBlock::ToolUse { id, name, input })
                .collect(),
            stop_reason: Some(StopReason::ToolUse),
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.usage.map(TokenUsage::total)
    }

    pub fn tool_use_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content_blocks
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }

    pub fn has_tool_use(&self) -> bool {
        self.tool_use_blocks().next().is_some()
    }

    /// The reply as it goes back into the conversation history.
    pub fn to_assistant_message(&self) -> ProviderMessage {
        let content = if self.content_blocks.is_empty() {
            vec![ContentBlock::Text {
                text: self.text.clone(),
            }]
        } else {
            self.content_blocks.clone()
        };
        ProviderMessage {
            role: MessageRole::Assistant,
            content,
        }
    }
}

impl ProviderMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error,
            }],
        }
    }

    /// Text blocks joined with newlines; tool blocks are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolUse { .. } | ContentBlock::ToolResult { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
