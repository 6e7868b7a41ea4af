use super::types::{ProviderMessage, ProviderResponse};
use crate::tools::ToolSpec;
use async_trait::async_trait;

/// Language-model capability.
///
/// Implementations report transport, authentication and empty-response
/// failures as a [`crate::error::GenerationError`] inside the returned
/// `anyhow::Error` so callers can `downcast` it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    /// One chat round-trip offering `tools` for function calling.
    async fn chat_with_tools(
        &self,
        system_prompt: Option<&str>,
        messages: &[ProviderMessage],
        tools: &[ToolSpec],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<ProviderResponse>;

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let messages = [ProviderMessage::user(message)];
        let response = self
            .chat_with_tools(system_prompt, &messages, &[], model, temperature)
            .await?;
        Ok(response.text)
    }
}
