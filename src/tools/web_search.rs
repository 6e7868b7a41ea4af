use super::search::SearchProvider;
use super::traits::{ExecutionContext, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Exposes a [`SearchProvider`] to the model as the `web_search` tool.
///
/// Search failures never escape: they are logged and handed back to the model
/// as a failed tool result, so the agent carries on without search context.
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    result_count: usize,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>, result_count: usize) -> Self {
        Self {
            provider,
            result_count: result_count.max(1),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Fetches web search information based on a query."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ExecutionContext) -> anyhow::Result<ToolResult> {
        let Some(query) = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return Ok(ToolResult::failed("missing required argument: query"));
        };

        tracing::info!(
            task = %ctx.task_id,
            role = %ctx.role,
            backend = self.provider.name(),
            query,
            "web search"
        );

        match self.provider.search(query, self.result_count).await {
            Ok(snippets) if snippets.is_empty() => {
                Ok(ToolResult::ok(format!("No results found for: {query}")))
            }
            Ok(snippets) => Ok(ToolResult::ok(
                snippets
                    .iter()
                    .enumerate()
                    .map(|(i, snippet)| format!("{}. {snippet}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )),
            Err(error) => {
                tracing::warn!(
                    task = %ctx.task_id,
                    backend = self.provider.name(),
                    %error,
                    "web search failed; continuing without results"
                );
                Ok(ToolResult::failed(format!("web search unavailable: {error}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    struct FixedSearch(Vec<String>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str, count: usize) -> Result<Vec<String>, SearchError> {
            Ok(self.0.iter().take(count).cloned().collect())
        }
    }

    struct DownSearch;

    #[async_trait]
    impl SearchProvider for DownSearch {
        fn name(&self) -> &str {
            "down"
        }

        async fn search(&self, _query: &str, _count: usize) -> Result<Vec<String>, SearchError> {
            Err(SearchError::Unreachable("connection refused".into()))
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("guide_task", "City Local Guide Expert", 5)
    }

    #[tokio::test]
    async fn numbers_snippets() {
        let tool = WebSearchTool::new(
            Arc::new(FixedSearch(vec!["Colosseum".into(), "Pantheon".into()])),
            5,
        );
        let result = tool.execute(json!({"query": "rome"}), &ctx()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "1. Colosseum\n2. Pantheon");
    }

    #[tokio::test]
    async fn search_error_becomes_failed_result() {
        let tool = WebSearchTool::new(Arc::new(DownSearch), 5);
        let result = tool.execute(json!({"query": "rome"}), &ctx()).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let tool = WebSearchTool::new(Arc::new(DownSearch), 5);
        let result = tool.execute(json!({"q": "rome"}), &ctx()).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn empty_results_are_reported() {
        let tool = WebSearchTool::new(Arc::new(FixedSearch(Vec::new())), 5);
        let result = tool.execute(json!({"query": "atlantis"}), &ctx()).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("No results"));
    }
}
