use super::traits::{ExecutionContext, Tool, ToolResult, ToolSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The capability set of one agent.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Return sorted list of registered tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Specs for all registered tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|tool| tool.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute a tool, charging the context's call budget first.
    ///
    /// Unknown tools and an exhausted budget come back as failed results so
    /// the model can recover; only tool-internal errors propagate.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &ExecutionContext,
    ) -> anyhow::Result<ToolResult> {
        let Some(tool) = self.tools.get(name) else {
            return Ok(ToolResult::failed(format!("Tool not found: {name}")));
        };

        if !ctx.budget().try_acquire() {
            tracing::debug!(
                task = %ctx.task_id,
                tool = name,
                limit = ctx.budget().limit(),
                "tool call budget exhausted"
            );
            return Ok(ToolResult::failed(format!(
                "tool call budget exhausted ({} calls); answer with the information you have",
                ctx.budget().limit()
            )));
        }

        tool.execute(args, ctx).await
    }
}
