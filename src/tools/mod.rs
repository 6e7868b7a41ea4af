pub mod registry;
pub mod search;
pub mod traits;
pub mod web_search;

pub use registry::ToolRegistry;
pub use search::{DuckDuckGoSearch, SearchProvider};
pub use traits::{CallBudget, ExecutionContext, Tool, ToolResult, ToolSpec};
pub use web_search::WebSearchTool;
