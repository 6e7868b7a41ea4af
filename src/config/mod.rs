mod env_overrides;
pub mod loader;
pub mod schema;
#[cfg(test)]
mod test_env;

pub use loader::{itinera_dir, require_credential};
pub use schema::{Config, GatewayConfig, LlmConfig, OutputConfig, PipelineConfig, SearchConfig};
