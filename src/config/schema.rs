use crate::crew::RunnerOptions;
use crate::error::ConfigError;
use crate::llm::openai::DEFAULT_OPENAI_BASE_URL;
use crate::tools::search::{DEFAULT_DUCKDUCKGO_URL, DEFAULT_RESULT_COUNT};
use crate::trip::agents::DEFAULT_MAX_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be within 0.0..=2.0 (got {})",
                self.llm.temperature
            )));
        }
        if url::Url::parse(&self.llm.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "llm.base_url is not a valid URL: {}",
                self.llm.base_url
            )));
        }
        if self.search.enabled && url::Url::parse(&self.search.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "search.base_url is not a valid URL: {}",
                self.search.base_url
            )));
        }
        if self.search.result_count == 0 {
            return Err(ConfigError::Validation(
                "search.result_count must be at least 1".into(),
            ));
        }
        if self.pipeline.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "pipeline.max_iterations must be at least 1".into(),
            ));
        }
        if self.pipeline.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "pipeline.max_concurrency must be at least 1".into(),
            ));
        }
        if self.gateway.session_ttl_secs == 0 || self.gateway.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "gateway.session_ttl_secs and gateway.max_sessions must be at least 1".into(),
            ));
        }
        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::Validation("output.dir must not be empty".into()));
        }
        Ok(())
    }
}

// ── Language model ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" (default) or "openai-compatible"
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> String {
    "openai".into()
}

fn default_llm_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.into()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_llm_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

// ── Web search ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Give agents the web search tool (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_result_count")]
    pub result_count: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_search_base_url() -> String {
    DEFAULT_DUCKDUCKGO_URL.into()
}

fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}

fn default_search_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_search_base_url(),
            result_count: default_result_count(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

// ── Pipeline ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tool-loop turns (and search calls) per agent invocation
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Independent tasks allowed in flight at once (1 = sequential)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Whole-run deadline in seconds; 0 disables it
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_concurrency() -> usize {
    1
}

fn default_deadline_secs() -> u64 {
    crate::crew::runner::DEFAULT_DEADLINE_SECS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_concurrency: default_max_concurrency(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            max_concurrency: self.max_concurrency.max(1),
            deadline: (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs)),
        }
    }
}

// ── Output ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for markdown artifacts; a leading `~` is expanded
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "~/.itinera/output".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl OutputConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).as_ref())
    }
}

// ── Gateway (web UI) ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8501)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Sessions idle longer than this are dropped with their credential
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Upper bound on live sessions; the least recently used go first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_gateway_port() -> u16 {
    8501
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_body_limit() -> usize {
    16 * 1024
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            body_limit_bytes: default_body_limit(),
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}
