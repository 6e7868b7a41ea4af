use chrono::NaiveDate;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `Itinera`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how a run ended; internal plumbing continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ItineraError {
    // ── User input / credentials ────────────────────────────────────────
    #[error("input: {0}")]
    Input(#[from] InputError),

    // ── Language model ──────────────────────────────────────────────────
    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    // ── Web search ──────────────────────────────────────────────────────
    #[error("search: {0}")]
    Search(#[from] SearchError),

    // ── Task graph / runner ─────────────────────────────────────────────
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ItineraError {
    /// Short, user-facing label used by the web UI and CLI.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input error",
            Self::Generation(_) => "generation error",
            Self::Search(_) => "search error",
            Self::Pipeline(PipelineError::MissingPrerequisite { .. }) => {
                "internal ordering error"
            }
            Self::Pipeline(_) => "pipeline error",
            Self::Config(_) => "config error",
            Self::Other(_) => "error",
        }
    }
}

// ─── Input errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing API credential: set {var} (or add it to .env)")]
    MissingCredential { var: &'static str },

    #[error("session credential has been revoked; start a new session")]
    CredentialRevoked,

    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid {field} {value:?}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

// ─── Language-model errors ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },

    #[error("provider {provider} returned an empty response")]
    EmptyResponse { provider: String },

    #[error("agent {role} failed: {message}")]
    Agent { role: String, message: String },
}

// ─── Search errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search backend unreachable: {0}")]
    Unreachable(String),

    #[error("search backend blocked the request: {0}")]
    Blocked(String),

    #[error("search backend returned status {status}")]
    Status { status: u16 },
}

// ─── Pipeline errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task {task} started before prerequisite {prerequisite} produced a result")]
    MissingPrerequisite { task: String, prerequisite: String },

    #[error("invalid task graph: {0}")]
    InvalidGraph(String),

    #[error("task graph is empty")]
    EmptyGraph,

    #[error("failed to write artifact {artifact}: {message}")]
    Sink { artifact: String, message: String },

    #[error("run exceeded its deadline of {secs}s")]
    DeadlineExceeded { secs: u64 },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ItineraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_date_range_displays_both_dates() {
        let err = ItineraError::Input(InputError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        });
        let text = err.to_string();
        assert!(text.contains("2024-06-01"));
        assert!(text.contains("2024-06-05"));
        assert_eq!(err.kind(), "input error");
    }

    #[test]
    fn missing_prerequisite_is_an_ordering_error() {
        let err = ItineraError::Pipeline(PipelineError::MissingPrerequisite {
            task: "planner_task".into(),
            prerequisite: "guide_task".into(),
        });
        assert_eq!(err.kind(), "internal ordering error");
        assert!(err.to_string().contains("guide_task"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: ItineraError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }

    #[test]
    fn generation_auth_names_provider() {
        let err = ItineraError::Generation(GenerationError::Auth {
            provider: "openai".into(),
        });
        assert!(err.to_string().contains("openai"));
    }
}
