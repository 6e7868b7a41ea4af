use super::credentials::SessionCredential;
use super::openai::OpenAiProvider;
use super::traits::Provider;
use crate::config::LlmConfig;
use crate::error::ConfigError;
use std::sync::Arc;

/// Build the language-model client for one session.
pub fn create_provider(
    config: &LlmConfig,
    credential: &SessionCredential,
) -> Result<Arc<dyn Provider>, ConfigError> {
    match config.provider.as_str() {
        "openai" | "openai-compatible" => Ok(Arc::new(OpenAiProvider::new(
            &config.base_url,
            credential,
            config.timeout_secs,
        ))),
        other => Err(ConfigError::Validation(format!(
            "unknown llm provider {other:?} (supported: openai, openai-compatible)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_is_supported() {
        let credential = SessionCredential::new("sk-test").unwrap();
        let provider = create_provider(&LlmConfig::default(), &credential).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let credential = SessionCredential::new("sk-test").unwrap();
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        let err = create_provider(&config, &credential).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
