use super::Config;

impl Config {
    /// Apply `ITINERA_*` environment variables on top of the file config.
    /// Unparseable or empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("ITINERA_PROVIDER")
            && !provider.is_empty()
        {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("ITINERA_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(base_url) =
            std::env::var("ITINERA_LLM_BASE_URL").or_else(|_| std::env::var("OPENAI_BASE_URL"))
            && !base_url.is_empty()
        {
            self.llm.base_url = base_url;
        }

        if let Ok(temp_str) = std::env::var("ITINERA_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.llm.temperature = temp;
        }

        if let Ok(enabled) = std::env::var("ITINERA_SEARCH_ENABLED")
            && let Ok(enabled) = enabled.parse::<bool>()
        {
            self.search.enabled = enabled;
        }

        if let Ok(value) = std::env::var("ITINERA_MAX_CONCURRENCY")
            && let Ok(max) = value.parse::<usize>()
            && max > 0
        {
            self.pipeline.max_concurrency = max;
        }

        if let Ok(value) = std::env::var("ITINERA_DEADLINE_SECS")
            && let Ok(secs) = value.parse::<u64>()
        {
            self.pipeline.deadline_secs = secs;
        }

        if let Ok(dir) = std::env::var("ITINERA_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output.dir = dir;
        }

        if let Ok(port_str) =
            std::env::var("ITINERA_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("ITINERA_GATEWAY_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::{EnvVarGuard, lock_env};
    use super::*;

    #[test]
    fn env_overrides_replace_file_values() {
        let _lock = lock_env();
        let _model = EnvVarGuard::set("ITINERA_MODEL", "gpt-4o-mini");
        let _port = EnvVarGuard::set("ITINERA_GATEWAY_PORT", "9000");
        let _dir = EnvVarGuard::set("ITINERA_OUTPUT_DIR", "/srv/plans");
        let _search = EnvVarGuard::set("ITINERA_SEARCH_ENABLED", "false");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.output.dir, "/srv/plans");
        assert!(!config.search.enabled);
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let _lock = lock_env();
        let _temp = EnvVarGuard::set("ITINERA_TEMPERATURE", "9.5");
        let _conc = EnvVarGuard::set("ITINERA_MAX_CONCURRENCY", "0");
        let _port = EnvVarGuard::unset("ITINERA_GATEWAY_PORT");
        let _fallback_port = EnvVarGuard::set("PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert!((config.llm.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.pipeline.max_concurrency, 1);
        assert_eq!(config.gateway.port, 8501);
    }
}
