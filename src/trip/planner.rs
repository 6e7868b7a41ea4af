use super::TripRequest;
use super::agents::AgentFactory;
use super::tasks::build_travel_tasks;
use crate::config::{Config, SearchConfig};
use crate::crew::{LlmBinding, OutputSink, PipelineRunner, RunOutput};
use crate::error::Result;
use crate::llm::Provider;
use crate::tools::{DuckDuckGoSearch, SearchProvider};
use std::sync::Arc;

/// Turns a [`TripRequest`] into a finished itinerary.
pub struct TripPlanner {
    factory: AgentFactory,
    runner: PipelineRunner,
}

impl TripPlanner {
    pub fn new(factory: AgentFactory, runner: PipelineRunner) -> Self {
        Self { factory, runner }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn Provider>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        let llm = LlmBinding {
            provider,
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
        };
        let mut factory = AgentFactory::new(llm, config.pipeline.max_iterations);
        if let Some(search) = search_provider(&config.search) {
            factory = factory.with_search(search, config.search.result_count);
        }
        let runner = PipelineRunner::new(sink).with_options(config.pipeline.runner_options());
        Self::new(factory, runner)
    }

    pub async fn plan(&self, request: &TripRequest) -> Result<RunOutput> {
        tracing::info!(
            origin = %request.origin,
            destination = %request.destination,
            days = request.duration_days(),
            "planning trip"
        );
        let agents = self.factory.build(&request.destination);
        let graph = build_travel_tasks(request, &agents)?;
        self.runner.run(&graph).await
    }
}

pub fn search_provider(config: &SearchConfig) -> Option<Arc<dyn SearchProvider>> {
    config.enabled.then(|| {
        Arc::new(DuckDuckGoSearch::new(&config.base_url, config.timeout_secs))
            as Arc<dyn SearchProvider>
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::MemorySink;
    use crate::crew::testing::ScriptedProvider;
    use crate::trip::agents::{
        CITY_LOCAL_GUIDE_EXPERT, TRAVEL_PLANNING_EXPERT, TRAVEL_TRIP_EXPERT,
    };
    use crate::trip::tasks::ITINERARY_ARTIFACT;

    #[tokio::test]
    async fn plan_runs_all_three_agents_in_order() {
        let provider = Arc::new(ScriptedProvider::new());
        let sink = Arc::new(MemorySink::new());
        let mut config = Config::default();
        config.search.enabled = false;
        let planner = TripPlanner::from_config(&config, provider.clone(), sink.clone());
        let request =
            TripRequest::parse("India", "Rome", "2024-06-01", "2024-06-03", "food").unwrap();

        let output = planner.plan(&request).await.unwrap();

        assert_eq!(
            provider.roles_called(),
            vec![TRAVEL_TRIP_EXPERT, CITY_LOCAL_GUIDE_EXPERT, TRAVEL_PLANNING_EXPERT]
        );
        assert_eq!(output.final_result.agent_role, TRAVEL_PLANNING_EXPERT);
        assert_eq!(sink.get(ITINERARY_ARTIFACT), Some(output.final_result.text));
    }

    #[test]
    fn disabled_search_yields_no_provider() {
        let config = SearchConfig {
            enabled: false,
            ..SearchConfig::default()
        };
        assert!(search_provider(&config).is_none());
        assert!(search_provider(&SearchConfig::default()).is_some());
    }
}
