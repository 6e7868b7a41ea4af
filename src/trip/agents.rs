use crate::crew::{Agent, AgentProfile, LlmBinding};
use crate::tools::{SearchProvider, ToolRegistry, WebSearchTool};
use std::sync::Arc;

pub const TRAVEL_TRIP_EXPERT: &str = "Travel Trip Expert";
pub const CITY_LOCAL_GUIDE_EXPERT: &str = "City Local Guide Expert";
pub const TRAVEL_PLANNING_EXPERT: &str = "Travel Planning Expert";

pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

pub fn travel_trip_expert(max_iterations: u32) -> AgentProfile {
    AgentProfile {
        role: TRAVEL_TRIP_EXPERT.into(),
        goal_template: "Gathers helpful information about {destination} and travel details."
            .into(),
        backstory: "A seasoned traveler who knows logistics and attractions.".into(),
        max_iterations,
    }
}

pub fn city_local_guide_expert(max_iterations: u32) -> AgentProfile {
    AgentProfile {
        role: CITY_LOCAL_GUIDE_EXPERT.into(),
        goal_template:
            "Provides information on things to do in the city based on user's interests.".into(),
        backstory: "A local expert passionate about sharing hidden gems.".into(),
        max_iterations,
    }
}

pub fn travel_planning_expert(max_iterations: u32) -> AgentProfile {
    AgentProfile {
        role: TRAVEL_PLANNING_EXPERT.into(),
        goal_template: "Compiles all gathered information into a detailed travel plan.".into(),
        backstory: "An organizational wizard who creates seamless itineraries.".into(),
        max_iterations,
    }
}

/// The three agents of one travel run.
#[derive(Debug, Clone)]
pub struct TravelAgents {
    pub location: Arc<Agent>,
    pub guide: Arc<Agent>,
    pub planner: Arc<Agent>,
}

/// Builds fresh agents for each run from a model binding and an optional
/// search backend.
#[derive(Clone)]
pub struct AgentFactory {
    llm: LlmBinding,
    search: Option<(Arc<dyn SearchProvider>, usize)>,
    max_iterations: u32,
}

impl AgentFactory {
    pub fn new(llm: LlmBinding, max_iterations: u32) -> Self {
        Self {
            llm,
            search: None,
            max_iterations,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>, result_count: usize) -> Self {
        self.search = Some((search, result_count));
        self
    }

    fn tools(&self) -> ToolRegistry {
        match &self.search {
            Some((search, result_count)) => ToolRegistry::new().with(Arc::new(
                WebSearchTool::new(Arc::clone(search), *result_count),
            )),
            None => ToolRegistry::new(),
        }
    }

    pub fn build(&self, destination: &str) -> TravelAgents {
        let make = |profile: AgentProfile| {
            Arc::new(Agent::new(&profile, destination, self.llm.clone(), self.tools()))
        };
        TravelAgents {
            location: make(travel_trip_expert(self.max_iterations)),
            guide: make(city_local_guide_expert(self.max_iterations)),
            planner: make(travel_planning_expert(self.max_iterations)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::testing::ScriptedProvider;

    fn factory() -> AgentFactory {
        AgentFactory::new(
            LlmBinding {
                provider: Arc::new(ScriptedProvider::new()),
                model: "gpt-3.5-turbo".into(),
                temperature: 0.7,
            },
            DEFAULT_MAX_ITERATIONS,
        )
    }

    #[test]
    fn destination_is_substituted_into_location_goal() {
        let agents = factory().build("Rome");
        assert_eq!(
            agents.location.goal,
            "Gathers helpful information about Rome and travel details."
        );
        assert_eq!(agents.guide.role, CITY_LOCAL_GUIDE_EXPERT);
        assert_eq!(agents.planner.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn agents_carry_search_only_when_configured() {
        assert!(factory().build("Rome").location.tool_names().is_empty());

        struct NoSearch;
        #[async_trait::async_trait]
        impl SearchProvider for NoSearch {
            fn name(&self) -> &str {
                "none"
            }
            async fn search(
                &self,
                _query: &str,
                _result_count: usize,
            ) -> Result<Vec<String>, crate::error::SearchError> {
                Ok(Vec::new())
            }
        }

        let agents = factory().with_search(Arc::new(NoSearch), 5).build("Rome");
        for agent in [&agents.location, &agents.guide, &agents.planner] {
            assert_eq!(agent.tool_names(), vec!["web_search"]);
        }
    }
}
