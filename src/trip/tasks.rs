use super::TripRequest;
use super::agents::TravelAgents;
use crate::crew::{Task, TaskGraph};
use crate::error::PipelineError;

pub const LOCATION_TASK: &str = "location_task";
pub const GUIDE_TASK: &str = "guide_task";
pub const PLANNER_TASK: &str = "planner_task";

pub const LOCATION_ARTIFACT: &str = "location-report";
pub const GUIDE_ARTIFACT: &str = "guide-report";
pub const ITINERARY_ARTIFACT: &str = "final-itinerary";

/// The three travel tasks for one request. The planner consumes the
/// location and guide reports, in that order.
pub fn build_travel_tasks(
    request: &TripRequest,
    agents: &TravelAgents,
) -> Result<TaskGraph, PipelineError> {
    let destination = &request.destination;

    let location = Task::new(
        LOCATION_TASK,
        format!(
            "Collect comprehensive data on accommodations, cost of living, travel advisories, \
             weather conditions, and local events in {destination}."
        ),
        "Detailed markdown report with travel logistics.",
        agents.location.clone(),
        LOCATION_ARTIFACT,
    );

    let guide = Task::new(
        GUIDE_TASK,
        format!(
            "Generate a personalized city guide for {destination} covering attractions, \
             restaurants, entertainment, and cultural spots based on {}.",
            request.interests
        ),
        "Markdown itinerary with places of interest.",
        agents.guide.clone(),
        GUIDE_ARTIFACT,
    );

    let planner = Task::new(
        PLANNER_TASK,
        format!(
            "Compile all collected data into a structured travel plan for {destination} \
             spanning {} days.",
            request.duration_days()
        ),
        "Detailed markdown itinerary with daily schedules.",
        agents.planner.clone(),
        ITINERARY_ARTIFACT,
    )
    .with_prerequisites(&[&location, &guide]);

    TaskGraph::new(vec![location, guide, planner])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{LlmBinding, TaskId};
    use crate::crew::testing::ScriptedProvider;
    use crate::trip::agents::AgentFactory;
    use std::sync::Arc;

    fn agents() -> TravelAgents {
        AgentFactory::new(
            LlmBinding {
                provider: Arc::new(ScriptedProvider::new()),
                model: "test".into(),
                temperature: 0.0,
            },
            5,
        )
        .build("Rome")
    }

    fn rome() -> TripRequest {
        TripRequest::parse("India", "Rome", "2024-06-01", "2024-06-03", "food").unwrap()
    }

    #[test]
    fn builds_three_tasks_in_declared_order() {
        let graph = build_travel_tasks(&rome(), &agents()).unwrap();
        let order: Vec<&str> = graph
            .execution_order()
            .into_iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(order, vec![LOCATION_TASK, GUIDE_TASK, PLANNER_TASK]);
    }

    #[test]
    fn planner_depends_on_location_then_guide() {
        let graph = build_travel_tasks(&rome(), &agents()).unwrap();
        let planner = graph.get(&TaskId::new(PLANNER_TASK)).unwrap();
        assert_eq!(
            planner.prerequisites,
            vec![TaskId::new(LOCATION_TASK), TaskId::new(GUIDE_TASK)]
        );
        assert!(planner.description.contains("spanning 3 days"));
        assert_eq!(planner.output_sink, ITINERARY_ARTIFACT);
    }

    #[test]
    fn descriptions_carry_request_fields() {
        let graph = build_travel_tasks(&rome(), &agents()).unwrap();
        let guide = graph.get(&TaskId::new(GUIDE_TASK)).unwrap();
        assert!(guide.description.contains("city guide for Rome"));
        assert!(guide.description.contains("based on food."));

        let location = graph.get(&TaskId::new(LOCATION_TASK)).unwrap();
        assert!(location.prerequisites.is_empty());
        assert!(location.description.ends_with("local events in Rome."));
    }
}
