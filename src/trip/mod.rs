pub mod agents;
pub mod planner;
pub mod tasks;

pub use agents::{AgentFactory, TravelAgents};
pub use planner::TripPlanner;
pub use tasks::build_travel_tasks;

use crate::error::InputError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORIGIN: &str = "India";
pub const DEFAULT_DESTINATION: &str = "Rome";
pub const DEFAULT_INTERESTS: &str = "Sightseeing and good food";

/// One user submission: where from, where to, when, and what for.
///
/// Construct through [`TripRequest::new`] (or [`TripRequest::parse`] for raw
/// form/CLI input) so the date range is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interests: String,
}

impl TripRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interests: impl Into<String>,
    ) -> Result<Self, InputError> {
        let destination = destination.into().trim().to_string();
        if destination.is_empty() {
            return Err(InputError::EmptyField("destination"));
        }
        if end_date < start_date {
            return Err(InputError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            origin: origin.into().trim().to_string(),
            destination,
            start_date,
            end_date,
            interests: interests.into().trim().to_string(),
        })
    }

    /// Build from unparsed `YYYY-MM-DD` date strings.
    pub fn parse(
        origin: &str,
        destination: &str,
        start_date: &str,
        end_date: &str,
        interests: &str,
    ) -> Result<Self, InputError> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        Self::new(origin, destination, start, end, interests)
    }

    /// Inclusive day count; a same-day trip is one day.
    pub fn duration_days(&self) -> u32 {
        let span = (self.end_date - self.start_date).num_days();
        u32::try_from(span + 1).unwrap_or(1).max(1)
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| InputError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
