//! Study plan builder - lays selected topics out over calendar days.

use chrono::{Days, NaiveDate};
use learning_records::StudyPlanEntry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;

const DAYS_PER_WEEK: u32 = 7;

/// How topics map onto calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanLayout {
    /// One topic per consecutive day from the start date. The days-available
    /// value only batches placement and never skips a date.
    #[default]
    Sequential,
    /// Use the first `days_available` days of each week starting at the start
    /// date, then continue at the start of the next week.
    WeeklyReset,
}

/// A validated request for a study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start: NaiveDate,
    pub hours_per_day: u32,
    pub days_available: u32,
    pub topics: Vec<String>,
}

impl PlanRequest {
    /// Build a request. Hours and days must be positive and at least one
    /// non-blank topic is required.
    pub fn new<I, S>(
        start: NaiveDate,
        hours_per_day: u32,
        days_available: u32,
        topics: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if hours_per_day == 0 {
            return Err(ValidationError::InvalidHours(hours_per_day.to_string()));
        }
        if days_available == 0 {
            return Err(ValidationError::InvalidDays(days_available.to_string()));
        }
        let topics: Vec<String> = topics
            .into_iter()
            .map(Into::into)
            .map(|t: String| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if topics.is_empty() {
            return Err(ValidationError::NoTopics);
        }

        Ok(Self {
            start,
            hours_per_day,
            days_available,
            topics,
        })
    }

    /// Build a request from raw form input.
    pub fn parse<I, S>(start: &str, hours: &str, days: &str, topics: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let start_date = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(start.to_string()))?;
        let hours_per_day = hours
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidHours(hours.to_string()))?;
        let days_available = days
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDays(days.to_string()))?;
        Self::new(start_date, hours_per_day, days_available, topics)
    }
}

/// Produces study plans in a fixed layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudyPlanBuilder {
    layout: PlanLayout,
}

impl StudyPlanBuilder {
    pub fn new(layout: PlanLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> PlanLayout {
        self.layout
    }

    /// Lay out every topic of the request, one per day, in request order.
    ///
    /// Requests built field by field are checked again here.
    pub fn build(&self, request: &PlanRequest) -> Result<Vec<StudyPlanEntry>, ValidationError> {
        if request.hours_per_day == 0 {
            return Err(ValidationError::InvalidHours(request.hours_per_day.to_string()));
        }
        if request.days_available == 0 {
            return Err(ValidationError::InvalidDays(request.days_available.to_string()));
        }
        if request.topics.is_empty() {
            return Err(ValidationError::NoTopics);
        }
        if self.layout == PlanLayout::WeeklyReset && request.days_available > DAYS_PER_WEEK {
            return Err(ValidationError::DaysExceedWeek(request.days_available));
        }

        let mut plan = Vec::with_capacity(request.topics.len());
        let mut topics = request.topics.iter();
        let mut week_start = request.start;
        let mut date = request.start;

        'weeks: loop {
            for _ in 0..request.days_available {
                let Some(topic) = topics.next() else {
                    break 'weeks;
                };
                plan.push(StudyPlanEntry {
                    date,
                    topic: topic.clone(),
                    hours: request.hours_per_day,
                });
                if topics.as_slice().is_empty() {
                    break 'weeks;
                }
                date = next_date(date, 1)?;
            }

            if self.layout == PlanLayout::WeeklyReset {
                week_start = next_date(week_start, u64::from(DAYS_PER_WEEK))?;
                date = week_start;
            }
        }

        debug!(layout = ?self.layout, entries = plan.len(), "Built study plan");
        Ok(plan)
    }
}

fn next_date(date: NaiveDate, days: u64) -> Result<NaiveDate, ValidationError> {
    date.checked_add_days(Days::new(days))
        .ok_or(ValidationError::DateOutOfRange)
}
