//! Scheduler configuration.
//!
//! Plain data passed in by the caller: where to start, which days are
//! holidays, who works which weekdays, and how the engine orders and
//! bounds its work. Loadable from JSON via [`SchedulerConfig::from_json`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dispatching::SequencingRule;
use crate::error::ForecastResult;
use crate::models::HolidayCalendar;

/// Default bound on calendar advances per assignee group.
pub const DEFAULT_MAX_RETRY_PASSES: usize = 5_000;

/// Configuration of a [`TaskScheduler`](super::TaskScheduler).
///
/// # Example
///
/// ```
/// use u_forecast::scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::from_json(r#"{
///     "start_date": "2017-09-10",
///     "holidays": {"dates": ["2017-09-15"]},
///     "assignee_workdays": {"user-a": ["Mon", "Tue"]}
/// }"#).unwrap();
/// assert_eq!(config.assignee_workdays["user-a"].len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// First candidate work-date. `None` = today (UTC).
    pub start_date: Option<NaiveDate>,
    /// Public holidays for every worker.
    pub holidays: HolidayCalendar,
    /// Weekday identifiers per worker. Missing = Monday–Friday.
    pub assignee_workdays: HashMap<String, Vec<String>>,
    /// Personal holidays per worker.
    pub assignee_personal_holidays: HashMap<String, Vec<NaiveDate>>,
    /// Ordering of each assignee's tasks within a generation.
    pub sequencing: SequencingRule,
    /// Calendar advances allowed per assignee group before failing.
    pub max_retry_passes: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            holidays: HolidayCalendar::default(),
            assignee_workdays: HashMap::new(),
            assignee_personal_holidays: HashMap::new(),
            sequencing: SequencingRule::default(),
            max_retry_passes: DEFAULT_MAX_RETRY_PASSES,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration; absent fields take defaults.
    pub fn from_json(json: &str) -> ForecastResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the start date.
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Sets the public holiday calendar.
    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    /// Sets a worker's weekdays.
    pub fn with_workdays<S: Into<String>>(
        mut self,
        worker: impl Into<String>,
        days: impl IntoIterator<Item = S>,
    ) -> Self {
        self.assignee_workdays
            .insert(worker.into(), days.into_iter().map(Into::into).collect());
        self
    }

    /// Sets a worker's personal holidays.
    pub fn with_personal_holidays(
        mut self,
        worker: impl Into<String>,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        self.assignee_personal_holidays
            .insert(worker.into(), dates.into_iter().collect());
        self
    }

    /// Sets the sequencing rule.
    pub fn with_sequencing(mut self, rule: SequencingRule) -> Self {
        self.sequencing = rule;
        self
    }

    /// Sets the retry bound.
    pub fn with_max_retry_passes(mut self, passes: usize) -> Self {
        self.max_retry_passes = passes;
        self
    }
}
