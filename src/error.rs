//! Error types for forecasting.
//!
//! Every fatal condition of the crate is a variant of [`ForecastError`].
//! Errors abort the current `schedule()` or Monte Carlo call; no partial
//! schedule is ever returned alongside an error.

use chrono::NaiveDate;

/// Result alias used across the crate.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// All fatal forecasting errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    // -- configuration -------------------------------------------------
    /// A milestone lacks its start or end date.
    #[error("milestone '{milestone_id}' must have both start_date and end_date defined")]
    MilestoneMissingDate { milestone_id: String },

    /// A workday identifier is not a recognised weekday name.
    #[error("invalid workday '{value}' for '{worker}', expected one of Sun, Mon, Tue, Wed, Thu, Fri, Sat")]
    InvalidWorkday { worker: String, value: String },

    /// An annual holiday rule names a month/day that never exists.
    #[error("invalid annual holiday '{name}': month {month}, day {day}")]
    InvalidHoliday { name: String, month: u32, day: u32 },

    /// Configuration could not be parsed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    // -- validation ----------------------------------------------------
    /// `schedule()` was called without tasks.
    #[error("no tasks given to schedule")]
    EmptyTaskSet,

    /// Two tasks share an id.
    #[error("duplicate task id '{task_id}'")]
    DuplicateTask { task_id: String },

    /// A task references a milestone the scheduler does not know.
    #[error("task '{task_id}' references undefined milestone '{milestone_id}'")]
    MissingMilestone { task_id: String, milestone_id: String },

    /// A task has no assignee.
    #[error("task '{task_id}' has no assignee; run a phantom assignment first")]
    TaskNotAssigned { task_id: String },

    /// A task depends on a task id that is not part of the task set.
    #[error("task '{task_id}' depends on unknown task '{dependency}'")]
    UnknownDependency { task_id: String, dependency: String },

    // -- scheduling ----------------------------------------------------
    /// The estimate of a task cannot drive scheduling.
    #[error("task '{task_id}' has an invalid estimate: {reason}")]
    InvalidEstimate { task_id: String, reason: String },

    /// The dependency relation contains a cycle.
    #[error("dependency cycle detected among tasks: {}", tasks.join(", "))]
    DependencyCycle { tasks: Vec<String> },

    /// The retry loop of one assignee group hit its iteration cap.
    #[error("schedule for '{assignee}' did not converge after {passes} calendar advances")]
    NonConvergent { assignee: String, passes: usize },

    /// A worker calendar ran past the last representable date.
    #[error("work calendar for '{worker}' exhausted after {last}")]
    CalendarExhausted { worker: String, last: NaiveDate },

    /// Tasks left unscheduled after all generations were processed.
    #[error("tasks left unscheduled: {}", task_ids.join(", "))]
    IncompleteSchedule { task_ids: Vec<String> },

    /// Scheduled dates were requested from a task that has none.
    #[error("task '{task_id}' is not scheduled")]
    TaskNotScheduled { task_id: String },

    // -- monte carlo ---------------------------------------------------
    /// Trial count must be positive.
    #[error("trial count must be positive, got {trials}")]
    InvalidTrials { trials: usize },

    /// Percentile must lie within [0, 100].
    #[error("percentile must be within 0..=100, got {percentile}")]
    InvalidPercentile { percentile: f64 },

    // -- assignment ----------------------------------------------------
    /// The phantom assignment distribution is unusable.
    #[error("invalid assignee distribution: {reason}")]
    InvalidDistribution { reason: String },
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::Config {
            reason: e.to_string(),
        }
    }
}
