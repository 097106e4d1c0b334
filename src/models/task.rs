//! Task model.
//!
//! A task is a unit of work owned by one assignee, belonging to one
//! milestone, with a three-point duration estimate and optional
//! prerequisite tasks.
//!
//! # Scheduling State
//! `scheduled_dates` is the only mutable part of a task. It is cleared at
//! the start of every `TaskScheduler::schedule` call and filled by the
//! engine; callers should treat it as read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// Three-point duration estimate, in work-days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskEstimates {
    /// Optimistic duration.
    pub minimum: f64,
    /// Most likely duration.
    pub suggested: f64,
    /// Pessimistic duration.
    pub maximum: f64,
}

impl TaskEstimates {
    /// Creates an estimate.
    pub fn new(minimum: f64, suggested: f64, maximum: f64) -> Self {
        Self {
            minimum,
            suggested,
            maximum,
        }
    }

    /// An estimate with no uncertainty.
    pub fn fixed(days: f64) -> Self {
        Self::new(days, days, days)
    }

    /// Checks `0 <= minimum <= suggested <= maximum` with finite values.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        let values = [self.minimum, self.suggested, self.maximum];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(format!("non-finite value in {self:?}"));
        }
        if self.minimum < 0.0 {
            return Err(format!("negative minimum {}", self.minimum));
        }
        if self.minimum > self.suggested || self.suggested > self.maximum {
            return Err(format!(
                "expected minimum <= suggested <= maximum, got ({}, {}, {})",
                self.minimum, self.suggested, self.maximum
            ));
        }
        Ok(())
    }
}

/// A task to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Scheduling priority (lower = scheduled earlier).
    pub absolute_priority: i32,
    /// Duration estimate.
    pub estimates: TaskEstimates,
    /// Worker the task is assigned to. `None` until assigned.
    pub assignee: Option<String>,
    /// Owning project.
    pub project_id: String,
    /// Milestone the task belongs to.
    pub milestone_id: String,
    /// Ids of tasks that must be scheduled before this one.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Work-dates assigned by the scheduler.
    #[serde(default)]
    pub scheduled_dates: Vec<NaiveDate>,
}

impl Task {
    /// Creates an unassigned task in `milestone_id` with a one-day estimate.
    pub fn new(id: impl Into<String>, milestone_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            absolute_priority: 0,
            estimates: TaskEstimates::fixed(1.0),
            assignee: None,
            project_id: String::new(),
            milestone_id: milestone_id.into(),
            depends_on: Vec::new(),
            scheduled_dates: Vec::new(),
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.absolute_priority = priority;
        self
    }

    /// Sets the estimate.
    pub fn with_estimates(mut self, estimates: TaskEstimates) -> Self {
        self.estimates = estimates;
        self
    }

    /// Sets the assignee.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the project.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Adds a prerequisite task.
    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.depends_on.push(task_id.into());
        self
    }

    /// First scheduled date.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.scheduled_dates.first().copied()
    }

    /// Last scheduled date.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.scheduled_dates.last().copied()
    }

    /// Whether the task has at least one scheduled date.
    pub fn is_scheduled(&self) -> bool {
        !self.scheduled_dates.is_empty()
    }

    /// Whether the task declares prerequisites.
    pub fn has_dependencies(&self) -> bool {
        !self.depends_on.is_empty()
    }

    /// Scheduled dates, or an error if the task has not been scheduled.
    pub fn scheduled_dates(&self) -> ForecastResult<&[NaiveDate]> {
        if self.scheduled_dates.is_empty() {
            return Err(ForecastError::TaskNotScheduled {
                task_id: self.id.clone(),
            });
        }
        Ok(&self.scheduled_dates)
    }

    /// Clears scheduling output.
    pub(crate) fn reset_schedule(&mut self) {
        self.scheduled_dates.clear();
    }
}
