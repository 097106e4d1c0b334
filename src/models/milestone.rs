//! Milestone model.
//!
//! A milestone groups tasks into a time window. Its start date gates when
//! member tasks may begin; its end date orders work but is not enforced
//! as a deadline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// A named time window grouping tasks.
///
/// Dates are optional so that records coming from external trackers can be
/// represented as-is; the scheduler rejects milestones missing either date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique milestone identifier.
    pub id: String,
    /// Earliest date member tasks may start.
    pub start_date: Option<NaiveDate>,
    /// Target completion date.
    pub end_date: Option<NaiveDate>,
}

impl Milestone {
    /// Creates a milestone with both dates.
    pub fn new(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// Returns `(start, end)` or `MilestoneMissingDate`.
    pub fn window(&self) -> ForecastResult<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ForecastError::MilestoneMissingDate {
                milestone_id: self.id.clone(),
            }),
        }
    }
}

/// A milestone whose dates have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MilestoneWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
