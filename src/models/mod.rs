//! Forecasting domain models.
//!
//! Provides the data types for describing planned work and its outcome:
//! worker calendars, tasks with three-point estimates, milestones and the
//! resulting schedule.
//!
//! # Domain Mappings
//!
//! | u-forecast | Issue tracker | Capacity planning |
//! |------------|---------------|-------------------|
//! | Task | Issue | Work item |
//! | Milestone | Milestone / Sprint | Release window |
//! | Assignee | Assignee | Worker / phantom worker |
//! | Schedule | Board forecast | Staffing plan |

mod calendar;
mod milestone;
mod schedule;
mod task;

pub use calendar::{AnnualHoliday, HolidayCalendar, WorkDateIter, WorkWeek};
pub(crate) use milestone::MilestoneWindow;
pub use milestone::Milestone;
pub use schedule::Schedule;
pub use task::{Task, TaskEstimates};
