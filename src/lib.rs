//! Completion forecasting for the U-Engine ecosystem.
//!
//! Predicts when interdependent tasks, assigned to individual workers, and
//! the milestones grouping them will complete. Accounts for dependency
//! order, per-worker work calendars, task priority and estimate
//! uncertainty. Produces either one deterministic schedule or, by Monte
//! Carlo simulation, a distribution of milestone completion dates.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `TaskEstimates`, `Milestone`,
//!   `Schedule`, `WorkDateIter`, `HolidayCalendar`, `WorkWeek`
//! - **`dependency`**: Layered topological sort of tasks into generations
//! - **`dispatching`**: Sequencing rules for an assignee's work queue
//! - **`validation`**: Input integrity checks (duplicate IDs, milestones, assignees)
//! - **`scheduler`**: The calendar-aware scheduling engine and its configuration
//! - **`montecarlo`**: Repeated sampled scheduling and percentile aggregation
//! - **`assignment`**: Phantom workers for capacity what-if analysis
//! - **`error`**: `ForecastError`
//!
//! # Architecture
//!
//! The crate performs no I/O. Callers (tracker adapters, CLIs) build tasks
//! and milestones, pass configuration as plain data, and present results.
//! Diagnostics are emitted through `tracing`; installing a subscriber is
//! left to the caller.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kotz & van Dorp (2004), "Beyond Beta: Other Continuous Families of
//!   Distributions with Bounded Support"

pub mod assignment;
pub mod dependency;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod montecarlo;
pub mod scheduler;
mod validation;

pub use error::{ForecastError, ForecastResult};
