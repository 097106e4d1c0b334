//! Calendar-aware task scheduling.
//!
//! Converts an unordered, fully assigned task set into per-worker,
//! per-day schedules.
//!
//! # Algorithm
//!
//! `TaskScheduler` resolves dependency generations, then greedily places
//! each assignee's tasks on that assignee's work calendar in sequencing
//! order, gated by milestone start dates. Tasks that cannot start yet are
//! retried after advancing the calendar by one work-date, up to a bounded
//! number of advances.
//!
//! # Estimates
//!
//! `EstimateMode::Deterministic` uses each task's suggested estimate;
//! `EstimateMode::Sampled` draws from a triangular distribution with an
//! explicitly seeded generator (see [`triangular`]).
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Kotz & van Dorp (2004), "Beyond Beta"

mod config;
mod engine;
mod sampling;

pub use config::{SchedulerConfig, DEFAULT_MAX_RETRY_PASSES};
pub use engine::TaskScheduler;
pub use sampling::{triangular, EstimateMode, MAX_TASK_DAYS};
