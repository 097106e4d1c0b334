//! Duration resolution.
//!
//! Turns a task's three-point estimate into a whole number of work-days,
//! either deterministically (the suggested value) or by sampling a
//! triangular distribution from an explicitly seeded generator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ForecastError, ForecastResult};
use crate::models::{Task, TaskEstimates};

/// Longest duration, in work-days, a single task may resolve to.
pub const MAX_TASK_DAYS: u32 = 10_000;

/// How task durations are derived from estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMode {
    /// Use `suggested`.
    #[default]
    Deterministic,
    /// Draw from `triangular(minimum, suggested, maximum)`.
    Sampled {
        /// Seed of the per-call generator.
        seed: u64,
    },
}

/// Draws from the triangular distribution on `[min, max]` with mode `mode`.
///
/// Uses inverse transform sampling. A degenerate range returns `min`.
///
/// # Reference
/// Kotz & van Dorp (2004), "Beyond Beta", Ch. 1
pub fn triangular<R: Rng + ?Sized>(rng: &mut R, min: f64, mode: f64, max: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        return min;
    }
    let u: f64 = rng.random();
    let split = (mode - min) / range;
    if u < split {
        min + (u * range * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * range * (max - mode)).sqrt()
    }
}

/// Resolves and caches the duration of each task for one scheduling call.
///
/// A task's duration is drawn at most once per call, so every pass of the
/// retry loop sees the same value.
pub(crate) struct DurationResolver {
    rng: Option<SmallRng>,
    resolved: HashMap<usize, u32>,
}

impl DurationResolver {
    pub(crate) fn new(mode: EstimateMode) -> Self {
        let rng = match mode {
            EstimateMode::Deterministic => None,
            EstimateMode::Sampled { seed } => Some(SmallRng::seed_from_u64(seed)),
        };
        Self {
            rng,
            resolved: HashMap::new(),
        }
    }

    /// Work-days needed by `tasks[index]`.
    pub(crate) fn days(&mut self, index: usize, task: &Task) -> ForecastResult<u32> {
        if let Some(&days) = self.resolved.get(&index) {
            return Ok(days);
        }
        let TaskEstimates {
            minimum,
            suggested,
            maximum,
        } = task.estimates;
        let value = match self.rng.as_mut() {
            Some(rng) => triangular(rng, minimum, suggested, maximum),
            None => suggested,
        };
        if !(value.is_finite() && value > 0.0) {
            return Err(ForecastError::InvalidEstimate {
                task_id: task.id.clone(),
                reason: format!("resolved duration {value} is not positive"),
            });
        }
        if value > f64::from(MAX_TASK_DAYS) {
            return Err(ForecastError::InvalidEstimate {
                task_id: task.id.clone(),
                reason: format!("resolved duration {value} exceeds {MAX_TASK_DAYS} work-days"),
            });
        }
        let days = value.ceil() as u32;
        self.resolved.insert(index, days);
        Ok(days)
    }
}
