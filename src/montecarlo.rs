//! Monte Carlo completion forecasting.
//!
//! Repeats scheduling with sampled durations and aggregates, per
//! milestone, the distribution of completion dates and the completion date
//! at a requested percentile.
//!
//! # Concurrency
//! Trials are independent: each clones the task set and schedules it with
//! its own seeded generator (`base_seed + trial`). Trials run on rayon's
//! global pool; their per-milestone completion dates are collected and
//! folded into one [`MonteCarloOutcome`] on the calling thread. Results
//! therefore do not depend on thread interleaving.
//!
//! # Percentiles
//! Completion dates are converted to day ordinals (days since 0001-01-01,
//! counted from 1), the percentile is taken with linear interpolation
//! between closest ranks, truncated to a whole day and converted back.

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use tracing::info;

use crate::error::{ForecastError, ForecastResult};
use crate::models::Task;
use crate::scheduler::{EstimateMode, TaskScheduler};

/// Base seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x5eed_f0ca_57;

/// Monte Carlo driver over a configured scheduler.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_forecast::models::{Milestone, Task, TaskEstimates};
/// use u_forecast::montecarlo::MonteCarlo;
/// use u_forecast::scheduler::{SchedulerConfig, TaskScheduler};
///
/// let d = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();
/// let scheduler = TaskScheduler::new(
///     vec![Milestone::new("m1", d(6, 1), d(7, 31))],
///     SchedulerConfig::new().with_start_date(d(6, 3)),
/// ).unwrap();
/// let tasks = vec![
///     Task::new("T1", "m1")
///         .with_assignee("dev")
///         .with_estimates(TaskEstimates::new(2.0, 4.0, 10.0)),
/// ];
///
/// let outcome = MonteCarlo::new(&scheduler).with_seed(7).run(&tasks, 200, 90.0).unwrap();
/// assert!(outcome.percentile_dates["m1"] >= d(6, 4));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MonteCarlo<'a> {
    scheduler: &'a TaskScheduler,
    seed: u64,
}

impl<'a> MonteCarlo<'a> {
    /// Creates a driver using [`DEFAULT_SEED`].
    pub fn new(scheduler: &'a TaskScheduler) -> Self {
        Self {
            scheduler,
            seed: DEFAULT_SEED,
        }
    }

    /// Sets the base seed; trial `i` uses `seed + i`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Runs `trials` sampled schedules of `tasks`.
    ///
    /// `tasks` is never mutated; each trial works on its own copy.
    ///
    /// # Errors
    /// - `InvalidTrials` if `trials == 0`
    /// - `InvalidPercentile` if `percentile` is outside `[0, 100]`
    /// - any error of [`TaskScheduler::schedule`]; the first failing trial
    ///   aborts the run
    pub fn run(
        &self,
        tasks: &[Task],
        trials: usize,
        percentile: f64,
    ) -> ForecastResult<MonteCarloOutcome> {
        if trials == 0 {
            return Err(ForecastError::InvalidTrials { trials });
        }
        check_percentile(percentile)?;

        let completions = (0..trials)
            .into_par_iter()
            .map(|trial| self.trial(tasks, trial))
            .collect::<ForecastResult<Vec<_>>>()?;

        let outcome = MonteCarloOutcome::aggregate(completions, percentile);
        info!(
            trials,
            percentile,
            milestones = outcome.percentile_dates.len(),
            "monte carlo complete"
        );
        Ok(outcome)
    }

    fn trial(&self, tasks: &[Task], trial: usize) -> ForecastResult<BTreeMap<String, NaiveDate>> {
        let mut trial_tasks = tasks.to_vec();
        let seed = self.seed.wrapping_add(trial as u64);
        let schedule = self
            .scheduler
            .schedule(&mut trial_tasks, EstimateMode::Sampled { seed })?;
        Ok(schedule.milestone_completion_dates())
    }
}

/// Aggregated result of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloOutcome {
    /// Number of trials run.
    pub trials: usize,
    /// Percentile used for `percentile_dates`.
    pub percentile: f64,
    /// milestone → completion date → number of trials.
    pub distribution: BTreeMap<String, BTreeMap<NaiveDate, usize>>,
    /// milestone → completion date at `percentile`.
    pub percentile_dates: BTreeMap<String, NaiveDate>,
    /// milestone → sorted completion ordinals, one per trial.
    #[serde(skip)]
    ordinals: BTreeMap<String, Vec<i32>>,
}

impl MonteCarloOutcome {
    fn aggregate(completions: Vec<BTreeMap<String, NaiveDate>>, percentile: f64) -> Self {
        let trials = completions.len();
        let mut distribution: BTreeMap<String, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
        let mut ordinals: BTreeMap<String, Vec<i32>> = BTreeMap::new();

        for completion in completions {
            for (milestone, date) in completion {
                *distribution
                    .entry(milestone.clone())
                    .or_default()
                    .entry(date)
                    .or_insert(0) += 1;
                ordinals
                    .entry(milestone)
                    .or_default()
                    .push(date.num_days_from_ce());
            }
        }
        for samples in ordinals.values_mut() {
            samples.sort_unstable();
        }

        let percentile_dates = ordinals
            .iter()
            .filter_map(|(m, samples)| {
                percentile_date(samples, percentile).map(|d| (m.clone(), d))
            })
            .collect();

        Self {
            trials,
            percentile,
            distribution,
            percentile_dates,
            ordinals,
        }
    }

    /// Completion date of `milestone` at another percentile `q`.
    ///
    /// Returns `Ok(None)` for a milestone with no samples.
    pub fn date_at_percentile(&self, milestone: &str, q: f64) -> ForecastResult<Option<NaiveDate>> {
        check_percentile(q)?;
        Ok(self
            .ordinals
            .get(milestone)
            .and_then(|samples| percentile_date(samples, q)))
    }

    /// Fraction of trials in which `milestone` completed on or before `date`.
    pub fn completion_probability(&self, milestone: &str, date: NaiveDate) -> f64 {
        match self.ordinals.get(milestone) {
            Some(samples) if !samples.is_empty() => {
                let ordinal = date.num_days_from_ce();
                let done = samples.partition_point(|&o| o <= ordinal);
                done as f64 / samples.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Milestones seen in the run.
    pub fn milestones(&self) -> impl Iterator<Item = &str> {
        self.distribution.keys().map(String::as_str)
    }
}

fn check_percentile(q: f64) -> ForecastResult<()> {
    if (0.0..=100.0).contains(&q) {
        Ok(())
    } else {
        Err(ForecastError::InvalidPercentile { percentile: q })
    }
}

/// Linear interpolation between closest ranks over sorted samples.
fn percentile_value(sorted: &[i32], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q / 100.0 * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (a, b) = (f64::from(sorted[lo]), f64::from(sorted[hi.min(last)]));
    Some(a + (b - a) * (rank - lo as f64))
}

fn percentile_date(sorted: &[i32], q: f64) -> Option<NaiveDate> {
    let value = percentile_value(sorted, q)?;
    NaiveDate::from_num_days_from_ce_opt(value.floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Milestone, TaskEstimates};
    use crate::scheduler::SchedulerConfig;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, m, d).unwrap()
    }

    fn scheduler() -> TaskScheduler {
        TaskScheduler::new(
            vec![
                Milestone::new("m1", date(6, 1), date(7, 31)),
                Milestone::new("m2", date(6, 1), date(8, 31)),
            ],
            SchedulerConfig::new().with_start_date(date(6, 3)),
        )
        .unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", "m1")
                .with_assignee("u1")
                .with_estimates(TaskEstimates::new(2.0, 4.0, 12.0)),
            Task::new("b", "m2")
                .with_assignee("u1")
                .with_dependency("a")
                .with_estimates(TaskEstimates::new(1.0, 3.0, 6.0)),
        ]
    }

    #[test]
    fn test_percentile_interpolation() {
        let samples = [1, 2, 3, 4];
        assert_eq!(percentile_value(&samples, 0.0), Some(1.0));
        assert_eq!(percentile_value(&samples, 100.0), Some(4.0));
        assert_eq!(percentile_value(&samples, 50.0), Some(2.5));
        assert!((percentile_value(&samples, 90.0).unwrap() - 3.7).abs() < 1e-9);
        assert_eq!(percentile_value(&[7], 33.0), Some(7.0));
        assert_eq!(percentile_value(&[], 50.0), None);
    }

    #[test]
    fn test_percentile_date_truncates() {
        let d1 = date(6, 3).num_days_from_ce();
        let samples = [d1, d1 + 1];
        // 50th percentile = d1 + 0.5 → d1
        assert_eq!(percentile_date(&samples, 50.0), Some(date(6, 3)));
    }

    #[test]
    fn test_zero_trials() {
        let s = scheduler();
        assert_eq!(
            MonteCarlo::new(&s).run(&tasks(), 0, 90.0),
            Err(ForecastError::InvalidTrials { trials: 0 })
        );
    }

    #[test]
    fn test_invalid_percentile() {
        let s = scheduler();
        assert!(matches!(
            MonteCarlo::new(&s).run(&tasks(), 10, 101.0),
            Err(ForecastError::InvalidPercentile { .. })
        ));
        assert!(matches!(
            MonteCarlo::new(&s).run(&tasks(), 10, f64::NAN),
            Err(ForecastError::InvalidPercentile { .. })
        ));
    }

    #[test]
    fn test_distribution_counts_trials() {
        let s = scheduler();
        let outcome = MonteCarlo::new(&s).with_seed(1).run(&tasks(), 300, 90.0).unwrap();
        assert_eq!(outcome.trials, 300);
        for milestone in ["m1", "m2"] {
            let total: usize = outcome.distribution[milestone].values().sum();
            assert_eq!(total, 300);
        }
        assert!(outcome.percentile_dates["m2"] > outcome.percentile_dates["m1"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let s = scheduler();
        let input = tasks();
        MonteCarlo::new(&s).run(&input, 20, 50.0).unwrap();
        assert!(input.iter().all(|t| !t.is_scheduled()));
    }

    #[test]
    fn test_reproducible_with_seed() {
        let s = scheduler();
        let a = MonteCarlo::new(&s).with_seed(99).run(&tasks(), 100, 80.0).unwrap();
        let b = MonteCarlo::new(&s).with_seed(99).run(&tasks(), 100, 80.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_percentile_monotone() {
        let s = scheduler();
        let outcome = MonteCarlo::new(&s).run(&tasks(), 200, 50.0).unwrap();
        let mut previous = None;
        for q in [0.0, 10.0, 25.0, 50.0, 75.0, 90.0, 99.0, 100.0] {
            let d = outcome.date_at_percentile("m2", q).unwrap();
            assert!(d >= previous);
            previous = d;
        }
        assert_eq!(outcome.date_at_percentile("nope", 50.0).unwrap(), None);
    }

    #[test]
    fn test_completion_probability() {
        let s = scheduler();
        let outcome = MonteCarlo::new(&s).run(&tasks(), 100, 90.0).unwrap();
        let last = *outcome.distribution["m1"].keys().last().unwrap();
        assert_eq!(outcome.completion_probability("m1", last), 1.0);
        assert_eq!(outcome.completion_probability("m1", date(6, 1)), 0.0);
        assert_eq!(outcome.completion_probability("unknown", last), 0.0);
    }

    #[test]
    fn test_trial_error_propagates() {
        let s = scheduler();
        let mut bad = tasks();
        bad[0].assignee = None;
        assert!(matches!(
            MonteCarlo::new(&s).run(&bad, 5, 90.0),
            Err(ForecastError::TaskNotAssigned { .. })
        ));
    }
}
