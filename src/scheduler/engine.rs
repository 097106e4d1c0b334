//! Calendar-aware, milestone-gated greedy scheduler.
//!
//! # Algorithm
//!
//! 1. Clear previous results and validate the task set.
//! 2. Order tasks into dependency generations.
//! 3. Build one work-date generator per assignee.
//! 4. For each generation, for each assignee group (sorted by the
//!    sequencing rule), run passes over the group. A task is placed when
//!    the assignee's calendar has reached its milestone start; placement
//!    consumes `ceil(duration)` consecutive work-dates.
//! 5. After a pass that leaves tasks unplaced, advance the assignee's
//!    calendar by one work-date and retry. The date produced by the
//!    advance is carried over to the next placement.
//!
//! # Complexity
//! O(g · p · n) where g=generations, p=retry passes, n=tasks per group.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::SchedulerConfig;
use super::sampling::{DurationResolver, EstimateMode};
use crate::dependency::plan_generations;
use crate::dispatching::SequencingRule;
use crate::error::{ForecastError, ForecastResult};
use crate::models::{
    HolidayCalendar, Milestone, MilestoneWindow, Schedule, Task, WorkDateIter, WorkWeek,
};
use crate::montecarlo::{MonteCarlo, MonteCarloOutcome};
use crate::validation::validate_tasks;

/// Schedules tasks onto their assignees' work calendars.
///
/// The scheduler holds only immutable configuration; all per-call state
/// (calendars, sampled durations) lives inside [`schedule`](Self::schedule),
/// so one scheduler can serve many concurrent Monte Carlo trials.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_forecast::models::{Milestone, Task, TaskEstimates};
/// use u_forecast::scheduler::{EstimateMode, SchedulerConfig, TaskScheduler};
///
/// let d = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();
/// let milestones = vec![Milestone::new("m1", d(6, 1), d(6, 30))];
/// let config = SchedulerConfig::new().with_start_date(d(6, 3));
/// let scheduler = TaskScheduler::new(milestones, config).unwrap();
///
/// let mut tasks = vec![
///     Task::new("T1", "m1")
///         .with_assignee("dev")
///         .with_estimates(TaskEstimates::fixed(3.0)),
/// ];
/// let schedule = scheduler.schedule(&mut tasks, EstimateMode::Deterministic).unwrap();
/// assert_eq!(schedule.final_date(None), Some(d(6, 5)));
/// ```
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    milestones: HashMap<String, MilestoneWindow>,
    holidays: Arc<HolidayCalendar>,
    workweeks: HashMap<String, WorkWeek>,
    personal_holidays: HashMap<String, Vec<NaiveDate>>,
    start_date: NaiveDate,
    sequencing: SequencingRule,
    max_retry_passes: usize,
}

impl TaskScheduler {
    /// Creates a scheduler.
    ///
    /// # Errors
    /// - `MilestoneMissingDate` if a milestone lacks a start or end date
    /// - `InvalidWorkday` if a workday identifier is not a weekday name
    /// - `InvalidHoliday` if an annual holiday can never occur
    pub fn new(
        milestones: impl IntoIterator<Item = Milestone>,
        config: SchedulerConfig,
    ) -> ForecastResult<Self> {
        let mut windows = HashMap::new();
        for milestone in milestones {
            let (start, end) = milestone.window()?;
            windows.insert(milestone.id, MilestoneWindow { start, end });
        }

        config.holidays.validate()?;

        let mut workweeks = HashMap::new();
        for (worker, days) in &config.assignee_workdays {
            let week = WorkWeek::parse(worker, days)?;
            debug!(worker = %worker, ?days, "workday override");
            workweeks.insert(worker.clone(), week);
        }

        if config.assignee_personal_holidays.is_empty() {
            warn!("personal holidays not configured; assignee holidays will not be taken into account");
        }

        Ok(Self {
            milestones: windows,
            holidays: Arc::new(config.holidays),
            workweeks,
            personal_holidays: config.assignee_personal_holidays,
            start_date: config.start_date.unwrap_or_else(|| Utc::now().date_naive()),
            sequencing: config.sequencing,
            max_retry_passes: config.max_retry_passes,
        })
    }

    /// First candidate work-date of every calendar.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Whether a milestone id is known.
    pub fn has_milestone(&self, milestone_id: &str) -> bool {
        self.milestones.contains_key(milestone_id)
    }

    /// Schedules `tasks`, writing each task's `scheduled_dates`.
    ///
    /// Previous results on the tasks are discarded first, so scheduling the
    /// same tasks twice with the same mode yields identical dates.
    ///
    /// # Errors
    /// Validation, estimate, cycle and non-convergence errors; see
    /// [`ForecastError`]. On error no schedule is returned and the tasks'
    /// dates must be considered incomplete.
    pub fn schedule(&self, tasks: &mut [Task], mode: EstimateMode) -> ForecastResult<Schedule> {
        if tasks.is_empty() {
            return Err(ForecastError::EmptyTaskSet);
        }
        for task in tasks.iter_mut() {
            task.reset_schedule();
        }
        validate_tasks(tasks, &self.milestones)?;

        let generations = plan_generations(tasks)?;
        let index: HashMap<String, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut calendars = self.calendars(tasks);
        let mut durations = DurationResolver::new(mode);
        let mut placed: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (level, generation) in generations.iter().enumerate() {
            let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
            for i in generation.iter().filter_map(|id| index.get(id).copied()) {
                let assignee = tasks[i].assignee.clone().unwrap_or_default();
                groups.entry(assignee).or_default().push(i);
            }
            debug!(generation = level, groups = groups.len(), "scheduling generation");

            for (assignee, mut group) in groups {
                self.sequencing
                    .sort_indices(&mut group, tasks, &self.milestones);
                let calendar = calendars
                    .entry(assignee.clone())
                    .or_insert_with(|| self.calendar_for(&assignee));
                let order = placed.entry(assignee.clone()).or_default();
                self.schedule_group(&assignee, &group, tasks, calendar, &mut durations, order)?;
            }
        }

        let unscheduled: Vec<String> = tasks
            .iter()
            .filter(|t| !t.is_scheduled())
            .map(|t| t.id.clone())
            .collect();
        if !unscheduled.is_empty() {
            return Err(ForecastError::IncompleteSchedule {
                task_ids: unscheduled,
            });
        }

        info!(
            tasks = tasks.len(),
            assignees = placed.len(),
            generations = generations.len(),
            "schedule complete"
        );
        Ok(Schedule::new(tasks.to_vec(), placed))
    }

    /// Runs a Monte Carlo forecast with the default seed.
    ///
    /// Shortcut for [`MonteCarlo::new`] followed by [`MonteCarlo::run`].
    pub fn montecarlo(
        &self,
        tasks: &[Task],
        trials: usize,
        percentile: f64,
    ) -> ForecastResult<MonteCarloOutcome> {
        MonteCarlo::new(self).run(tasks, trials, percentile)
    }

    /// Places one assignee's tasks of one generation.
    fn schedule_group(
        &self,
        assignee: &str,
        group: &[usize],
        tasks: &mut [Task],
        calendar: &mut WorkDateIter,
        durations: &mut DurationResolver,
        order: &mut Vec<String>,
    ) -> ForecastResult<()> {
        let mut carried: Option<NaiveDate> = None;
        let mut advances = 0usize;
        let mut deferred: HashSet<usize> = HashSet::new();

        loop {
            for &i in group {
                if tasks[i].is_scheduled() {
                    continue;
                }
                let days = durations.days(i, &tasks[i])?;
                let Some(window) = self.milestones.get(&tasks[i].milestone_id) else {
                    continue;
                };

                if calendar.current() < window.start {
                    if deferred.insert(i) {
                        warn!(
                            task = %tasks[i].id,
                            milestone = %tasks[i].milestone_id,
                            milestone_start = %window.start,
                            "milestone not yet started, deferring task"
                        );
                    }
                    continue;
                }

                let mut dates = Vec::with_capacity(days as usize);
                for _ in 0..days {
                    let date = match carried.take() {
                        Some(date) => date,
                        None => calendar.advance()?,
                    };
                    dates.push(date);
                }
                debug!(
                    task = %tasks[i].id,
                    assignee,
                    days,
                    start = ?dates.first(),
                    end = ?dates.last(),
                    "task placed"
                );
                tasks[i].scheduled_dates = dates;
                order.push(tasks[i].id.clone());
            }

            if group.iter().all(|&i| tasks[i].is_scheduled()) {
                return Ok(());
            }
            if advances >= self.max_retry_passes {
                return Err(ForecastError::NonConvergent {
                    assignee: assignee.to_string(),
                    passes: advances,
                });
            }
            carried = Some(calendar.advance()?);
            advances += 1;
        }
    }

    fn calendars(&self, tasks: &[Task]) -> BTreeMap<String, WorkDateIter> {
        let assignees: BTreeSet<&str> = tasks
            .iter()
            .filter_map(|t| t.assignee.as_deref())
            .collect();
        assignees
            .into_iter()
            .map(|a| (a.to_string(), self.calendar_for(a)))
            .collect()
    }

    fn calendar_for(&self, assignee: &str) -> WorkDateIter {
        let personal = match self.personal_holidays.get(assignee) {
            Some(dates) => dates.clone(),
            None => {
                if !self.personal_holidays.is_empty() {
                    warn!(assignee, "no personal holidays given; assignee holidays not taken into account");
                }
                Vec::new()
            }
        };
        let week = self.workweeks.get(assignee).copied().unwrap_or_default();
        WorkDateIter::with_week(
            assignee,
            Arc::clone(&self.holidays),
            personal,
            week,
            self.start_date,
        )
    }
}
