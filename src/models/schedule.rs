//! Schedule (result) model.
//!
//! A schedule is the read-only outcome of one `TaskScheduler::schedule`
//! call: every task with its work-dates, plus the order in which each
//! assignee's tasks were placed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Task;
use crate::error::ForecastError;

/// A complete schedule.
///
/// Every contained task is scheduled. Queries never mutate the schedule,
/// so repeated calls with the same arguments return equal results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord")]
pub struct Schedule {
    tasks: Vec<Task>,
    /// assignee → task ids, in placement order.
    assignee_tasks: BTreeMap<String, Vec<String>>,
}

/// Wire form of a [`Schedule`], checked on the way in.
#[derive(Deserialize)]
struct ScheduleRecord {
    tasks: Vec<Task>,
    #[serde(default)]
    assignee_tasks: BTreeMap<String, Vec<String>>,
}

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = ForecastError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        let unscheduled: Vec<String> = record
            .tasks
            .iter()
            .filter(|t| !t.is_scheduled())
            .map(|t| t.id.clone())
            .collect();
        if !unscheduled.is_empty() {
            return Err(ForecastError::IncompleteSchedule {
                task_ids: unscheduled,
            });
        }
        Ok(Self::new(record.tasks, record.assignee_tasks))
    }
}

impl Schedule {
    /// Builds a schedule from fully scheduled tasks.
    ///
    /// # Panics
    /// If any task has no scheduled dates. The engine checks this before
    /// construction, so a panic here indicates an engine defect.
    pub fn new(tasks: Vec<Task>, assignee_tasks: BTreeMap<String, Vec<String>>) -> Self {
        assert!(
            tasks.iter().all(Task::is_scheduled),
            "schedule built from unscheduled tasks"
        );
        Self {
            tasks,
            assignee_tasks,
        }
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the schedule holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Tasks sorted by end date (then id), optionally for one assignee.
    pub fn tasks(&self, assignee: Option<&str>) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| assignee.is_none() || t.assignee.as_deref() == assignee)
            .collect();
        tasks.sort_by(|a, b| (a.end_date(), &a.id).cmp(&(b.end_date(), &b.id)));
        tasks
    }

    /// Tasks bucketed by milestone id, each bucket sorted by end date.
    pub fn milestone_tasks(&self) -> BTreeMap<&str, Vec<&Task>> {
        let mut buckets: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
        for task in self.tasks(None) {
            buckets.entry(task.milestone_id.as_str()).or_default().push(task);
        }
        buckets
    }

    /// Completion date of every milestone (latest end date of its tasks).
    pub fn milestone_completion_dates(&self) -> BTreeMap<String, NaiveDate> {
        let mut completion: BTreeMap<String, NaiveDate> = BTreeMap::new();
        for task in &self.tasks {
            if let Some(end) = task.end_date() {
                completion
                    .entry(task.milestone_id.clone())
                    .and_modify(|d| *d = (*d).max(end))
                    .or_insert(end);
            }
        }
        completion
    }

    /// Assignees with at least one task.
    pub fn assignees(&self) -> Vec<&str> {
        self.assignee_tasks
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(a, _)| a.as_str())
            .collect()
    }

    /// Task ids of one assignee in the order they were placed.
    pub fn placement_order(&self, assignee: &str) -> &[String] {
        self.assignee_tasks
            .get(assignee)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The task finishing last; ties go to the greatest id.
    pub fn final_task(&self, assignee: Option<&str>) -> Option<&Task> {
        self.tasks(assignee).into_iter().last()
    }

    /// End date of [`final_task`](Self::final_task).
    pub fn final_date(&self, assignee: Option<&str>) -> Option<NaiveDate> {
        self.final_task(assignee).and_then(Task::end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, m, d).unwrap()
    }

    fn scheduled(id: &str, milestone: &str, assignee: &str, dates: &[NaiveDate]) -> Task {
        let mut t = Task::new(id, milestone).with_assignee(assignee);
        t.scheduled_dates = dates.to_vec();
        t
    }

    fn sample_schedule() -> Schedule {
        let tasks = vec![
            scheduled("2", "milestone-b", "user-a", &[date(10, 3), date(10, 9)]),
            scheduled("1", "milestone-a", "user-a", &[date(9, 18), date(9, 22)]),
            scheduled("3", "milestone-a", "user-b", &[date(9, 19), date(9, 25)]),
        ];
        let mut by_assignee = BTreeMap::new();
        by_assignee.insert("user-a".to_string(), vec!["1".to_string(), "2".to_string()]);
        by_assignee.insert("user-b".to_string(), vec!["3".to_string()]);
        Schedule::new(tasks, by_assignee)
    }

    #[test]
    fn test_tasks_sorted_by_end_date() {
        let s = sample_schedule();
        let ids: Vec<&str> = s.tasks(None).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_tasks_filtered_by_assignee() {
        let s = sample_schedule();
        let ids: Vec<&str> = s.tasks(Some("user-b")).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
        assert!(s.tasks(Some("nobody")).is_empty());
    }

    #[test]
    fn test_milestone_tasks() {
        let s = sample_schedule();
        let buckets = s.milestone_tasks();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets["milestone-a"].len(), 2);
        assert_eq!(buckets["milestone-b"][0].id, "2");
    }

    #[test]
    fn test_milestone_completion_dates() {
        let s = sample_schedule();
        let done = s.milestone_completion_dates();
        assert_eq!(done["milestone-a"], date(9, 25));
        assert_eq!(done["milestone-b"], date(10, 9));
    }

    #[test]
    fn test_final_task_and_date() {
        let s = sample_schedule();
        assert_eq!(s.final_task(None).unwrap().id, "2");
        assert_eq!(s.final_date(None), Some(date(10, 9)));
        assert_eq!(s.final_date(Some("user-b")), Some(date(9, 25)));
        assert_eq!(s.final_date(Some("nobody")), None);
        // repeated queries agree
        assert_eq!(s.final_task(None), s.final_task(None));
    }

    #[test]
    fn test_final_task_tie_breaks_by_id() {
        let tasks = vec![
            scheduled("a", "m", "u", &[date(9, 18)]),
            scheduled("b", "m", "v", &[date(9, 18)]),
        ];
        let s = Schedule::new(tasks, BTreeMap::new());
        assert_eq!(s.final_task(None).unwrap().id, "b");
    }

    #[test]
    fn test_assignees_and_order() {
        let s = sample_schedule();
        assert_eq!(s.assignees(), vec!["user-a", "user-b"]);
        assert_eq!(s.placement_order("user-a"), ["1".to_string(), "2".to_string()]);
        assert!(s.placement_order("nobody").is_empty());
        assert_eq!(s.len(), 3);
        assert!(s.task("3").is_some());
    }

    #[test]
    fn test_json_roundtrip_keeps_schedule() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_deserialize_rejects_unscheduled_task() {
        let json = r#"{
            "tasks": [{
                "id": "1",
                "absolute_priority": 0,
                "estimates": {"minimum": 1.0, "suggested": 1.0, "maximum": 1.0},
                "assignee": "user-a",
                "project_id": "",
                "milestone_id": "m"
            }],
            "assignee_tasks": {"user-a": ["1"]}
        }"#;
        let err = serde_json::from_str::<Schedule>(json).unwrap_err();
        assert!(err.to_string().contains("tasks left unscheduled: 1"), "{err}");
    }

    #[test]
    #[should_panic(expected = "unscheduled")]
    fn test_unscheduled_task_panics() {
        Schedule::new(vec![Task::new("1", "m")], BTreeMap::new());
    }
}
