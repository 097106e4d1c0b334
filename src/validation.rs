//! Input validation for scheduling calls.
//!
//! Checks structural integrity of a task set before any date is assigned.
//! Detects:
//! - Duplicate task IDs
//! - Milestone references the scheduler does not know
//! - Unassigned tasks
//! - Prerequisites outside the task set
//! - Malformed estimates
//!
//! The first problem found is returned; scheduling never starts on an
//! invalid task set. Cycles are reported by the dependency resolver.

use std::collections::{HashMap, HashSet};

use crate::error::{ForecastError, ForecastResult};
use crate::models::{MilestoneWindow, Task};

/// Validates a task set against the known milestones.
///
/// Checks, in order:
/// 1. The set is not empty
/// 2. No duplicate task IDs
/// 3. Every milestone reference resolves
/// 4. Every task has an assignee
/// 5. Every prerequisite is part of the set
/// 6. Every estimate satisfies `0 <= minimum <= suggested <= maximum`
pub(crate) fn validate_tasks(
    tasks: &[Task],
    milestones: &HashMap<String, MilestoneWindow>,
) -> ForecastResult<()> {
    if tasks.is_empty() {
        return Err(ForecastError::EmptyTaskSet);
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            return Err(ForecastError::DuplicateTask {
                task_id: task.id.clone(),
            });
        }
    }

    if let Some(task) = tasks
        .iter()
        .find(|t| !milestones.contains_key(&t.milestone_id))
    {
        return Err(ForecastError::MissingMilestone {
            task_id: task.id.clone(),
            milestone_id: task.milestone_id.clone(),
        });
    }

    if let Some(task) = tasks
        .iter()
        .find(|t| t.assignee.as_deref().map_or(true, str::is_empty))
    {
        return Err(ForecastError::TaskNotAssigned {
            task_id: task.id.clone(),
        });
    }

    for task in tasks {
        if let Some(dep) = task
            .depends_on
            .iter()
            .find(|d| !task_ids.contains(d.as_str()))
        {
            return Err(ForecastError::UnknownDependency {
                task_id: task.id.clone(),
                dependency: dep.clone(),
            });
        }
    }

    for task in tasks {
        task.estimates
            .check()
            .map_err(|reason| ForecastError::InvalidEstimate {
                task_id: task.id.clone(),
                reason,
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskEstimates;
    use chrono::NaiveDate;

    fn milestones() -> HashMap<String, MilestoneWindow> {
        let mut m = HashMap::new();
        m.insert(
            "milestone-a".to_string(),
            MilestoneWindow {
                start: NaiveDate::from_ymd_opt(2017, 9, 15).unwrap(),
                end: NaiveDate::from_ymd_opt(2017, 10, 20).unwrap(),
            },
        );
        m
    }

    fn task(id: &str) -> Task {
        Task::new(id, "milestone-a")
            .with_assignee("user-a")
            .with_estimates(TaskEstimates::new(3.0, 5.0, 15.0))
    }

    #[test]
    fn test_valid_input() {
        let tasks = vec![task("1"), task("2").with_dependency("1")];
        assert!(validate_tasks(&tasks, &milestones()).is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            validate_tasks(&[], &milestones()),
            Err(ForecastError::EmptyTaskSet)
        );
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![task("1"), task("1")];
        assert!(matches!(
            validate_tasks(&tasks, &milestones()),
            Err(ForecastError::DuplicateTask { .. })
        ));
    }

    #[test]
    fn test_missing_milestone() {
        let tasks = vec![Task::new("1", "nowhere").with_assignee("user-a")];
        assert_eq!(
            validate_tasks(&tasks, &milestones()),
            Err(ForecastError::MissingMilestone {
                task_id: "1".into(),
                milestone_id: "nowhere".into()
            })
        );
    }

    #[test]
    fn test_not_assigned() {
        let mut unassigned = task("2");
        unassigned.assignee = None;
        let tasks = vec![task("1"), unassigned];
        assert_eq!(
            validate_tasks(&tasks, &milestones()),
            Err(ForecastError::TaskNotAssigned { task_id: "2".into() })
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let tasks = vec![task("1").with_dependency("99")];
        assert!(matches!(
            validate_tasks(&tasks, &milestones()),
            Err(ForecastError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_invalid_estimate() {
        let tasks = vec![task("1").with_estimates(TaskEstimates::new(5.0, 3.0, 1.0))];
        assert!(matches!(
            validate_tasks(&tasks, &milestones()),
            Err(ForecastError::InvalidEstimate { .. })
        ));
    }
}
