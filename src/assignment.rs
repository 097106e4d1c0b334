//! Phantom worker assignment.
//!
//! Assigns synthetic ("phantom") workers to tasks without an assignee so
//! that a task set can be scheduled before real staffing is known. Running
//! the same tasks with different phantom counts answers "how many people
//! does this milestone need?".
//!
//! Only unassigned tasks (no assignee, or an empty one) are touched;
//! existing assignees are kept.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::error::{ForecastError, ForecastResult};
use crate::models::Task;

/// Default name prefix of phantom workers.
pub const DEFAULT_PHANTOM_PREFIX: &str = "phantom-";

/// How a phantom worker is picked for each unassigned task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeDistribution {
    /// Every phantom worker equally likely.
    #[default]
    Uniform,
    /// Probability proportional to the weight at the worker's index.
    Weighted(Vec<f64>),
}

/// Creates phantom workers and assigns them to unassigned tasks.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_forecast::assignment::{AssigneeDistribution, PhantomAssigner};
/// use u_forecast::models::Task;
///
/// let assigner = PhantomAssigner::new(3);
/// let mut tasks = vec![Task::new("1", "m"), Task::new("2", "m").with_assignee("alice")];
/// let mut rng = SmallRng::seed_from_u64(1);
/// let n = assigner.assign(&mut tasks, &AssigneeDistribution::Uniform, &mut rng).unwrap();
/// assert_eq!(n, 1);
/// assert_eq!(tasks[1].assignee.as_deref(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhantomAssigner {
    usernames: Vec<String>,
}

impl PhantomAssigner {
    /// Creates `count` phantom workers named `phantom-0`, `phantom-1`, ...
    pub fn new(count: usize) -> Self {
        Self::with_prefix(count, DEFAULT_PHANTOM_PREFIX)
    }

    /// Creates `count` phantom workers named `{prefix}{i}`.
    pub fn with_prefix(count: usize, prefix: &str) -> Self {
        Self {
            usernames: (0..count).map(|i| format!("{prefix}{i}")).collect(),
        }
    }

    /// Phantom worker names.
    pub fn usernames(&self) -> &[String] {
        &self.usernames
    }

    /// Assigns a phantom worker to every task without an assignee.
    ///
    /// An empty assignee name counts as unassigned.
    ///
    /// Returns the number of tasks assigned.
    ///
    /// # Errors
    /// `InvalidDistribution` if there are no phantom workers, or if the
    /// weights do not match the worker count or are not usable weights.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        tasks: &mut [Task],
        distribution: &AssigneeDistribution,
        rng: &mut R,
    ) -> ForecastResult<usize> {
        if self.usernames.is_empty() {
            return Err(ForecastError::InvalidDistribution {
                reason: "no phantom workers to choose from".into(),
            });
        }
        let weighted = match distribution {
            AssigneeDistribution::Uniform => None,
            AssigneeDistribution::Weighted(weights) => {
                if weights.len() != self.usernames.len() {
                    return Err(ForecastError::InvalidDistribution {
                        reason: format!(
                            "{} weights for {} phantom workers",
                            weights.len(),
                            self.usernames.len()
                        ),
                    });
                }
                Some(WeightedIndex::new(weights).map_err(|e| {
                    ForecastError::InvalidDistribution {
                        reason: e.to_string(),
                    }
                })?)
            }
        };

        let mut assigned = 0;
        for task in tasks
            .iter_mut()
            .filter(|t| t.assignee.as_deref().map_or(true, str::is_empty))
        {
            let pick = match &weighted {
                Some(index) => index.sample(rng),
                None => rng.random_range(0..self.usernames.len()),
            };
            let name = &self.usernames[pick];
            warn!(task = %task.id, phantom = %name, "assigning phantom worker");
            task.assignee = Some(name.clone());
            assigned += 1;
        }
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn unassigned(n: usize) -> Vec<Task> {
        (0..n).map(|i| Task::new(i.to_string(), "m")).collect()
    }

    #[test]
    fn test_usernames() {
        let a = PhantomAssigner::new(14);
        assert_eq!(a.usernames().len(), 14);
        assert_eq!(a.usernames()[0], "phantom-0");
        assert_eq!(a.usernames()[13], "phantom-13");
        assert_eq!(PhantomAssigner::with_prefix(1, "temp-").usernames()[0], "temp-0");
    }

    #[test]
    fn test_assigns_all_unassigned() {
        let a = PhantomAssigner::new(3);
        let mut tasks = unassigned(3);
        let mut rng = SmallRng::seed_from_u64(5);
        let n = a.assign(&mut tasks, &AssigneeDistribution::Uniform, &mut rng).unwrap();
        assert_eq!(n, 3);
        assert!(tasks
            .iter()
            .all(|t| t.assignee.as_deref().is_some_and(|x| x.starts_with("phantom-"))));
    }

    #[test]
    fn test_empty_assignee_is_unassigned() {
        let a = PhantomAssigner::new(1);
        let mut tasks = vec![Task::new("1", "m").with_assignee(""), Task::new("2", "m").with_assignee("bob")];
        let mut rng = SmallRng::seed_from_u64(1);
        let n = a.assign(&mut tasks, &AssigneeDistribution::Uniform, &mut rng).unwrap();
        assert_eq!(n, 1);
        assert_eq!(tasks[0].assignee.as_deref(), Some("phantom-0"));
        assert_eq!(tasks[1].assignee.as_deref(), Some("bob"));
    }

    #[test]
    fn test_uniform_covers_everyone() {
        let a = PhantomAssigner::new(4);
        let mut tasks = unassigned(200);
        let mut rng = SmallRng::seed_from_u64(11);
        a.assign(&mut tasks, &AssigneeDistribution::Uniform, &mut rng).unwrap();
        let picked: HashSet<_> = tasks.iter().filter_map(|t| t.assignee.clone()).collect();
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn test_weighted_zero_weight_never_picked() {
        let a = PhantomAssigner::new(3);
        let mut tasks = unassigned(100);
        let mut rng = SmallRng::seed_from_u64(2);
        let dist = AssigneeDistribution::Weighted(vec![1.0, 0.0, 3.0]);
        a.assign(&mut tasks, &dist, &mut rng).unwrap();
        assert!(tasks
            .iter()
            .all(|t| t.assignee.as_deref() != Some("phantom-1")));
    }

    #[test]
    fn test_invalid_distributions() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut tasks = unassigned(1);
        let a = PhantomAssigner::new(2);
        assert!(matches!(
            a.assign(&mut tasks, &AssigneeDistribution::Weighted(vec![1.0]), &mut rng),
            Err(ForecastError::InvalidDistribution { .. })
        ));
        assert!(matches!(
            a.assign(&mut tasks, &AssigneeDistribution::Weighted(vec![0.0, 0.0]), &mut rng),
            Err(ForecastError::InvalidDistribution { .. })
        ));
        assert!(matches!(
            PhantomAssigner::new(0).assign(&mut tasks, &AssigneeDistribution::Uniform, &mut rng),
            Err(ForecastError::InvalidDistribution { .. })
        ));
    }
}
