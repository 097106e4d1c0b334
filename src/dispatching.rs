//! Sequencing rules for an assignee's work queue.
//!
//! Within one generation, each assignee's tasks are placed in the order
//! given by a [`SequencingRule`]. Keys are compared ascending: the task with
//! the smallest key is offered the assignee's calendar first.
//!
//! # Usage
//!
//! ```
//! use u_forecast::dispatching::SequencingRule;
//!
//! let rule = SequencingRule::default();
//! assert_eq!(rule, SequencingRule::MilestoneThenPriority);
//! ```
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! (EDD combined with static priority)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{MilestoneWindow, Task};

/// Ordering applied to the tasks of one assignee group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencingRule {
    /// `(milestone end date, absolute_priority)`: milestone urgency first,
    /// priority breaks ties within a milestone.
    #[default]
    MilestoneThenPriority,
    /// `absolute_priority` only, ignoring milestone urgency.
    PriorityOnly,
}

/// Sort key; task id is the final tie-break so ordering is deterministic.
type SequenceKey<'a> = (Option<NaiveDate>, i32, &'a str);

impl SequencingRule {
    fn key<'a>(&self, task: &'a Task, milestones: &HashMap<String, MilestoneWindow>) -> SequenceKey<'a> {
        let milestone_end = match self {
            SequencingRule::MilestoneThenPriority => {
                milestones.get(&task.milestone_id).map(|w| w.end)
            }
            SequencingRule::PriorityOnly => None,
        };
        (milestone_end, task.absolute_priority, task.id.as_str())
    }

    /// Sorts task indices into placement order.
    pub(crate) fn sort_indices(
        &self,
        indices: &mut [usize],
        tasks: &[Task],
        milestones: &HashMap<String, MilestoneWindow>,
    ) {
        indices.sort_by(|&a, &b| {
            self.key(&tasks[a], milestones)
                .cmp(&self.key(&tasks[b], milestones))
        });
    }
}
