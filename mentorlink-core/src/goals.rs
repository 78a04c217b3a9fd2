//! Goal tracking board. Progress is always derived from milestones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MentorlinkError;
use crate::metrics::{percentage, round1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Career,
    Technical,
    Leadership,
    Networking,
    Personal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: GoalCategory,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub milestones: Vec<Milestone>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// round(100 * completed / total); 0 with no milestones.
    pub fn progress(&self) -> u32 {
        let done = self.milestones.iter().filter(|m| m.completed).count();
        percentage(done, self.milestones.len())
    }

    pub fn is_complete(&self) -> bool {
        !self.milestones.is_empty() && self.milestones.iter().all(|m| m.completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: GoalCategory,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub average_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCard {
    pub id: String,
    pub title: String,
    pub category: GoalCategory,
    pub priority: Priority,
    pub progress: u32,
    pub milestones_done: usize,
    pub milestones_total: usize,
    pub deadline_label: String,
    pub overdue: bool,
}

/// "Due today", "Due tomorrow", "Due in N days", "Overdue by N days",
/// "No deadline".
pub fn deadline_label(deadline: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(deadline) = deadline else {
        return "No deadline".to_string();
    };
    match (deadline - today).num_days() {
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        -1 => "Overdue by 1 day".to_string(),
        d if d > 1 => format!("Due in {} days", d),
        d => format!("Overdue by {} days", -d),
    }
}

pub fn goal_card(goal: &Goal, today: NaiveDate) -> GoalCard {
    GoalCard {
        id: goal.id.clone(),
        title: goal.title.clone(),
        category: goal.category,
        priority: goal.priority,
        progress: goal.progress(),
        milestones_done: goal.milestones.iter().filter(|m| m.completed).count(),
        milestones_total: goal.milestones.len(),
        deadline_label: deadline_label(goal.deadline, today),
        overdue: !goal.is_complete() && goal.deadline.is_some_and(|d| d < today),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBoard {
    goals: Vec<Goal>,
}

impl GoalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn add_goal(&mut self, new: NewGoal) -> Result<&Goal, MentorlinkError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(MentorlinkError::validation("Goal title cannot be empty"));
        }
        self.goals.push(Goal {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: new
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category: new.category,
            priority: new.priority,
            deadline: new.deadline,
            milestones: Vec::new(),
            created_at: Utc::now(),
        });
        Ok(&self.goals[self.goals.len() - 1])
    }

    pub fn remove_goal(&mut self, id: &str) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        self.goals.len() != before
    }

    fn goal_mut(&mut self, id: &str) -> Result<&mut Goal, MentorlinkError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| MentorlinkError::not_found(format!("Goal {}", id)))
    }

    /// Returns the new milestone's id.
    pub fn add_milestone(&mut self, goal_id: &str, text: &str) -> Result<String, MentorlinkError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MentorlinkError::validation("Milestone cannot be empty"));
        }
        let goal = self.goal_mut(goal_id)?;
        let id = uuid::Uuid::new_v4().to_string();
        goal.milestones.push(Milestone {
            id: id.clone(),
            text: text.to_string(),
            completed: false,
        });
        Ok(id)
    }

    pub fn remove_milestone(
        &mut self,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<u32, MentorlinkError> {
        let goal = self.goal_mut(goal_id)?;
        let before = goal.milestones.len();
        goal.milestones.retain(|m| m.id != milestone_id);
        if goal.milestones.len() == before {
            return Err(MentorlinkError::not_found(format!("Milestone {}", milestone_id)));
        }
        Ok(goal.progress())
    }

    /// Flip a milestone and return the goal's recomputed progress.
    pub fn toggle_milestone(
        &mut self,
        goal_id: &str,
        milestone_id: &str,
    ) -> Result<u32, MentorlinkError> {
        let goal = self.goal_mut(goal_id)?;
        let milestone = goal
            .milestones
            .iter_mut()
            .find(|m| m.id == milestone_id)
            .ok_or_else(|| MentorlinkError::not_found(format!("Milestone {}", milestone_id)))?;
        milestone.completed = !milestone.completed;
        Ok(goal.progress())
    }

    pub fn stats(&self) -> GoalStats {
        let completed = self.goals.iter().filter(|g| g.is_complete()).count();
        let not_started = self.goals.iter().filter(|g| g.progress() == 0).count();
        let average_progress = if self.goals.is_empty() {
            0.0
        } else {
            let sum: u32 = self.goals.iter().map(Goal::progress).sum();
            round1(f64::from(sum) / self.goals.len() as f64)
        };
        GoalStats {
            total: self.goals.len(),
            completed,
            in_progress: self.goals.len() - completed - not_started,
            not_started,
            average_progress,
        }
    }

    /// Cards with the highest priority first, then nearest deadline.
    pub fn cards(&self, today: NaiveDate) -> Vec<GoalCard> {
        let mut goals: Vec<&Goal> = self.goals.iter().collect();
        goals.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| match (a.deadline, b.deadline) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
        });
        goals.into_iter().map(|g| goal_card(g, today)).collect()
    }
}
