//! Goal-progress heuristic: how far a completed task moves each open goal.
//!
//! The estimate is approximate on purpose. A task can advance several goals at
//! once, and the same effort may be counted against more than one of them.

use serde::Serialize;

use super::reward::clamp_alignment;
use super::types::{Category, Difficulty};

/// Extra progress per unit of goal alignment.
pub const ALIGNMENT_PROGRESS_FACTOR: f64 = 0.1;

/// How strongly a task relates to a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMatch {
    /// Same category.
    Category,
    /// One title contains the other, ignoring case.
    Title,
    /// Learning or health work counted towards a personal goal.
    Growth,
    Unrelated,
}

impl GoalMatch {
    /// Share of the increment the goal receives.
    pub fn strength(&self) -> f64 {
        match self {
            Self::Category => 1.0,
            Self::Title => 0.8,
            Self::Growth => 0.3,
            Self::Unrelated => 0.0,
        }
    }
}

/// The parts of a completed task the heuristic reads.
#[derive(Debug, Clone, Copy)]
pub struct TaskSignal<'a> {
    pub title: &'a str,
    pub category: Category,
    pub difficulty: Difficulty,
    pub goal_alignment: f64,
}

/// The parts of a goal the heuristic reads.
#[derive(Debug, Clone, Copy)]
pub struct GoalState<'a> {
    pub title: &'a str,
    pub category: Category,
    pub progress: f64,
    pub completed: bool,
}

/// Result of applying one task to one goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressStep {
    pub matched: GoalMatch,
    pub delta: f64,
    pub progress: f64,
    /// `true` only on the event that carries the goal to 1.0.
    pub completed_now: bool,
}

/// Full increment a task would give a perfectly matching goal.
pub fn progress_increment(difficulty: Difficulty, goal_alignment: f64) -> f64 {
    difficulty.progress_increment() + clamp_alignment(goal_alignment) * ALIGNMENT_PROGRESS_FACTOR
}

/// Classify the relation between a task and a goal. Checks run strongest first.
pub fn match_goal(task: &TaskSignal<'_>, goal: &GoalState<'_>) -> GoalMatch {
    if task.category == goal.category {
        return GoalMatch::Category;
    }
    if titles_overlap(task.title, goal.title) {
        return GoalMatch::Title;
    }
    if matches!(task.category, Category::Learning | Category::Health)
        && goal.category == Category::Personal
    {
        return GoalMatch::Growth;
    }
    GoalMatch::Unrelated
}

fn titles_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Apply a completed task to a goal. `None` when the goal is untouched.
pub fn advance_goal(task: &TaskSignal<'_>, goal: &GoalState<'_>) -> Option<ProgressStep> {
    if goal.completed {
        return None;
    }
    let matched = match_goal(task, goal);
    let delta = progress_increment(task.difficulty, task.goal_alignment) * matched.strength();
    if delta <= 0.0 {
        return None;
    }
    let progress = (goal.progress + delta).min(1.0);
    Some(ProgressStep {
        matched,
        delta,
        progress,
        completed_now: progress >= 1.0,
    })
}
