//! Tracker entities and the allow-listed request shapes that create or change them.
//!
//! Request structs only carry fields a client may set. Derived values (task `xp`,
//! goal `progress`/`completed`, profile `level`/`skill_points`) have no slot in
//! them, so a client-supplied value for one of those is dropped during
//! deserialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::progression::{Category, Difficulty, Frequency, Priority, Skill, SkillSet};

/// Where a task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    Manual,
    Ai,
}

impl TaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ai => "ai",
        }
    }
}

impl std::str::FromStr for TaskSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "ai" => Ok(Self::Ai),
            _ => Err(format!("unknown task source: {s}")),
        }
    }
}

/// The singleton player profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Cumulative experience. Never decreases.
    pub xp: i64,
    /// Always `level_from_xp(xp)`.
    pub level: u32,
    /// Points still available to spend.
    pub skill_points: i64,
    pub skill_points_spent: i64,
    /// Free-text description of what the player is working towards.
    pub goals: Option<String>,
    pub preferred_difficulty: Difficulty,
    pub focus_areas: Vec<String>,
    #[serde(flatten)]
    pub skills: SkillSet,
    pub created_at: String,
    pub updated_at: String,
}

/// Allow-listed profile update. Skills are target values, not increments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub goals: Option<String>,
    pub preferred_difficulty: Option<Difficulty>,
    pub focus_areas: Option<Vec<String>>,
    pub strength: Option<i64>,
    pub endurance: Option<i64>,
    pub agility: Option<i64>,
    pub focus: Option<i64>,
    pub memory: Option<i64>,
    pub problem_solving: Option<i64>,
    pub communication: Option<i64>,
    pub leadership: Option<i64>,
    pub empathy: Option<i64>,
}

impl ProfileUpdate {
    /// Requested skill targets keyed by skill.
    pub fn requested_skills(&self) -> BTreeMap<Skill, i64> {
        let slots = [
            (Skill::Strength, self.strength),
            (Skill::Endurance, self.endurance),
            (Skill::Agility, self.agility),
            (Skill::Focus, self.focus),
            (Skill::Memory, self.memory),
            (Skill::ProblemSolving, self.problem_solving),
            (Skill::Communication, self.communication),
            (Skill::Leadership, self.leadership),
            (Skill::Empathy, self.empathy),
        ];
        slots
            .into_iter()
            .filter_map(|(skill, value)| value.map(|v| (skill, v)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub category: Category,
    /// XP requested at creation, before the difficulty clamp.
    pub base_xp: i64,
    /// XP granted on completion. Always derived from `base_xp`.
    pub xp: i64,
    pub goal_alignment: f64,
    pub frequency: Frequency,
    /// Skill raised by one, free of charge, on each completion.
    pub skill_reward: Option<Skill>,
    pub completed: bool,
    pub active: bool,
    pub times_completed: i64,
    pub source: TaskSource,
    pub last_completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
    /// Base XP; the stored reward is derived from it.
    pub xp: Option<i64>,
    pub goal_alignment: Option<f64>,
    pub frequency: Option<Frequency>,
    pub skill_reward: Option<Skill>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
    pub xp: Option<i64>,
    pub goal_alignment: Option<f64>,
    pub frequency: Option<Frequency>,
    pub skill_reward: Option<Skill>,
    pub active: Option<bool>,
}

/// Listing filter for tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    /// `Some(false)` for open tasks only, `Some(true)` for completed only.
    pub completed: Option<bool>,
    pub include_inactive: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub priority: Priority,
    /// Optional numeric target (e.g. an amount to save).
    pub target: Option<f64>,
    /// In `[0, 1]`; only moves up until completion.
    pub progress: f64,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub target: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    /// `level_reached`, `xp_earned`, or `tasks_completed`.
    pub condition_type: String,
    pub condition_value: i64,
    pub xp_reward: i64,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
    pub created_at: String,
}
