//! Progression rules: pure functions from XP, task and goal attributes to levels,
//! rewards, goal progress, and achievement unlocks.
//!
//! Nothing in this module touches the database. The [`crate::tracker`] operations
//! load entities, call into these rules, and persist the results.

pub mod achievements;
pub mod goals;
pub mod level;
pub mod reward;
pub mod skills;
pub mod types;

pub use level::{level_from_xp, progress_to_next_level, skill_points_for_level, xp_floor_for_level};
pub use reward::{task_xp_reward, RewardPolicy};
pub use skills::{Skill, SkillSet};
pub use types::{Category, Difficulty, Frequency, Priority};
