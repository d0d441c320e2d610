//! XP awarded for completing a task.

use serde::{Deserialize, Serialize};

use super::types::Difficulty;

/// Which reward formula the tracker applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Alignment bonus, then clamp into the difficulty's XP range.
    #[default]
    Ranged,
    /// Alignment bonus times the difficulty multiplier, no clamp.
    Multiplier,
}

/// Clamp a goal-alignment score into `[0, 1]`. NaN counts as no alignment.
pub fn clamp_alignment(alignment: f64) -> f64 {
    if alignment.is_nan() {
        0.0
    } else {
        alignment.clamp(0.0, 1.0)
    }
}

/// Multiplier earned by serving a goal: `1.0 + 0.5 * alignment`.
pub fn alignment_bonus(alignment: f64) -> f64 {
    1.0 + 0.5 * clamp_alignment(alignment)
}

/// XP a task grants on completion.
pub fn task_xp_reward(base_xp: i64, difficulty: Difficulty, alignment: f64, policy: RewardPolicy) -> i64 {
    let boosted = base_xp.max(0) as f64 * alignment_bonus(alignment);
    match policy {
        RewardPolicy::Ranged => {
            let (lo, hi) = difficulty.xp_range();
            boosted.clamp(lo as f64, hi as f64).round() as i64
        }
        RewardPolicy::Multiplier => (boosted * difficulty.multiplier()).round() as i64,
    }
}
