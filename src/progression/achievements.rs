//! Achievement conditions and the unlock scan.

use serde::{Deserialize, Serialize};

use super::level::level_from_xp;

/// What an achievement's threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    LevelReached,
    XpEarned,
    TasksCompleted,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LevelReached => "level_reached",
            Self::XpEarned => "xp_earned",
            Self::TasksCompleted => "tasks_completed",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConditionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "level_reached" => Ok(Self::LevelReached),
            "xp_earned" => Ok(Self::XpEarned),
            "tasks_completed" => Ok(Self::TasksCompleted),
            _ => Err(format!("unknown achievement condition: {s}")),
        }
    }
}

/// Profile figures the conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub xp: i64,
    pub level: u32,
    pub tasks_completed: i64,
}

impl ProgressSnapshot {
    pub fn new(xp: i64, tasks_completed: i64) -> Self {
        Self {
            xp,
            level: level_from_xp(xp),
            tasks_completed,
        }
    }
}

/// One achievement as seen by the scan. `condition_type` stays a string so that
/// rows with an unknown kind are simply never unlocked.
#[derive(Debug, Clone, Copy)]
pub struct AchievementRule<'a> {
    pub condition_type: &'a str,
    pub condition_value: i64,
    pub xp_reward: i64,
    pub unlocked: bool,
}

pub fn is_satisfied(condition_type: &str, threshold: i64, snapshot: &ProgressSnapshot) -> bool {
    match condition_type.parse::<ConditionKind>() {
        Ok(ConditionKind::LevelReached) => i64::from(snapshot.level) >= threshold,
        Ok(ConditionKind::XpEarned) => snapshot.xp >= threshold,
        Ok(ConditionKind::TasksCompleted) => snapshot.tasks_completed >= threshold,
        Err(_) => false,
    }
}

/// Outcome of [`scan_unlocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockScan {
    /// Indices into the rule slice, in unlock order.
    pub unlocked: Vec<usize>,
    pub xp_granted: i64,
    /// Snapshot after all rewards were granted and the level recomputed.
    pub snapshot: ProgressSnapshot,
}

/// Unlock every locked achievement whose condition holds.
///
/// Rewards can lift XP and level enough to satisfy further achievements, so the
/// scan repeats until a pass unlocks nothing. Running it again on the result is
/// therefore a no-op.
pub fn scan_unlocks(rules: &[AchievementRule<'_>], start: ProgressSnapshot) -> UnlockScan {
    let mut snapshot = start;
    let mut done: Vec<bool> = rules.iter().map(|r| r.unlocked).collect();
    let mut unlocked = Vec::new();
    let mut xp_granted = 0i64;

    loop {
        let mut newly = Vec::new();
        for (idx, rule) in rules.iter().enumerate() {
            if !done[idx] && is_satisfied(rule.condition_type, rule.condition_value, &snapshot) {
                newly.push(idx);
            }
        }
        if newly.is_empty() {
            break;
        }
        for idx in newly {
            done[idx] = true;
            let reward = rules[idx].xp_reward.max(0);
            xp_granted += reward;
            snapshot.xp = snapshot.xp.saturating_add(reward);
            unlocked.push(idx);
        }
        snapshot.level = level_from_xp(snapshot.xp);
    }

    UnlockScan {
        unlocked,
        xp_granted,
        snapshot,
    }
}
