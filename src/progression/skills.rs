//! Named skill attributes and all-or-nothing skill point spending.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The nine skill attributes a profile can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Strength,
    Endurance,
    Agility,
    Focus,
    Memory,
    ProblemSolving,
    Communication,
    Leadership,
    Empathy,
}

impl Skill {
    pub const ALL: [Skill; 9] = [
        Skill::Strength,
        Skill::Endurance,
        Skill::Agility,
        Skill::Focus,
        Skill::Memory,
        Skill::ProblemSolving,
        Skill::Communication,
        Skill::Leadership,
        Skill::Empathy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Endurance => "endurance",
            Self::Agility => "agility",
            Self::Focus => "focus",
            Self::Memory => "memory",
            Self::ProblemSolving => "problem_solving",
            Self::Communication => "communication",
            Self::Leadership => "leadership",
            Self::Empathy => "empathy",
        }
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .into_iter()
            .find(|skill| skill.as_str() == s.trim())
            .ok_or_else(|| format!("unknown skill: {s}"))
    }
}

/// Current values of all nine skills. Every value is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    pub strength: i64,
    pub endurance: i64,
    pub agility: i64,
    pub focus: i64,
    pub memory: i64,
    pub problem_solving: i64,
    pub communication: i64,
    pub leadership: i64,
    pub empathy: i64,
}

impl Default for SkillSet {
    fn default() -> Self {
        Self {
            strength: 1,
            endurance: 1,
            agility: 1,
            focus: 1,
            memory: 1,
            problem_solving: 1,
            communication: 1,
            leadership: 1,
            empathy: 1,
        }
    }
}

impl SkillSet {
    pub fn get(&self, skill: Skill) -> i64 {
        match skill {
            Skill::Strength => self.strength,
            Skill::Endurance => self.endurance,
            Skill::Agility => self.agility,
            Skill::Focus => self.focus,
            Skill::Memory => self.memory,
            Skill::ProblemSolving => self.problem_solving,
            Skill::Communication => self.communication,
            Skill::Leadership => self.leadership,
            Skill::Empathy => self.empathy,
        }
    }

    fn slot(&mut self, skill: Skill) -> &mut i64 {
        match skill {
            Skill::Strength => &mut self.strength,
            Skill::Endurance => &mut self.endurance,
            Skill::Agility => &mut self.agility,
            Skill::Focus => &mut self.focus,
            Skill::Memory => &mut self.memory,
            Skill::ProblemSolving => &mut self.problem_solving,
            Skill::Communication => &mut self.communication,
            Skill::Leadership => &mut self.leadership,
            Skill::Empathy => &mut self.empathy,
        }
    }

    pub fn set(&mut self, skill: Skill, value: i64) {
        *self.slot(skill) = value;
    }

    /// Raise a skill by `amount` without spending points (task-granted bonus).
    pub fn grant(&mut self, skill: Skill, amount: i64) {
        let slot = self.slot(skill);
        *slot = slot.saturating_add(amount);
    }
}

/// Why a skill spend was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendError {
    /// The request asked for more points than the profile has.
    Insufficient { needed: i64, available: i64 },
    /// A requested value was below 1 or below the current value.
    Invalid(String),
}

/// A validated skill spend, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSpend {
    pub skills: SkillSet,
    pub points_spent: i64,
}

/// Validate `requested` target values against `current` and `available` points.
///
/// Either every change is accepted and the returned [`SkillSpend`] carries the new
/// skill values, or nothing is: the caller's state is untouched on error.
pub fn plan_skill_spend(
    current: &SkillSet,
    requested: &BTreeMap<Skill, i64>,
    available: i64,
) -> Result<SkillSpend, SpendError> {
    let mut next = *current;
    let mut needed = 0i64;

    for (&skill, &target) in requested {
        let now = current.get(skill);
        if target < 1 {
            return Err(SpendError::Invalid(format!("{skill} must be at least 1")));
        }
        if target < now {
            return Err(SpendError::Invalid(format!(
                "{skill} cannot be lowered from {now} to {target}"
            )));
        }
        needed = match needed.checked_add(target - now) {
            Some(total) => total,
            None => {
                return Err(SpendError::Insufficient {
                    needed: i64::MAX,
                    available: available.max(0),
                })
            }
        };
        next.set(skill, target);
    }

    if needed > available {
        return Err(SpendError::Insufficient {
            needed,
            available: available.max(0),
        });
    }

    Ok(SkillSpend {
        skills: next,
        points_spent: needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(pairs: &[(Skill, i64)]) -> BTreeMap<Skill, i64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn spend_within_budget() {
        let current = SkillSet::default();
        let plan = plan_skill_spend(
            &current,
            &request(&[(Skill::Strength, 3), (Skill::Focus, 2)]),
            5,
        )
        .unwrap();
        assert_eq!(plan.points_spent, 3);
        assert_eq!(plan.skills.strength, 3);
        assert_eq!(plan.skills.focus, 2);
        assert_eq!(plan.skills.memory, 1);
    }

    #[test]
    fn overspend_is_rejected_whole() {
        let current = SkillSet::default();
        let err = plan_skill_spend(
            &current,
            &request(&[(Skill::Strength, 2), (Skill::Empathy, 4)]),
            3,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SpendError::Insufficient {
                needed: 4,
                available: 3
            }
        );
        assert_eq!(current, SkillSet::default());
    }

    #[test]
    fn huge_targets_cannot_wrap_the_cost() {
        let current = SkillSet::default();
        let err = plan_skill_spend(
            &current,
            &request(&[(Skill::Strength, i64::MAX), (Skill::Focus, i64::MAX)]),
            0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SpendError::Insufficient {
                needed: i64::MAX,
                available: 0
            }
        );
    }

    #[test]
    fn unchanged_values_cost_nothing() {
        let mut current = SkillSet::default();
        current.agility = 4;
        let plan = plan_skill_spend(&current, &request(&[(Skill::Agility, 4)]), 0).unwrap();
        assert_eq!(plan.points_spent, 0);
    }

    #[test]
    fn lowering_or_zero_is_invalid() {
        let mut current = SkillSet::default();
        current.memory = 3;
        assert!(matches!(
            plan_skill_spend(&current, &request(&[(Skill::Memory, 2)]), 10),
            Err(SpendError::Invalid(_))
        ));
        assert!(matches!(
            plan_skill_spend(&current, &request(&[(Skill::Strength, 0)]), 10),
            Err(SpendError::Invalid(_))
        ));
    }

    #[test]
    fn skill_names_round_trip_through_from_str() {
        for skill in Skill::ALL {
            assert_eq!(skill.as_str().parse::<Skill>(), Ok(skill));
        }
        assert!("charisma".parse::<Skill>().is_err());
    }

    #[test]
    fn grant_adds_without_limit_checks() {
        let mut skills = SkillSet::default();
        skills.grant(Skill::Leadership, 1);
        assert_eq!(skills.leadership, 2);
    }
}
