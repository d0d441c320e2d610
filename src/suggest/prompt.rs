//! Model selection and prompt construction.

use serde::Serialize;

use super::feedback::LearnedPattern;
use crate::config::LlmConfig;
use crate::progression::{Category, Difficulty, Frequency};
use crate::tracker::truncate_chars;

/// Longest goals text forwarded to the model.
pub const MAX_GOALS_CHARS: usize = 200;

/// Model tiers, each mapped to a concrete model name in [`LlmConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Fast,
    Balanced,
    Creative,
    Analytical,
}

impl ModelTier {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Learning | Category::Work | Category::Career => Self::Analytical,
            Category::Personal | Category::Creative => Self::Creative,
            _ => Self::Balanced,
        }
    }

    pub fn model_name<'a>(&self, config: &'a LlmConfig) -> &'a str {
        match self {
            Self::Fast => &config.fast_model,
            Self::Balanced => &config.balanced_model,
            Self::Creative => &config.creative_model,
            Self::Analytical => &config.analytical_model,
        }
    }
}

/// Creative and personal prompts sample hotter.
pub fn temperature_for(category: Category) -> f64 {
    match category {
        Category::Creative | Category::Personal => 0.8,
        _ => 0.6,
    }
}

/// Trim and cut user goals to [`MAX_GOALS_CHARS`].
pub fn clean_goals(goals: &str) -> String {
    truncate_chars(goals.trim(), MAX_GOALS_CHARS)
}

/// Build the generation prompt. `goals` is expected to be cleaned already.
pub fn build_prompt(
    goals: &str,
    category: Category,
    frequency: Frequency,
    count: usize,
    patterns: &[LearnedPattern],
) -> String {
    let example_difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
    let examples: Vec<String> = example_difficulties
        .iter()
        .cycle()
        .take(count.max(1))
        .enumerate()
        .map(|(i, difficulty)| {
            format!(
                r#"{{"title":"Task {n}","description":"What to do","difficulty":"{difficulty}","category":"{category}","xp":{xp}}}"#,
                n = i + 1,
                xp = difficulty.default_base_xp(),
            )
        })
        .collect();

    let ranges: Vec<String> = Difficulty::ALL
        .iter()
        .map(|d| {
            let (lo, hi) = d.xp_range();
            format!("{d}={lo}-{hi}")
        })
        .collect();
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    let mut prompt = format!(
        "Create {count} {frequency} tasks for goals: {goals}\n\n\
         Output must be valid JSON only:\n[\n{examples}\n]\n\n\
         Categories: {categories}\n\
         XP: {ranges}\n\
         Keep titles under 50 characters and descriptions under 100 characters.",
        examples = examples.join(",\n"),
        categories = categories.join(", "),
        ranges = ranges.join(", "),
    );

    if !patterns.is_empty() {
        prompt.push_str("\n\nUser preferences learned from past completions:\n");
        for p in patterns {
            prompt.push_str(&format!(
                "- {}: {} (success rate: {:.0}%)\n",
                p.pattern_type,
                p.pattern_value,
                p.success_rate * 100.0
            ));
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_category() {
        assert_eq!(ModelTier::for_category(Category::Work), ModelTier::Analytical);
        assert_eq!(ModelTier::for_category(Category::Creative), ModelTier::Creative);
        assert_eq!(ModelTier::for_category(Category::Fitness), ModelTier::Balanced);
        assert_eq!(ModelTier::for_category(Category::General), ModelTier::Balanced);

        let config = LlmConfig::default();
        assert_eq!(ModelTier::Creative.model_name(&config), "gemma2:2b");
        assert_eq!(ModelTier::Fast.model_name(&config), "llama3.2:1b");
    }

    #[test]
    fn goals_are_cut() {
        let long = format!("  {}  ", "x".repeat(500));
        assert_eq!(clean_goals(&long).chars().count(), MAX_GOALS_CHARS);
    }

    #[test]
    fn prompt_mentions_count_ranges_and_patterns() {
        let patterns = vec![LearnedPattern {
            pattern_type: "difficulty_preference".into(),
            pattern_value: "hard".into(),
            success_rate: 0.8,
            usage_count: 3,
        }];
        let prompt = build_prompt("run a 10k", Category::Fitness, Frequency::Daily, 3, &patterns);
        assert!(prompt.starts_with("Create 3 daily tasks for goals: run a 10k"));
        assert!(prompt.contains("easy=5-20"));
        assert!(prompt.contains(r#""category":"fitness""#));
        assert!(prompt.contains("difficulty_preference: hard (success rate: 80%)"));

        let bare = build_prompt("x", Category::Work, Frequency::Once, 1, &[]);
        assert!(!bare.contains("learned"));
    }
}
