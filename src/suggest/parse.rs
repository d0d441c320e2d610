//! Parse-or-fallback boundary between free-form model text and task proposals.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::progression::{Category, Difficulty, Frequency};
use crate::tracker::truncate_chars;
use crate::tracker::types::NewTask;

pub const MAX_PROPOSAL_TITLE_CHARS: usize = 50;
pub const MAX_PROPOSAL_DESCRIPTION_CHARS: usize = 100;

/// A task suggested by the model, already cleaned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProposal {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub frequency: Frequency,
    pub xp: i64,
}

impl TaskProposal {
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            difficulty: Some(self.difficulty),
            category: Some(self.category),
            xp: Some(self.xp),
            goal_alignment: None,
            frequency: Some(self.frequency),
            skill_reward: None,
        }
    }
}

/// What came out of the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    Parsed(Vec<TaskProposal>),
    Fallback(Vec<TaskProposal>),
}

impl Suggestions {
    pub fn proposals(&self) -> &[TaskProposal] {
        match self {
            Self::Parsed(p) | Self::Fallback(p) => p,
        }
    }

    pub fn into_proposals(self) -> Vec<TaskProposal> {
        match self {
            Self::Parsed(p) | Self::Fallback(p) => p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// The single canned proposal used when nothing usable came back.
pub fn fallback_proposals(category: Category, frequency: Frequency) -> Vec<TaskProposal> {
    let name = category.as_str();
    let mut title_case = name.to_string();
    if let Some(first) = title_case.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    vec![TaskProposal {
        title: format!("Quick {title_case} Task"),
        description: format!("Complete a 15-minute {name} activity"),
        difficulty: Difficulty::Medium,
        category,
        frequency,
        xp: 20,
    }]
}

/// Pull the JSON array out of model text: prefer a fenced block that holds an
/// array, then take the outermost `[ ... ]`.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let text = text.trim();
    let text = text
        .split("```")
        .skip(1)
        .step_by(2)
        .map(|block| block.strip_prefix("json").unwrap_or(block).trim())
        .find(|block| block.starts_with('[') && block.ends_with(']'))
        .unwrap_or(text);
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Turn model output into proposals. Never fails; unusable output yields
/// [`Suggestions::Fallback`].
pub fn parse_suggestions(
    text: &str,
    category: Category,
    frequency: Frequency,
    max: usize,
) -> Suggestions {
    let parsed = extract_json_array(text)
        .and_then(|json| serde_json::from_str::<Vec<Value>>(json).ok())
        .unwrap_or_default();

    let proposals: Vec<TaskProposal> = parsed
        .iter()
        .filter_map(|item| proposal_from_value(item, category, frequency))
        .take(max)
        .collect();

    if proposals.is_empty() {
        tracing::warn!(text_len = text.len(), "no usable proposals in model output, using fallback");
        Suggestions::Fallback(fallback_proposals(category, frequency))
    } else {
        Suggestions::Parsed(proposals)
    }
}

fn proposal_from_value(item: &Value, category: Category, frequency: Frequency) -> Option<TaskProposal> {
    let obj = item.as_object()?;
    let title = obj.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let difficulty = obj
        .get("difficulty")
        .and_then(Value::as_str)
        .map(Difficulty::parse_lenient)
        .unwrap_or_default();
    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse_lenient)
        .unwrap_or(category);
    let (lo, hi) = difficulty.xp_range();
    let xp = match obj.get("xp") {
        Some(Value::Number(n)) => n.as_f64().map(|x| x.round() as i64),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .unwrap_or_else(|| difficulty.default_base_xp())
    .clamp(lo, hi);

    Some(TaskProposal {
        title: truncate_chars(title, MAX_PROPOSAL_TITLE_CHARS),
        description: truncate_chars(description, MAX_PROPOSAL_DESCRIPTION_CHARS),
        difficulty,
        category,
        frequency,
        xp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_parsed() {
        let text = "Sure! Here you go:\n```json\n[\n  {\"title\": \"Morning jog\", \"description\": \"Run 2km\", \"difficulty\": \"easy\", \"category\": \"fitness\", \"xp\": 15}\n]\n```";
        let result = parse_suggestions(text, Category::Fitness, Frequency::Daily, 3);
        let Suggestions::Parsed(items) = result else {
            panic!("expected parsed suggestions");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Morning jog");
        assert_eq!(items[0].difficulty, Difficulty::Easy);
        assert_eq!(items[0].xp, 15);
        assert_eq!(items[0].frequency, Frequency::Daily);
    }

    #[test]
    fn bracketed_prose_before_a_fence_is_skipped() {
        let text = "Tasks for [Monday]:\n```json\n[{\"title\": \"Stretch\"}]\n```\nEnjoy [really]!";
        assert_eq!(extract_json_array(text), Some("[{\"title\": \"Stretch\"}]"));

        let result = parse_suggestions(text, Category::Health, Frequency::Daily, 3);
        assert!(!result.is_fallback());
        assert_eq!(result.proposals()[0].title, "Stretch");
    }

    #[test]
    fn unfenced_text_uses_outermost_brackets() {
        assert_eq!(extract_json_array("ok: [1, [2]] done"), Some("[1, [2]]"));
        assert_eq!(extract_json_array("```\nno array here\n```"), None);
    }

    #[test]
    fn garbage_falls_back() {
        for text in ["", "I cannot help with that.", "[not json]", "{\"title\": \"x\"}", "[]"] {
            let result = parse_suggestions(text, Category::Learning, Frequency::Weekly, 3);
            assert!(result.is_fallback(), "expected fallback for {text:?}");
            let items = result.into_proposals();
            assert_eq!(items[0].title, "Quick Learning Task");
            assert_eq!(items[0].description, "Complete a 15-minute learning activity");
            assert_eq!(items[0].xp, 20);
            assert_eq!(items[0].frequency, Frequency::Weekly);
        }
    }

    #[test]
    fn items_are_cleaned_and_capped() {
        let long_title = "t".repeat(80);
        let text = format!(
            r#"[
              {{"title": "{long_title}", "difficulty": "hard", "xp": 999}},
              {{"title": "   "}},
              {{"description": "no title"}},
              {{"title": "Two", "difficulty": "legendary", "xp": "12"}},
              {{"title": "Three"}},
              {{"title": "Four"}}
            ]"#
        );
        let result = parse_suggestions(&text, Category::Work, Frequency::Once, 3);
        let items = result.proposals();
        assert!(!result.is_fallback());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title.chars().count(), MAX_PROPOSAL_TITLE_CHARS);
        assert_eq!(items[0].xp, 50);
        assert_eq!(items[1].difficulty, Difficulty::Medium);
        assert_eq!(items[1].xp, 20);
        assert_eq!(items[1].category, Category::Work);
        assert_eq!(items[2].title, "Three");
        assert_eq!(items[2].xp, 25);
    }
}
