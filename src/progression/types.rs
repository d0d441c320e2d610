//! Fixed enumerations read by the progression rules.
//!
//! Every enum here parses leniently: unknown or empty strings fall back to the
//! variant's default so the reward functions stay total. Strict parsing is still
//! available through [`std::str::FromStr`].

use serde::{Deserialize, Serialize};

macro_rules! lenient_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (default = $default:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case", from = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// SQL-compatible string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Parse, mapping anything unrecognised to the default variant.
            pub fn parse_lenient(s: &str) -> Self {
                s.parse().unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(format!("unknown {}: {other}", stringify!($name).to_ascii_lowercase())),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::parse_lenient(&s)
            }
        }
    };
}

lenient_enum! {
    /// How hard a task is. Drives both the XP reward and the goal-progress increment.
    pub enum Difficulty (default = Medium) {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
        Expert => "expert",
    }
}

lenient_enum! {
    /// Shared category set for tasks and goals.
    pub enum Category (default = General) {
        General => "general",
        Work => "work",
        Career => "career",
        Fitness => "fitness",
        Health => "health",
        Learning => "learning",
        Personal => "personal",
        Financial => "financial",
        Social => "social",
        Relationships => "relationships",
        Creative => "creative",
    }
}

lenient_enum! {
    pub enum Priority (default = Medium) {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

lenient_enum! {
    /// Recurrence interval of a task. `Once` tasks never reopen.
    pub enum Frequency (default = Once) {
        Once => "once",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

impl Difficulty {
    /// Reward multiplier of the first model revision.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 0.7,
            Self::Medium => 1.0,
            Self::Hard => 1.5,
            Self::Expert => 2.0,
        }
    }

    /// Inclusive XP range a task of this difficulty may award.
    pub fn xp_range(&self) -> (i64, i64) {
        match self {
            Self::Easy => (5, 20),
            Self::Medium => (20, 35),
            Self::Hard => (35, 50),
            Self::Expert => (50, 75),
        }
    }

    /// Base XP used when a task is created without one.
    pub fn default_base_xp(&self) -> i64 {
        match self {
            Self::Easy => 15,
            Self::Medium => 25,
            Self::Hard => 40,
            Self::Expert => 60,
        }
    }

    /// Goal-progress increment granted by completing a task of this difficulty.
    pub fn progress_increment(&self) -> f64 {
        match self {
            Self::Easy => 0.05,
            Self::Medium => 0.08,
            Self::Hard => 0.12,
            Self::Expert => 0.20,
        }
    }
}

impl Priority {
    /// Sort rank, higher first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

impl Frequency {
    /// Days after a completion before the task reopens.
    pub fn interval_days(&self) -> Option<i64> {
        match self {
            Self::Once => None,
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly => Some(30),
        }
    }
}

/// A goal category offered to clients, with its display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct GoalCategoryInfo {
    pub id: Category,
    pub name: &'static str,
    pub icon: &'static str,
}

/// The categories a goal is normally filed under.
pub fn goal_categories() -> Vec<GoalCategoryInfo> {
    vec![
        GoalCategoryInfo { id: Category::Career, name: "Career & Work", icon: "fas fa-briefcase" },
        GoalCategoryInfo { id: Category::Health, name: "Health & Fitness", icon: "fas fa-heart" },
        GoalCategoryInfo { id: Category::Personal, name: "Personal Development", icon: "fas fa-user-plus" },
        GoalCategoryInfo { id: Category::Financial, name: "Financial", icon: "fas fa-dollar-sign" },
        GoalCategoryInfo { id: Category::Learning, name: "Learning & Education", icon: "fas fa-graduation-cap" },
        GoalCategoryInfo { id: Category::Relationships, name: "Relationships & Social", icon: "fas fa-users" },
    ]
}
