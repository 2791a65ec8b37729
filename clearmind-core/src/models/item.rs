use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::timestamp;

/// Top-level classification of a captured item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Task,
    Idea,
    Thought,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Task, Category::Idea, Category::Thought];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Task => "task",
            Category::Idea => "idea",
            Category::Thought => "thought",
        }
    }

    /// The fixed subcategory set scoped to this category.
    pub fn subcategories(self) -> &'static [Subcategory] {
        use Subcategory::*;
        match self {
            Category::Task => &[Obligation, Goal, Habit, Deadline],
            Category::Idea => &[Project, Creative, Improvement],
            Category::Thought => &[Reflection, Learning, Memory, Question],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Obligation,
    Goal,
    Habit,
    Deadline,
    Project,
    Creative,
    Improvement,
    Reflection,
    Learning,
    Memory,
    Question,
}

impl Subcategory {
    pub const ALL: [Subcategory; 11] = [
        Subcategory::Obligation,
        Subcategory::Goal,
        Subcategory::Habit,
        Subcategory::Deadline,
        Subcategory::Project,
        Subcategory::Creative,
        Subcategory::Improvement,
        Subcategory::Reflection,
        Subcategory::Learning,
        Subcategory::Memory,
        Subcategory::Question,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subcategory::Obligation => "obligation",
            Subcategory::Goal => "goal",
            Subcategory::Habit => "habit",
            Subcategory::Deadline => "deadline",
            Subcategory::Project => "project",
            Subcategory::Creative => "creative",
            Subcategory::Improvement => "improvement",
            Subcategory::Reflection => "reflection",
            Subcategory::Learning => "learning",
            Subcategory::Memory => "memory",
            Subcategory::Question => "question",
        }
    }

    /// The single category whose set contains this subcategory.
    pub fn category(self) -> Category {
        match self {
            Subcategory::Obligation
            | Subcategory::Goal
            | Subcategory::Habit
            | Subcategory::Deadline => Category::Task,
            Subcategory::Project | Subcategory::Creative | Subcategory::Improvement => {
                Category::Idea
            }
            Subcategory::Reflection
            | Subcategory::Learning
            | Subcategory::Memory
            | Subcategory::Question => Category::Thought,
        }
    }

    pub fn belongs_to(self, category: Category) -> bool {
        self.category() == category
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Done,
    Archived,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Pending, Status::InProgress, Status::Done, Status::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Archived => "archived",
        }
    }

    pub fn is_done(self) -> bool {
        self == Status::Done
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! impl_str_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_str_enum!(Category, "category");
impl_str_enum!(Subcategory, "subcategory");
impl_str_enum!(Status, "status");

/// A captured task, idea or thought as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    #[serde(
        default,
        deserialize_with = "lenient_subcategory",
        skip_serializing_if = "Option::is_none"
    )]
    pub subcategory: Option<Subcategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_area: Option<String>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "priority_or_zero")]
    pub priority: u8,
    pub status: Status,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Partial item body for `POST /items` and `PUT /items/{id}`.
///
/// The backend applies updates with exclude-unset semantics, so `None` fields
/// are left untouched server-side. `subcategory` and `deadline` are doubly
/// optional: `Some(None)` is sent as an explicit `null` and clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Option<Subcategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_area: Option<String>,
    #[serde(serialize_with = "timestamp::nullable", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Server-side filters for `GET /items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_area: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
}

/// Subcategories are AI-generated upstream; unknown labels read as absent.
pub(crate) fn lenient_subcategory<'de, D>(deserializer: D) -> Result<Option<Subcategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        if s.trim().is_empty() {
            return None;
        }
        match s.parse() {
            Ok(sub) => Some(sub),
            Err(_) => {
                tracing::debug!(subcategory = %s, "Unknown subcategory from backend, ignoring");
                None
            }
        }
    }))
}

/// `null` and missing priorities read as 0.
pub(crate) fn priority_or_zero<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.map(|p| p.clamp(0, i64::from(u8::MAX)) as u8).unwrap_or(0))
}
