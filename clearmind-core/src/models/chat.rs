use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::item::{lenient_subcategory, priority_or_zero, Category, Subcategory};
use super::null_as_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// An item the classifier pulled out of a chat message. It has already been
/// saved server-side but the chat endpoint returns it without id or status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub title: String,
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_subcategory")]
    pub subcategory: Option<Subcategory>,
    #[serde(default)]
    pub life_area: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "priority_or_zero")]
    pub priority: u8,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ExtractedItem>,
}

/// One entry of the local transcript. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub items: Vec<ExtractedItem>,
    pub sent_at: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            items: Vec::new(),
            sent_at: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, items: Vec<ExtractedItem>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            items,
            sent_at: Local::now(),
        }
    }
}
