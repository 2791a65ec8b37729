use thiserror::Error;

use crate::validation::FormError;

/// Shown when a failure carries no backend detail.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ClearMindError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file error: {0}")]
    StateFile(String),

    #[error("{0}")]
    Invalid(#[from] FormError),

    #[error("Unauthorized{}", detail_suffix(.detail))]
    Unauthorized { detail: Option<String> },

    #[error("Rejected by server ({status}){}", detail_suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },

    #[error("Not found{}", detail_suffix(.detail))]
    NotFound { detail: Option<String> },

    #[error("Server error ({status}){}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Another request for this action is still in flight")]
    Busy,

    #[error("Request cancelled: the owning view is gone or superseded")]
    Cancelled,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ClearMindError {
    /// Backend `detail` string, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClearMindError::Unauthorized { detail }
            | ClearMindError::Rejected { detail, .. }
            | ClearMindError::NotFound { detail }
            | ClearMindError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text for an inline error message: form errors as-is, backend detail
    /// verbatim when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClearMindError::Invalid(form) => form.to_string(),
            other => other.detail().unwrap_or(fallback).to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClearMindError::Unauthorized { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClearMindError>;
