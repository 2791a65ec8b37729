//! Chat transcript controller.
//!
//! The log is append-only and lives only as long as the controller. A send
//! moves the controller `idle → sending → idle`; a second send while one is
//! outstanding is refused instead of double-posting.

use crate::error::{ClearMindError, Result};
use crate::models::{ChatMessage, ChatReply, Role};
use crate::scope::{ActionGate, ActionGuard, ActionState};
use crate::store::Classifier;

pub const GREETING: &str =
    "Good morning! I noticed you have a few open loops from yesterday. Ready to organize your day?";
pub const APOLOGY: &str = "I'm having trouble processing that. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// A send is already in flight; nothing happened.
    Busy,
    /// The classifier replied and the reply was appended.
    Replied,
    /// The classifier failed and the apology was appended.
    Failed,
}

/// A user message already on the log, waiting for the classifier.
#[derive(Debug)]
pub struct PendingSend {
    message: String,
    guard: ActionGuard,
}

impl PendingSend {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub async fn resolve(self, classifier: &dyn Classifier) -> ResolvedSend {
        let result = classifier.classify(&self.message).await;
        ResolvedSend {
            result,
            _guard: self.guard,
        }
    }
}

#[derive(Debug)]
pub struct ResolvedSend {
    result: Result<ChatReply>,
    _guard: ActionGuard,
}

impl ResolvedSend {
    /// Build a resolution for a send whose request never completed (e.g. its view closed).
    pub fn abandoned(pending: PendingSend, error: ClearMindError) -> Self {
        Self {
            result: Err(error),
            _guard: pending.guard,
        }
    }
}

pub enum BeginSend {
    Started(PendingSend),
    Refused(SendOutcome),
}

#[derive(Debug)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    gate: ActionGate,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING, Vec::new())],
            gate: ActionGate::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn state(&self) -> ActionState {
        self.gate.state()
    }

    /// Append the user's message and claim the send slot.
    pub fn begin_send(&mut self, text: &str) -> BeginSend {
        if text.trim().is_empty() {
            return BeginSend::Refused(SendOutcome::Ignored);
        }
        let Some(guard) = self.gate.try_begin() else {
            tracing::debug!("Chat send refused: previous message still in flight");
            return BeginSend::Refused(SendOutcome::Busy);
        };
        self.messages.push(ChatMessage::user(text));
        BeginSend::Started(PendingSend {
            message: text.to_string(),
            guard,
        })
    }

    /// Append the assistant's side. Errors become a fixed apology; the log is never rolled back.
    pub fn finish_send(&mut self, resolved: ResolvedSend) -> SendOutcome {
        let ResolvedSend { result, _guard } = resolved;
        match result {
            Ok(reply) => {
                tracing::debug!(items = reply.items.len(), "Chat reply received");
                self.messages
                    .push(ChatMessage::assistant(reply.message, reply.items));
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat send failed");
                self.messages.push(ChatMessage::assistant(APOLOGY, Vec::new()));
                SendOutcome::Failed
            }
        }
    }

    pub async fn send(&mut self, classifier: &dyn Classifier, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            BeginSend::Refused(outcome) => outcome,
            BeginSend::Started(pending) => {
                let resolved = pending.resolve(classifier).await;
                self.finish_send(resolved)
            }
        }
    }

    /// Count of extracted items across all assistant replies.
    pub fn extracted_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.items.len())
            .sum()
    }
}
