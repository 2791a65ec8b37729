//! Create/edit form state for a single item.
//!
//! The draft is never applied to the visible list on its own. A commit is a
//! three-step exchange so a UI can render the `saving` state in between:
//! [`ItemEditor::begin_commit`] → [`CommitRequest::execute`] →
//! [`ItemEditor::finish_commit`]. [`ItemEditor::commit`] runs all three.

use chrono::NaiveDateTime;

use crate::board::ItemBoard;
use crate::error::{ClearMindError, Result};
use crate::models::{Category, Item, ItemPayload, Status, Subcategory};
use crate::scope::{ActionGate, ActionGuard};
use crate::store::ItemStore;
use crate::validation::{validate_priority, validate_subcategory, FormError};

pub const DEFAULT_PRIORITY: u8 = 5;

/// One editable field. Category changes go through
/// [`ItemDraft::change_category`] because they also clear the subcategory.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Title(String),
    Description(String),
    Subcategory(Option<Subcategory>),
    LifeArea(String),
    Deadline(Option<NaiveDateTime>),
    Priority(u8),
    Status(Status),
}

/// Item fields minus id and timestamps. The subcategory always belongs to the category.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    title: String,
    description: String,
    category: Category,
    subcategory: Option<Subcategory>,
    life_area: String,
    deadline: Option<NaiveDateTime>,
    priority: u8,
    status: Status,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: Category::Task,
            subcategory: None,
            life_area: String::new(),
            deadline: None,
            priority: DEFAULT_PRIORITY,
            status: Status::Pending,
        }
    }
}

impl ItemDraft {
    pub fn from_item(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            category: item.category,
            // A stale pairing from the server is dropped rather than carried into the form.
            subcategory: item.subcategory.filter(|s| s.belongs_to(item.category)),
            life_area: item.life_area.clone().unwrap_or_default(),
            deadline: item.deadline,
            priority: if item.priority == 0 {
                DEFAULT_PRIORITY
            } else {
                item.priority
            },
            status: item.status,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subcategory(&self) -> Option<Subcategory> {
        self.subcategory
    }

    pub fn life_area(&self) -> &str {
        &self.life_area
    }

    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.deadline
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_field(&mut self, field: DraftField) -> std::result::Result<(), FormError> {
        match field {
            DraftField::Title(v) => self.title = v,
            DraftField::Description(v) => self.description = v,
            DraftField::Subcategory(Some(sub)) => {
                validate_subcategory(self.category, sub)?;
                self.subcategory = Some(sub);
            }
            DraftField::Subcategory(None) => self.subcategory = None,
            DraftField::LifeArea(v) => self.life_area = v,
            DraftField::Deadline(v) => self.deadline = v,
            DraftField::Priority(p) => self.priority = validate_priority(p)?,
            DraftField::Status(s) => self.status = s,
        }
        Ok(())
    }

    /// Subcategory sets are category-scoped, so any category change clears it.
    pub fn change_category(&mut self, category: Category) {
        self.category = category;
        self.subcategory = None;
    }

    fn validate(&self) -> std::result::Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::TitleRequired);
        }
        validate_priority(self.priority)?;
        if let Some(sub) = self.subcategory {
            validate_subcategory(self.category, sub)?;
        }
        Ok(())
    }

    fn payload(&self, status: Option<Status>) -> ItemPayload {
        ItemPayload {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.clone()),
            category: Some(self.category),
            subcategory: Some(self.subcategory),
            life_area: Some(self.life_area.clone()),
            deadline: Some(self.deadline),
            priority: Some(self.priority),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone)]
struct EditSession {
    mode: EditMode,
    draft: ItemDraft,
    seeded_status: Status,
}

/// A validated save, ready to send. Holds the editor's `saving` flag until finished.
#[derive(Debug)]
pub struct CommitRequest {
    mode: EditMode,
    payload: ItemPayload,
    guard: ActionGuard,
}

impl CommitRequest {
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    pub async fn execute(self, store: &dyn ItemStore) -> CommitOutcome {
        let result = match self.mode {
            EditMode::Create => store.create(&self.payload).await,
            EditMode::Edit(id) => store.update(id, &self.payload).await,
        };
        CommitOutcome {
            mode: self.mode,
            result,
            _guard: self.guard,
        }
    }
}

#[derive(Debug)]
pub struct CommitOutcome {
    mode: EditMode,
    result: Result<Item>,
    _guard: ActionGuard,
}

#[derive(Debug, Default)]
pub struct ItemEditor {
    session: Option<EditSession>,
    gate: ActionGate,
}

impl ItemEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a draft from `existing`, or from empty defaults for a new item.
    pub fn open(&mut self, existing: Option<&Item>) {
        self.session = Some(match existing {
            Some(item) => EditSession {
                mode: EditMode::Edit(item.id),
                draft: ItemDraft::from_item(item),
                seeded_status: item.status,
            },
            None => EditSession {
                mode: EditMode::Create,
                draft: ItemDraft::default(),
                seeded_status: Status::Pending,
            },
        });
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn draft(&self) -> Option<&ItemDraft> {
        self.session.as_ref().map(|s| &s.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut ItemDraft> {
        self.session.as_mut().map(|s| &mut s.draft)
    }

    pub fn saving(&self) -> bool {
        !self.gate.is_idle()
    }

    pub fn set_field(&mut self, field: DraftField) -> Result<()> {
        let draft = self.draft_mut().ok_or(FormError::NoDraft)?;
        draft.set_field(field)?;
        Ok(())
    }

    pub fn change_category(&mut self, category: Category) -> Result<()> {
        self.draft_mut()
            .ok_or(FormError::NoDraft)?
            .change_category(category);
        Ok(())
    }

    pub fn begin_commit(&mut self) -> Result<CommitRequest> {
        let session = self.session.as_ref().ok_or(FormError::NoDraft)?;
        session.draft.validate()?;
        let guard = self.gate.try_begin().ok_or(ClearMindError::Busy)?;

        // New items always start pending. Edits only send status when the user
        // changed it, so a save never reverts a toggle made elsewhere.
        let status = match session.mode {
            EditMode::Create => Some(Status::Pending),
            EditMode::Edit(_) => (session.draft.status != session.seeded_status)
                .then_some(session.draft.status),
        };

        Ok(CommitRequest {
            mode: session.mode,
            payload: session.draft.payload(status),
            guard,
        })
    }

    /// Merge a confirmed item into `board` and close; on failure keep the draft open.
    pub fn finish_commit(&mut self, board: &mut ItemBoard, outcome: CommitOutcome) -> Result<Item> {
        let CommitOutcome { mode, result, _guard } = outcome;
        match result {
            Ok(item) => {
                match mode {
                    EditMode::Create => board.prepend(item.clone()),
                    EditMode::Edit(_) => {
                        if !board.replace(item.clone()) {
                            board.prepend(item.clone());
                        }
                    }
                }
                if self.mode() == Some(mode) {
                    self.session = None;
                }
                tracing::debug!(item_id = item.id, ?mode, "Item saved");
                Ok(item)
            }
            Err(e) => {
                tracing::error!(?mode, error = %e, "Failed to save item");
                Err(e)
            }
        }
    }

    pub async fn commit(&mut self, store: &dyn ItemStore, board: &mut ItemBoard) -> Result<Item> {
        let request = self.begin_commit()?;
        let outcome = request.execute(store).await;
        self.finish_commit(board, outcome)
    }
}
