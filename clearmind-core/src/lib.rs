pub mod auth;
pub mod board;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod profile;
pub mod routes;
pub mod scope;
pub mod session;
pub mod store;
pub mod transcript;
pub mod validation;
pub mod views;

pub use board::ItemBoard;
pub use client::ClearMindClient;
pub use config::ClearMindConfig;
pub use editor::{CommitOutcome, EditMode, ItemDraft, ItemEditor};
pub use error::{ClearMindError, Result, GENERIC_FAILURE};
pub use routes::{guard, Navigation, Route};
pub use scope::{ActionGate, ActionState, ViewScope};
pub use session::{FileStateStore, MemoryStateStore, PersistedState, Session, StateStore};
pub use store::{Classifier, ItemStore};
pub use transcript::{SendOutcome, Transcript};
pub use validation::{FormError, RegisterForm};
pub use views::{DashboardView, ItemStats, ViewFilter};
