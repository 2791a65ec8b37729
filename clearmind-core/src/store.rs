//! Seams between views and the remote backend.
//!
//! `ClearMindClient` implements both traits over HTTP. Views take `&dyn`
//! references so they can be driven by any implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChatReply, Item, ItemPayload, ItemQuery, Status};

/// The remote item collection. Every call is a fresh round trip: no caching, no retries.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self, query: &ItemQuery) -> Result<Vec<Item>>;

    async fn get(&self, id: i64) -> Result<Item>;

    async fn create(&self, payload: &ItemPayload) -> Result<Item>;

    async fn update(&self, id: i64, payload: &ItemPayload) -> Result<Item>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn update_status(&self, id: i64, status: Status) -> Result<Item>;
}

/// The remote classifier behind the chat page.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<ChatReply>;
}
