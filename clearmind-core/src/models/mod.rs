pub mod chat;
pub mod item;
pub mod timestamp;
pub mod user;

pub use chat::{ChatMessage, ChatReply, ChatRequest, ExtractedItem, Role};
pub use item::{
    Category, Item, ItemPayload, ItemQuery, ParseEnumError, Status, StatusUpdate, Subcategory,
};
pub use user::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
