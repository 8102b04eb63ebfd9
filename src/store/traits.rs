//! `SlotStore` trait: named storage slots holding serialized drafts.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic storage of one text value per `(user_id, key)` slot.
///
/// Values are stored verbatim so that malformed content can be detected (and
/// ignored) by the reader rather than rejected by the store.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Read the raw value of a slot.
    async fn get_slot(&self, user_id: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or overwrite a slot.
    async fn set_slot(&self, user_id: &str, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a slot. Returns whether anything was deleted.
    async fn delete_slot(&self, user_id: &str, key: &str) -> Result<bool, StoreError>;
}
