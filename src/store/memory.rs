//! In-memory slot store, used by tests and as a scratch backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::SlotStore;
use crate::error::StoreError;

#[derive(Default)]
pub struct MemorySlotStore {
    slots: RwLock<HashMap<(String, String), String>>,
    unavailable: AtomicBool,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail, as a browser in private mode or over quota would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn get_slot(&self, user_id: &str, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let slots = self.slots.read().await;
        Ok(slots.get(&(user_id.to_string(), key.to_string())).cloned())
    }

    async fn set_slot(&self, user_id: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut slots = self.slots.write().await;
        slots.insert((user_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn delete_slot(&self, user_id: &str, key: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut slots = self.slots.write().await;
        Ok(slots
            .remove(&(user_id.to_string(), key.to_string()))
            .is_some())
    }
}
