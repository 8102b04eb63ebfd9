//! Persistence layer: named draft slots backed by libSQL or memory.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

use std::sync::Arc;

pub use libsql_backend::LibSqlSlotStore;
pub use memory::MemorySlotStore;
pub use traits::SlotStore;

use crate::config::ServiceConfig;
use crate::error::Result;

/// Open the configured libSQL database as the service's slot store.
pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn SlotStore>> {
    let store = LibSqlSlotStore::new_local(&config.db_path).await?;
    Ok(Arc::new(store))
}
