use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::catalog::locks::KeyedLocks;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub blob_store: Arc<dyn BlobStore>,
    pub catalog_locks: Arc<KeyedLocks>,
    pub config: AppConfig,
}
