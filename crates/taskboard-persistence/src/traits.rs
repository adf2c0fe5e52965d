use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use taskboard_core::TaskboardResult;
use uuid::Uuid;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata stored alongside every saved snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the process that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Point-in-time copy of every collection, serialized as JSON bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub data: Vec<u8>,
    pub metadata: PersistenceMetadata,
}

/// Durable home for snapshots (file, object storage, ...)
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn save(&self, snapshot: StoreSnapshot) -> TaskboardResult<PersistenceMetadata>;

    async fn load(&self) -> TaskboardResult<(StoreSnapshot, PersistenceMetadata)>;

    async fn exists(&self) -> bool;

    fn path(&self) -> &Path;
}
