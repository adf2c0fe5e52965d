use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot, FORMAT_VERSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskboard_core::{TaskboardError, TaskboardResult};
use uuid::Uuid;

/// Snapshot store backed by one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
}

/// On-disk layout: `{ "version": 1, "metadata": {...}, "data": {...} }`
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> TaskboardResult<PersistenceMetadata> {
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();
        snapshot.metadata.format_version = FORMAT_VERSION;

        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: snapshot.metadata.clone(),
            data: serde_json::from_slice(&snapshot.data)?,
        };
        let json_bytes = serde_json::to_vec_pretty(&envelope)?;

        AtomicWriter::write_atomic(&self.path, &json_bytes).await?;
        tracing::info!(
            "Saved {} bytes to {}",
            json_bytes.len(),
            self.path.display()
        );

        Ok(snapshot.metadata)
    }

    async fn load(&self) -> TaskboardResult<(StoreSnapshot, PersistenceMetadata)> {
        let file_bytes = AtomicWriter::read_all(&self.path).await?;
        let envelope: JsonEnvelope = serde_json::from_slice(&file_bytes)?;

        if envelope.version != FORMAT_VERSION {
            return Err(TaskboardError::Serialization(format!(
                "Unsupported format version {} in {}",
                envelope.version,
                self.path.display()
            )));
        }

        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&envelope.data)?,
            metadata: envelope.metadata.clone(),
        };
        tracing::info!(
            "Loaded {} bytes from {}",
            file_bytes.len(),
            self.path.display()
        );

        Ok((snapshot, envelope.metadata))
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
