use std::path::Path;
use std::sync::Arc;

use taskboard_core::{AppConfig, TaskboardError, TaskboardResult};
use taskboard_domain::{Taskboard, User};
use taskboard_persistence::{JsonFileStore, MemoryStore, PersistenceStore};

/// One CLI invocation: the data file loaded into memory, the services over it,
/// and the file to write back to.
pub struct CliContext {
    pub app: Taskboard,
    store: Arc<MemoryStore>,
    file: JsonFileStore,
}

impl CliContext {
    pub async fn load(file_path: &Path, config: &AppConfig) -> TaskboardResult<Self> {
        let file = JsonFileStore::new(file_path);

        let store = if file.exists().await {
            let (snapshot, metadata) = file.load().await?;
            tracing::debug!(
                "Loaded snapshot saved at {} by {}",
                metadata.saved_at,
                metadata.instance_id
            );
            MemoryStore::import_snapshot(&snapshot)?
        } else {
            tracing::info!("Starting new data file {}", file_path.display());
            MemoryStore::new()
        };
        let store = Arc::new(store);
        store
            .purge_expired_activity(chrono::Utc::now(), config.effective_activity_retention_days())
            .await;

        Ok(Self {
            app: Taskboard::from_config(store.clone(), config),
            store,
            file,
        })
    }

    /// The user named by `--actor`.
    pub async fn actor(&self, email: Option<&str>) -> TaskboardResult<User> {
        let email = email.ok_or_else(|| {
            TaskboardError::Unauthorized(
                "An actor is required (--actor or TASKBOARD_ACTOR)".to_string(),
            )
        })?;
        self.app.users.resolve_actor(email).await
    }

    pub async fn save(&self) -> TaskboardResult<()> {
        let snapshot = self.store.export_snapshot(self.file.instance_id()).await?;
        self.file.save(snapshot).await?;
        Ok(())
    }
}
