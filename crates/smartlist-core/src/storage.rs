use crate::error::RepositoryError;
use crate::repository::ListRepository;
use async_trait::async_trait;
use smartlist_models::{ListDefinition, ListId, ScanState};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// List repository backed by a single JSON file.
///
/// Every operation is a read-modify-write under one mutex, which makes
/// `compare_and_set_scan_state` atomic for all workers sharing this instance.
/// Writes go to a temp file that is renamed over the original.
pub struct JsonListRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonListRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<ListId, ListDefinition>, RepositoryError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "List store does not exist yet");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        let lists: Vec<ListDefinition> = serde_json::from_slice(&data)?;
        Ok(lists.into_iter().map(|list| (list.id, list)).collect())
    }

    async fn save(&self, lists: &BTreeMap<ListId, ListDefinition>) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let records: Vec<&ListDefinition> = lists.values().collect();
        let encoded = serde_json::to_vec_pretty(&records)?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, encoded).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ListRepository for JsonListRepository {
    async fn get(&self, id: ListId) -> Result<Option<ListDefinition>, RepositoryError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(&id))
    }

    async fn update(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut lists = self.load().await?;
        lists.insert(list.id, list.clone());
        self.save(&lists).await
    }

    async fn delete(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut lists = self.load().await?;
        if lists.remove(&list.id).is_some() {
            self.save(&lists).await?;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ListDefinition>, RepositoryError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_values().collect())
    }

    async fn compare_and_set_scan_state(
        &self,
        id: ListId,
        expected: ScanState,
        next: ScanState,
    ) -> Result<bool, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut lists = self.load().await?;
        match lists.get_mut(&id) {
            Some(list) if list.scan_state == expected => {
                list.scan_state = next;
                self.save(&lists).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
