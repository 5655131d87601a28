use crate::error::RepositoryError;
use async_trait::async_trait;
use smartlist_models::{ListDefinition, ListId, ScanState};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Durable home of list definitions.
#[async_trait]
pub trait ListRepository: Send + Sync {
    async fn get(&self, id: ListId) -> Result<Option<ListDefinition>, RepositoryError>;

    /// Insert or replace the record with `list.id`
    async fn update(&self, list: &ListDefinition) -> Result<(), RepositoryError>;

    async fn delete(&self, list: &ListDefinition) -> Result<(), RepositoryError>;

    async fn list_all(&self) -> Result<Vec<ListDefinition>, RepositoryError>;

    /// Atomically move `id` from `expected` to `next`.
    ///
    /// Returns `false` (and writes nothing) when the list is missing or its
    /// current state is not `expected`.
    async fn compare_and_set_scan_state(
        &self,
        id: ListId,
        expected: ScanState,
        next: ScanState,
    ) -> Result<bool, RepositoryError>;
}

/// In-process repository.
#[derive(Debug, Default)]
pub struct MemoryListRepository {
    lists: RwLock<BTreeMap<ListId, ListDefinition>>,
}

impl MemoryListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lists(lists: impl IntoIterator<Item = ListDefinition>) -> Self {
        Self {
            lists: RwLock::new(lists.into_iter().map(|list| (list.id, list)).collect()),
        }
    }
}

#[async_trait]
impl ListRepository for MemoryListRepository {
    async fn get(&self, id: ListId) -> Result<Option<ListDefinition>, RepositoryError> {
        Ok(self.lists.read().await.get(&id).cloned())
    }

    async fn update(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        self.lists.write().await.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        self.lists.write().await.remove(&list.id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ListDefinition>, RepositoryError> {
        Ok(self.lists.read().await.values().cloned().collect())
    }

    async fn compare_and_set_scan_state(
        &self,
        id: ListId,
        expected: ScanState,
        next: ScanState,
    ) -> Result<bool, RepositoryError> {
        let mut lists = self.lists.write().await;
        match lists.get_mut(&id) {
            Some(list) if list.scan_state == expected => {
                list.scan_state = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
