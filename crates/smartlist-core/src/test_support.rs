use crate::error::{HostError, RepositoryError};
use crate::host::{JobHost, ProcessJob, ProgressSink};
use crate::repository::{ListRepository, MemoryListRepository};
use async_trait::async_trait;
use smartlist_models::{
    CatalogId, CatalogItem, FilterSet, ListDefinition, ListId, ListKind, ScanState,
};
use smartlist_sources::{CatalogService, ListStore, RemoteList, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub fn item(id: u64, title: &str, year: u32) -> CatalogItem {
    CatalogItem::new(id, title, Some(year))
}

#[derive(Default)]
pub struct FakeCatalog {
    pub filter_results: Vec<CatalogItem>,
    pub by_name: HashMap<(String, u32), CatalogItem>,
    pub filter_failure: Mutex<Option<SourceError>>,
    pub filter_calls: AtomicUsize,
    pub lookups: Mutex<Vec<(String, u32, Instant)>>,
}

impl FakeCatalog {
    pub fn with_results(items: Vec<CatalogItem>) -> Self {
        Self {
            filter_results: items,
            ..Self::default()
        }
    }

    pub fn with_titles(items: Vec<(&str, u32, CatalogItem)>) -> Self {
        Self {
            by_name: items
                .into_iter()
                .map(|(name, year, item)| ((name.to_string(), year), item))
                .collect(),
            ..Self::default()
        }
    }

    pub fn fail_next_search(&self, error: SourceError) {
        *self.filter_failure.lock().unwrap() = Some(error);
    }

    pub fn lookup_names(&self) -> Vec<(String, u32)> {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .map(|(name, year, _)| (name.clone(), *year))
            .collect()
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search_by_filter(
        &self,
        _kind: ListKind,
        _filters: &FilterSet,
    ) -> Result<Vec<CatalogItem>, SourceError> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.filter_failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.filter_results.clone())
    }

    async fn search_by_name_and_year(
        &self,
        _kind: ListKind,
        name: &str,
        year: u32,
    ) -> Result<Option<CatalogItem>, SourceError> {
        self.lookups
            .lock()
            .unwrap()
            .push((name.to_string(), year, Instant::now()));
        Ok(self.by_name.get(&(name.to_string(), year)).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Fetch(ListId),
    Add(Vec<CatalogId>),
    Remove(Vec<CatalogId>),
    UpdateList(ListId),
}

#[derive(Default)]
pub struct FakeStore {
    pub calls: Mutex<Vec<StoreCall>>,
    pub fetch_failure: Mutex<Option<SourceError>>,
    pub add_failure: Mutex<Option<SourceError>>,
    pub update_failure: Mutex<Option<SourceError>>,
}

impl FakeStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Add/remove calls only
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Add(_) | StoreCall::Remove(_)))
            .collect()
    }

    pub fn fail_next_fetch(&self, error: SourceError) {
        *self.fetch_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_next_add(&self, error: SourceError) {
        *self.add_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_next_update(&self, error: SourceError) {
        *self.update_failure.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl ListStore for FakeStore {
    async fn fetch_list(&self, list_id: ListId) -> Result<RemoteList, SourceError> {
        self.calls.lock().unwrap().push(StoreCall::Fetch(list_id));
        if let Some(error) = self.fetch_failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(RemoteList {
            id: list_id,
            name: format!("remote {}", list_id),
            item_count: None,
        })
    }

    async fn add_items(
        &self,
        _list_id: ListId,
        _kind: ListKind,
        items: &[CatalogItem],
    ) -> Result<(), SourceError> {
        if let Some(error) = self.add_failure.lock().unwrap().take() {
            return Err(error);
        }
        let ids = items.iter().map(|item| item.id).collect();
        self.calls.lock().unwrap().push(StoreCall::Add(ids));
        Ok(())
    }

    async fn remove_items(
        &self,
        _list_id: ListId,
        _kind: ListKind,
        items: &[CatalogId],
    ) -> Result<(), SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Remove(items.to_vec()));
        Ok(())
    }

    async fn update_list(&self, list: &ListDefinition) -> Result<(), SourceError> {
        if let Some(error) = self.update_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.calls.lock().unwrap().push(StoreCall::UpdateList(list.id));
        Ok(())
    }
}

/// Memory repository that also keeps every record handed to `delete`.
#[derive(Default)]
pub struct RecordingRepository {
    inner: MemoryListRepository,
    pub deletes: Mutex<Vec<ListDefinition>>,
}

impl RecordingRepository {
    pub fn with_lists(lists: impl IntoIterator<Item = ListDefinition>) -> Self {
        Self {
            inner: MemoryListRepository::with_lists(lists),
            deletes: Mutex::default(),
        }
    }

    pub fn deletes(&self) -> Vec<ListDefinition> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListRepository for RecordingRepository {
    async fn get(&self, id: ListId) -> Result<Option<ListDefinition>, RepositoryError> {
        self.inner.get(id).await
    }

    async fn update(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        self.inner.update(list).await
    }

    async fn delete(&self, list: &ListDefinition) -> Result<(), RepositoryError> {
        self.deletes.lock().unwrap().push(list.clone());
        self.inner.delete(list).await
    }

    async fn list_all(&self) -> Result<Vec<ListDefinition>, RepositoryError> {
        self.inner.list_all().await
    }

    async fn compare_and_set_scan_state(
        &self,
        id: ListId,
        expected: ScanState,
        next: ScanState,
    ) -> Result<bool, RepositoryError> {
        self.inner.compare_and_set_scan_state(id, expected, next).await
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub jobs: Mutex<Vec<ProcessJob>>,
    pub cycles: Mutex<Vec<Duration>>,
    pub reject_jobs: AtomicBool,
    pub advances: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
}

impl RecordingHost {
    pub fn jobs(&self) -> Vec<ProcessJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn cycles(&self) -> Vec<Duration> {
        self.cycles.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobHost for RecordingHost {
    async fn enqueue(&self, job: ProcessJob) -> Result<(), HostError> {
        if self.reject_jobs.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable("shutting down".to_string()));
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }

    async fn schedule_cycle(&self, delay: Duration) -> Result<(), HostError> {
        self.cycles.lock().unwrap().push(delay);
        Ok(())
    }

    fn progress(&self, _list_id: ListId, _label: &str, _total: usize) -> Box<dyn ProgressSink> {
        Box::new(CountingProgress {
            advances: self.advances.clone(),
            finished: self.finished.clone(),
        })
    }
}

struct CountingProgress {
    advances: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl ProgressSink for CountingProgress {
    fn advance(&mut self) {
        self.advances.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&mut self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}
