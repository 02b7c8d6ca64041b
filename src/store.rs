//! Persistence seam for translation records.

use crate::record::{NewTranslation, TranslationRecord};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Record store for translations.
///
/// Implementations persist what they are given; validation and cache
/// invalidation happen in [`crate::translation::TranslationService`].
#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<TranslationRecord>>;

    /// Name of the record matching both `source_name` and `context`.
    /// A `None` context only matches records without a context.
    async fn find_by_source(
        &self,
        source_name: &str,
        context: Option<&str>,
    ) -> Result<Option<String>>;

    /// Insert a new record and return it with its assigned name
    async fn insert(&self, new: NewTranslation) -> Result<TranslationRecord>;

    /// Overwrite an existing record and return it as stored, or `None` if
    /// it no longer exists. The store sets `modified`.
    async fn update(&self, record: &TranslationRecord) -> Result<Option<TranslationRecord>>;

    /// Returns false if there was nothing to delete
    async fn delete(&self, name: &str) -> Result<bool>;
}

/// In-process store for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    records: BTreeMap<String, TranslationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // Writes replace whole records, so a poisoned lock is still consistent
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<TranslationRecord>> {
        Ok(self.lock().records.get(name).cloned())
    }

    async fn find_by_source(
        &self,
        source_name: &str,
        context: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .lock()
            .records
            .values()
            .find(|r| r.source_name == source_name && r.context.as_deref() == context)
            .map(|r| r.name.clone()))
    }

    async fn insert(&self, new: NewTranslation) -> Result<TranslationRecord> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let record = new.into_record(format!("tr-{:06}", inner.next_id));
        inner.records.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, record: &TranslationRecord) -> Result<Option<TranslationRecord>> {
        let mut inner = self.lock();
        Ok(inner.records.get_mut(&record.name).map(|existing| {
            *existing = TranslationRecord {
                modified: Utc::now(),
                ..record.clone()
            };
            existing.clone()
        }))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.lock().records.remove(name).is_some())
    }
}
