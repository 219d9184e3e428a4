use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, SignoffError};
use crate::filter::Filter;
use crate::models::ReportRecord;
use crate::registry::ReportKind;
use crate::store::RecordStore;

/// In-memory store for tests. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<&'static str, Vec<ReportRecord>>,
    failing: Option<&'static str>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kind: &ReportKind, record: ReportRecord) {
        let mut inner = self.lock();
        inner.tables.entry(kind.table).or_default().push(record);
    }

    /// Makes every query against `kind` fail.
    pub fn fail_on(&self, kind: &ReportKind) {
        self.lock().failing = Some(kind.table);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scan(&self, kind: &ReportKind, filter: &Filter) -> Result<Vec<ReportRecord>> {
        let inner = self.lock();
        if inner.failing == Some(kind.table) {
            return Err(SignoffError::query(kind.name, "connection refused"));
        }
        Ok(inner
            .tables
            .get(kind.table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, kind: &ReportKind, filter: &Filter) -> Result<Vec<ReportRecord>> {
        self.scan(kind, filter)
    }

    async fn count(&self, kind: &ReportKind, filter: &Filter) -> Result<i64> {
        Ok(self.scan(kind, filter)?.len() as i64)
    }

    async fn columns(&self, kind: &ReportKind) -> Result<Vec<String>> {
        let mut columns: Vec<String> = vec!["id".to_string()];
        columns.extend(kind.referenced_columns().map(str::to_string));
        Ok(columns)
    }
}
