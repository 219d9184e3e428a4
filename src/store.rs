use async_trait::async_trait;

use crate::error::Result;
use crate::filter::Filter;
use crate::models::ReportRecord;
use crate::registry::ReportKind;

/// Read access to the report tables.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records of `kind` matching `filter`, in the store's natural order.
    async fn fetch(&self, kind: &ReportKind, filter: &Filter) -> Result<Vec<ReportRecord>>;

    async fn count(&self, kind: &ReportKind, filter: &Filter) -> Result<i64>;

    /// Column names of the table backing `kind`.
    async fn columns(&self, kind: &ReportKind) -> Result<Vec<String>>;
}
