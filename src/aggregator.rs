use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::filter::Filter;
use crate::models::{KindResult, OFFICER_FIELD, STATUS_FIELD, STATUS_SUBMITTED};
use crate::policy::{signed_filter, supervisor_filter, unsigned_filter};
use crate::registry::{self, ReportKind};
use crate::store::RecordStore;

/// Any signature blank, optionally limited to one officer's reports.
/// A missing or empty officer name applies no officer filter.
pub fn unsigned_by_officer_filter(kind: &ReportKind, officer: Option<&str>) -> Filter {
    let officer = match officer {
        Some(name) if !name.is_empty() => Filter::equals(OFFICER_FIELD, name),
        _ => Filter::Always,
    };
    unsigned_filter(kind.signature_fields).and(officer)
}

pub fn unsigned_by_supervisor_filter(kind: &ReportKind, supervisor: &str) -> Filter {
    supervisor_filter(kind.supervisor_fields, supervisor)
        .and(unsigned_filter(kind.signature_fields))
}

pub fn signed_by_supervisor_filter(kind: &ReportKind, supervisor: &str) -> Filter {
    supervisor_filter(kind.supervisor_fields, supervisor)
        .and(signed_filter(kind.signature_fields))
}

/// Primary supervisor column equals `supervisor` and the workflow status is
/// `Submitted`. Signature columns are not consulted.
pub fn submitted_by_supervisor_filter(kind: &ReportKind, supervisor: &str) -> Filter {
    let primary = kind
        .supervisor_fields
        .first()
        .map_or(Filter::Never, |field| supervisor_filter(&[*field], supervisor));
    primary.and(Filter::equals(STATUS_FIELD, STATUS_SUBMITTED))
}

/// Runs sign-off queries against a record store.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn RecordStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self, kind: &ReportKind, filter: &Filter) -> Result<KindResult> {
        let laporan = self.store.fetch(kind, filter).await?;
        debug!(kind = kind.name, total = laporan.len(), "query finished");
        Ok(KindResult::new(laporan))
    }

    pub async fn unsigned_by_officer(
        &self,
        kind: &ReportKind,
        officer: Option<&str>,
    ) -> Result<KindResult> {
        self.run(kind, &unsigned_by_officer_filter(kind, officer)).await
    }

    pub async fn unsigned_by_supervisor(
        &self,
        kind: &ReportKind,
        supervisor: &str,
    ) -> Result<KindResult> {
        self.run(kind, &unsigned_by_supervisor_filter(kind, supervisor))
            .await
    }

    pub async fn signed_by_supervisor(
        &self,
        kind: &ReportKind,
        supervisor: &str,
    ) -> Result<KindResult> {
        self.run(kind, &signed_by_supervisor_filter(kind, supervisor))
            .await
    }

    pub async fn submitted_by_supervisor(
        &self,
        kind: &ReportKind,
        supervisor: &str,
    ) -> Result<KindResult> {
        self.run(kind, &submitted_by_supervisor_filter(kind, supervisor))
            .await
    }

    /// Unsigned reports for `supervisor` summed over every kind. The first
    /// store failure aborts the whole count.
    pub async fn count_unsigned_all(&self, supervisor: &str) -> Result<i64> {
        let mut total = 0i64;
        for kind in registry::all_kinds() {
            let filter = unsigned_by_supervisor_filter(kind, supervisor);
            total += self.store.count(kind, &filter).await?;
        }
        Ok(total)
    }
}
