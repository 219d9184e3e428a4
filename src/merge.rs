use tracing::info;

use crate::aggregator::{
    signed_by_supervisor_filter, unsigned_by_officer_filter, unsigned_by_supervisor_filter,
    Aggregator,
};
use crate::error::Result;
use crate::filter::Filter;
use crate::models::{AggregatedResult, LabelledRecord};
use crate::registry::{self, ReportKind};

impl Aggregator {
    /// Runs one filter per kind over the whole registry, in declaration order.
    /// Any store failure aborts the merge.
    async fn merge_all<F>(&self, build: F) -> Result<AggregatedResult>
    where
        F: Fn(&ReportKind) -> Filter,
    {
        let mut merged = AggregatedResult::default();
        for kind in registry::all_kinds() {
            let result = self.run(kind, &build(kind)).await?;
            merged.push(kind.name, result);
        }
        Ok(merged)
    }

    pub async fn unsigned_by_officer_all(
        &self,
        officer: Option<&str>,
    ) -> Result<AggregatedResult> {
        let merged = self
            .merge_all(|kind| unsigned_by_officer_filter(kind, officer))
            .await?;
        info!(
            officer = officer.unwrap_or("*"),
            total = merged.total(),
            "unsigned reports by officer"
        );
        Ok(merged)
    }

    pub async fn unsigned_by_supervisor_all(&self, supervisor: &str) -> Result<AggregatedResult> {
        let merged = self
            .merge_all(|kind| unsigned_by_supervisor_filter(kind, supervisor))
            .await?;
        info!(supervisor, total = merged.total(), "unsigned reports by supervisor");
        Ok(merged)
    }

    pub async fn signed_by_supervisor_all(&self, supervisor: &str) -> Result<AggregatedResult> {
        let merged = self
            .merge_all(|kind| signed_by_supervisor_filter(kind, supervisor))
            .await?;
        info!(supervisor, total = merged.total(), "signed reports by supervisor");
        Ok(merged)
    }
}

/// Flattens a merged result into one list, each record tagged with its kind.
pub fn flatten(merged: &AggregatedResult) -> Vec<LabelledRecord> {
    let mut records = Vec::with_capacity(merged.total());
    for (kind_name, result) in merged.iter() {
        let label = registry::find(kind_name).map_or(kind_name, |kind| kind.label);
        for record in &result.laporan {
            records.push(LabelledRecord {
                kind: kind_name,
                label,
                record: record.clone(),
            });
        }
    }
    records
}
