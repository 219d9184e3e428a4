use std::fmt::Write;

use chrono::NaiveDate;

use crate::merge::flatten;
use crate::models::{AggregatedResult, LabelledRecord, ReportRecord};
use crate::policy::{is_signed, is_unsigned, missing_signatures};
use crate::registry::{self, ReportKind};

fn count_where(
    merged: &AggregatedResult,
    kind: &ReportKind,
    keep: fn(&ReportRecord, &[&str]) -> bool,
) -> usize {
    merged.get(kind.name).map_or(0, |result| {
        result
            .laporan
            .iter()
            .filter(|record| keep(record, kind.signature_fields))
            .count()
    })
}

fn describe(entry: &LabelledRecord, signature_fields: &[&str]) -> String {
    let record = &entry.record;
    let id = record
        .id()
        .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
    let tanggal = record.text("tanggal").unwrap_or("undated");
    let officer = record.officer_name().unwrap_or("unknown officer");
    let status = record.status().unwrap_or("-");
    format!(
        "{} {} ({}) by {}, status {}, missing {}",
        entry.label,
        id,
        tanggal,
        officer,
        status,
        missing_signatures(record, signature_fields).join(" and ")
    )
}

/// Markdown sign-off backlog for one supervisor.
pub fn build_report(
    supervisor: &str,
    generated_on: NaiveDate,
    unsigned: &AggregatedResult,
    signed: &AggregatedResult,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Supervisor Sign-off Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        supervisor, generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Backlog by Report Kind");

    if unsigned.total() == 0 && signed.total() == 0 {
        let _ = writeln!(output, "No reports assigned to this supervisor.");
    } else {
        for kind in registry::all_kinds() {
            let pending = count_where(unsigned, kind, is_unsigned);
            let done = count_where(signed, kind, is_signed);
            if pending == 0 && done == 0 {
                continue;
            }
            let _ = writeln!(
                output,
                "- {}: {} awaiting signature, {} signed",
                kind.label, pending, done
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Awaiting Signature ({})", unsigned.total());

    let pending = flatten(unsigned);
    if pending.is_empty() {
        let _ = writeln!(output, "Nothing awaiting signature.");
    } else {
        for entry in &pending {
            let fields = registry::find(entry.kind).map_or(&[][..], |kind| kind.signature_fields);
            let _ = writeln!(output, "- {}", describe(entry, fields));
        }
    }

    output
}
