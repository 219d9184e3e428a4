//! Sign-off classification rules.
//!
//! A record is unsigned as soon as any one of its signature columns is blank,
//! and signed only when every signature column is filled. A dual-signature
//! record with one signature present is therefore unsigned and not signed.

use crate::filter::Filter;
use crate::models::ReportRecord;

pub fn is_blank(record: &ReportRecord, field: &str) -> bool {
    record.text(field).map_or(true, str::is_empty)
}

pub fn is_unsigned(record: &ReportRecord, signature_fields: &[&str]) -> bool {
    signature_fields.iter().any(|field| is_blank(record, field))
}

pub fn is_signed(record: &ReportRecord, signature_fields: &[&str]) -> bool {
    signature_fields.iter().all(|field| !is_blank(record, field))
}

/// Signature columns still blank on `record`, in declaration order.
pub fn missing_signatures<'a>(
    record: &ReportRecord,
    signature_fields: &[&'a str],
) -> Vec<&'a str> {
    signature_fields
        .iter()
        .copied()
        .filter(|field| is_blank(record, field))
        .collect()
}

pub fn unsigned_filter(signature_fields: &[&'static str]) -> Filter {
    Filter::Any(signature_fields.iter().copied().map(Filter::Blank).collect())
}

pub fn signed_filter(signature_fields: &[&'static str]) -> Filter {
    Filter::All(signature_fields.iter().copied().map(Filter::Filled).collect())
}

/// Any of the supervisor columns holds `name`. A blank name matches nothing.
pub fn supervisor_filter(supervisor_fields: &[&'static str], name: &str) -> Filter {
    if name.is_empty() {
        return Filter::Never;
    }
    Filter::Any(
        supervisor_fields
            .iter()
            .map(|field| Filter::equals(*field, name))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUAL: &[&str] = &["ttd_supervisor1", "ttd_supervisor2"];

    fn dual_record(first: Option<&str>, second: Option<&str>) -> ReportRecord {
        ReportRecord::from_pairs([
            ("nama_supervisor1", Some("Rudi")),
            ("ttd_supervisor1", first),
            ("ttd_supervisor2", second),
        ])
    }

    #[test]
    fn half_signed_dual_record_is_unsigned_only() {
        let record = dual_record(Some(""), Some("sig-data"));
        assert!(is_unsigned(&record, DUAL));
        assert!(!is_signed(&record, DUAL));
    }

    #[test]
    fn missing_signatures_lists_blank_columns() {
        let record = dual_record(None, Some("sig"));
        assert_eq!(missing_signatures(&record, DUAL), vec!["ttd_supervisor1"]);
        assert!(missing_signatures(&dual_record(Some("a"), Some("b")), DUAL).is_empty());
    }

    #[test]
    fn single_signature_partitions_are_complementary() {
        let fields: &[&str] = &["ttd_supervisor"];
        for value in [None, Some(""), Some("sig-data")] {
            let record = ReportRecord::from_pairs([("ttd_supervisor", value)]);
            assert_ne!(is_unsigned(&record, fields), is_signed(&record, fields));
        }
    }

    #[test]
    fn filters_agree_with_predicates() {
        let cases = [
            dual_record(None, None),
            dual_record(Some("a"), None),
            dual_record(None, Some("b")),
            dual_record(Some(""), Some("b")),
            dual_record(Some("a"), Some("b")),
        ];
        for record in &cases {
            assert_eq!(unsigned_filter(DUAL).matches(record), is_unsigned(record, DUAL));
            assert_eq!(signed_filter(DUAL).matches(record), is_signed(record, DUAL));
        }
    }

    #[test]
    fn supervisor_filter_matches_either_column() {
        let fields: &[&str] = &["nama_supervisor1", "nama_supervisor2"];
        let record = ReportRecord::from_pairs([
            ("nama_supervisor1", Some("Andi")),
            ("nama_supervisor2", Some("Rudi")),
        ]);
        assert!(supervisor_filter(fields, "Rudi").matches(&record));
        assert!(supervisor_filter(fields, "Andi").matches(&record));
        assert!(!supervisor_filter(fields, "Dewi").matches(&record));
    }

    #[test]
    fn blank_supervisor_name_matches_nothing() {
        let fields: &[&str] = &["nama_supervisor"];
        let record = ReportRecord::from_pairs([("nama_supervisor", Some(""))]);
        assert_eq!(supervisor_filter(fields, ""), Filter::Never);
        assert!(!supervisor_filter(fields, "").matches(&record));
    }
}
