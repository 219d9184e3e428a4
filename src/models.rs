use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const STATUS_FIELD: &str = "status";
pub const OFFICER_FIELD: &str = "nama_petugas";
pub const STATUS_SUBMITTED: &str = "Submitted";

/// One row of a report table, kept as the column map the store returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportRecord(Map<String, Value>);

impl ReportRecord {
    pub fn new(columns: Map<String, Value>) -> Self {
        Self(columns)
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        let columns = pairs
            .into_iter()
            .map(|(key, value)| {
                let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
                (key.to_string(), value)
            })
            .collect();
        Self(columns)
    }

    /// Text value of a column; `None` for null, missing and non-string values.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn status(&self) -> Option<&str> {
        self.text(STATUS_FIELD)
    }

    pub fn officer_name(&self) -> Option<&str> {
        self.text(OFFICER_FIELD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindResult {
    pub total: usize,
    pub laporan: Vec<ReportRecord>,
}

impl KindResult {
    pub fn new(laporan: Vec<ReportRecord>) -> Self {
        Self {
            total: laporan.len(),
            laporan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountResult {
    pub total: i64,
}

/// Per-kind results keyed by kind name, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    entries: Vec<(&'static str, KindResult)>,
}

impl AggregatedResult {
    pub fn push(&mut self, kind: &'static str, result: KindResult) {
        self.entries.push((kind, result));
    }

    pub fn get(&self, kind: &str) -> Option<&KindResult> {
        self.entries
            .iter()
            .find(|(name, _)| *name == kind)
            .map(|(_, result)| result)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &KindResult)> {
        self.entries.iter().map(|(name, result)| (*name, result))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, result)| result.total).sum()
    }
}

impl Serialize for AggregatedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, result) in &self.entries {
            map.serialize_entry(kind, result)?;
        }
        map.end()
    }
}

/// A record tagged with the kind it came from, for cross-kind listings.
#[derive(Debug, Clone, Serialize)]
pub struct LabelledRecord {
    pub kind: &'static str,
    pub label: &'static str,
    pub record: ReportRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub name: &'static str,
    pub label: &'static str,
    pub signature_fields: &'static [&'static str],
    pub supervisor_fields: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregated_result_serializes_in_insertion_order() {
        let mut result = AggregatedResult::default();
        result.push("walking_patrol_master", KindResult::default());
        result.push("behaviour_master", KindResult::default());
        result.push("logbook_harian_master", KindResult::default());

        let json = serde_json::to_string(&result).unwrap();
        let walking = json.find("walking_patrol_master").unwrap();
        let behaviour = json.find("behaviour_master").unwrap();
        let logbook = json.find("logbook_harian_master").unwrap();
        assert!(walking < behaviour && behaviour < logbook);
    }

    #[test]
    fn kind_result_total_tracks_records() {
        let records = vec![
            ReportRecord::from_pairs([("nama_supervisor", Some("Dewi"))]),
            ReportRecord::from_pairs([("nama_supervisor", Some("Rudi"))]),
        ];
        let result = KindResult::new(records);
        assert_eq!(result.total, 2);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["laporan"][1]["nama_supervisor"], "Rudi");
    }

    #[test]
    fn text_ignores_nulls_and_non_strings() {
        let mut columns = Map::new();
        columns.insert("ttd_supervisor".to_string(), Value::Null);
        columns.insert("id".to_string(), Value::from(7));
        columns.insert("status".to_string(), Value::from("Submitted"));
        let record = ReportRecord::new(columns);

        assert_eq!(record.text("ttd_supervisor"), None);
        assert_eq!(record.text("id"), None);
        assert_eq!(record.text("missing"), None);
        assert_eq!(record.id(), Some(7));
        assert_eq!(record.status(), Some("Submitted"));
    }
}
