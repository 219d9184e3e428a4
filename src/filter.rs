use std::fmt::Write;

use crate::models::ReportRecord;

/// Predicate over report columns, evaluated in memory or rendered to SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Always,
    Never,
    Equals { field: &'static str, value: String },
    /// Null, missing or empty string.
    Blank(&'static str),
    /// Neither null nor empty string.
    Filled(&'static str),
    Any(Vec<Filter>),
    All(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: &'static str, value: &str) -> Self {
        Filter::Equals {
            field,
            value: value.to_string(),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Always, f) | (f, Filter::Always) => f,
            (Filter::All(mut left), right) => {
                left.push(right);
                Filter::All(left)
            }
            (left, right) => Filter::All(vec![left, right]),
        }
    }

    pub fn matches(&self, record: &ReportRecord) -> bool {
        match self {
            Filter::Always => true,
            Filter::Never => false,
            Filter::Equals { field, value } => record.text(field) == Some(value.as_str()),
            Filter::Blank(field) => record.text(field).map_or(true, str::is_empty),
            Filter::Filled(field) => !Filter::Blank(*field).matches(record),
            Filter::Any(filters) => filters.iter().any(|f| f.matches(record)),
            Filter::All(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }

    /// Renders a Postgres boolean expression. Values go to `binds` and are
    /// referenced positionally; column names come from the registry only.
    pub fn to_sql(&self, binds: &mut Vec<String>) -> String {
        match self {
            Filter::Always => "TRUE".to_string(),
            Filter::Never => "FALSE".to_string(),
            Filter::Equals { field, value } => {
                binds.push(value.clone());
                format!("\"{field}\" = ${}", binds.len())
            }
            Filter::Blank(field) => format!("(\"{field}\" IS NULL OR \"{field}\" = '')"),
            Filter::Filled(field) => {
                format!("(\"{field}\" IS NOT NULL AND \"{field}\" <> '')")
            }
            Filter::Any(filters) => join(filters, " OR ", "FALSE", binds),
            Filter::All(filters) => join(filters, " AND ", "TRUE", binds),
        }
    }
}

fn join(filters: &[Filter], op: &str, empty: &str, binds: &mut Vec<String>) -> String {
    if filters.is_empty() {
        return empty.to_string();
    }

    let mut sql = String::from("(");
    for (idx, filter) in filters.iter().enumerate() {
        if idx > 0 {
            sql.push_str(op);
        }
        let _ = write!(sql, "{}", filter.to_sql(binds));
    }
    sql.push(')');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_covers_null_missing_and_empty() {
        let record = ReportRecord::from_pairs([("a", None), ("b", Some("")), ("c", Some("sig"))]);
        assert!(Filter::Blank("a").matches(&record));
        assert!(Filter::Blank("b").matches(&record));
        assert!(Filter::Blank("missing").matches(&record));
        assert!(!Filter::Blank("c").matches(&record));
        assert!(Filter::Filled("c").matches(&record));
    }

    #[test]
    fn renders_nested_sql_with_positional_binds() {
        let filter = Filter::All(vec![
            Filter::Any(vec![
                Filter::equals("nama_supervisor1", "Rudi"),
                Filter::equals("nama_supervisor2", "Rudi"),
            ]),
            Filter::Any(vec![Filter::Blank("ttd_supervisor1"), Filter::Blank("ttd_supervisor2")]),
        ]);

        let mut binds = Vec::new();
        let sql = filter.to_sql(&mut binds);
        assert_eq!(
            sql,
            "((\"nama_supervisor1\" = $1 OR \"nama_supervisor2\" = $2) AND \
             ((\"ttd_supervisor1\" IS NULL OR \"ttd_supervisor1\" = '') OR \
             (\"ttd_supervisor2\" IS NULL OR \"ttd_supervisor2\" = '')))"
        );
        assert_eq!(binds, vec!["Rudi".to_string(), "Rudi".to_string()]);
    }

    #[test]
    fn filled_renders_not_null_and_not_empty() {
        let filter = Filter::All(vec![
            Filter::Filled("ttd_supervisor1"),
            Filter::Filled("ttd_supervisor2"),
        ]);

        let mut binds = Vec::new();
        assert_eq!(
            filter.to_sql(&mut binds),
            "((\"ttd_supervisor1\" IS NOT NULL AND \"ttd_supervisor1\" <> '') AND \
             (\"ttd_supervisor2\" IS NOT NULL AND \"ttd_supervisor2\" <> ''))"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn empty_groups_render_as_constants() {
        let mut binds = Vec::new();
        assert_eq!(Filter::Any(vec![]).to_sql(&mut binds), "FALSE");
        assert_eq!(Filter::All(vec![]).to_sql(&mut binds), "TRUE");
        assert!(binds.is_empty());
    }

    #[test]
    fn and_drops_always_and_flattens() {
        let filter = Filter::Always.and(Filter::Blank("x"));
        assert_eq!(filter, Filter::Blank("x"));

        let filter = Filter::Blank("x").and(Filter::Blank("y")).and(Filter::Blank("z"));
        assert_eq!(
            filter,
            Filter::All(vec![Filter::Blank("x"), Filter::Blank("y"), Filter::Blank("z")])
        );
    }
}
