use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool, Row};
use tracing::debug;

use crate::error::{Result, SignoffError};
use crate::filter::Filter;
use crate::models::ReportRecord;
use crate::registry::{self, ReportKind};
use crate::store::RecordStore;

pub const SCHEMA: &str = "signoff";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed report tables.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn where_clause(filter: &Filter) -> (String, Vec<String>) {
    let mut binds = Vec::new();
    let sql = filter.to_sql(&mut binds);
    (sql, binds)
}

#[async_trait]
impl RecordStore for PgStore {
    async fn fetch(&self, kind: &ReportKind, filter: &Filter) -> Result<Vec<ReportRecord>> {
        let (predicate, binds) = where_clause(filter);
        let query = format!(
            "SELECT to_jsonb(t) AS row FROM {SCHEMA}.\"{}\" t WHERE {predicate} ORDER BY t.id",
            kind.table
        );
        debug!(kind = kind.name, %query, "fetching reports");

        let mut rows = sqlx::query(&query);
        for value in &binds {
            rows = rows.bind(value);
        }

        let records = rows
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SignoffError::query(kind.name, e))?;

        let mut reports = Vec::with_capacity(records.len());
        for row in records {
            let value: Value = row
                .try_get("row")
                .map_err(|e| SignoffError::query(kind.name, e))?;
            match value {
                Value::Object(columns) => reports.push(ReportRecord::new(columns)),
                other => {
                    return Err(SignoffError::query(
                        kind.name,
                        format!("expected a row object, got {other}"),
                    ))
                }
            }
        }

        Ok(reports)
    }

    async fn count(&self, kind: &ReportKind, filter: &Filter) -> Result<i64> {
        let (predicate, binds) = where_clause(filter);
        let query = format!(
            "SELECT COUNT(*) AS total FROM {SCHEMA}.\"{}\" WHERE {predicate}",
            kind.table
        );
        debug!(kind = kind.name, %query, "counting reports");

        let mut rows = sqlx::query(&query);
        for value in &binds {
            rows = rows.bind(value);
        }

        let row = rows
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SignoffError::query(kind.name, e))?;
        row.try_get("total")
            .map_err(|e| SignoffError::query(kind.name, e))
    }

    async fn columns(&self, kind: &ReportKind) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT column_name::text AS column_name
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#,
        )
        .bind(SCHEMA)
        .bind(kind.table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SignoffError::query(kind.name, e))?;

        Ok(rows.iter().map(|row| row.get("column_name")).collect())
    }
}

/// Columns to list in the `INSERT` for `row`. Null values are left out so the
/// table's column defaults apply.
fn insert_columns(
    kind: &ReportKind,
    known_columns: &[String],
    row: &Map<String, Value>,
) -> anyhow::Result<Vec<String>> {
    let mut columns = Vec::new();
    for (key, value) in row {
        if key == "id" {
            continue;
        }
        if !known_columns.iter().any(|c| c == key) {
            anyhow::bail!("{} has no column named {key}", kind.name);
        }
        if value.is_null() {
            continue;
        }
        columns.push(format!("\"{key}\""));
    }
    Ok(columns)
}

/// Inserts one report row, ignoring rows whose `source_key` already exists.
/// Returns whether a row was written.
async fn insert_report(
    conn: &mut PgConnection,
    kind: &ReportKind,
    known_columns: &[String],
    row: Map<String, Value>,
) -> anyhow::Result<bool> {
    let column_list = insert_columns(kind, known_columns, &row)?.join(", ");

    let query = format!(
        "INSERT INTO {SCHEMA}.\"{table}\" ({column_list}) \
         SELECT {column_list} FROM jsonb_populate_record(NULL::{SCHEMA}.\"{table}\", $1) \
         ON CONFLICT (source_key) DO NOTHING",
        table = kind.table
    );

    let result = sqlx::query(&query)
        .bind(Value::Object(row))
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to insert into {}", kind.table))?;

    Ok(result.rows_affected() > 0)
}

fn sample(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| {
            let value = if value.is_empty() {
                Value::Null
            } else {
                Value::String(value.to_string())
            };
            (key.to_string(), value)
        })
        .collect()
}

pub async fn seed(store: &PgStore) -> anyhow::Result<usize> {
    let samples = vec![
        (
            registry::LOGBOOK_HARIAN,
            sample(&[
                ("source_key", "seed-logbook-001"),
                ("tanggal", "2026-02-02"),
                ("shift", "Pagi"),
                ("lokasi", "Terminal 1"),
                ("nama_petugas", "Budi Santoso"),
                ("nama_yg_menyerahkan", "Budi Santoso"),
                ("nama_yg_menerima", "Sari Wulandari"),
                ("nama_supervisor", "Dewi Lestari"),
                ("ttd_supervisor", ""),
                ("status", "Submitted"),
            ]),
        ),
        (
            registry::LOGBOOK_HARIAN,
            sample(&[
                ("source_key", "seed-logbook-002"),
                ("tanggal", "2026-02-01"),
                ("shift", "Malam"),
                ("lokasi", "Terminal 2"),
                ("nama_petugas", "Sari Wulandari"),
                ("nama_supervisor", "Dewi Lestari"),
                ("ttd_supervisor", "data:image/png;base64,c2lnbmVk"),
                ("status", "Approved"),
            ]),
        ),
        (
            "behaviour_master",
            sample(&[
                ("source_key", "seed-behaviour-001"),
                ("tanggal", "2026-02-02"),
                ("lokasi", "Gate A3"),
                ("nama_petugas", "Budi Santoso"),
                ("nama_supervisor1", "Rudi Hartono"),
                ("nama_supervisor2", "Dewi Lestari"),
                ("ttd_supervisor1", ""),
                ("ttd_supervisor2", "data:image/png;base64,c2lnbmVk"),
                ("status", "Submitted"),
            ]),
        ),
        (
            "patroli_darat_master",
            sample(&[
                ("source_key", "seed-patroli-darat-001"),
                ("tanggal", "2026-01-30"),
                ("lokasi", "Perimeter Utara"),
                ("nama_petugas", "Agus Pratama"),
                ("nama_supervisor", "Rudi Hartono"),
                ("status", "Submitted"),
            ]),
        ),
        (
            "rotasi_personel_master",
            sample(&[
                ("source_key", "seed-rotasi-001"),
                ("tanggal", "2026-01-29"),
                ("lokasi", "Terminal 1"),
                ("nama_petugas", "Agus Pratama"),
                ("nama_supervisor", "Rudi Hartono"),
                ("ttd_supervisor", "data:image/png;base64,c2lnbmVk"),
                ("ttd_supervisor2", ""),
                ("status", "Submitted"),
            ]),
        ),
    ];

    let mut tx = store.pool().begin().await?;
    let mut inserted = 0usize;
    for (kind_name, row) in samples {
        let kind = registry::find(kind_name)?;
        let columns = store.columns(kind).await?;
        if insert_report(&mut *tx, kind, &columns, row).await? {
            inserted += 1;
        }
    }
    tx.commit().await?;

    Ok(inserted)
}

/// Imports report rows from a CSV whose headers are column names of `kind`.
/// Empty cells fall back to the column default; rows without `source_key` get
/// a generated one. The import is all or nothing.
pub async fn import_csv(
    store: &PgStore,
    kind: &ReportKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let columns = store.columns(kind).await?;
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut tx = store.pool().begin().await?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<std::collections::BTreeMap<String, String>>() {
        let record = result?;
        let mut row: Map<String, Value> = record
            .into_iter()
            .map(|(key, value)| {
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::String(value)
                };
                (key, value)
            })
            .collect();

        let has_key = row.get("source_key").is_some_and(|v| !v.is_null());
        if !has_key {
            row.insert(
                "source_key".to_string(),
                Value::String(format!("import-{}", uuid::Uuid::new_v4())),
            );
        }

        if insert_report(&mut *tx, kind, &columns, row).await? {
            inserted += 1;
        }
    }
    tx.commit().await?;

    Ok(inserted)
}
