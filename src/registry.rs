use crate::error::{Result, SignoffError};
use crate::models::{KindSummary, OFFICER_FIELD, STATUS_FIELD};
use crate::store::RecordStore;

/// Static description of one report table and its sign-off columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportKind {
    pub name: &'static str,
    pub table: &'static str,
    pub label: &'static str,
    pub signature_fields: &'static [&'static str],
    pub supervisor_fields: &'static [&'static str],
}

impl ReportKind {
    /// Every column a query against this kind may touch.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &'static str> {
        self.signature_fields
            .iter()
            .chain(self.supervisor_fields.iter())
            .copied()
            .chain([STATUS_FIELD, OFFICER_FIELD])
    }

    pub fn summary(&self) -> KindSummary {
        KindSummary {
            name: self.name,
            label: self.label,
            signature_fields: self.signature_fields,
            supervisor_fields: self.supervisor_fields,
        }
    }
}

const SINGLE_SIGNATURE: &[&str] = &["ttd_supervisor"];
const SINGLE_SUPERVISOR: &[&str] = &["nama_supervisor"];
const DUAL_SIGNATURE: &[&str] = &["ttd_supervisor1", "ttd_supervisor2"];
const DUAL_SUPERVISOR: &[&str] = &["nama_supervisor1", "nama_supervisor2"];

const fn single(name: &'static str, label: &'static str) -> ReportKind {
    ReportKind {
        name,
        table: name,
        label,
        signature_fields: SINGLE_SIGNATURE,
        supervisor_fields: SINGLE_SUPERVISOR,
    }
}

pub const LOGBOOK_HARIAN: &str = "logbook_harian_master";

pub static REPORT_KINDS: [ReportKind; 10] = [
    single(LOGBOOK_HARIAN, "Logbook Harian"),
    ReportKind {
        name: "behaviour_master",
        table: "behaviour_master",
        label: "Behaviour",
        signature_fields: DUAL_SIGNATURE,
        supervisor_fields: DUAL_SUPERVISOR,
    },
    single("form_kemajuan_personel_master", "Form Kemajuan Personel"),
    single("laporan_patroli_random_master", "Laporan Patroli Random"),
    single("patroli_darat_master", "Patroli Darat"),
    single("patroli_udara_master", "Patroli Udara"),
    ReportKind {
        name: "rotasi_personel_master",
        table: "rotasi_personel_master",
        label: "Rotasi Personel",
        signature_fields: &["ttd_supervisor", "ttd_supervisor2"],
        supervisor_fields: SINGLE_SUPERVISOR,
    },
    ReportKind {
        name: "suspicious_master",
        table: "suspicious_master",
        label: "Suspicious",
        signature_fields: DUAL_SIGNATURE,
        supervisor_fields: DUAL_SUPERVISOR,
    },
    single("walking_patrol_master", "Walking Patrol"),
    single(
        "walking_patrol_non_terminal_master",
        "Walking Patrol Non Terminal",
    ),
];

pub fn all_kinds() -> &'static [ReportKind] {
    &REPORT_KINDS
}

pub fn find(name: &str) -> Result<&'static ReportKind> {
    REPORT_KINDS
        .iter()
        .find(|kind| kind.name == name)
        .ok_or_else(|| SignoffError::NotFound(name.to_string()))
}

/// Checks that every column the kind references exists in `columns`.
pub fn validate(kind: &ReportKind, columns: &[String]) -> Result<()> {
    if kind.signature_fields.is_empty() || kind.supervisor_fields.is_empty() {
        return Err(SignoffError::Config {
            kind: kind.name.to_string(),
            column: "<none>".to_string(),
        });
    }

    for column in kind.referenced_columns() {
        if !columns.iter().any(|c| c == column) {
            return Err(SignoffError::Config {
                kind: kind.name.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Checks every registered kind against the live schema. Run once at startup.
pub async fn validate_registry(store: &dyn RecordStore) -> Result<()> {
    for kind in all_kinds() {
        let columns = store.columns(kind).await?;
        validate(kind, &columns)?;
    }
    Ok(())
}
