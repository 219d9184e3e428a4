use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::models::{AggregatedResult, CountResult, KindResult, KindSummary};
use crate::registry::{self, LOGBOOK_HARIAN};

#[derive(Clone)]
pub struct AppState {
    aggregator: Aggregator,
}

pub fn router(aggregator: Aggregator) -> Router {
    let state = AppState { aggregator };
    let api = Router::new()
        .route("/ttd-supervisor-kosong", get(unsigned_by_officer_any))
        .route("/ttd-supervisor-kosong/{nama}", get(unsigned_by_officer))
        .route(
            "/laporan-belum-ttd-supervisor/{nama}",
            get(unsigned_by_supervisor),
        )
        .route(
            "/logbook-harian-master/belum-ttd-supervisor/{nama}",
            get(logbook_submitted),
        )
        .route(
            "/logbook-harian-master/sudah-ttd-supervisor/{nama}",
            get(signed_by_supervisor),
        )
        .route(
            "/logbook-harian-master/count-belum-ttd-supervisor/{nama}",
            get(count_unsigned),
        )
        .route("/report-kinds", get(report_kinds))
        .route(
            "/{kind}/ttd-supervisor-kosong-flat/{nama}",
            get(kind_unsigned_by_officer),
        )
        .route(
            "/{kind}/belum-ttd-supervisor-flat/{nama}",
            get(kind_unsigned_by_supervisor),
        )
        .route(
            "/{kind}/sudah-ttd-supervisor-flat/{nama}",
            get(kind_signed_by_supervisor),
        );

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn unsigned_by_officer_any(
    State(st): State<AppState>,
) -> Result<Json<AggregatedResult>, AppError> {
    Ok(Json(st.aggregator.unsigned_by_officer_all(None).await?))
}

async fn unsigned_by_officer(
    State(st): State<AppState>,
    Path(nama): Path<String>,
) -> Result<Json<AggregatedResult>, AppError> {
    Ok(Json(st.aggregator.unsigned_by_officer_all(Some(&nama)).await?))
}

async fn unsigned_by_supervisor(
    State(st): State<AppState>,
    Path(nama): Path<String>,
) -> Result<Json<AggregatedResult>, AppError> {
    Ok(Json(st.aggregator.unsigned_by_supervisor_all(&nama).await?))
}

async fn logbook_submitted(
    State(st): State<AppState>,
    Path(nama): Path<String>,
) -> Result<Json<KindResult>, AppError> {
    let kind = registry::find(LOGBOOK_HARIAN)?;
    Ok(Json(st.aggregator.submitted_by_supervisor(kind, &nama).await?))
}

async fn signed_by_supervisor(
    State(st): State<AppState>,
    Path(nama): Path<String>,
) -> Result<Json<AggregatedResult>, AppError> {
    Ok(Json(st.aggregator.signed_by_supervisor_all(&nama).await?))
}

async fn count_unsigned(
    State(st): State<AppState>,
    Path(nama): Path<String>,
) -> Result<Json<CountResult>, AppError> {
    let total = st.aggregator.count_unsigned_all(&nama).await?;
    Ok(Json(CountResult { total }))
}

async fn report_kinds() -> Json<Vec<KindSummary>> {
    Json(registry::all_kinds().iter().map(|k| k.summary()).collect())
}

async fn kind_unsigned_by_officer(
    State(st): State<AppState>,
    Path((kind, nama)): Path<(String, String)>,
) -> Result<Json<KindResult>, AppError> {
    let kind = registry::find(&kind)?;
    Ok(Json(st.aggregator.unsigned_by_officer(kind, Some(&nama)).await?))
}

async fn kind_unsigned_by_supervisor(
    State(st): State<AppState>,
    Path((kind, nama)): Path<(String, String)>,
) -> Result<Json<KindResult>, AppError> {
    let kind = registry::find(&kind)?;
    Ok(Json(st.aggregator.unsigned_by_supervisor(kind, &nama).await?))
}

async fn kind_signed_by_supervisor(
    State(st): State<AppState>,
    Path((kind, nama)): Path<(String, String)>,
) -> Result<Json<KindResult>, AppError> {
    let kind = registry::find(&kind)?;
    Ok(Json(st.aggregator.signed_by_supervisor(kind, &nama).await?))
}

/// Every failure is reported as a 500 with an `error` message body.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(value: E) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
