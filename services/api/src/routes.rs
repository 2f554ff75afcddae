use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use fleet_status::error::AppError;
use fleet_status::fleet::{
    assess_records, fleet_router, import_trainsets, AlertPublisher, FleetReport, FleetService,
    FleetSummary, RecommendationView, TrainsetRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Ad-hoc fleet report over an uploaded trainset CSV; nothing is stored.
#[derive(Debug, Deserialize)]
pub(crate) struct FleetReportRequest {
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FleetReportResponse {
    pub(crate) today: NaiveDate,
    pub(crate) recommendations: Vec<RecommendationView>,
    pub(crate) summary: FleetSummary,
}

pub(crate) fn with_fleet_routes<R, A>(service: Arc<FleetService<R, A>>) -> axum::Router
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    fleet_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/fleet/report",
            axum::routing::post(fleet_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn fleet_report_endpoint(
    Json(payload): Json<FleetReportRequest>,
) -> Result<Json<FleetReportResponse>, AppError> {
    let FleetReportRequest { csv, today } = payload;

    let records = import_trainsets(Cursor::new(csv.into_bytes()))?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let assessments = assess_records(&records, today);
    let summary = FleetReport::build(&assessments).summary();

    Ok(Json(FleetReportResponse {
        today,
        recommendations: assessments
            .iter()
            .map(|assessment| assessment.to_view())
            .collect(),
        summary,
    }))
}
