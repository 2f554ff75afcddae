use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{TrainsetId, TrainsetRecord, TrainsetSnapshot, TrainsetStatus};
use super::report::views::RecommendationView;
use super::repository::{AlertPublisher, RepositoryError, TrainsetRepository};
use super::service::{FleetService, FleetServiceError};

/// Optional reference date for date-dependent endpoints; defaults to today.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: TrainsetStatus,
}

/// Router builder exposing the trainset store, recommendations, and fleet summary.
pub fn fleet_router<R, A>(service: Arc<FleetService<R, A>>) -> Router
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/trainsets",
            get(list_handler::<R, A>).post(register_handler::<R, A>),
        )
        .route("/api/v1/trainsets/:trainset_id", get(get_handler::<R, A>))
        .route(
            "/api/v1/trainsets/:trainset_id/recommendation",
            get(recommendation_handler::<R, A>),
        )
        .route(
            "/api/v1/trainsets/:trainset_id/status",
            put(status_handler::<R, A>),
        )
        .route(
            "/api/v1/trainsets/:trainset_id/apply",
            post(apply_handler::<R, A>),
        )
        .route(
            "/api/v1/fleet/recommendations",
            get(fleet_recommendations_handler::<R, A>),
        )
        .route("/api/v1/fleet/summary", get(summary_handler::<R, A>))
        .route("/api/v1/recommendations", post(classify_handler::<R, A>))
        .with_state(service)
}

fn error_response(error: FleetServiceError) -> Response {
    let status = match &error {
        FleetServiceError::InvalidSnapshot(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FleetServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        FleetServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FleetServiceError::Repository(RepositoryError::Unavailable(_))
        | FleetServiceError::Alert(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.list() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    axum::Json(record): axum::Json<TrainsetRecord>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.register(record) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Path(trainset_id): Path<String>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.get(&TrainsetId(trainset_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommendation_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Path(trainset_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.recommend(&TrainsetId(trainset_id), query.date()) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Path(trainset_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.set_status(&TrainsetId(trainset_id), request.status) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Path(trainset_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.apply_recommendation(&TrainsetId(trainset_id), query.date()) {
        Ok(transition) => {
            let payload = json!({
                "trainset_id": transition.trainset_id,
                "from": transition.from,
                "to": transition.to,
                "changed": transition.changed(),
                "recommendation": transition.assessment.to_view(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fleet_recommendations_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.assess_fleet(query.date()) {
        Ok(assessments) => {
            let views: Vec<RecommendationView> =
                assessments.iter().map(|assessment| assessment.to_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.summary(query.date()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn classify_handler<R, A>(
    State(service): State<Arc<FleetService<R, A>>>,
    axum::Json(snapshot): axum::Json<TrainsetSnapshot>,
) -> Response
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.classify(&snapshot) {
        Ok(recommendation) => (StatusCode::OK, axum::Json(recommendation)).into_response(),
        Err(error) => error_response(error),
    }
}
