use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAlertPublisher, InMemoryTrainsetRepository};
use crate::routes::with_fleet_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_status::config::AppConfig;
use fleet_status::error::AppError;
use fleet_status::fleet::{import_trainsets_from_path, FleetService, TrainsetRepository};
use fleet_status::telemetry;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryTrainsetRepository::default());
    if let Some(path) = config.fleet.seed_csv.as_deref() {
        seed_repository(repository.as_ref(), path)?;
    }
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let fleet_service = Arc::new(FleetService::new(repository, alerts));

    let app = with_fleet_routes(fleet_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fleet status service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn seed_repository(repository: &InMemoryTrainsetRepository, path: &Path) -> Result<(), AppError> {
    let records = import_trainsets_from_path(path)?;
    let total = records.len();

    for record in records {
        let id = record.id.clone();
        if let Err(error) = repository.upsert(record) {
            warn!(trainset = %id, %error, "failed to seed trainset");
        }
    }

    info!(path = %path.display(), trainsets = total, "trainset store seeded");
    Ok(())
}
