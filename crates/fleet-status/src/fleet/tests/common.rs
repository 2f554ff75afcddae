use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::fleet::domain::{TrainsetId, TrainsetRecord, TrainsetSnapshot, TrainsetStatus};
use crate::fleet::repository::{
    AlertError, AlertPublisher, FleetAlert, RepositoryError, TrainsetRepository,
};
use crate::fleet::{fleet_router, FleetService};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

/// Healthy trainset that lands in the premium ready branch.
pub(super) fn snapshot() -> TrainsetSnapshot {
    TrainsetSnapshot {
        status: TrainsetStatus::Ready,
        availability_percentage: 95.0,
        branding_priority: 9,
        open_job_cards: 0,
        has_critical_jobs: false,
        fitness_expiry_days: 200,
        mileage: 12_000.0,
    }
}

pub(super) fn record(id: &str, expiry_days: i64) -> TrainsetRecord {
    let base = snapshot();
    TrainsetRecord {
        id: TrainsetId(id.to_string()),
        name: Some(format!("Trainset {id}")),
        status: base.status,
        availability_percentage: base.availability_percentage,
        branding_priority: base.branding_priority,
        open_job_cards: base.open_job_cards,
        has_critical_jobs: base.has_critical_jobs,
        fitness_expiry: today() + chrono::Duration::days(expiry_days),
        mileage: base.mileage,
    }
}

pub(super) fn expired_record(id: &str) -> TrainsetRecord {
    record(id, -2)
}

pub(super) fn maintenance_record(id: &str) -> TrainsetRecord {
    TrainsetRecord {
        availability_percentage: 80.0,
        open_job_cards: 3,
        status: TrainsetStatus::Standby,
        ..record(id, 120)
    }
}

pub(super) fn build_service() -> (
    FleetService<MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = FleetService::new(repository.clone(), alerts.clone());
    (service, repository, alerts)
}

pub(super) fn seeded_service(
    records: Vec<TrainsetRecord>,
) -> (
    FleetService<MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let (service, repository, alerts) = build_service();
    for record in records {
        service.register(record).expect("seed record registers");
    }
    (service, repository, alerts)
}

/// Insertion-ordered store, mirroring the order guarantees of the production adapter.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<TrainsetRecord>>>,
}

impl TrainsetRepository for MemoryRepository {
    fn insert(&self, record: TrainsetRecord) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn upsert(&self, record: TrainsetRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => guard.push(record),
        }
        Ok(())
    }

    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<TrainsetRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn update_status(
        &self,
        id: &TrainsetId,
        status: TrainsetStatus,
    ) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<FleetAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<FleetAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: FleetAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

/// Rejects the first `failures` publishes, then records like [`MemoryAlerts`].
pub(super) struct FlakyAlerts {
    failures: Mutex<usize>,
    delivered: MemoryAlerts,
}

impl FlakyAlerts {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            delivered: MemoryAlerts::default(),
        }
    }

    pub(super) fn events(&self) -> Vec<FleetAlert> {
        self.delivered.events()
    }
}

impl AlertPublisher for FlakyAlerts {
    fn publish(&self, alert: FleetAlert) -> Result<(), AlertError> {
        let mut remaining = self.failures.lock().expect("alert mutex poisoned");
        if *remaining > 0 {
            *remaining -= 1;
            return Err(AlertError::Transport("pager offline".to_string()));
        }
        self.delivered.publish(alert)
    }
}

pub(super) struct UnavailableRepository;

impl TrainsetRepository for UnavailableRepository {
    fn insert(&self, _record: TrainsetRecord) -> Result<TrainsetRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, _record: TrainsetRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TrainsetId) -> Result<Option<TrainsetRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<TrainsetRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &TrainsetId,
        _status: TrainsetStatus,
    ) -> Result<TrainsetRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: FleetService<MemoryRepository, MemoryAlerts>,
) -> axum::Router {
    fleet_router(Arc::new(service))
}
