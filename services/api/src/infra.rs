use chrono::NaiveDate;
use fleet_status::fleet::{
    AlertError, AlertPublisher, FleetAlert, RepositoryError, TrainsetId, TrainsetRecord,
    TrainsetRepository, TrainsetStatus,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local trainset store; records keep registration order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryTrainsetRepository {
    records: Arc<Mutex<Vec<TrainsetRecord>>>,
}

impl InMemoryTrainsetRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<TrainsetRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("trainset store lock poisoned".to_string()))
    }
}

impl TrainsetRepository for InMemoryTrainsetRepository {
    fn insert(&self, record: TrainsetRecord) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn upsert(&self, record: TrainsetRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => guard.push(record),
        }
        Ok(())
    }

    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<TrainsetRecord>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn update_status(
        &self,
        id: &TrainsetId,
        status: TrainsetStatus,
    ) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

/// Alert sink that logs each alert and keeps it for later inspection.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<FleetAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: FleetAlert) -> Result<(), AlertError> {
        warn!(
            template = %alert.template,
            trainset = %alert.trainset_id,
            details = ?alert.details,
            "fleet alert raised"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| AlertError::Transport("alert log lock poisoned".to_string()))?;
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<FleetAlert> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
