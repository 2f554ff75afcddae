use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{TrainsetId, TrainsetRecord, TrainsetStatus};

/// Storage abstraction so the fleet service can be exercised without a live data store.
///
/// `list` returns records in the order the store considers canonical; the service keeps that
/// order in every fleet-wide response.
pub trait TrainsetRepository: Send + Sync {
    fn insert(&self, record: TrainsetRecord) -> Result<TrainsetRecord, RepositoryError>;
    fn upsert(&self, record: TrainsetRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<TrainsetRecord>, RepositoryError>;
    fn update_status(
        &self,
        id: &TrainsetId,
        status: TrainsetStatus,
    ) -> Result<TrainsetRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("trainset already exists")]
    Conflict,
    #[error("trainset not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (dashboard feed, e-mail, pager adapters).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: FleetAlert) -> Result<(), AlertError>;
}

/// Alert payload describing a status event for a single trainset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetAlert {
    pub template: String,
    pub trainset_id: TrainsetId,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}
