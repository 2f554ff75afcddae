//! Trainset fleet status: domain model, recommendation engine, reporting, and HTTP surface.

pub mod classifier;
pub mod domain;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{
    classify, classify_fleet, DecisionRule, InvalidSnapshot, Recommendation, SnapshotField,
    StatusClassifier,
};
pub use domain::{TrainsetId, TrainsetRecord, TrainsetSnapshot, TrainsetStatus, UnknownStatus};
pub use import::{import_trainsets, import_trainsets_from_path, FleetImportError};
pub use report::views::{FleetSummary, RecommendationView};
pub use report::{assess_records, FleetReport, TrainsetAssessment};
pub use repository::{
    AlertError, AlertPublisher, FleetAlert, RepositoryError, TrainsetRepository,
};
pub use router::fleet_router;
pub use service::{FleetService, FleetServiceError, StatusTransition};
