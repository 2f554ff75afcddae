mod summary;
pub mod views;

pub use summary::{
    assess_records, CriticalTrainset, ExpiringCertificate, FleetReport, TrainsetAssessment,
};
