use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for trainsets tracked in the fleet inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrainsetId(pub String);

impl fmt::Display for TrainsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operational state of a trainset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainsetStatus {
    Ready,
    Standby,
    Maintenance,
    Critical,
}

impl TrainsetStatus {
    /// Most urgent first, the order used by dashboards and summaries.
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Critical,
            Self::Maintenance,
            Self::Standby,
            Self::Ready,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Standby => "standby",
            Self::Maintenance => "maintenance",
            Self::Critical => "critical",
        }
    }

    /// Urgency bucket: critical > maintenance > ready/standby.
    pub const fn urgency_rank(self) -> u8 {
        match self {
            Self::Critical => 2,
            Self::Maintenance => 1,
            Self::Ready | Self::Standby => 0,
        }
    }
}

impl fmt::Display for TrainsetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trainset status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TrainsetStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "standby" => Ok(Self::Standby),
            "maintenance" => Ok(Self::Maintenance),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// Point-in-time operational attributes fed to the classifier.
///
/// Integer counts are signed so that out-of-range values supplied by upstream systems reach
/// validation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainsetSnapshot {
    pub status: TrainsetStatus,
    pub availability_percentage: f64,
    pub branding_priority: i32,
    pub open_job_cards: i32,
    pub has_critical_jobs: bool,
    pub fitness_expiry_days: i64,
    pub mileage: f64,
}

/// Persisted trainset state as held by the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainsetRecord {
    pub id: TrainsetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: TrainsetStatus,
    pub availability_percentage: f64,
    pub branding_priority: i32,
    pub open_job_cards: i32,
    #[serde(default)]
    pub has_critical_jobs: bool,
    pub fitness_expiry: NaiveDate,
    pub mileage: f64,
}

impl TrainsetRecord {
    /// Days remaining on the fitness certificate as of `today`; negative once expired.
    pub fn fitness_expiry_days(&self, today: NaiveDate) -> i64 {
        (self.fitness_expiry - today).num_days()
    }

    pub fn snapshot(&self, today: NaiveDate) -> TrainsetSnapshot {
        TrainsetSnapshot {
            status: self.status,
            availability_percentage: self.availability_percentage,
            branding_priority: self.branding_priority,
            open_job_cards: self.open_job_cards,
            has_critical_jobs: self.has_critical_jobs,
            fitness_expiry_days: self.fitness_expiry_days(today),
            mileage: self.mileage,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id.0)
    }
}
