use std::fmt;

use serde::Serialize;

use super::super::domain::TrainsetSnapshot;

/// Snapshot fields subject to domain checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    AvailabilityPercentage,
    BrandingPriority,
    OpenJobCards,
    Mileage,
}

impl SnapshotField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AvailabilityPercentage => "availability_percentage",
            Self::BrandingPriority => "branding_priority",
            Self::OpenJobCards => "open_job_cards",
            Self::Mileage => "mileage",
        }
    }
}

impl fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a snapshot carries a value outside its declared domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid snapshot: {field} = {value} (expected {expected})")]
pub struct InvalidSnapshot {
    pub field: SnapshotField,
    pub value: f64,
    pub expected: &'static str,
}

/// Domain checks applied before any rule is evaluated.
pub fn validate(snapshot: &TrainsetSnapshot) -> Result<(), InvalidSnapshot> {
    let availability = snapshot.availability_percentage;
    if !availability.is_finite() || !(0.0..=100.0).contains(&availability) {
        return Err(InvalidSnapshot {
            field: SnapshotField::AvailabilityPercentage,
            value: availability,
            expected: "a percentage between 0 and 100",
        });
    }

    if !(0..=10).contains(&snapshot.branding_priority) {
        return Err(InvalidSnapshot {
            field: SnapshotField::BrandingPriority,
            value: f64::from(snapshot.branding_priority),
            expected: "an integer between 0 and 10",
        });
    }

    if snapshot.open_job_cards < 0 {
        return Err(InvalidSnapshot {
            field: SnapshotField::OpenJobCards,
            value: f64::from(snapshot.open_job_cards),
            expected: "a non-negative count",
        });
    }

    if !snapshot.mileage.is_finite() || snapshot.mileage < 0.0 {
        return Err(InvalidSnapshot {
            field: SnapshotField::Mileage,
            value: snapshot.mileage,
            expected: "a non-negative distance",
        });
    }

    Ok(())
}
