use super::super::domain::{TrainsetSnapshot, TrainsetStatus};

const CERTIFICATE_WARNING_DAYS: i64 = 30;
const HIGH_MILEAGE_THRESHOLD: f64 = 18_000.0;

/// Latent risks worth surfacing even when they did not drive the decision.
pub(crate) fn risk_factors(snapshot: &TrainsetSnapshot, recommended: TrainsetStatus) -> Vec<String> {
    let mut factors = Vec::new();

    let expiry = snapshot.fitness_expiry_days;
    if expiry > 0 && expiry <= CERTIFICATE_WARNING_DAYS {
        factors.push(format!("certificate expires in {expiry} days"));
    }

    if snapshot.mileage > HIGH_MILEAGE_THRESHOLD {
        factors.push("high mileage \u{2014} increased wear".to_string());
    }

    if snapshot.open_job_cards > 0 && recommended != TrainsetStatus::Maintenance {
        factors.push(format!("{} pending job cards", snapshot.open_job_cards));
    }

    factors
}
