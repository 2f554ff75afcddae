use super::super::domain::TrainsetSnapshot;

const AVAILABILITY_WEIGHT: f64 = 4.0;
const BRANDING_WEIGHT: f64 = 2.5;
const JOB_CARD_WEIGHT: f64 = 2.0;
const CERTIFICATE_MARGIN_DAYS: i64 = 30;
const NO_CRITICAL_JOBS_WEIGHT: f64 = 0.5;

const MAX_READINESS: f64 = 10.0;

/// Weighted 0-10 service readiness used to separate ready from standby trainsets.
pub(crate) fn readiness_score(snapshot: &TrainsetSnapshot) -> f64 {
    let availability = snapshot.availability_percentage / 100.0 * AVAILABILITY_WEIGHT;
    let branding = f64::from(snapshot.branding_priority) / 10.0 * BRANDING_WEIGHT;
    let job_load = (f64::from(3 - snapshot.open_job_cards) / 3.0).max(0.0) * JOB_CARD_WEIGHT;
    let certificate = if snapshot.fitness_expiry_days > CERTIFICATE_MARGIN_DAYS {
        1.0
    } else {
        0.5
    };
    let critical_jobs = if snapshot.has_critical_jobs {
        0.0
    } else {
        NO_CRITICAL_JOBS_WEIGHT
    };

    (availability + branding + job_load + certificate + critical_jobs).clamp(0.0, MAX_READINESS)
}
