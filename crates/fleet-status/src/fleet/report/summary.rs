use super::super::classifier::{classify, InvalidSnapshot, Recommendation};
use super::super::domain::{TrainsetId, TrainsetRecord, TrainsetSnapshot, TrainsetStatus};
use super::views::{
    AlertSeverity, FleetAlertView, FleetKpis, FleetSummary, RecommendationView, StatusCountEntry,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

const CERTIFICATE_WARNING_DAYS: i64 = 30;

/// A classified trainset: the snapshot it was judged on plus the resulting recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct TrainsetAssessment {
    pub trainset_id: TrainsetId,
    pub name: Option<String>,
    pub snapshot: TrainsetSnapshot,
    pub recommendation: Recommendation,
}

impl TrainsetAssessment {
    /// Classify a stored record as of `today`.
    pub fn from_record(record: &TrainsetRecord, today: NaiveDate) -> Result<Self, InvalidSnapshot> {
        let snapshot = record.snapshot(today);
        let recommendation = classify(&snapshot)?;
        Ok(Self {
            trainset_id: record.id.clone(),
            name: record.name.clone(),
            snapshot,
            recommendation,
        })
    }

    pub fn current_status(&self) -> TrainsetStatus {
        self.snapshot.status
    }

    pub fn status_change(&self) -> bool {
        self.recommendation.changes_status(self.snapshot.status)
    }

    pub fn to_view(&self) -> RecommendationView {
        RecommendationView {
            trainset_id: self.trainset_id.clone(),
            name: self.name.clone(),
            current_status: self.snapshot.status,
            recommended_status: self.recommendation.recommended_status,
            status_change: self.status_change(),
            confidence: self.recommendation.confidence,
            priority: self.recommendation.priority,
            reasons: self.recommendation.reasons.clone(),
            risk_factors: self.recommendation.risk_factors.clone(),
            readiness_score: self.recommendation.readiness_or_zero(),
            rule: self.recommendation.rule,
        }
    }
}

/// Classify records in order, leaving out any whose snapshot fails validation.
pub fn assess_records(records: &[TrainsetRecord], today: NaiveDate) -> Vec<TrainsetAssessment> {
    records
        .iter()
        .filter_map(|record| match TrainsetAssessment::from_record(record, today) {
            Ok(assessment) => Some(assessment),
            Err(error) => {
                warn!(trainset = %record.id, %error, "skipping trainset with invalid snapshot");
                None
            }
        })
        .collect()
}

/// Aggregated view over a classified fleet.
#[derive(Debug, Default)]
pub struct FleetReport {
    pub current_counts: HashMap<TrainsetStatus, usize>,
    pub recommended_counts: HashMap<TrainsetStatus, usize>,
    pub total: usize,
    pub confidence_total: f64,
    pub availability_total: f64,
    pub status_changes: usize,
    pub open_job_cards: i64,
    pub critical: Vec<CriticalTrainset>,
    pub expiring: Vec<ExpiringCertificate>,
}

#[derive(Debug, Clone)]
pub struct CriticalTrainset {
    pub trainset_id: TrainsetId,
    pub priority: u8,
    pub topic: &'static str,
    pub detail: String,
}

impl CriticalTrainset {
    pub fn to_view(&self) -> FleetAlertView {
        FleetAlertView {
            trainset_id: self.trainset_id.clone(),
            severity: AlertSeverity::Critical,
            severity_label: AlertSeverity::Critical.label(),
            topic: self.topic,
            detail: self.detail.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpiringCertificate {
    pub trainset_id: TrainsetId,
    pub days_remaining: i64,
}

impl ExpiringCertificate {
    pub fn to_view(&self) -> FleetAlertView {
        FleetAlertView {
            trainset_id: self.trainset_id.clone(),
            severity: AlertSeverity::Warning,
            severity_label: AlertSeverity::Warning.label(),
            topic: "certificate expiring",
            detail: format!("certificate expires in {} days", self.days_remaining),
        }
    }
}

impl FleetReport {
    pub fn build(assessments: &[TrainsetAssessment]) -> Self {
        let mut report = Self::default();

        for assessment in assessments {
            let snapshot = &assessment.snapshot;
            let recommendation = &assessment.recommendation;

            report.total += 1;
            *report.current_counts.entry(snapshot.status).or_default() += 1;
            *report
                .recommended_counts
                .entry(recommendation.recommended_status)
                .or_default() += 1;
            report.confidence_total += recommendation.confidence;
            report.availability_total += snapshot.availability_percentage;
            report.open_job_cards += i64::from(snapshot.open_job_cards);

            if assessment.status_change() {
                report.status_changes += 1;
            }

            if recommendation.recommended_status == TrainsetStatus::Critical {
                report.critical.push(CriticalTrainset {
                    trainset_id: assessment.trainset_id.clone(),
                    priority: recommendation.priority,
                    topic: recommendation.rule.reason(),
                    detail: recommendation.reasons.join("; "),
                });
            }

            let days = snapshot.fitness_expiry_days;
            if days > 0 && days <= CERTIFICATE_WARNING_DAYS {
                report.expiring.push(ExpiringCertificate {
                    trainset_id: assessment.trainset_id.clone(),
                    days_remaining: days,
                });
            }
        }

        report
    }

    fn average(&self, total: f64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            total / self.total as f64
        }
    }

    pub fn summary(&self) -> FleetSummary {
        let current_counts = counts_view(&self.current_counts);
        let recommended_counts = counts_view(&self.recommended_counts);

        let ready = self
            .recommended_counts
            .get(&TrainsetStatus::Ready)
            .copied()
            .unwrap_or(0);

        let kpis = FleetKpis {
            total_trainsets: self.total,
            average_availability: self.average(self.availability_total),
            ready_share: self.average(ready as f64),
            open_job_cards: self.open_job_cards,
            certificates_expiring_soon: self.expiring.len(),
        };

        let mut critical: Vec<&CriticalTrainset> = self.critical.iter().collect();
        critical.sort_by(|left, right| right.priority.cmp(&left.priority));

        let alerts = critical
            .into_iter()
            .map(CriticalTrainset::to_view)
            .chain(self.expiring.iter().map(ExpiringCertificate::to_view))
            .collect();

        FleetSummary {
            current_counts,
            recommended_counts,
            average_confidence: self.average(self.confidence_total),
            status_changes: self.status_changes,
            kpis,
            alerts,
        }
    }
}

fn counts_view(counts: &HashMap<TrainsetStatus, usize>) -> Vec<StatusCountEntry> {
    TrainsetStatus::ordered()
        .into_iter()
        .map(|status| StatusCountEntry {
            status,
            status_label: status.label(),
            count: counts.get(&status).copied().unwrap_or(0),
        })
        .collect()
}
