use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::classifier::{validate, InvalidSnapshot, Recommendation, StatusClassifier};
use super::domain::{TrainsetId, TrainsetRecord, TrainsetSnapshot, TrainsetStatus};
use super::report::views::FleetSummary;
use super::report::{assess_records, FleetReport, TrainsetAssessment};
use super::repository::{
    AlertError, AlertPublisher, FleetAlert, RepositoryError, TrainsetRepository,
};

/// Service composing the trainset store, the status classifier, and alert dispatch.
pub struct FleetService<R, A> {
    repository: Arc<R>,
    alerts: Arc<A>,
    classifier: StatusClassifier,
}

/// Outcome of applying a recommendation to a stored trainset.
#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub trainset_id: TrainsetId,
    pub from: TrainsetStatus,
    pub to: TrainsetStatus,
    pub assessment: TrainsetAssessment,
}

impl StatusTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl<R, A> FleetService<R, A>
where
    R: TrainsetRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<A>) -> Self {
        Self {
            repository,
            alerts,
            classifier: StatusClassifier::new(),
        }
    }

    /// Register a new trainset after checking its attributes are in domain.
    pub fn register(&self, record: TrainsetRecord) -> Result<TrainsetRecord, FleetServiceError> {
        // Expiry days are not range-checked, so any reference date serves here.
        validate(&record.snapshot(record.fitness_expiry))?;
        let stored = self.repository.insert(record)?;
        info!(
            trainset = %stored.id,
            name = stored.display_name(),
            status = %stored.status,
            "trainset registered"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &TrainsetId) -> Result<TrainsetRecord, FleetServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<TrainsetRecord>, FleetServiceError> {
        Ok(self.repository.list()?)
    }

    /// Classify a caller-supplied snapshot without touching the store.
    pub fn classify(
        &self,
        snapshot: &TrainsetSnapshot,
    ) -> Result<Recommendation, FleetServiceError> {
        Ok(self.classifier.classify(snapshot)?)
    }

    /// Classify a stored trainset as of `today`.
    pub fn recommend(
        &self,
        id: &TrainsetId,
        today: NaiveDate,
    ) -> Result<TrainsetAssessment, FleetServiceError> {
        let record = self.get(id)?;
        Ok(TrainsetAssessment::from_record(&record, today)?)
    }

    /// Classify every stored trainset in store order.
    ///
    /// Records that fail validation are logged and left out so one bad row does not blank
    /// the whole dashboard.
    pub fn assess_fleet(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<TrainsetAssessment>, FleetServiceError> {
        let records = self.repository.list()?;
        Ok(assess_records(&records, today))
    }

    pub fn summary(&self, today: NaiveDate) -> Result<FleetSummary, FleetServiceError> {
        let assessments = self.assess_fleet(today)?;
        Ok(FleetReport::build(&assessments).summary())
    }

    /// Manual status transition requested by an operator.
    pub fn set_status(
        &self,
        id: &TrainsetId,
        status: TrainsetStatus,
    ) -> Result<TrainsetRecord, FleetServiceError> {
        let previous = self.get(id)?.status;
        let updated = self.repository.update_status(id, status)?;
        info!(trainset = %id, from = %previous, to = %status, "manual status transition");
        Ok(updated)
    }

    /// Adopt the classifier's recommendation as the trainset's new status.
    ///
    /// A move into critical is only kept once its alert has been published.
    pub fn apply_recommendation(
        &self,
        id: &TrainsetId,
        today: NaiveDate,
    ) -> Result<StatusTransition, FleetServiceError> {
        let record = self.get(id)?;
        let assessment = TrainsetAssessment::from_record(&record, today)?;
        let from = record.status;
        let to = assessment.recommendation.recommended_status;

        if from != to {
            self.repository.update_status(id, to)?;
            info!(
                trainset = %id,
                %from,
                %to,
                rule = ?assessment.recommendation.rule,
                "recommendation applied"
            );
        }

        if to == TrainsetStatus::Critical && from != TrainsetStatus::Critical {
            warn!(
                trainset = %id,
                priority = assessment.recommendation.priority,
                "trainset moved to critical"
            );
            if let Err(error) = self.alerts.publish(critical_alert(&assessment)) {
                self.repository.update_status(id, from)?;
                warn!(
                    trainset = %id,
                    %error,
                    status = %from,
                    "critical alert failed, status restored"
                );
                return Err(error.into());
            }
        }

        Ok(StatusTransition {
            trainset_id: id.clone(),
            from,
            to,
            assessment,
        })
    }
}

fn critical_alert(assessment: &TrainsetAssessment) -> FleetAlert {
    let recommendation = &assessment.recommendation;
    let mut details = BTreeMap::new();
    details.insert("status".to_string(), recommendation.recommended_status.label().to_string());
    details.insert("priority".to_string(), recommendation.priority.to_string());
    details.insert("reason".to_string(), recommendation.rule.reason().to_string());
    if !recommendation.risk_factors.is_empty() {
        details.insert("risk_factors".to_string(), recommendation.risk_factors.join("; "));
    }

    FleetAlert {
        template: "trainset_critical".to_string(),
        trainset_id: assessment.trainset_id.clone(),
        details,
    }
}

/// Error raised by the fleet service.
#[derive(Debug, thiserror::Error)]
pub enum FleetServiceError {
    #[error(transparent)]
    InvalidSnapshot(#[from] InvalidSnapshot),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}
