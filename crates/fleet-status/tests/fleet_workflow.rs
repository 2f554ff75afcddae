use chrono::NaiveDate;
use fleet_status::fleet::{
    import_trainsets, AlertError, AlertPublisher, DecisionRule, FleetAlert, FleetService,
    RepositoryError, TrainsetId, TrainsetRecord, TrainsetRepository, TrainsetStatus,
};
use std::sync::{Arc, Mutex};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid reference date")
}

#[derive(Default)]
struct VecRepository {
    records: Mutex<Vec<TrainsetRecord>>,
}

impl TrainsetRepository for VecRepository {
    fn insert(&self, record: TrainsetRecord) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn upsert(&self, record: TrainsetRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => guard.push(record),
        }
        Ok(())
    }

    fn fetch(&self, id: &TrainsetId) -> Result<Option<TrainsetRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<TrainsetRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn update_status(
        &self,
        id: &TrainsetId,
        status: TrainsetStatus,
    ) -> Result<TrainsetRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

#[derive(Default)]
struct RecordingAlerts {
    events: Mutex<Vec<FleetAlert>>,
}

impl AlertPublisher for RecordingAlerts {
    fn publish(&self, alert: FleetAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

fn seeded_service() -> (
    FleetService<VecRepository, RecordingAlerts>,
    Arc<RecordingAlerts>,
) {
    let data = include_bytes!("../fleet_snapshot.csv");
    let records = import_trainsets(&data[..]).expect("fleet snapshot imports");
    assert_eq!(records.len(), 10);

    let alerts = Arc::new(RecordingAlerts::default());
    let service = FleetService::new(Arc::new(VecRepository::default()), alerts.clone());
    for record in records {
        service.register(record).expect("record registers");
    }
    (service, alerts)
}

#[test]
fn snapshot_export_classifies_into_expected_rules() {
    let (service, _alerts) = seeded_service();

    let assessments = service.assess_fleet(as_of()).expect("fleet assesses");
    let rules: Vec<(&str, DecisionRule)> = assessments
        .iter()
        .map(|assessment| {
            (
                assessment.trainset_id.0.as_str(),
                assessment.recommendation.rule,
            )
        })
        .collect();

    assert_eq!(
        rules,
        vec![
            ("TS-01", DecisionRule::PremiumService),
            ("TS-02", DecisionRule::SuitableBackup),
            ("TS-03", DecisionRule::BasicBackup),
            ("TS-04", DecisionRule::PreventiveMaintenance),
            ("TS-05", DecisionRule::AvailabilityBelowTarget),
            ("TS-06", DecisionRule::SafetyCriticalJobs),
            ("TS-07", DecisionRule::AvailabilityCritical),
            ("TS-08", DecisionRule::CertificateExpired),
            ("TS-09", DecisionRule::MultipleJobCards),
            ("TS-10", DecisionRule::PremiumService),
        ]
    );

    let nila = &assessments[2].recommendation;
    assert_eq!(
        nila.risk_factors,
        vec![
            "certificate expires in 21 days".to_string(),
            "high mileage \u{2014} increased wear".to_string(),
            "2 pending job cards".to_string(),
        ]
    );
    assert!(nila.readiness_score.is_some());
    assert!(assessments[7].recommendation.readiness_score.is_none());
}

#[test]
fn fleet_summary_reflects_snapshot_export() {
    let (service, _alerts) = seeded_service();

    let summary = service.summary(as_of()).expect("summary builds");

    assert_eq!(summary.recommended_count(TrainsetStatus::Critical), 3);
    assert_eq!(summary.recommended_count(TrainsetStatus::Maintenance), 3);
    assert_eq!(summary.recommended_count(TrainsetStatus::Standby), 2);
    assert_eq!(summary.recommended_count(TrainsetStatus::Ready), 2);
    assert_eq!(summary.status_changes, 7);
    assert_eq!(summary.kpis.certificates_expiring_soon, 1);
    assert_eq!(summary.kpis.open_job_cards, 17);

    let alert_ids: Vec<&str> = summary
        .alerts
        .iter()
        .map(|alert| alert.trainset_id.0.as_str())
        .collect();
    assert_eq!(alert_ids, vec!["TS-08", "TS-07", "TS-06", "TS-03"]);
}

#[test]
fn applying_recommendations_settles_the_fleet() {
    let (service, alerts) = seeded_service();

    let ids: Vec<TrainsetId> = service
        .list()
        .expect("list")
        .into_iter()
        .map(|record| record.id)
        .collect();
    let changed = ids
        .iter()
        .map(|id| service.apply_recommendation(id, as_of()).expect("apply"))
        .filter(|transition| transition.changed())
        .count();
    assert_eq!(changed, 7);

    let events = alerts.events.lock().expect("alert mutex poisoned").clone();
    let critical: Vec<&str> = events
        .iter()
        .map(|alert| alert.trainset_id.0.as_str())
        .collect();
    assert_eq!(critical, vec!["TS-06", "TS-07", "TS-08"]);
    assert!(events
        .iter()
        .all(|alert| alert.template == "trainset_critical"));

    let summary = service.summary(as_of()).expect("summary builds");
    assert_eq!(summary.status_changes, 0);
    assert_eq!(summary.current_count(TrainsetStatus::Critical), 3);
}
