use crate::infra::{InMemoryAlertPublisher, InMemoryTrainsetRepository};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use fleet_status::error::AppError;
use fleet_status::fleet::{
    assess_records, import_trainsets_from_path, FleetReport, FleetService, FleetSummary,
    RecommendationView, TrainsetAssessment, TrainsetId, TrainsetRecord, TrainsetStatus,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Trainset CSV export to classify
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Reference date for certificate expiry (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the recommendations and summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for certificate expiry (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct RecommendOutput<'a> {
    today: NaiveDate,
    recommendations: Vec<RecommendationView>,
    summary: &'a FleetSummary,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs { csv, today, json } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let records = import_trainsets_from_path(&csv)?;
    let assessments = assess_records(&records, today);
    let summary = FleetReport::build(&assessments).summary();

    if json {
        let output = RecommendOutput {
            today,
            recommendations: assessments.iter().map(TrainsetAssessment::to_view).collect(),
            summary: &summary,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Recommendation payload unavailable: {err}"),
        }
        return Ok(());
    }

    println!("Fleet recommendations from {} (as of {today})", csv.display());
    render_recommendations(&assessments);
    render_summary(&summary);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Fleet status demo (as of {today})");
    let repository = Arc::new(InMemoryTrainsetRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = FleetService::new(repository, alerts.clone());

    for record in sample_fleet(today) {
        if let Err(err) = service.register(record) {
            println!("  Registration rejected: {err}");
        }
    }

    let assessments = match service.assess_fleet(today) {
        Ok(assessments) => assessments,
        Err(err) => {
            println!("  Fleet unavailable: {err}");
            return Ok(());
        }
    };
    render_recommendations(&assessments);

    match service.summary(today) {
        Ok(summary) => render_summary(&summary),
        Err(err) => println!("  Summary unavailable: {err}"),
    }

    println!("\nApplying recommendations");
    for assessment in &assessments {
        match service.apply_recommendation(&assessment.trainset_id, today) {
            Ok(transition) if transition.changed() => println!(
                "- {}: {} -> {}",
                transition.trainset_id, transition.from, transition.to
            ),
            Ok(transition) => println!("- {}: stays {}", transition.trainset_id, transition.to),
            Err(err) => println!("- {}: not applied ({err})", assessment.trainset_id),
        }
    }

    let events = alerts.events();
    if events.is_empty() {
        println!("\nAlerts dispatched: none");
    } else {
        println!("\nAlerts dispatched");
        for alert in events {
            let reason = alert.details.get("reason").map(String::as_str).unwrap_or("");
            println!("- template={} -> {} ({reason})", alert.template, alert.trainset_id);
        }
    }

    Ok(())
}

fn render_recommendations(assessments: &[TrainsetAssessment]) {
    println!("\nRecommendations");
    for assessment in assessments {
        let view = assessment.to_view();
        let marker = if view.status_change { "*" } else { " " };
        println!(
            "{marker} {} [{}] {} -> {} | priority {} | confidence {:.0}% | readiness {:.1}",
            view.trainset_id,
            view.name.as_deref().unwrap_or("unnamed"),
            view.current_status,
            view.recommended_status,
            view.priority,
            view.confidence * 100.0,
            view.readiness_score
        );
        println!("    {}", view.reasons.join("; "));
        if !view.risk_factors.is_empty() {
            println!("    risks: {}", view.risk_factors.join(", "));
        }
    }
}

fn render_summary(summary: &FleetSummary) {
    println!("\nRecommended status mix");
    for entry in &summary.recommended_counts {
        println!(
            "- {}: {} (currently {})",
            entry.status_label,
            entry.count,
            summary.current_count(entry.status)
        );
    }

    let kpis = &summary.kpis;
    println!(
        "\n{} trainsets | {:.1}% avg availability | {:.0}% ready | {} open job cards",
        kpis.total_trainsets,
        kpis.average_availability,
        kpis.ready_share * 100.0,
        kpis.open_job_cards
    );
    println!(
        "Average confidence {:.0}% | {} status changes recommended",
        summary.average_confidence * 100.0,
        summary.status_changes
    );

    if summary.alerts.is_empty() {
        println!("\nFleet alerts: none");
    } else {
        println!("\nFleet alerts");
        for alert in &summary.alerts {
            println!(
                "- [{}] {} {}: {}",
                alert.severity_label, alert.trainset_id, alert.topic, alert.detail
            );
        }
    }
}

fn sample_fleet(today: NaiveDate) -> Vec<TrainsetRecord> {
    let trainset = |id: &str,
                    name: &str,
                    status: TrainsetStatus,
                    availability: f64,
                    branding: i32,
                    job_cards: i32,
                    critical_jobs: bool,
                    expiry_days: i64,
                    mileage: f64| TrainsetRecord {
        id: TrainsetId(id.to_string()),
        name: Some(name.to_string()),
        status,
        availability_percentage: availability,
        branding_priority: branding,
        open_job_cards: job_cards,
        has_critical_jobs: critical_jobs,
        fitness_expiry: today + Duration::days(expiry_days),
        mileage,
    };

    vec![
        trainset("TS-01", "Krishna", TrainsetStatus::Ready, 96.0, 9, 0, false, 180, 12_400.0),
        trainset("TS-02", "Tapti", TrainsetStatus::Ready, 93.5, 5, 1, false, 95, 14_100.0),
        trainset("TS-03", "Nila", TrainsetStatus::Standby, 91.0, 2, 2, false, 21, 19_300.0),
        trainset("TS-04", "Sarayu", TrainsetStatus::Ready, 88.0, 7, 1, false, 140, 9_800.0),
        trainset("TS-05", "Aruth", TrainsetStatus::Standby, 78.5, 4, 3, false, 60, 16_750.0),
        trainset("TS-06", "Vaigai", TrainsetStatus::Ready, 94.0, 6, 2, true, 75, 11_200.0),
        trainset("TS-07", "Jhelum", TrainsetStatus::Maintenance, 64.0, 3, 5, false, 40, 21_050.0),
        trainset("TS-08", "Bhavani", TrainsetStatus::Ready, 97.0, 8, 0, false, -3, 7_600.0),
        trainset("TS-09", "Kaveri", TrainsetStatus::Standby, 92.0, 8, 3, false, 210, 10_300.0),
        trainset("TS-10", "Pamba", TrainsetStatus::Ready, 99.0, 10, 0, false, 300, 5_200.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_fleet_spans_every_recommended_status() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        let assessments = assess_records(&sample_fleet(today), today);
        assert_eq!(assessments.len(), 10);

        let summary = FleetReport::build(&assessments).summary();
        for status in TrainsetStatus::ordered() {
            assert!(
                summary.recommended_count(status) > 0,
                "sample fleet should recommend {status}"
            );
        }
    }
}
