use super::super::classifier::DecisionRule;
use super::super::domain::{TrainsetId, TrainsetStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status: TrainsetStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetAlertView {
    pub trainset_id: TrainsetId,
    pub severity: AlertSeverity,
    pub severity_label: &'static str,
    pub topic: &'static str,
    pub detail: String,
}

/// Headline fleet indicators for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct FleetKpis {
    pub total_trainsets: usize,
    pub average_availability: f64,
    pub ready_share: f64,
    pub open_job_cards: i64,
    pub certificates_expiring_soon: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetSummary {
    pub current_counts: Vec<StatusCountEntry>,
    pub recommended_counts: Vec<StatusCountEntry>,
    pub average_confidence: f64,
    pub status_changes: usize,
    pub kpis: FleetKpis,
    pub alerts: Vec<FleetAlertView>,
}

impl FleetSummary {
    pub fn recommended_count(&self, status: TrainsetStatus) -> usize {
        count_for(&self.recommended_counts, status)
    }

    pub fn current_count(&self, status: TrainsetStatus) -> usize {
        count_for(&self.current_counts, status)
    }
}

fn count_for(entries: &[StatusCountEntry], status: TrainsetStatus) -> usize {
    entries
        .iter()
        .find(|entry| entry.status == status)
        .map(|entry| entry.count)
        .unwrap_or(0)
}

/// Per-trainset recommendation as exposed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub trainset_id: TrainsetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub current_status: TrainsetStatus,
    pub recommended_status: TrainsetStatus,
    pub status_change: bool,
    pub confidence: f64,
    pub priority: u8,
    pub reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    pub readiness_score: f64,
    pub rule: DecisionRule,
}
