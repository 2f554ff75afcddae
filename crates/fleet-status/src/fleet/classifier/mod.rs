//! Rule-based status recommendations for individual trainsets.
//!
//! The decision cascade lives in [`rules`] as an ordered table; the first row whose predicate
//! holds decides the status, confidence and priority. Readiness scoring and risk annotation
//! are kept separate so they can be reasoned about on their own.

mod readiness;
mod risk;
mod rules;
mod validation;

pub use rules::DecisionRule;
pub use validation::{validate, InvalidSnapshot, SnapshotField};

use super::domain::{TrainsetSnapshot, TrainsetStatus};
use rules::{first_match, RuleInput};
use serde::{Deserialize, Serialize};

/// Classifier output for a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommended_status: TrainsetStatus,
    pub confidence: f64,
    pub priority: u8,
    pub reasons: Vec<String>,
    pub risk_factors: Vec<String>,
    /// Present only when the decision was made on readiness (ready/standby branches).
    pub readiness_score: Option<f64>,
    pub rule: DecisionRule,
}

impl Recommendation {
    /// Readiness for reporting; undefined scores (critical and maintenance outcomes) read as 0.
    pub fn readiness_or_zero(&self) -> f64 {
        self.readiness_score.unwrap_or(0.0)
    }

    pub fn changes_status(&self, current: TrainsetStatus) -> bool {
        self.recommended_status != current
    }

    pub fn summary(&self) -> String {
        format!(
            "{} (priority {}, confidence {:.0}%): {}",
            self.recommended_status.label(),
            self.priority,
            self.confidence * 100.0,
            self.reasons.join("; ")
        )
    }
}

/// Stateless classifier handle so services can hold it alongside their other collaborators.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier;

impl StatusClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, snapshot: &TrainsetSnapshot) -> Result<Recommendation, InvalidSnapshot> {
        classify(snapshot)
    }
}

/// Classify a single snapshot.
pub fn classify(snapshot: &TrainsetSnapshot) -> Result<Recommendation, InvalidSnapshot> {
    validate(snapshot)?;

    let input = RuleInput {
        snapshot,
        readiness: readiness::readiness_score(snapshot),
    };
    let rule = first_match(&input);
    let outcome = rule.outcome;

    let reasons = vec![outcome.reason.to_string(), (rule.detail)(&input)];
    let risk_factors = risk::risk_factors(snapshot, outcome.status);
    let readiness_score = rule.id.uses_readiness().then_some(input.readiness);

    Ok(Recommendation {
        recommended_status: outcome.status,
        confidence: outcome.confidence,
        priority: outcome.priority,
        reasons,
        risk_factors,
        readiness_score,
        rule: rule.id,
    })
}

/// Classify each snapshot independently, preserving input order.
pub fn classify_fleet(
    snapshots: &[TrainsetSnapshot],
) -> Vec<Result<Recommendation, InvalidSnapshot>> {
    snapshots.iter().map(classify).collect()
}

#[cfg(test)]
pub(crate) fn readiness_for_tests(snapshot: &TrainsetSnapshot) -> f64 {
    readiness::readiness_score(snapshot)
}

#[cfg(test)]
pub(crate) fn rule_outcome_for_tests(id: DecisionRule) -> (TrainsetStatus, f64, u8) {
    let outcome = rules::rule_for(id).outcome;
    (outcome.status, outcome.confidence, outcome.priority)
}
