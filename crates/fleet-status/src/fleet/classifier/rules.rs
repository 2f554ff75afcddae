use serde::{Deserialize, Serialize};

use super::super::domain::{TrainsetSnapshot, TrainsetStatus};

const AVAILABILITY_CRITICAL: f64 = 70.0;
const AVAILABILITY_TARGET: f64 = 85.0;
const AVAILABILITY_PREVENTIVE: f64 = 90.0;
const MAX_OPEN_JOB_CARDS: i32 = 2;
const PREMIUM_BRANDING_PRIORITY: i32 = 8;
const PREMIUM_READINESS: f64 = 8.5;
const GOOD_READINESS: f64 = 8.0;
const BACKUP_READINESS: f64 = 7.0;

/// Rows of the recommendation cascade, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    CertificateExpired,
    AvailabilityCritical,
    SafetyCriticalJobs,
    AvailabilityBelowTarget,
    MultipleJobCards,
    PreventiveMaintenance,
    PremiumService,
    GoodServiceCondition,
    SuitableBackup,
    BasicBackup,
}

impl DecisionRule {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::CertificateExpired,
            Self::AvailabilityCritical,
            Self::SafetyCriticalJobs,
            Self::AvailabilityBelowTarget,
            Self::MultipleJobCards,
            Self::PreventiveMaintenance,
            Self::PremiumService,
            Self::GoodServiceCondition,
            Self::SuitableBackup,
            Self::BasicBackup,
        ]
    }

    /// 1-based position in the cascade.
    pub const fn order(self) -> u8 {
        match self {
            Self::CertificateExpired => 1,
            Self::AvailabilityCritical => 2,
            Self::SafetyCriticalJobs => 3,
            Self::AvailabilityBelowTarget => 4,
            Self::MultipleJobCards => 5,
            Self::PreventiveMaintenance => 6,
            Self::PremiumService => 7,
            Self::GoodServiceCondition => 8,
            Self::SuitableBackup => 9,
            Self::BasicBackup => 10,
        }
    }

    /// Whether the rule is decided on the readiness score.
    pub const fn uses_readiness(self) -> bool {
        self.order() >= Self::PremiumService.order()
    }

    pub fn reason(self) -> &'static str {
        rule_for(self).outcome.reason
    }

    pub fn status(self) -> TrainsetStatus {
        rule_for(self).outcome.status
    }
}

/// Fixed status, confidence and priority attached to a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RuleOutcome {
    pub status: TrainsetStatus,
    pub confidence: f64,
    pub priority: u8,
    pub reason: &'static str,
}

pub(crate) struct RuleInput<'a> {
    pub snapshot: &'a TrainsetSnapshot,
    pub readiness: f64,
}

pub(crate) struct Rule {
    pub id: DecisionRule,
    pub applies: fn(&RuleInput<'_>) -> bool,
    pub outcome: RuleOutcome,
    pub detail: fn(&RuleInput<'_>) -> String,
}

pub(crate) static RULES: [Rule; 10] = [
    Rule {
        id: DecisionRule::CertificateExpired,
        applies: |input| input.snapshot.fitness_expiry_days <= 0,
        outcome: RuleOutcome {
            status: TrainsetStatus::Critical,
            confidence: 0.98,
            priority: 10,
            reason: "certificate expired",
        },
        detail: |input| match input.snapshot.fitness_expiry_days {
            0 => "fitness certificate expires today".to_string(),
            days => format!("fitness certificate expired {} days ago", -days),
        },
    },
    Rule {
        id: DecisionRule::AvailabilityCritical,
        applies: |input| input.snapshot.availability_percentage < AVAILABILITY_CRITICAL,
        outcome: RuleOutcome {
            status: TrainsetStatus::Critical,
            confidence: 0.95,
            priority: 9,
            reason: "availability critical",
        },
        detail: |input| {
            format!(
                "availability {:.1}% below {:.0}% critical threshold",
                input.snapshot.availability_percentage, AVAILABILITY_CRITICAL
            )
        },
    },
    Rule {
        id: DecisionRule::SafetyCriticalJobs,
        applies: |input| input.snapshot.has_critical_jobs,
        outcome: RuleOutcome {
            status: TrainsetStatus::Critical,
            confidence: 0.90,
            priority: 8,
            reason: "safety-critical maintenance pending",
        },
        detail: |input| {
            format!(
                "{} open job cards include safety-critical work",
                input.snapshot.open_job_cards
            )
        },
    },
    Rule {
        id: DecisionRule::AvailabilityBelowTarget,
        applies: |input| input.snapshot.availability_percentage < AVAILABILITY_TARGET,
        outcome: RuleOutcome {
            status: TrainsetStatus::Maintenance,
            confidence: 0.85,
            priority: 7,
            reason: "availability below target",
        },
        detail: |input| {
            format!(
                "availability {:.1}% below {:.0}% target",
                input.snapshot.availability_percentage, AVAILABILITY_TARGET
            )
        },
    },
    Rule {
        id: DecisionRule::MultipleJobCards,
        applies: |input| input.snapshot.open_job_cards > MAX_OPEN_JOB_CARDS,
        outcome: RuleOutcome {
            status: TrainsetStatus::Maintenance,
            confidence: 0.82,
            priority: 6,
            reason: "multiple job cards open",
        },
        detail: |input| {
            format!(
                "{} open job cards exceed the limit of {}",
                input.snapshot.open_job_cards, MAX_OPEN_JOB_CARDS
            )
        },
    },
    Rule {
        id: DecisionRule::PreventiveMaintenance,
        applies: |input| input.snapshot.availability_percentage < AVAILABILITY_PREVENTIVE,
        outcome: RuleOutcome {
            status: TrainsetStatus::Maintenance,
            confidence: 0.80,
            priority: 5,
            reason: "preventive maintenance due",
        },
        detail: |input| {
            format!(
                "availability {:.1}% below {:.0}% preventive threshold",
                input.snapshot.availability_percentage, AVAILABILITY_PREVENTIVE
            )
        },
    },
    Rule {
        id: DecisionRule::PremiumService,
        applies: |input| {
            input.snapshot.branding_priority >= PREMIUM_BRANDING_PRIORITY
                && input.readiness > PREMIUM_READINESS
        },
        outcome: RuleOutcome {
            status: TrainsetStatus::Ready,
            confidence: 0.90,
            priority: 2,
            reason: "premium service fit",
        },
        detail: |input| {
            format!(
                "readiness {:.2} with branding priority {}",
                input.readiness, input.snapshot.branding_priority
            )
        },
    },
    Rule {
        id: DecisionRule::GoodServiceCondition,
        applies: |input| input.readiness > GOOD_READINESS,
        outcome: RuleOutcome {
            status: TrainsetStatus::Ready,
            confidence: 0.85,
            priority: 3,
            reason: "good service condition",
        },
        detail: |input| format!("readiness {:.2} above {:.1}", input.readiness, GOOD_READINESS),
    },
    Rule {
        id: DecisionRule::SuitableBackup,
        applies: |input| input.readiness > BACKUP_READINESS,
        outcome: RuleOutcome {
            status: TrainsetStatus::Standby,
            confidence: 0.80,
            priority: 4,
            reason: "suitable backup",
        },
        detail: |input| format!("readiness {:.2} above {:.1}", input.readiness, BACKUP_READINESS),
    },
    Rule {
        id: DecisionRule::BasicBackup,
        applies: |_| true,
        outcome: RuleOutcome {
            status: TrainsetStatus::Standby,
            confidence: 0.75,
            priority: 4,
            reason: "basic backup service",
        },
        detail: |input| {
            format!(
                "readiness {:.2} at or below {:.1}",
                input.readiness, BACKUP_READINESS
            )
        },
    },
];

/// First rule whose predicate holds; the final row always matches.
pub(crate) fn first_match(input: &RuleInput<'_>) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(input))
        .unwrap_or(&RULES[RULES.len() - 1])
}

pub(crate) fn rule_for(id: DecisionRule) -> &'static Rule {
    &RULES[usize::from(id.order() - 1)]
}
