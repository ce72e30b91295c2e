pub mod interventions;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{RiskRules, RuleSet};
use crate::core::Customer;
use crate::scoring::{ChurnSignal, SignalKind};

pub use interventions::{intervention_for, Intervention};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,    // score < medium_at (30)
    Medium, // medium_at..high_at (30-69)
    High,   // score >= high_at (70)
}

impl RiskLabel {
    pub fn from_score(score: u32, rules: &RiskRules) -> Self {
        if score >= rules.high_at {
            Self::High
        } else if score >= rules.medium_at {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// A fired churn signal as shown to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalExplanation {
    pub signal: SignalKind,
    pub name: String,
    pub observed: String,
    pub contribution: f64,
    pub explanation: String,
}

impl From<&ChurnSignal> for SignalExplanation {
    fn from(signal: &ChurnSignal) -> Self {
        Self {
            signal: signal.kind,
            name: signal.kind.to_string(),
            observed: signal.observed.clone(),
            contribution: signal.points(),
            explanation: signal.contribution.explanation.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnRiskAssessment {
    pub label: RiskLabel,
    /// Always within 0..=100
    pub score: u32,
    /// Highest contribution first
    pub signals: Vec<SignalExplanation>,
    /// Most urgent first
    pub interventions: Vec<Intervention>,
    pub review_within_days: u32,
    pub summary: String,
}

impl ChurnRiskAssessment {
    pub fn has_urgency(&self, urgency: Urgency) -> bool {
        self.interventions.iter().any(|i| i.urgency == urgency)
    }
}

/// Aggregate churn signals into a labelled, explained risk verdict.
///
/// Signals below the contribution floor are neither reported nor counted, so
/// the score always equals the rounded sum of the explanations shown.
pub fn assess_churn_risk(
    customer: &Customer,
    signals: &[ChurnSignal],
    rules: &RuleSet,
) -> ChurnRiskAssessment {
    let floor = rules.signals.contribution_floor;
    let mut fired: Vec<&ChurnSignal> = signals.iter().filter(|s| s.points() >= floor).collect();
    fired.sort_by(|a, b| {
        b.points()
            .total_cmp(&a.points())
            .then_with(|| a.kind.cmp(&b.kind))
    });

    let raw: f64 = fired.iter().map(|s| s.points()).sum();
    let score = raw.round().clamp(0.0, 100.0) as u32;
    let label = RiskLabel::from_score(score, &rules.risk);

    let mut interventions: Vec<Intervention> = fired
        .iter()
        .map(|s| intervention_for(s, customer, &rules.risk))
        .collect();
    // Stable: equal urgencies keep contribution order.
    interventions.sort_by(|a, b| b.urgency.cmp(&a.urgency));

    log::debug!(
        "Customer {} churn score {} ({}) from {} signals",
        customer.id,
        score,
        label,
        fired.len()
    );

    ChurnRiskAssessment {
        label,
        score,
        signals: fired.into_iter().map(SignalExplanation::from).collect(),
        interventions,
        review_within_days: review_horizon(label, &rules.risk),
        summary: summary_for(label, customer, &rules.risk),
    }
}

fn review_horizon(label: RiskLabel, rules: &RiskRules) -> u32 {
    match label {
        RiskLabel::High => rules.review_days_high,
        RiskLabel::Medium => rules.review_days_medium,
        RiskLabel::Low => rules.review_days_low,
    }
}

fn summary_for(label: RiskLabel, customer: &Customer, rules: &RiskRules) -> String {
    match label {
        RiskLabel::High => format!(
            "Immediate intervention required: schedule an executive business review with {} within {} days.",
            interventions::owner(customer),
            rules.review_days_high
        ),
        RiskLabel::Medium => format!(
            "Proactive engagement recommended: hold a business review within {} days and monitor usage weekly.",
            rules.review_days_medium
        ),
        RiskLabel::Low => {
            "Maintain regular check-ins and continue expansion conversations.".to_string()
        }
    }
}
