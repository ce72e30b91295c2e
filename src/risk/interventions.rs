use serde::{Deserialize, Serialize};

use super::Urgency;
use crate::config::RiskRules;
use crate::core::Customer;
use crate::scoring::{ChurnSignal, SignalKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub signal: SignalKind,
    pub action: String,
    pub urgency: Urgency,
}

/// Who should run the intervention.
pub(crate) fn owner(customer: &Customer) -> &str {
    customer
        .account_manager
        .as_deref()
        .unwrap_or("the account team")
}

/// Map a fired signal to its intervention template.
///
/// Urgency follows the risk points the signal carried in this assessment,
/// not its table weight: a recency decline that has only partly saturated
/// (say 15 of 30 points) yields a Medium intervention, a saturated one High.
pub fn intervention_for(signal: &ChurnSignal, customer: &Customer, rules: &RiskRules) -> Intervention {
    let owner = owner(customer);
    let action = match signal.kind {
        SignalKind::CoreNonAdoption => format!(
            "Book a core-feature enablement session with {} ({})",
            owner, signal.observed
        ),
        SignalKind::RecencyDecline => format!(
            "Send a re-engagement check-in from {} and confirm an active champion ({})",
            owner, signal.observed
        ),
        SignalKind::UsageBreadth => {
            "Share use-case examples for adjacent features to broaden day-to-day usage".to_string()
        }
        SignalKind::PlanValueMismatch => format!(
            "Have {} run a value review tying plan capabilities to the customer's goals",
            owner
        ),
        SignalKind::EarlyAdoptionStall => {
            "Restart onboarding with a 30-day success plan and weekly milestones".to_string()
        }
    };

    Intervention {
        signal: signal.kind,
        action,
        urgency: rules.urgency_for(signal.points()),
    }
}
