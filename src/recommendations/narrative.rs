//! Deterministic recommendation text.
//!
//! Text depends only on the feature's category, the gap cause, and customer
//! facts, so identical inputs always produce identical wording.

use crate::config::AdoptionRules;
use crate::core::{Customer, Feature, FeatureCategory};
use crate::scoring::{AdoptionGap, GapCause};

pub fn reason(gap: &AdoptionGap) -> String {
    let prefix = match gap.cause {
        GapCause::NeverUsed => "Never used",
        GapCause::Infrequent => "Infrequent use",
        GapCause::Stale => "Stale usage",
        GapCause::Adopted => "Adopted",
    };
    format!("{}: {}", prefix, gap.score.explanation)
}

pub fn suggested_action(customer: &Customer, feature: &Feature, gap: &AdoptionGap) -> String {
    let owner = customer
        .account_manager
        .as_deref()
        .unwrap_or("the customer success team");
    match gap.cause {
        GapCause::NeverUsed => format!(
            "Schedule a 30-minute onboarding session with {} to demonstrate {} {}",
            owner,
            feature.name,
            category_focus(feature.category)
        ),
        GapCause::Stale => format!(
            "Send a re-engagement email with {} use cases for {}, then follow up with a quick check-in call",
            feature.category, feature.name
        ),
        GapCause::Infrequent | GapCause::Adopted => format!(
            "Share advanced tips and best practices for {} via in-app guidance",
            feature.name
        ),
    }
}

pub fn expected_impact(customer: &Customer, feature: &Feature, rules: &AdoptionRules) -> String {
    if feature.is_core {
        return "Raises core product engagement and lowers churn risk".to_string();
    }
    if feature.category.drives_expansion() && customer.mrr > 0.0 {
        return format!(
            "Builds the case for expansion: potential of about ${:.0}/month",
            customer.mrr * rules.expansion_share
        );
    }
    match feature.category {
        FeatureCategory::Collaboration => {
            "Spreads the product across more of the team, making the account stickier".to_string()
        }
        _ => "Deepens day-to-day product engagement".to_string(),
    }
}

fn category_focus(category: FeatureCategory) -> &'static str {
    match category {
        FeatureCategory::Core => "within the team's daily workflow",
        FeatureCategory::Collaboration => "with the wider team",
        FeatureCategory::Analytics => "against the customer's key metrics",
        FeatureCategory::Integration => "connected to their primary systems",
        FeatureCategory::Advanced => "on one high-value use case",
    }
}
