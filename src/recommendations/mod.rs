pub mod narrative;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::{ConfidenceRules, RuleSet};
use crate::core::{Customer, Error, Feature, FeatureCategory, Result, UsageSet};
use crate::observability::{set_phase, AnalysisPhase};
use crate::scoring::{compute_adoption_gap, AdoptionGap, GapCause};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub feature_id: String,
    pub feature_name: String,
    pub category: FeatureCategory,
    /// 1-based, gap-free
    pub priority: usize,
    pub gap_score: f64,
    pub gap_cause: GapCause,
    pub reason: String,
    pub suggested_action: String,
    pub expected_impact: String,
    /// Within the configured floor and ceiling
    pub confidence: f64,
}

/// Rank the catalog into at most `max_recommendations` explained recommendations.
///
/// Fails with `InsufficientData` only when no catalog feature is available on
/// the customer's plan. A fully adopted customer yields an empty list.
pub fn build_recommendations(
    customer: &Customer,
    catalog: &[Feature],
    usage: &UsageSet,
    as_of: DateTime<Utc>,
    rules: &RuleSet,
) -> Result<Vec<Recommendation>> {
    let adoption = &rules.adoption;

    let eligible: Vec<(&Feature, AdoptionGap)> = {
        let _phase = set_phase(AnalysisPhase::AdoptionScoring);
        catalog
            .iter()
            .filter_map(|feature| {
                compute_adoption_gap(customer, feature, usage.get(&feature.id), as_of, adoption)
                    .map(|gap| (feature, gap))
            })
            .collect()
    };

    if eligible.is_empty() {
        return Err(Error::insufficient_data(
            &customer.id,
            format!("no catalog feature is available on the {} plan", customer.plan),
        ));
    }

    let mut candidates: Vec<(&Feature, AdoptionGap)> = eligible
        .into_iter()
        .filter(|(_, gap)| gap.cause != GapCause::Adopted && gap.score.value >= adoption.min_gap)
        .collect();

    candidates.sort_by(|(fa, a), (fb, b)| compare_candidates(a, fa, b, fb));
    candidates.truncate(adoption.max_recommendations);

    log::debug!(
        "Customer {}: {} recommendation candidates above gap {}",
        customer.id,
        candidates.len(),
        adoption.min_gap
    );

    let evidence = usage.total_actions();
    Ok(candidates
        .into_iter()
        .enumerate()
        .map(|(index, (feature, gap))| Recommendation {
            feature_id: feature.id.clone(),
            feature_name: feature.name.clone(),
            category: feature.category,
            priority: index + 1,
            gap_score: gap.score.value,
            gap_cause: gap.cause,
            reason: narrative::reason(&gap),
            suggested_action: narrative::suggested_action(customer, feature, &gap),
            expected_impact: narrative::expected_impact(customer, feature, adoption),
            confidence: confidence(gap.score.value, evidence, &rules.confidence),
        })
        .collect())
}

fn compare_candidates(a: &AdoptionGap, fa: &Feature, b: &AdoptionGap, fb: &Feature) -> Ordering {
    b.score
        .value
        .total_cmp(&a.score.value)
        .then_with(|| fa.id.cmp(&fb.id))
}

/// Monotonic in both gap size and recorded usage volume.
pub fn confidence(gap: f64, total_actions: u64, rules: &ConfidenceRules) -> f64 {
    let actions = total_actions as f64;
    let evidence = actions / (actions + rules.evidence_half_saturation);
    let raw = rules.gap_share * gap.clamp(0.0, 1.0) + (1.0 - rules.gap_share) * evidence;
    (rules.floor + (rules.ceiling - rules.floor) * raw).clamp(rules.floor, rules.ceiling)
}
