use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Explained;
use crate::config::{AdoptionRules, RelevanceFactors};
use crate::core::{Customer, Feature, FeatureUsage};

/// Why a feature is under-adopted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCause {
    NeverUsed,
    Infrequent,
    Stale,
    Adopted,
}

impl fmt::Display for GapCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeverUsed => write!(f, "never used"),
            Self::Infrequent => write!(f, "infrequent"),
            Self::Stale => write!(f, "stale"),
            Self::Adopted => write!(f, "adopted"),
        }
    }
}

/// How much a feature matters to this particular customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Core,
    SegmentMatch,
    General,
    SegmentMismatch,
}

impl Relevance {
    pub fn classify(customer: &Customer, feature: &Feature) -> Self {
        if feature.is_core {
            return Self::Core;
        }
        if feature.segments.is_empty() {
            return Self::General;
        }
        let matches = customer.segment.as_deref().is_some_and(|segment| {
            feature
                .segments
                .iter()
                .any(|s| s.eq_ignore_ascii_case(segment))
        });
        if matches {
            Self::SegmentMatch
        } else {
            Self::SegmentMismatch
        }
    }

    pub fn factor(self, factors: &RelevanceFactors) -> f64 {
        match self {
            Self::Core => factors.core,
            Self::SegmentMatch => factors.segment_match,
            Self::General => factors.general,
            Self::SegmentMismatch => factors.segment_mismatch,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Core => "core feature",
            Self::SegmentMatch => "built for this segment",
            Self::General => "general-purpose feature",
            Self::SegmentMismatch => "outside this segment",
        }
    }
}

/// Adoption gap of one plan-eligible feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdoptionGap {
    pub feature_id: String,
    pub cause: GapCause,
    pub relevance: Relevance,
    /// Gap in [0, 1] with its justification
    pub score: Explained<f64>,
    pub actions: u64,
    pub days_since_last_use: Option<u32>,
}

/// Score how far `customer` is from adopting `feature`.
///
/// Returns `None` when the feature is not available on the customer's plan;
/// such features are never recommended.
pub fn compute_adoption_gap(
    customer: &Customer,
    feature: &Feature,
    usage: Option<&FeatureUsage>,
    as_of: DateTime<Utc>,
    rules: &AdoptionRules,
) -> Option<AdoptionGap> {
    if !feature.is_available_on(customer.plan) {
        return None;
    }

    let relevance = Relevance::classify(customer, feature);
    let age = customer.account_age_days;
    let actions = usage.map_or(0, |u| u.total_actions);
    let days_since_last_use = usage.and_then(|u| u.days_since_last_use(as_of));

    let (cause, base, reason) = match usage.filter(|u| u.has_activity()) {
        None => {
            // Core features are expected from day one; the rest get the adoption window.
            let base = match relevance {
                Relevance::Core => 1.0,
                _ => never_used_gap(age, rules.adoption_window_days),
            };
            let reason = format!(
                "'{}' has never been used in {} days on the account",
                feature.name, age
            );
            (GapCause::NeverUsed, base, reason)
        }
        Some(_) => {
            let expected = expected_actions(age, rules);
            let infrequent = infrequent_gap(actions, expected, rules.ceilings.infrequent);
            let stale = days_since_last_use.map_or(0.0, |days| stale_gap(days, rules));

            if infrequent == 0.0 && stale == 0.0 {
                let reason = format!(
                    "'{}' is in regular use ({} actions)",
                    feature.name, actions
                );
                (GapCause::Adopted, 0.0, reason)
            } else if stale > infrequent {
                let days = days_since_last_use.unwrap_or_default();
                let reason = format!(
                    "'{}' was last used {} days ago, past the {}-day freshness limit",
                    feature.name, days, rules.stale_after_days
                );
                (GapCause::Stale, stale, reason)
            } else {
                let reason = format!(
                    "'{}' has {} recorded actions, below the {:.0} expected after {} days",
                    feature.name, actions, expected, age
                );
                (GapCause::Infrequent, infrequent, reason)
            }
        }
    };

    let score = (base * relevance.factor(&rules.relevance)).clamp(0.0, 1.0);
    let explanation = format!("{} ({}, gap {:.2})", reason, relevance.describe(), score);

    Some(AdoptionGap {
        feature_id: feature.id.clone(),
        cause,
        relevance,
        score: Explained::new(score, explanation),
        actions,
        days_since_last_use,
    })
}

/// Full gap once the adoption window has passed; ramps up linearly before it.
fn never_used_gap(age_days: u32, window_days: u32) -> f64 {
    if window_days == 0 || age_days >= window_days {
        1.0
    } else {
        f64::from(age_days) / f64::from(window_days)
    }
}

/// Actions expected by now: the floor per adoption window, scaled by account age.
pub(crate) fn expected_actions(age_days: u32, rules: &AdoptionRules) -> f64 {
    let windows = f64::from(age_days) / f64::from(rules.adoption_window_days.max(1));
    rules.min_actions as f64 * windows.max(1.0)
}

fn infrequent_gap(actions: u64, expected: f64, ceiling: f64) -> f64 {
    let actions = actions as f64;
    if actions >= expected {
        0.0
    } else {
        ceiling * (1.0 - actions / expected)
    }
}

fn stale_gap(days_idle: u32, rules: &AdoptionRules) -> f64 {
    let limit = rules.stale_after_days;
    if days_idle <= limit {
        return 0.0;
    }
    let overdue = f64::from(days_idle - limit) / f64::from(limit.max(1));
    let ceilings = &rules.ceilings;
    ceilings.stale_floor + (ceilings.stale - ceilings.stale_floor) * overdue.min(1.0)
}
