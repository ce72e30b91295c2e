use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Explained;
use super::adoption_gap::expected_actions;
use crate::config::{AdoptionRules, RuleSet, SignalRules};
use crate::core::{Customer, Feature, UsageSet};

/// The fixed set of churn checks, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    CoreNonAdoption,
    RecencyDecline,
    UsageBreadth,
    PlanValueMismatch,
    EarlyAdoptionStall,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::CoreNonAdoption,
        SignalKind::RecencyDecline,
        SignalKind::UsageBreadth,
        SignalKind::PlanValueMismatch,
        SignalKind::EarlyAdoptionStall,
    ];

    /// Key used in rule tables.
    pub fn key(self) -> &'static str {
        match self {
            Self::CoreNonAdoption => "core_non_adoption",
            Self::RecencyDecline => "recency_decline",
            Self::UsageBreadth => "usage_breadth",
            Self::PlanValueMismatch => "plan_value_mismatch",
            Self::EarlyAdoptionStall => "early_adoption_stall",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoreNonAdoption => write!(f, "Core-feature non-adoption"),
            Self::RecencyDecline => write!(f, "Usage recency decline"),
            Self::UsageBreadth => write!(f, "Narrow usage breadth"),
            Self::PlanValueMismatch => write!(f, "Plan-value mismatch"),
            Self::EarlyAdoptionStall => write!(f, "Early adoption stall"),
        }
    }
}

/// One explainable churn observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnSignal {
    pub kind: SignalKind,
    /// What was measured, in words
    pub observed: String,
    /// Risk points added, with the sentence shown to users
    pub contribution: Explained<f64>,
}

impl ChurnSignal {
    fn new(kind: SignalKind, observed: String, contribution: f64, effect: &str) -> Self {
        let contribution = if contribution > 0.0 {
            Explained::new(contribution, format!("{} → +{:.0} risk", effect, contribution))
        } else {
            Explained::zero(format!("{} → no added risk", effect))
        };
        Self {
            kind,
            observed,
            contribution,
        }
    }

    pub fn points(&self) -> f64 {
        self.contribution.value
    }
}

/// Evaluate every churn check for one customer.
///
/// Always returns one entry per [`SignalKind`], in [`SignalKind::ALL`] order;
/// checks that did not fire carry a zero contribution.
pub fn compute_churn_signals(
    customer: &Customer,
    catalog: &[Feature],
    usage: &UsageSet,
    as_of: DateTime<Utc>,
    rule_set: &RuleSet,
) -> Vec<ChurnSignal> {
    let rules = &rule_set.signals;
    let eligible: Vec<&Feature> = catalog
        .iter()
        .filter(|f| f.is_available_on(customer.plan))
        .collect();
    let core: Vec<&Feature> = eligible.iter().copied().filter(|f| f.is_core).collect();

    vec![
        core_non_adoption(customer, &core, usage, rules),
        recency_decline(customer, usage, as_of, rules),
        usage_breadth(eligible.len(), usage, as_of, rules),
        plan_value_mismatch(customer, eligible.len(), usage, &rule_set.adoption, rules),
        early_adoption_stall(customer, &core, usage, rules),
    ]
}

fn core_non_adoption(
    customer: &Customer,
    core: &[&Feature],
    usage: &UsageSet,
    rules: &SignalRules,
) -> ChurnSignal {
    let unused: Vec<&str> = core
        .iter()
        .filter(|f| !usage.is_used(&f.id))
        .map(|f| f.name.as_str())
        .collect();

    let observed = format!("{} of {} core features unused", unused.len(), core.len());
    if unused.is_empty() {
        return ChurnSignal::new(
            SignalKind::CoreNonAdoption,
            observed,
            0.0,
            "all core features in use",
        );
    }

    let noun = if unused.len() == 1 {
        "core feature"
    } else {
        "core features"
    };
    let effect = format!(
        "no usage of {} {} in {} days",
        noun,
        unused.join(", "),
        customer.account_age_days
    );
    ChurnSignal::new(
        SignalKind::CoreNonAdoption,
        observed,
        rules.weights.core_non_adoption,
        &effect,
    )
}

fn recency_decline(
    customer: &Customer,
    usage: &UsageSet,
    as_of: DateTime<Utc>,
    rules: &SignalRules,
) -> ChurnSignal {
    // No activity at all counts as idle since signup.
    let (idle_days, observed) = match usage.days_since_any_use(as_of) {
        Some(days) => (days, format!("last activity {} days ago", days)),
        None => (
            customer.account_age_days,
            format!(
                "no activity since signup {} days ago",
                customer.account_age_days
            ),
        ),
    };

    let excess = idle_days.saturating_sub(rules.freshness_days);
    let fraction = (f64::from(excess) / f64::from(rules.recency_saturation_days.max(1))).min(1.0);
    let contribution = rules.weights.recency_decline * fraction;

    let effect = if excess > 0 {
        format!(
            "{}, {} days past the {}-day freshness threshold",
            observed, excess, rules.freshness_days
        )
    } else {
        format!("{}, within the {}-day freshness threshold", observed, rules.freshness_days)
    };
    ChurnSignal::new(SignalKind::RecencyDecline, observed, contribution, &effect)
}

fn usage_breadth(
    eligible_count: usize,
    usage: &UsageSet,
    as_of: DateTime<Utc>,
    rules: &SignalRules,
) -> ChurnSignal {
    let recent = usage.distinct_used_within(as_of, rules.breadth_window_days);
    let target = rules.breadth_target.min(eligible_count);
    let observed = format!(
        "{} distinct features used in the last {} days",
        recent, rules.breadth_window_days
    );

    if target == 0 {
        return ChurnSignal::new(
            SignalKind::UsageBreadth,
            observed,
            0.0,
            "no eligible features to measure breadth against",
        );
    }

    let shortfall = target.saturating_sub(recent);
    let contribution = rules.weights.usage_breadth * shortfall as f64 / target as f64;
    let effect = format!("{} (healthy is {} or more)", observed, target);
    ChurnSignal::new(SignalKind::UsageBreadth, observed, contribution, &effect)
}

/// Fires when a high-paying account records fewer actions than it needs.
///
/// The floor is `low_activity_actions`, lowered to the actions a fully
/// adopted account of this age would have across its eligible features.
fn plan_value_mismatch(
    customer: &Customer,
    eligible_count: usize,
    usage: &UsageSet,
    adoption: &AdoptionRules,
    rules: &SignalRules,
) -> ChurnSignal {
    let actions = usage.total_actions();
    let observed = format!("${:.0} MRR with {} recorded actions", customer.mrr, actions);
    let adoption_floor =
        expected_actions(customer.account_age_days, adoption) * eligible_count as f64;
    let floor = adoption_floor.min(rules.low_activity_actions as f64);
    let fires = customer.mrr >= rules.high_mrr && (actions as f64) < floor;

    if fires {
        let effect = format!(
            "paying ${:.0}/month but only {} actions recorded",
            customer.mrr, actions
        );
        ChurnSignal::new(
            SignalKind::PlanValueMismatch,
            observed,
            rules.weights.plan_value_mismatch,
            &effect,
        )
    } else {
        ChurnSignal::new(
            SignalKind::PlanValueMismatch,
            observed,
            0.0,
            "activity is in line with plan value",
        )
    }
}

fn early_adoption_stall(
    customer: &Customer,
    core: &[&Feature],
    usage: &UsageSet,
    rules: &SignalRules,
) -> ChurnSignal {
    let used = core.iter().filter(|f| usage.is_used(&f.id)).count();
    let observed = format!(
        "{} of {} core features used after {} days",
        used,
        core.len(),
        customer.account_age_days
    );

    // Grace period of one freshness interval before an account can stall.
    let in_early_lifecycle = customer.account_age_days < rules.early_lifecycle_days
        && customer.account_age_days >= rules.freshness_days;
    let ratio = if core.is_empty() {
        1.0
    } else {
        used as f64 / core.len() as f64
    };

    if in_early_lifecycle && ratio < rules.early_core_adoption_ratio {
        let effect = format!("new account with low early adoption ({})", observed);
        ChurnSignal::new(
            SignalKind::EarlyAdoptionStall,
            observed,
            rules.weights.early_adoption_stall,
            &effect,
        )
    } else {
        ChurnSignal::new(
            SignalKind::EarlyAdoptionStall,
            observed,
            0.0,
            "early adoption on track",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FeatureCategory, FeatureUsage, PlanTier};
    use chrono::Duration;

    fn customer(mrr: f64, age: u32) -> Customer {
        Customer {
            id: "c1".into(),
            name: "Acme".into(),
            plan: PlanTier::Standard,
            mrr,
            account_age_days: age,
            segment: None,
            account_manager: None,
        }
    }

    fn feature(id: &str, is_core: bool) -> Feature {
        Feature {
            id: id.into(),
            name: id.to_uppercase(),
            category: FeatureCategory::Core,
            available_on: PlanTier::Basic.and_above(),
            is_core,
            segments: Vec::new(),
        }
    }

    fn used(feature_id: &str, actions: u64, days_ago: i64, as_of: DateTime<Utc>) -> FeatureUsage {
        FeatureUsage {
            customer_id: "c1".into(),
            feature_id: feature_id.into(),
            total_actions: actions,
            first_used: Some(as_of - Duration::days(days_ago + 30)),
            last_used: Some(as_of - Duration::days(days_ago)),
        }
    }

    fn points(signals: &[ChurnSignal], kind: SignalKind) -> f64 {
        signals
            .iter()
            .find(|s| s.kind == kind)
            .map(ChurnSignal::points)
            .unwrap()
    }

    #[test]
    fn test_fixed_signal_set_in_order() {
        let now = Utc::now();
        let signals = compute_churn_signals(
            &customer(100.0, 200),
            &[],
            &UsageSet::empty("c1"),
            now,
            &RuleSet::default(),
        );
        let kinds: Vec<_> = signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SignalKind::ALL.to_vec());
    }

    #[test]
    fn test_core_non_adoption_names_the_feature() {
        let now = Utc::now();
        let catalog = vec![feature("dash", true), feature("api", false)];
        let usage = UsageSet::new("c1", vec![used("api", 50, 1, now)]).unwrap();
        let signals = compute_churn_signals(
            &customer(100.0, 30),
            &catalog,
            &usage,
            now,
            &RuleSet::default(),
        );
        let core = &signals[0];
        assert_eq!(core.points(), 40.0);
        assert_eq!(
            core.contribution.explanation,
            "no usage of core feature DASH in 30 days → +40 risk"
        );
    }

    #[test]
    fn test_recency_proportional_to_idle_days() {
        let now = Utc::now();
        let catalog = vec![feature("dash", true)];
        let rules = RuleSet::default();

        let fresh = UsageSet::new("c1", vec![used("dash", 50, 10, now)]).unwrap();
        let idle = UsageSet::new("c1", vec![used("dash", 50, 37, now)]).unwrap();
        let dormant = UsageSet::new("c1", vec![used("dash", 50, 120, now)]).unwrap();
        let c = customer(100.0, 300);

        let at = |u: &UsageSet| {
            points(
                &compute_churn_signals(&c, &catalog, u, now, &rules),
                SignalKind::RecencyDecline,
            )
        };
        assert_eq!(at(&fresh), 0.0);
        assert!((at(&idle) - 15.0).abs() < 1e-9);
        assert_eq!(at(&dormant), 30.0);
    }

    #[test]
    fn test_breadth_target_capped_by_catalog() {
        let now = Utc::now();
        let catalog = vec![feature("dash", true), feature("api", false)];
        let usage =
            UsageSet::new("c1", vec![used("dash", 50, 1, now), used("api", 50, 2, now)]).unwrap();
        let signals = compute_churn_signals(
            &customer(100.0, 300),
            &catalog,
            &usage,
            now,
            &RuleSet::default(),
        );
        assert_eq!(points(&signals, SignalKind::UsageBreadth), 0.0);
    }

    #[test]
    fn test_plan_value_mismatch() {
        let now = Utc::now();
        let catalog = vec![feature("dash", true)];
        let usage = UsageSet::new("c1", vec![used("dash", 4, 1, now)]).unwrap();
        let rules = RuleSet::default();

        let pricey = compute_churn_signals(&customer(500.0, 300), &catalog, &usage, now, &rules);
        let cheap = compute_churn_signals(&customer(50.0, 300), &catalog, &usage, now, &rules);
        assert_eq!(points(&pricey, SignalKind::PlanValueMismatch), 25.0);
        assert_eq!(points(&cheap, SignalKind::PlanValueMismatch), 0.0);
    }

    #[test]
    fn test_plan_value_mismatch_respects_adoption_volume() {
        // 14 days, one feature: 3 actions is full adoption.
        let now = Utc::now();
        let catalog = vec![feature("dash", true)];
        let rules = RuleSet::default();

        let adopted = UsageSet::new("c1", vec![used("dash", 3, 1, now)]).unwrap();
        let short = UsageSet::new("c1", vec![used("dash", 2, 1, now)]).unwrap();
        let at = |u: &UsageSet| {
            points(
                &compute_churn_signals(&customer(500.0, 14), &catalog, u, now, &rules),
                SignalKind::PlanValueMismatch,
            )
        };
        assert_eq!(at(&adopted), 0.0);
        assert_eq!(at(&short), 25.0);
    }

    #[test]
    fn test_early_adoption_stall_needs_young_account() {
        let now = Utc::now();
        let catalog = vec![feature("dash", true), feature("reports", true)];
        let usage = UsageSet::empty("c1");
        let rules = RuleSet::default();

        let young = compute_churn_signals(&customer(50.0, 30), &catalog, &usage, now, &rules);
        let brand_new = compute_churn_signals(&customer(50.0, 3), &catalog, &usage, now, &rules);
        let mature = compute_churn_signals(&customer(50.0, 300), &catalog, &usage, now, &rules);
        assert_eq!(points(&young, SignalKind::EarlyAdoptionStall), 10.0);
        assert_eq!(points(&brand_new, SignalKind::EarlyAdoptionStall), 0.0);
        assert_eq!(points(&mature, SignalKind::EarlyAdoptionStall), 0.0);
    }
}
