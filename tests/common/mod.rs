#![allow(dead_code)]

use adoptmap::{
    Customer, Dataset, Feature, FeatureCategory, FeatureUsage, InMemoryDataSource,
    InMemoryTrendStore, IntelligenceEngine, PlanTier, RuleSet,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn customer(id: &str, plan: PlanTier, mrr: f64, age: u32) -> Customer {
    Customer {
        id: id.to_string(),
        name: format!("Customer {}", id),
        plan,
        mrr,
        account_age_days: age,
        segment: None,
        account_manager: None,
    }
}

pub fn feature(id: &str, category: FeatureCategory, is_core: bool, min_tier: PlanTier) -> Feature {
    Feature {
        id: id.to_string(),
        name: id.replace('_', " "),
        category,
        available_on: min_tier.and_above(),
        is_core,
        segments: Vec::new(),
    }
}

/// Usage with `actions` recorded, last used `last_days_ago` before `as_of()`.
pub fn usage(customer_id: &str, feature_id: &str, actions: u64, last_days_ago: i64) -> FeatureUsage {
    FeatureUsage {
        customer_id: customer_id.to_string(),
        feature_id: feature_id.to_string(),
        total_actions: actions,
        first_used: Some(as_of() - Duration::days(last_days_ago + 30)),
        last_used: Some(as_of() - Duration::days(last_days_ago)),
    }
}

pub fn engine(dataset: Dataset) -> IntelligenceEngine {
    engine_with_rules(dataset, RuleSet::default())
}

pub fn engine_with_rules(dataset: Dataset, rules: RuleSet) -> IntelligenceEngine {
    let store = InMemoryTrendStore::from_rules(&rules.trend);
    IntelligenceEngine::new(
        Arc::new(InMemoryDataSource::from_dataset(dataset).unwrap()),
        Arc::new(store),
        rules,
    )
}
