use super::{whole_days_between, Error, FeatureUsage, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Validated usage facts for one customer, keyed by feature id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageSet {
    customer_id: String,
    by_feature: BTreeMap<String, FeatureUsage>,
}

impl UsageSet {
    pub fn empty(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            by_feature: BTreeMap::new(),
        }
    }

    /// Build the set, rejecting records that break the usage invariants:
    /// foreign customer ids, duplicate (customer, feature) pairs, actions
    /// without a last-used timestamp, and first use after last use.
    pub fn new(customer_id: impl Into<String>, records: Vec<FeatureUsage>) -> Result<Self> {
        let customer_id = customer_id.into();
        let mut by_feature = BTreeMap::new();

        for record in records {
            validate_record(&customer_id, &record)?;
            if by_feature.contains_key(&record.feature_id) {
                return Err(Error::invariant(format!(
                    "duplicate usage record for ({}, {})",
                    customer_id, record.feature_id
                )));
            }
            by_feature.insert(record.feature_id.clone(), record);
        }

        Ok(Self {
            customer_id,
            by_feature,
        })
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn get(&self, feature_id: &str) -> Option<&FeatureUsage> {
        self.by_feature.get(feature_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureUsage> {
        self.by_feature.values()
    }

    pub fn len(&self) -> usize {
        self.by_feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_feature.is_empty()
    }

    pub fn total_actions(&self) -> u64 {
        self.iter().map(|u| u.total_actions).sum()
    }

    /// Whether the feature has any recorded activity.
    pub fn is_used(&self, feature_id: &str) -> bool {
        self.get(feature_id).is_some_and(FeatureUsage::has_activity)
    }

    /// Days since the most recent use of any feature.
    pub fn days_since_any_use(&self, as_of: DateTime<Utc>) -> Option<u32> {
        self.iter()
            .filter_map(|u| u.last_used)
            .max()
            .map(|last| whole_days_between(last, as_of))
    }

    /// Distinct features used within the trailing `window_days`.
    pub fn distinct_used_within(&self, as_of: DateTime<Utc>, window_days: u32) -> usize {
        self.iter()
            .filter(|u| u.days_since_last_use(as_of).is_some_and(|d| d <= window_days))
            .count()
    }
}

fn validate_record(customer_id: &str, record: &FeatureUsage) -> Result<()> {
    if record.customer_id != customer_id {
        return Err(Error::invariant(format!(
            "usage record for feature {} belongs to {}, expected {}",
            record.feature_id, record.customer_id, customer_id
        )));
    }
    if record.total_actions > 0 && record.last_used.is_none() {
        return Err(Error::invariant(format!(
            "usage ({}, {}) has {} actions but no last-used timestamp",
            customer_id, record.feature_id, record.total_actions
        )));
    }
    if let (Some(first), Some(last)) = (record.first_used, record.last_used) {
        if first > last {
            return Err(Error::invariant(format!(
                "usage ({}, {}) first used after last used",
                customer_id, record.feature_id
            )));
        }
    }
    Ok(())
}
