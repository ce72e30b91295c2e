pub mod errors;
pub mod usage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use errors::{Error, ErrorCode, Result};
pub use usage::UsageSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Standard,
    Premium,
    Enterprise,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [
        PlanTier::Basic,
        PlanTier::Standard,
        PlanTier::Premium,
        PlanTier::Enterprise,
    ];

    /// Every tier at or above `self`.
    pub fn and_above(self) -> BTreeSet<PlanTier> {
        Self::ALL.into_iter().filter(|tier| *tier >= self).collect()
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Standard => write!(f, "standard"),
            Self::Premium => write!(f, "premium"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureCategory {
    Core,
    Collaboration,
    Analytics,
    Integration,
    Advanced,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 5] = [
        FeatureCategory::Core,
        FeatureCategory::Collaboration,
        FeatureCategory::Analytics,
        FeatureCategory::Integration,
        FeatureCategory::Advanced,
    ];

    /// Categories whose adoption usually precedes a plan expansion.
    pub fn drives_expansion(self) -> bool {
        matches!(self, Self::Analytics | Self::Integration | Self::Advanced)
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Collaboration => write!(f, "collaboration"),
            Self::Analytics => write!(f, "analytics"),
            Self::Integration => write!(f, "integration"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub plan: PlanTier,
    /// Monthly recurring revenue in account currency.
    pub mrr: f64,
    pub account_age_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_manager: Option<String>,
}

impl Customer {
    /// Reject records that cannot come from a well-behaved data source.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invariant("customer id must not be empty"));
        }
        if !self.mrr.is_finite() || self.mrr < 0.0 {
            return Err(Error::invariant(format!(
                "customer {} has invalid MRR {}",
                self.id, self.mrr
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub category: FeatureCategory,
    pub available_on: BTreeSet<PlanTier>,
    /// Expected to be used by every customer.
    #[serde(default)]
    pub is_core: bool,
    /// Segments this feature is built for; empty means general purpose.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
}

impl Feature {
    pub fn is_available_on(&self, plan: PlanTier) -> bool {
        self.available_on.contains(&plan)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub customer_id: String,
    pub feature_id: String,
    #[serde(default)]
    pub total_actions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl FeatureUsage {
    pub fn never_used(customer_id: impl Into<String>, feature_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            feature_id: feature_id.into(),
            total_actions: 0,
            first_used: None,
            last_used: None,
        }
    }

    /// Any recorded activity at all.
    pub fn has_activity(&self) -> bool {
        self.total_actions > 0 || self.last_used.is_some()
    }

    /// Whole days between the last recorded use and `as_of`.
    pub fn days_since_last_use(&self, as_of: DateTime<Utc>) -> Option<u32> {
        self.last_used.map(|last| whole_days_between(last, as_of))
    }
}

/// Whole days from `earlier` to `later`; timestamps in the future count as zero.
pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> u32 {
    let days = (later - earlier).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}
