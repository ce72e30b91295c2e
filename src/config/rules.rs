//! Scoring rule tables
//!
//! Every weight and threshold the engine uses lives here. Changing engine
//! behavior means changing these tables and bumping [`RULES_VERSION`].

use serde::{Deserialize, Serialize};

use super::playbooks::PlaybookTable;
use crate::risk::Urgency;
use crate::scoring::SignalKind;

/// Version stamp of the default rule tables.
pub const RULES_VERSION: &str = "2026.1";

/// Root policy object consumed by every scoring component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub adoption: AdoptionRules,

    #[serde(default)]
    pub confidence: ConfidenceRules,

    #[serde(default)]
    pub signals: SignalRules,

    #[serde(default)]
    pub risk: RiskRules,

    #[serde(default)]
    pub trend: TrendRules,

    #[serde(default)]
    pub playbooks: PlaybookTable,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: default_version(),
            adoption: AdoptionRules::default(),
            confidence: ConfidenceRules::default(),
            signals: SignalRules::default(),
            risk: RiskRules::default(),
            trend: TrendRules::default(),
            playbooks: PlaybookTable::default(),
        }
    }
}

fn default_version() -> String {
    RULES_VERSION.to_string()
}

/// Adoption-gap thresholds for the recommendation builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionRules {
    /// Days a new account gets before an unused feature counts as a full gap
    #[serde(default = "default_adoption_window_days")]
    pub adoption_window_days: u32,

    /// Actions expected per adoption window
    #[serde(default = "default_min_actions")]
    pub min_actions: u64,

    /// A used feature goes stale after this many idle days
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: u32,

    /// Gaps below this are not actionable
    #[serde(default = "default_min_gap")]
    pub min_gap: f64,

    /// Upper bound on recommendations returned (1..=3)
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Share of MRR quoted as expansion potential in impact text
    #[serde(default = "default_expansion_share")]
    pub expansion_share: f64,

    #[serde(default)]
    pub relevance: RelevanceFactors,

    #[serde(default)]
    pub ceilings: CauseCeilings,
}

impl Default for AdoptionRules {
    fn default() -> Self {
        Self {
            adoption_window_days: default_adoption_window_days(),
            min_actions: default_min_actions(),
            stale_after_days: default_stale_after_days(),
            min_gap: default_min_gap(),
            max_recommendations: default_max_recommendations(),
            expansion_share: default_expansion_share(),
            relevance: RelevanceFactors::default(),
            ceilings: CauseCeilings::default(),
        }
    }
}

fn default_adoption_window_days() -> u32 {
    14
}
fn default_min_actions() -> u64 {
    3
}
fn default_stale_after_days() -> u32 {
    30
}
fn default_min_gap() -> f64 {
    0.25
}
fn default_max_recommendations() -> usize {
    3
}
fn default_expansion_share() -> f64 {
    0.15
}

/// How strongly a feature matters to a given customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceFactors {
    pub core: f64,
    pub segment_match: f64,
    pub general: f64,
    pub segment_mismatch: f64,
}

impl Default for RelevanceFactors {
    fn default() -> Self {
        Self {
            core: 1.0,
            segment_match: 0.9,
            general: 0.7,
            segment_mismatch: 0.4,
        }
    }
}

/// Maximum base gap per cause; never-used is always 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CauseCeilings {
    pub infrequent: f64,
    pub stale: f64,
    /// Gap assigned the day a feature crosses the stale threshold
    pub stale_floor: f64,
}

impl Default for CauseCeilings {
    fn default() -> Self {
        Self {
            infrequent: 0.8,
            stale: 0.8,
            stale_floor: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceRules {
    pub floor: f64,
    pub ceiling: f64,
    /// Share of confidence driven by the gap score; the rest by evidence
    pub gap_share: f64,
    /// Total actions at which evidence counts as half saturated
    pub evidence_half_saturation: f64,
}

impl Default for ConfidenceRules {
    fn default() -> Self {
        Self {
            floor: 0.3,
            ceiling: 0.95,
            gap_share: 0.6,
            evidence_half_saturation: 50.0,
        }
    }
}

/// Maximum risk points each churn signal can contribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub core_non_adoption: f64,
    pub recency_decline: f64,
    pub usage_breadth: f64,
    pub plan_value_mismatch: f64,
    pub early_adoption_stall: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            core_non_adoption: 40.0,
            recency_decline: 30.0,
            usage_breadth: 20.0,
            plan_value_mismatch: 25.0,
            early_adoption_stall: 10.0,
        }
    }
}

impl SignalWeights {
    pub fn weight(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::CoreNonAdoption => self.core_non_adoption,
            SignalKind::RecencyDecline => self.recency_decline,
            SignalKind::UsageBreadth => self.usage_breadth,
            SignalKind::PlanValueMismatch => self.plan_value_mismatch,
            SignalKind::EarlyAdoptionStall => self.early_adoption_stall,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRules {
    /// Idle days tolerated before recency decline starts contributing
    #[serde(default = "default_freshness_days")]
    pub freshness_days: u32,

    /// Idle days beyond freshness at which recency decline is at full weight
    #[serde(default = "default_recency_saturation_days")]
    pub recency_saturation_days: u32,

    #[serde(default = "default_breadth_window_days")]
    pub breadth_window_days: u32,

    /// Distinct recently used features considered healthy
    #[serde(default = "default_breadth_target")]
    pub breadth_target: usize,

    #[serde(default = "default_high_mrr")]
    pub high_mrr: f64,

    #[serde(default = "default_low_activity_actions")]
    pub low_activity_actions: u64,

    #[serde(default = "default_early_lifecycle_days")]
    pub early_lifecycle_days: u32,

    #[serde(default = "default_early_core_adoption_ratio")]
    pub early_core_adoption_ratio: f64,

    /// Signals contributing less than this are not reported
    #[serde(default = "default_contribution_floor")]
    pub contribution_floor: f64,

    #[serde(default)]
    pub weights: SignalWeights,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            freshness_days: default_freshness_days(),
            recency_saturation_days: default_recency_saturation_days(),
            breadth_window_days: default_breadth_window_days(),
            breadth_target: default_breadth_target(),
            high_mrr: default_high_mrr(),
            low_activity_actions: default_low_activity_actions(),
            early_lifecycle_days: default_early_lifecycle_days(),
            early_core_adoption_ratio: default_early_core_adoption_ratio(),
            contribution_floor: default_contribution_floor(),
            weights: SignalWeights::default(),
        }
    }
}

fn default_freshness_days() -> u32 {
    14
}
fn default_recency_saturation_days() -> u32 {
    46
}
fn default_breadth_window_days() -> u32 {
    30
}
fn default_breadth_target() -> usize {
    3
}
fn default_high_mrr() -> f64 {
    400.0
}
fn default_low_activity_actions() -> u64 {
    25
}
fn default_early_lifecycle_days() -> u32 {
    90
}
fn default_early_core_adoption_ratio() -> f64 {
    0.3
}
fn default_contribution_floor() -> f64 {
    1.0
}

/// Label bands and intervention urgency.
///
/// Scores below `medium_at` are Low, scores below `high_at` are Medium,
/// everything else is High.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRules {
    pub medium_at: u32,
    pub high_at: u32,
    pub high_urgency_at: f64,
    pub medium_urgency_at: f64,
    pub review_days_low: u32,
    pub review_days_medium: u32,
    pub review_days_high: u32,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            medium_at: 30,
            high_at: 70,
            high_urgency_at: 25.0,
            medium_urgency_at: 10.0,
            review_days_low: 90,
            review_days_medium: 30,
            review_days_high: 7,
        }
    }
}

impl RiskRules {
    /// Urgency for an intervention triggered by a signal of this contribution.
    pub fn urgency_for(&self, contribution: f64) -> Urgency {
        if contribution >= self.high_urgency_at {
            Urgency::High
        } else if contribution >= self.medium_urgency_at {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendRules {
    /// Assessments kept per customer
    pub retention: usize,
    /// Score moves smaller than this are stable
    pub noise_threshold: f64,
}

impl Default for TrendRules {
    fn default() -> Self {
        Self {
            retention: 10,
            noise_threshold: 5.0,
        }
    }
}

impl RuleSet {
    /// Collect every constraint violation instead of stopping at the first.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.version.trim().is_empty() {
            errors.push("version must not be empty".to_string());
        }

        let adoption = &self.adoption;
        if !(1..=3).contains(&adoption.max_recommendations) {
            errors.push(format!(
                "adoption.max_recommendations must be between 1 and 3, got {}",
                adoption.max_recommendations
            ));
        }
        if adoption.adoption_window_days == 0 {
            errors.push("adoption.adoption_window_days must be positive".to_string());
        }
        if adoption.min_actions == 0 {
            errors.push("adoption.min_actions must be positive".to_string());
        }
        if adoption.stale_after_days == 0 {
            errors.push("adoption.stale_after_days must be positive".to_string());
        }
        check_unit("adoption.min_gap", adoption.min_gap, &mut errors);
        check_unit("adoption.expansion_share", adoption.expansion_share, &mut errors);
        check_unit("adoption.relevance.core", adoption.relevance.core, &mut errors);
        check_unit(
            "adoption.relevance.segment_match",
            adoption.relevance.segment_match,
            &mut errors,
        );
        check_unit(
            "adoption.relevance.general",
            adoption.relevance.general,
            &mut errors,
        );
        check_unit(
            "adoption.relevance.segment_mismatch",
            adoption.relevance.segment_mismatch,
            &mut errors,
        );
        let relevance = &adoption.relevance;
        let strongest_other = relevance
            .segment_match
            .max(relevance.general)
            .max(relevance.segment_mismatch);
        if relevance.core <= strongest_other {
            errors.push(format!(
                "adoption.relevance.core ({}) must exceed every other relevance factor ({})",
                relevance.core, strongest_other
            ));
        }
        if relevance.core < adoption.min_gap {
            errors.push(format!(
                "adoption.relevance.core ({}) must not be below adoption.min_gap ({})",
                relevance.core, adoption.min_gap
            ));
        }
        check_unit(
            "adoption.ceilings.infrequent",
            adoption.ceilings.infrequent,
            &mut errors,
        );
        check_unit("adoption.ceilings.stale", adoption.ceilings.stale, &mut errors);
        if adoption.ceilings.stale_floor > adoption.ceilings.stale {
            errors.push("adoption.ceilings.stale_floor must not exceed stale".to_string());
        }

        let confidence = &self.confidence;
        check_unit("confidence.floor", confidence.floor, &mut errors);
        check_unit("confidence.ceiling", confidence.ceiling, &mut errors);
        check_unit("confidence.gap_share", confidence.gap_share, &mut errors);
        if confidence.floor > confidence.ceiling {
            errors.push("confidence.floor must not exceed confidence.ceiling".to_string());
        }
        if !confidence.evidence_half_saturation.is_finite()
            || confidence.evidence_half_saturation <= 0.0
        {
            errors.push("confidence.evidence_half_saturation must be positive".to_string());
        }

        for kind in SignalKind::ALL {
            let weight = self.signals.weights.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                errors.push(format!(
                    "signals.weights.{} must be a non-negative number",
                    kind.key()
                ));
            }
        }
        if !self.signals.high_mrr.is_finite() || self.signals.high_mrr <= 0.0 {
            errors.push("signals.high_mrr must be a positive number".to_string());
        }
        if self.signals.recency_saturation_days == 0 {
            errors.push("signals.recency_saturation_days must be positive".to_string());
        }
        if self.signals.breadth_target == 0 {
            errors.push("signals.breadth_target must be positive".to_string());
        }
        check_unit(
            "signals.early_core_adoption_ratio",
            self.signals.early_core_adoption_ratio,
            &mut errors,
        );

        let risk = &self.risk;
        if risk.medium_at >= risk.high_at {
            errors.push(format!(
                "risk.medium_at ({}) must be below risk.high_at ({})",
                risk.medium_at, risk.high_at
            ));
        }
        if risk.high_at > 100 {
            errors.push("risk.high_at must not exceed 100".to_string());
        }
        if risk.medium_urgency_at > risk.high_urgency_at {
            errors.push("risk.medium_urgency_at must not exceed high_urgency_at".to_string());
        }

        if self.trend.retention < 2 {
            errors.push("trend.retention must keep at least 2 assessments".to_string());
        }
        if !self.trend.noise_threshold.is_finite() || self.trend.noise_threshold < 0.0 {
            errors.push("trend.noise_threshold must be non-negative".to_string());
        }

        errors.extend(self.playbooks.validation_errors());
        errors
    }

    /// Validate, joining all problems into one configuration error.
    pub fn validate(&self) -> crate::core::Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::core::Error::configuration(errors.join("; ")))
        }
    }
}

fn check_unit(name: &str, value: f64, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(format!("{} must be between 0.0 and 1.0, got {}", name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = RuleSet::default();
        assert!(rules.validation_errors().is_empty());
        assert_eq!(rules.version, RULES_VERSION);
    }

    #[test]
    fn test_validation_accumulates_errors() {
        let mut rules = RuleSet::default();
        rules.adoption.max_recommendations = 5;
        rules.risk.medium_at = 80;
        rules.trend.retention = 1;
        rules.signals.weights.usage_breadth = -1.0;

        let errors = rules.validation_errors();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let mut rules = RuleSet::default();
        rules.confidence.evidence_half_saturation = f64::NAN;
        rules.signals.high_mrr = f64::INFINITY;

        let errors = rules.validation_errors();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].contains("evidence_half_saturation"));
        assert!(errors[1].contains("high_mrr"));
    }

    #[test]
    fn test_core_relevance_must_dominate() {
        let mut rules = RuleSet::default();
        rules.adoption.relevance.segment_match = 1.0;

        let errors = rules.validation_errors();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("adoption.relevance.core"));
    }

    #[test]
    fn test_urgency_bands() {
        let risk = RiskRules::default();
        assert_eq!(risk.urgency_for(40.0), Urgency::High);
        assert_eq!(risk.urgency_for(25.0), Urgency::High);
        assert_eq!(risk.urgency_for(24.9), Urgency::Medium);
        assert_eq!(risk.urgency_for(10.0), Urgency::Medium);
        assert_eq!(risk.urgency_for(3.0), Urgency::Low);
    }

    #[test]
    fn test_signal_weight_lookup_covers_every_kind() {
        let weights = SignalWeights::default();
        let total: f64 = SignalKind::ALL.iter().map(|k| weights.weight(*k)).sum();
        assert_eq!(total, 125.0);
    }
}
