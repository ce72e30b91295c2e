//! The single entry point callers use: one `CustomerIntelligence` per request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::RuleSet;
use crate::core::{Error, Result};
use crate::data::DataAccess;
use crate::observability::{
    record_completed_analysis, set_current_customer, set_phase, AnalysisPhase,
};
use crate::onboarding::{compose_onboarding, OnboardingStep};
use crate::recommendations::{build_recommendations, Recommendation};
use crate::risk::{assess_churn_risk, ChurnRiskAssessment};
use crate::scoring::compute_churn_signals;
use crate::trend::{RecommendationRecord, RiskTrend, TrendStore};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerIntelligence {
    pub customer_id: String,
    pub customer_name: String,
    pub generated_at: DateTime<Utc>,
    pub rules_version: String,
    pub recommendations: Vec<Recommendation>,
    pub risk: ChurnRiskAssessment,
    pub onboarding: Vec<OnboardingStep>,
    pub trend: RiskTrend,
}

/// Sequences scoring, ranking, risk, onboarding, and trend memory.
///
/// Shareable across threads; the only mutable state lives in the trend store.
pub struct IntelligenceEngine {
    data: Arc<dyn DataAccess>,
    trend: Arc<dyn TrendStore>,
    rules: RuleSet,
}

impl IntelligenceEngine {
    pub fn new(data: Arc<dyn DataAccess>, trend: Arc<dyn TrendStore>, rules: RuleSet) -> Self {
        Self { data, trend, rules }
    }

    pub fn trend_store(&self) -> &Arc<dyn TrendStore> {
        &self.trend
    }

    pub fn analyze_customer(&self, customer_id: &str) -> Result<CustomerIntelligence> {
        self.analyze_customer_at(customer_id, Utc::now())
    }

    /// Analyze as of a fixed instant.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` when the data source does not know the id
    /// - `InsufficientData` when nothing in the catalog is on the customer's plan
    ///
    /// Neither error records anything into trend memory.
    pub fn analyze_customer_at(
        &self,
        customer_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<CustomerIntelligence> {
        let span = tracing::info_span!("analyze_customer", customer_id);
        let _enter = span.enter();
        let _customer = set_current_customer(customer_id);

        let (customer, catalog, usage) = {
            let _phase = set_phase(AnalysisPhase::DataLoading);
            let customer = self
                .data
                .get_customer(customer_id)
                .ok_or_else(|| Error::customer_not_found(customer_id))?;
            let usage = self
                .data
                .get_usage(customer_id)
                .ok_or_else(|| Error::customer_not_found(customer_id))?;
            (customer, self.data.get_feature_catalog(), usage)
        };
        log::debug!(
            "Loaded {} ({} plan, {} usage records, {} catalog features)",
            customer.id,
            customer.plan,
            usage.len(),
            catalog.len()
        );

        let recommendations = {
            let _phase = set_phase(AnalysisPhase::Recommendation);
            build_recommendations(&customer, &catalog, &usage, as_of, &self.rules)?
        };

        let risk = {
            let _phase = set_phase(AnalysisPhase::RiskAssessment);
            let signals =
                compute_churn_signals(&customer, &catalog, &usage, as_of, &self.rules);
            assess_churn_risk(&customer, &signals, &self.rules)
        };

        let onboarding = {
            let _phase = set_phase(AnalysisPhase::Onboarding);
            compose_onboarding(recommendations.first(), &self.rules.playbooks)
        };

        let trend = {
            let _phase = set_phase(AnalysisPhase::TrendTracking);
            let trend = self.trend.record_and_classify(&customer.id, risk.score, as_of);
            self.trend.record_recommendations(
                &customer.id,
                RecommendationRecord {
                    timestamp: as_of,
                    feature_ids: recommendations.iter().map(|r| r.feature_id.clone()).collect(),
                },
            );
            trend
        };

        log::info!(
            "Analyzed {}: {} recommendations, risk {} ({}), trend {}",
            customer.id,
            recommendations.len(),
            risk.score,
            risk.label,
            trend
        );
        record_completed_analysis();

        Ok(CustomerIntelligence {
            customer_id: customer.id,
            customer_name: customer.name,
            generated_at: as_of,
            rules_version: self.rules.version.clone(),
            recommendations,
            risk,
            onboarding,
            trend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Customer, Feature, FeatureCategory, PlanTier};
    use crate::data::{Dataset, InMemoryDataSource};
    use crate::trend::InMemoryTrendStore;
    use chrono::TimeZone;

    fn engine(dataset: Dataset) -> IntelligenceEngine {
        IntelligenceEngine::new(
            Arc::new(InMemoryDataSource::from_dataset(dataset).unwrap()),
            Arc::new(InMemoryTrendStore::new(10, 5.0)),
            RuleSet::default(),
        )
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_unknown_customer_records_nothing() {
        let engine = engine(Dataset::default());
        let err = engine.analyze_customer_at("nobody", as_of()).unwrap_err();
        assert!(matches!(err, Error::CustomerNotFound { .. }));
        assert!(engine.trend_store().history("nobody").is_empty());
    }

    #[test]
    fn test_insufficient_data_records_nothing() {
        let dataset = Dataset::default()
            .with_customer(Customer {
                id: "c1".into(),
                name: "Acme".into(),
                plan: PlanTier::Basic,
                mrr: 100.0,
                account_age_days: 50,
                segment: None,
                account_manager: None,
            })
            .with_feature(Feature {
                id: "sso".into(),
                name: "SSO".into(),
                category: FeatureCategory::Advanced,
                available_on: PlanTier::Enterprise.and_above(),
                is_core: false,
                segments: Vec::new(),
            });
        let engine = engine(dataset);
        let err = engine.analyze_customer_at("c1", as_of()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
        assert!(err.is_recoverable());
        assert!(engine.trend_store().history("c1").is_empty());
        assert!(engine.trend_store().recommendation_history("c1", 5).is_empty());
    }

    #[test]
    fn test_each_analysis_records_its_recommendations() {
        let dataset = crate::data::demo::demo_dataset(as_of());
        let engine = engine(dataset);

        let first = engine.analyze_customer_at("cust_003", as_of()).unwrap();
        let later = as_of() + chrono::Duration::days(1);
        engine.analyze_customer_at("cust_003", later).unwrap();

        let history = engine.trend_store().recommendation_history("cust_003", 5);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, as_of());
        assert_eq!(history[1].timestamp, later);
        let first_ids: Vec<String> = first
            .recommendations
            .iter()
            .map(|r| r.feature_id.clone())
            .collect();
        assert_eq!(history[0].feature_ids, first_ids);
    }
}
