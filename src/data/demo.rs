//! Built-in demo accounts.
//!
//! Five customers with distinct health profiles (healthy, normal, at-risk,
//! champion, new) against a ten-feature catalog. All timestamps are relative
//! to `as_of`, so a given `as_of` always yields the same dataset.

use chrono::{DateTime, Duration, Utc};

use super::Dataset;
use crate::core::{Customer, Feature, FeatureCategory, FeatureUsage, PlanTier};

pub fn demo_dataset(as_of: DateTime<Utc>) -> Dataset {
    let mut dataset = Dataset {
        customers: demo_customers(),
        features: demo_catalog(),
        usage: Vec::new(),
    };

    let activity = |customer: &str, feature: &str, actions: u64, first: i64, last: i64| {
        FeatureUsage {
            customer_id: customer.to_string(),
            feature_id: feature.to_string(),
            total_actions: actions,
            first_used: Some(as_of - Duration::days(first)),
            last_used: Some(as_of - Duration::days(last)),
        }
    };

    // Healthy: broad recent usage, SSO never configured.
    dataset.usage.extend([
        activity("cust_001", "feat_core_dashboard", 620, 178, 1),
        activity("cust_001", "feat_core_reports", 240, 170, 2),
        activity("cust_001", "feat_collab_teams", 310, 160, 1),
        activity("cust_001", "feat_collab_comments", 150, 120, 4),
        activity("cust_001", "feat_analytics_advanced", 90, 100, 6),
        activity("cust_001", "feat_analytics_ai", 18, 60, 12),
        activity("cust_001", "feat_integration_api", 400, 175, 1),
        activity("cust_001", "feat_integration_webhook", 85, 90, 3),
        activity("cust_001", "feat_admin_audit", 9, 80, 41),
    ]);

    // Normal: core in place, premium features barely touched.
    dataset.usage.extend([
        activity("cust_002", "feat_core_dashboard", 210, 118, 2),
        activity("cust_002", "feat_core_reports", 64, 110, 5),
        activity("cust_002", "feat_collab_teams", 48, 90, 9),
        activity("cust_002", "feat_analytics_advanced", 4, 40, 33),
        activity("cust_002", "feat_integration_api", 30, 100, 52),
    ]);

    // At risk: one core feature never used, the rest gone quiet.
    dataset.usage.extend([
        activity("cust_003", "feat_core_dashboard", 18, 195, 45),
        activity("cust_003", "feat_collab_teams", 4, 150, 60),
    ]);

    // Champion: everything on the plan in heavy, recent use.
    dataset.usage.extend(
        demo_catalog()
            .iter()
            .enumerate()
            .map(|(i, f)| activity("cust_004", &f.id, 300 + 40 * i as u64, 360, (i % 3) as i64)),
    );

    // New: one month in, only the dashboard so far.
    dataset
        .usage
        .push(activity("cust_005", "feat_core_dashboard", 6, 25, 3));

    dataset
}

fn demo_customers() -> Vec<Customer> {
    let customer = |id: &str,
                    name: &str,
                    plan: PlanTier,
                    mrr: f64,
                    age: u32,
                    segment: &str,
                    manager: &str| Customer {
        id: id.to_string(),
        name: name.to_string(),
        plan,
        mrr,
        account_age_days: age,
        segment: Some(segment.to_string()),
        account_manager: Some(manager.to_string()),
    };

    vec![
        customer("cust_001", "Acme Corporation", PlanTier::Enterprise, 5000.0, 180, "technology", "Sarah Johnson"),
        customer("cust_002", "TechStart Inc", PlanTier::Premium, 1500.0, 120, "saas", "Mike Chen"),
        customer("cust_003", "Legacy Systems Co", PlanTier::Premium, 2000.0, 200, "manufacturing", "Sarah Johnson"),
        customer("cust_004", "Innovation Labs", PlanTier::Enterprise, 8000.0, 365, "technology", "Mike Chen"),
        customer("cust_005", "Fresh Startup", PlanTier::Basic, 500.0, 30, "e-commerce", "Sarah Johnson"),
    ]
}

fn demo_catalog() -> Vec<Feature> {
    let feature = |id: &str,
                   name: &str,
                   category: FeatureCategory,
                   tier: PlanTier,
                   is_core: bool,
                   segments: &[&str]| Feature {
        id: id.to_string(),
        name: name.to_string(),
        category,
        available_on: tier.and_above(),
        is_core,
        segments: segments.iter().map(|s| s.to_string()).collect(),
    };

    use FeatureCategory::*;
    vec![
        feature("feat_core_dashboard", "Core Dashboard", Core, PlanTier::Basic, true, &[]),
        feature("feat_core_reports", "Custom Reports", Core, PlanTier::Basic, true, &[]),
        feature("feat_collab_teams", "Team Collaboration", Collaboration, PlanTier::Basic, false, &[]),
        feature("feat_collab_comments", "Comments & Annotations", Collaboration, PlanTier::Premium, false, &[]),
        feature("feat_analytics_advanced", "Advanced Analytics", Analytics, PlanTier::Premium, false, &[]),
        feature("feat_analytics_ai", "AI-Powered Insights", Analytics, PlanTier::Premium, false, &["technology", "saas"]),
        feature("feat_integration_api", "API Integration", Integration, PlanTier::Basic, false, &[]),
        feature("feat_integration_webhook", "Webhook Integration", Integration, PlanTier::Premium, false, &[]),
        feature("feat_admin_audit", "Audit Logs", Advanced, PlanTier::Enterprise, false, &["manufacturing", "healthcare"]),
        feature("feat_admin_sso", "SSO Authentication", Advanced, PlanTier::Enterprise, false, &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataAccess, InMemoryDataSource};
    use chrono::TimeZone;

    #[test]
    fn test_demo_dataset_is_valid() {
        let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let source = InMemoryDataSource::from_dataset(demo_dataset(as_of)).unwrap();
        assert_eq!(source.list_customers().len(), 5);
        assert_eq!(source.get_feature_catalog().len(), 10);
        assert!(source.get_usage("cust_004").unwrap().len() == 10);
    }

    #[test]
    fn test_demo_dataset_is_deterministic() {
        let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(demo_dataset(as_of), demo_dataset(as_of));
    }
}
