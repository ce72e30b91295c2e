// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod data;
pub mod engine;
pub mod io;
pub mod observability;
pub mod onboarding;
pub mod recommendations;
pub mod risk;
pub mod scoring;
pub mod trend;

// Re-export commonly used types
pub use crate::core::{
    Customer, Error, ErrorCode, Feature, FeatureCategory, FeatureUsage, PlanTier, Result,
    UsageSet,
};

pub use crate::config::{load_rules, RuleSet, RULES_VERSION};

pub use crate::data::{DataAccess, Dataset, InMemoryDataSource};

pub use crate::engine::{CustomerIntelligence, IntelligenceEngine};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::onboarding::{compose_onboarding, OnboardingStep};

pub use crate::recommendations::{build_recommendations, Recommendation};

pub use crate::risk::{
    assess_churn_risk, ChurnRiskAssessment, Intervention, RiskLabel, SignalExplanation, Urgency,
};

pub use crate::scoring::{
    compute_adoption_gap, compute_churn_signals, AdoptionGap, ChurnSignal, Explained, GapCause,
    SignalKind,
};

pub use crate::trend::{
    InMemoryTrendStore, RecommendationRecord, RiskPoint, RiskTrend, TrendStore,
};
