//! Versioned rule tables and their loading.

pub mod loader;
pub mod playbooks;
pub mod rules;

pub use loader::{load_rules, parse_and_validate_rules, render_rules, CONFIG_FILE_NAME};
pub use playbooks::{PlaybookTable, StepTemplate, FEATURE_PLACEHOLDER};
pub use rules::{
    AdoptionRules, CauseCeilings, ConfidenceRules, RelevanceFactors, RiskRules, RuleSet,
    SignalRules, SignalWeights, TrendRules, RULES_VERSION,
};
