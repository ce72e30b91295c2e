use serde::{Deserialize, Serialize};

use crate::core::FeatureCategory;

/// Placeholder substituted with the feature name in step templates.
pub const FEATURE_PLACEHOLDER: &str = "{feature}";

/// One onboarding step before the feature name is filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub what: String,
    pub why: String,
    pub action: String,
    pub minutes: u32,
}

impl StepTemplate {
    fn new(what: &str, why: &str, action: &str, minutes: u32) -> Self {
        Self {
            what: what.to_string(),
            why: why.to_string(),
            action: action.to_string(),
            minutes,
        }
    }
}

/// Onboarding templates keyed by feature category, 1-3 steps each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybookTable {
    pub core: Vec<StepTemplate>,
    pub collaboration: Vec<StepTemplate>,
    pub analytics: Vec<StepTemplate>,
    pub integration: Vec<StepTemplate>,
    pub advanced: Vec<StepTemplate>,
}

impl PlaybookTable {
    pub fn for_category(&self, category: FeatureCategory) -> &[StepTemplate] {
        match category {
            FeatureCategory::Core => &self.core,
            FeatureCategory::Collaboration => &self.collaboration,
            FeatureCategory::Analytics => &self.analytics,
            FeatureCategory::Integration => &self.integration,
            FeatureCategory::Advanced => &self.advanced,
        }
    }

    pub fn validation_errors(&self) -> Vec<String> {
        FeatureCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let steps = self.for_category(category).len();
                if (1..=3).contains(&steps) {
                    None
                } else {
                    Some(format!(
                        "playbooks.{} must define 1 to 3 steps, found {}",
                        category, steps
                    ))
                }
            })
            .collect()
    }
}

impl Default for PlaybookTable {
    fn default() -> Self {
        Self {
            core: vec![
                StepTemplate::new(
                    "Guided walkthrough of {feature}",
                    "{feature} is part of the everyday workflow every account relies on",
                    "Run a live walkthrough of {feature} with the primary users",
                    30,
                ),
                StepTemplate::new(
                    "Build a first real workflow in {feature}",
                    "Value shows up once {feature} is used on the team's own data",
                    "Pick one recurring task and move it into {feature}",
                    45,
                ),
                StepTemplate::new(
                    "Review {feature} usage after 7 days",
                    "Early follow-up catches blockers before habits settle",
                    "Check {feature} activity and address open questions",
                    15,
                ),
            ],
            collaboration: vec![
                StepTemplate::new(
                    "Invite teammates to {feature}",
                    "{feature} only pays off when more than one person is in it",
                    "Send invitations to the core team from {feature}",
                    10,
                ),
                StepTemplate::new(
                    "Configure a shared view in {feature}",
                    "A shared starting point keeps the team looking at the same work",
                    "Create and share one team view in {feature}",
                    20,
                ),
                StepTemplate::new(
                    "Review {feature} usage after 7 days",
                    "Confirms the team actually adopted the shared workflow",
                    "Compare active collaborators in {feature} against invitations sent",
                    15,
                ),
            ],
            analytics: vec![
                StepTemplate::new(
                    "Pick the questions {feature} should answer",
                    "Analysis without a question rarely turns into a habit",
                    "Agree on two business questions to answer with {feature}",
                    20,
                ),
                StepTemplate::new(
                    "Build a first report in {feature}",
                    "A concrete report makes the capability tangible",
                    "Create one report in {feature} and share it with stakeholders",
                    40,
                ),
                StepTemplate::new(
                    "Schedule recurring delivery from {feature}",
                    "Scheduled insight keeps {feature} in the weekly rhythm",
                    "Set a weekly schedule for the new report",
                    10,
                ),
            ],
            integration: vec![
                StepTemplate::new(
                    "Provision access for {feature}",
                    "Integrations stall most often on credentials and permissions",
                    "Generate credentials for {feature} with the customer's admin",
                    15,
                ),
                StepTemplate::new(
                    "Connect the first system through {feature}",
                    "One working connection proves the data path end to end",
                    "Connect the customer's primary system via {feature}",
                    60,
                ),
                StepTemplate::new(
                    "Verify data flowing through {feature}",
                    "Silent integration failures erode trust quickly",
                    "Confirm recent events arrived through {feature}",
                    15,
                ),
            ],
            advanced: vec![
                StepTemplate::new(
                    "Expert session on {feature}",
                    "Advanced capabilities need a guided first use",
                    "Schedule a working session on {feature} with a product specialist",
                    45,
                ),
                StepTemplate::new(
                    "Pilot {feature} on one use case",
                    "A narrow pilot produces a measurable outcome",
                    "Apply {feature} to a single, well-understood use case",
                    60,
                ),
                StepTemplate::new(
                    "Measure the {feature} pilot",
                    "A measured result justifies broader rollout",
                    "Review the pilot outcome and decide on rollout",
                    20,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_default_playbook() {
        let table = PlaybookTable::default();
        for category in FeatureCategory::ALL {
            let steps = table.for_category(category);
            assert!(!steps.is_empty() && steps.len() <= 3, "{category}");
            assert!(steps.iter().all(|s| s.minutes > 0));
        }
        assert!(table.validation_errors().is_empty());
    }

    #[test]
    fn test_oversized_playbook_rejected() {
        let mut table = PlaybookTable::default();
        let extra = table.core[0].clone();
        table.core.push(extra);
        let errors = table.validation_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("playbooks.core"));
    }
}
