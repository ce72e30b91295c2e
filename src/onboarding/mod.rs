use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{PlaybookTable, FEATURE_PLACEHOLDER};
use crate::recommendations::Recommendation;

/// Playbooks never exceed this many steps.
pub const MAX_STEPS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    /// 1-based
    pub step_number: usize,
    pub what: String,
    pub why: String,
    pub action: String,
    #[serde(rename = "estimated_minutes", with = "minutes")]
    pub estimated_time: Duration,
}

/// Expand the top recommendation into its category playbook.
///
/// Without a recommendation there is nothing to enable, so no steps are produced.
pub fn compose_onboarding(
    top: Option<&Recommendation>,
    playbooks: &PlaybookTable,
) -> Vec<OnboardingStep> {
    let Some(recommendation) = top else {
        return Vec::new();
    };

    playbooks
        .for_category(recommendation.category)
        .iter()
        .take(MAX_STEPS)
        .enumerate()
        .map(|(index, template)| OnboardingStep {
            step_number: index + 1,
            what: fill(&template.what, &recommendation.feature_name),
            why: fill(&template.why, &recommendation.feature_name),
            action: fill(&template.action, &recommendation.feature_name),
            estimated_time: Duration::from_secs(u64::from(template.minutes) * 60),
        })
        .collect()
}

fn fill(template: &str, feature_name: &str) -> String {
    template.replace(FEATURE_PLACEHOLDER, feature_name)
}

/// Total time across a playbook.
pub fn total_time(steps: &[OnboardingStep]) -> Duration {
    steps.iter().map(|s| s.estimated_time).sum()
}

mod minutes {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs() / 60)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let minutes = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(minutes * 60))
    }
}
