use serde::{Deserialize, Serialize};

/// A value paired with the human-readable reason it has that value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explained<T> {
    pub value: T,
    pub explanation: String,
}

impl<T> Explained<T> {
    pub fn new(value: T, explanation: impl Into<String>) -> Self {
        Self {
            value,
            explanation: explanation.into(),
        }
    }
}

impl Explained<f64> {
    /// Zero contribution with the reason it did not fire.
    pub fn zero(explanation: impl Into<String>) -> Self {
        Self::new(0.0, explanation)
    }
}
