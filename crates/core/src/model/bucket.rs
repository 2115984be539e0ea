use serde::{Deserialize, Serialize};

/// A labeled, inclusive range of normalized scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringBucket {
    pub min: f64,
    pub max: f64,
    pub label: String,
}

impl ScoringBucket {
    #[must_use]
    pub fn new(min: f64, max: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            label: label.into(),
        }
    }

    /// True when `score` lies within `[min, max]`, both ends inclusive.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}
