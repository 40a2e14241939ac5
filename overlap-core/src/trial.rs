use serde::{Deserialize, Serialize};

/// One row of the trial list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub label1: String,
    pub label2: String,
    #[serde(default, rename = "type")]
    pub label_type: Option<String>,
}

impl TrialSpec {
    pub fn new(label1: impl Into<String>, label2: impl Into<String>) -> Self {
        Self {
            label1: label1.into(),
            label2: label2.into(),
            label_type: None,
        }
    }

    /// Labels in screen order, `(left, right)`.
    pub fn sides(&self, swapped: bool) -> (&str, &str) {
        if swapped {
            (&self.label2, &self.label1)
        } else {
            (&self.label1, &self.label2)
        }
    }
}

/// Recorded result per confirmed trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub participant_id: String,
    /// 1-based presentation index.
    pub trial: usize,
    pub label1: String,
    pub label2: String,
    pub size_percent: f64,
    pub overlap_percent: f64,
    pub timestamp: String,
    /// Seconds from presentation to confirmation.
    pub response_time: f64,
    /// 1 when label2 was drawn at the left circle.
    pub order_indicator: u8,
    pub label_type: Option<String>,
}
