//! Graded result types with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::AnswerValue;

/// The graded outcome of a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub question_id: String,
    /// What the learner submitted; `None` when unanswered.
    pub selected_answer: Option<AnswerValue>,
    pub is_correct: bool,
    /// Points earned.
    pub score: u32,
    /// Evenly divided share of the elapsed time; an approximation, not
    /// a per-question measurement.
    pub time_spent_seconds: u32,
    /// Set for answered essay questions awaiting manual grading.
    #[serde(default)]
    pub needs_review: bool,
}

/// Where a result stands after auto-grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultStatus {
    /// Every question was auto-graded.
    Completed,
    /// One or more essay answers await manual grading.
    PendingReview,
}

/// Session timestamps carried on the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A complete graded assessment result.
///
/// Created once per submission and immutable thereafter; later pass/fail
/// corrections go through the enrollment-status endpoint instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub assessment_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub total_score: u32,
    pub max_possible_score: u32,
    /// `total_score / max_possible_score * 100`; 0 when the denominator is 0.
    pub percentage_score: f64,
    pub is_passed: bool,
    pub time_spent_minutes: u32,
    pub question_responses: Vec<Response>,
    /// Skill tag → earned percentage over that tag's possible points.
    pub skill_scores: BTreeMap<String, f64>,
    pub status: ResultStatus,
    pub metadata: ResultMetadata,
}

impl AssessmentResult {
    /// Save the result as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Store(format!("failed to serialize result: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Store(format!("failed to create {}: {e}", parent.display())))?;
        }
        std::fs::write(path, json)
            .map_err(|e| CoreError::Store(format!("failed to write {}: {e}", path.display())))?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Store(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Store(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Timer readings handed to the scoring engine at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTiming {
    pub time_limit_seconds: u32,
    pub remaining_seconds: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl SessionTiming {
    /// Seconds consumed out of the limit.
    pub fn elapsed_seconds(&self) -> u32 {
        self.time_limit_seconds.saturating_sub(self.remaining_seconds)
    }
}
