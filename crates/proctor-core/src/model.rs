//! Core data model types for proctor.
//!
//! These are the types the backend serves for assessments, questions,
//! and enrollment records. Field names follow the backend's camelCase
//! JSON; enum discriminants follow its kebab-case type tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An assessment a learner can take.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Unique identifier (a 24-hex-char object id on the wire).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// What kind of assessment this is.
    #[serde(rename = "type")]
    pub kind: AssessmentKind,
    /// Class the assessment belongs to.
    pub class_id: String,
    /// Subject the assessment belongs to.
    pub subject_id: String,
    /// The questions, in authoring order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Declared point total. May lag behind the questions; scoring
    /// always recomputes from `questions`.
    #[serde(default)]
    pub total_points: u32,
    /// Pass threshold as a percentage of the max possible score.
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    /// Session settings.
    #[serde(default)]
    pub settings: AssessmentSettings,
}

impl Assessment {
    /// Sum of the points of every question.
    pub fn max_possible_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Look up a question by id.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Time limit in whole seconds. Zero means untimed.
    pub fn time_limit_seconds(&self) -> u32 {
        self.settings.time_limit_minutes * 60
    }
}

fn default_passing_score() -> f64 {
    60.0
}

/// Assessment categories the platform distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentKind {
    Aptitude,
    ChapterTest,
    FinalExam,
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::Aptitude => write!(f, "aptitude"),
            AssessmentKind::ChapterTest => write!(f, "chapter-test"),
            AssessmentKind::FinalExam => write!(f, "final-exam"),
        }
    }
}

/// Per-assessment session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSettings {
    /// Countdown length in minutes. Zero disables the timer.
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
    /// Present questions in a shuffled order.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Show the graded breakdown to the learner after submission.
    #[serde(default = "default_true")]
    pub show_results: bool,
    /// How many attempts a learner gets.
    #[serde(default = "default_attempts")]
    pub attempts_allowed: u32,
    /// Unpublished assessments are not taken.
    #[serde(default)]
    pub is_published: bool,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            time_limit_minutes: default_time_limit(),
            shuffle_questions: false,
            show_results: true,
            attempts_allowed: default_attempts(),
            is_published: false,
        }
    }
}

fn default_time_limit() -> u32 {
    30
}

fn default_attempts() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// A single question within an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the assessment.
    pub id: String,
    /// Question text shown to the learner.
    pub text: String,
    /// Question kind; drives the grading branch.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Answer options. Empty for essay questions.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Points awarded for a correct answer.
    pub points: u32,
    /// Authoring difficulty label (e.g. "easy", "medium", "hard").
    #[serde(default)]
    pub difficulty_level: Option<String>,
    /// Skill tags used for per-skill aggregation.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Explanation shown after grading.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Hints available to the learner.
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Question {
    /// The option flagged correct, if any.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// The correct answer of a true-false question, derived by parsing
    /// the correct option's *text* as a boolean. The backend stores
    /// "True"/"False" strings rather than a native boolean, so this
    /// returns `None` when the text is not a recognizable boolean.
    pub fn correct_flag(&self) -> Option<bool> {
        let text = self.correct_option()?.text.trim().to_lowercase();
        match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// One selectable answer option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Option text; also the committed answer value for mcq questions.
    pub text: String,
    /// Whether this option is the correct one.
    #[serde(default)]
    pub is_correct: bool,
    /// Shown after grading.
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Mcq,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionKind {
    /// Essay questions are never auto-graded.
    pub fn is_auto_graded(self) -> bool {
        !matches!(self, QuestionKind::Essay)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Mcq => write!(f, "mcq"),
            QuestionKind::TrueFalse => write!(f, "true-false"),
            QuestionKind::ShortAnswer => write!(f, "short-answer"),
            QuestionKind::Essay => write!(f, "essay"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mcq" | "multiple-choice" => Ok(QuestionKind::Mcq),
            "true-false" | "truefalse" => Ok(QuestionKind::TrueFalse),
            "short-answer" => Ok(QuestionKind::ShortAnswer),
            "essay" => Ok(QuestionKind::Essay),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A learner's enrollment in a class/subject, with aptitude-test flags.
///
/// `aptitude_test_id` is kept as raw JSON: the backend populates it
/// inconsistently (plain hex string, nested object, or a stringified
/// object). [`crate::resolver::normalize_test_id`] turns it into a
/// usable identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: String,
    pub class_id: String,
    pub subject_id: String,
    #[serde(default = "default_true")]
    pub is_enrolled: bool,
    #[serde(default)]
    pub aptitude_test_id: Option<serde_json::Value>,
    #[serde(default)]
    pub aptitude_test_completed: bool,
    #[serde(default)]
    pub aptitude_test_passed: bool,
}

/// One entry of the pending-assessments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTest {
    /// Test identifier in any of the backend's ambiguous shapes.
    #[serde(default)]
    pub test_id: serde_json::Value,
    pub class_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Committed answers keyed by question id.
pub type AnswerMap = std::collections::HashMap<String, AnswerValue>;

/// A committed answer value as it travels on the wire.
///
/// True-false questions submit a boolean; everything else submits text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(t) => Some(t),
            AnswerValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AnswerValue::Flag(b) => Some(*b),
            AnswerValue::Text(_) => None,
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        AnswerValue::Flag(b)
    }
}

impl From<String> for AnswerValue {
    fn from(t: String) -> Self {
        AnswerValue::Text(t)
    }
}

impl From<&str> for AnswerValue {
    fn from(t: &str) -> Self {
        AnswerValue::Text(t.to_string())
    }
}
