//! Structural validation of assessment definitions.
//!
//! These are advisory checks for authoring mistakes the backend happily
//! stores: questions that can never be graded correct, mismatched point
//! totals, unusable true-false options. Warnings, not errors.

use crate::model::{Assessment, QuestionKind};

/// A single advisory finding.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id, when the finding is question-scoped.
    pub question_id: Option<String>,
    pub message: String,
}

/// Validate an assessment for common authoring issues.
pub fn validate_assessment(assessment: &Assessment) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut push = |question_id: Option<&str>, message: String| {
        warnings.push(ValidationWarning {
            question_id: question_id.map(str::to_string),
            message,
        });
    };

    if assessment.questions.is_empty() {
        push(None, "assessment has no questions".into());
    }

    if !(0.0..=100.0).contains(&assessment.passing_score) {
        push(
            None,
            format!("passingScore {} is not a percentage", assessment.passing_score),
        );
    }

    let computed = assessment.max_possible_score();
    if assessment.total_points != 0 && assessment.total_points != computed {
        push(
            None,
            format!(
                "totalPoints {} disagrees with the question sum {computed}",
                assessment.total_points
            ),
        );
    }

    if assessment.settings.time_limit_minutes == 0 {
        push(None, "timeLimitMinutes is 0; the session will be untimed".into());
    }

    let mut seen_ids = std::collections::HashSet::new();
    for question in &assessment.questions {
        if !seen_ids.insert(&question.id) {
            push(Some(&question.id), format!("duplicate question id: {}", question.id));
        }
    }

    for question in &assessment.questions {
        if question.points == 0 {
            push(Some(&question.id), "question is worth 0 points".into());
        }

        match question.kind {
            QuestionKind::Mcq => {
                let correct = question.options.iter().filter(|o| o.is_correct).count();
                if question.options.is_empty() {
                    push(Some(&question.id), "mcq question has no options".into());
                } else if correct == 0 {
                    push(Some(&question.id), "mcq question has no correct option".into());
                } else if correct > 1 {
                    push(
                        Some(&question.id),
                        format!("mcq question flags {correct} options correct"),
                    );
                }
            }
            QuestionKind::TrueFalse => {
                if question.correct_flag().is_none() {
                    push(
                        Some(&question.id),
                        "true-false question's correct option text is not a boolean".into(),
                    );
                }
            }
            QuestionKind::ShortAnswer => {
                if question.correct_option().is_none() {
                    push(
                        Some(&question.id),
                        "short-answer question has no accepted answer".into(),
                    );
                }
            }
            // Essays are manually graded; nothing to check.
            QuestionKind::Essay => {}
        }
    }

    warnings
}
