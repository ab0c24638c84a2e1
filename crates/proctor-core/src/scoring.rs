//! The scoring engine: pure, deterministic grading of a response sheet.
//!
//! `score` takes everything it needs as arguments and performs no I/O,
//! so identical inputs always grade identically.

use std::collections::BTreeMap;

use crate::model::{AnswerMap, AnswerValue, Assessment, Question, QuestionKind};
use crate::results::{AssessmentResult, Response, ResultMetadata, ResultStatus, SessionTiming};

/// Per-question grading outcome before time attribution.
struct Graded {
    answered: bool,
    is_correct: bool,
    score: u32,
    needs_review: bool,
}

/// Grade a full response sheet against an assessment.
///
/// Unanswered questions score 0 but still contribute their points to
/// `max_possible_score`. Per-question `time_spent_seconds` is the total
/// elapsed time divided evenly across answered questions; it is an
/// approximation, not an individually measured timer.
pub fn score(assessment: &Assessment, answers: &AnswerMap, timing: &SessionTiming) -> AssessmentResult {
    let mut responses = Vec::with_capacity(assessment.questions.len());
    let mut total_score = 0u32;
    let mut max_possible_score = 0u32;
    let mut any_needs_review = false;
    let mut skills: BTreeMap<String, (u32, u32)> = BTreeMap::new();

    let answered_count = assessment
        .questions
        .iter()
        .filter(|q| is_answered(q, answers.get(&q.id)))
        .count() as u32;
    let elapsed = timing.elapsed_seconds();
    let seconds_per_answer = if answered_count > 0 {
        elapsed / answered_count
    } else {
        0
    };

    for question in &assessment.questions {
        let answer = answers.get(&question.id);
        let graded = grade_question(question, answer);

        max_possible_score += question.points;
        total_score += graded.score;
        any_needs_review |= graded.needs_review;

        for tag in &question.tags {
            let entry = skills.entry(tag.clone()).or_insert((0, 0));
            entry.0 += graded.score;
            entry.1 += question.points;
        }

        responses.push(Response {
            question_id: question.id.clone(),
            selected_answer: answer.cloned(),
            is_correct: graded.is_correct,
            score: graded.score,
            time_spent_seconds: if graded.answered { seconds_per_answer } else { 0 },
            needs_review: graded.needs_review,
        });
    }

    let percentage_score = if max_possible_score == 0 {
        0.0
    } else {
        f64::from(total_score) / f64::from(max_possible_score) * 100.0
    };

    let skill_scores = skills
        .into_iter()
        .map(|(tag, (earned, possible))| {
            let pct = if possible == 0 {
                0.0
            } else {
                f64::from(earned) / f64::from(possible) * 100.0
            };
            (tag, pct)
        })
        .collect();

    AssessmentResult {
        assessment_id: assessment.id.clone(),
        class_id: assessment.class_id.clone(),
        subject_id: assessment.subject_id.clone(),
        total_score,
        max_possible_score,
        percentage_score,
        is_passed: percentage_score >= assessment.passing_score,
        time_spent_minutes: elapsed / 60,
        question_responses: responses,
        skill_scores,
        status: if any_needs_review {
            ResultStatus::PendingReview
        } else {
            ResultStatus::Completed
        },
        metadata: ResultMetadata {
            start_time: timing.started_at,
            end_time: timing.ended_at,
        },
    }
}

/// Whether an answer value counts as "answered" for its question kind.
///
/// `false` is a real answer for true-false questions; free text counts
/// only once its trimmed length is non-zero.
pub fn is_answered(question: &Question, answer: Option<&AnswerValue>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    match question.kind {
        QuestionKind::Mcq => answer.as_text().is_some_and(|t| !t.is_empty()),
        QuestionKind::TrueFalse => answer.as_flag().is_some(),
        QuestionKind::ShortAnswer | QuestionKind::Essay => {
            answer.as_text().is_some_and(|t| !t.trim().is_empty())
        }
    }
}

fn grade_question(question: &Question, answer: Option<&AnswerValue>) -> Graded {
    let answered = is_answered(question, answer);

    match question.kind {
        QuestionKind::Mcq => {
            let is_correct = answer
                .and_then(AnswerValue::as_text)
                .and_then(|selected| question.options.iter().find(|o| o.text == selected))
                .is_some_and(|o| o.is_correct);
            Graded {
                answered,
                is_correct,
                score: if is_correct { question.points } else { 0 },
                needs_review: false,
            }
        }
        QuestionKind::TrueFalse => {
            let is_correct = match (answer.and_then(AnswerValue::as_flag), question.correct_flag()) {
                (Some(given), Some(expected)) => given == expected,
                _ => false,
            };
            Graded {
                answered,
                is_correct,
                score: if is_correct { question.points } else { 0 },
                needs_review: false,
            }
        }
        QuestionKind::ShortAnswer => {
            let is_correct = answer
                .and_then(AnswerValue::as_text)
                .map(|given| given.trim().to_lowercase())
                .filter(|given| !given.is_empty())
                .is_some_and(|given| {
                    question
                        .options
                        .iter()
                        .filter(|o| o.is_correct)
                        .any(|o| o.text.trim().to_lowercase() == given)
                });
            Graded {
                answered,
                is_correct,
                score: if is_correct { question.points } else { 0 },
                needs_review: false,
            }
        }
        // Essays are never auto-scored; answered ones wait for manual grading.
        QuestionKind::Essay => Graded {
            answered,
            is_correct: false,
            score: 0,
            needs_review: answered,
        },
    }
}
