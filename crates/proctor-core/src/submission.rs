//! Building and dispatching the outbound result payload.
//!
//! `submit_session` is the single submission path: the session's state
//! machine takes the slot, scoring runs, the payload is validated and
//! posted, and only a confirmed success finalizes the session and
//! clears the local draft state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::results::AssessmentResult;
use crate::scoring;
use crate::session::ExamSession;
use crate::traits::LearningApi;

/// The outbound submission object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub student_id: String,
    /// Client-generated idempotency key for this submission attempt.
    pub submission_id: Uuid,
    #[serde(flatten)]
    pub result: AssessmentResult,
}

impl SubmissionPayload {
    /// Assemble and validate the payload. Every missing required field
    /// is named in the error, not just the first one.
    pub fn build(student_id: &str, result: &AssessmentResult) -> Result<Self, CoreError> {
        let mut missing = Vec::new();
        if student_id.trim().is_empty() {
            missing.push("studentId");
        }
        if result.assessment_id.trim().is_empty() {
            missing.push("assessmentId");
        }
        if result.class_id.trim().is_empty() {
            missing.push("classId");
        }
        if result.question_responses.is_empty() {
            missing.push("questionResponses");
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "submission is missing required fields: {}",
                missing.join(", ")
            )));
        }

        // totalScore and maxPossibleScore are always present by type;
        // what can go wrong is their relationship.
        if result.total_score > result.max_possible_score {
            return Err(CoreError::Validation(format!(
                "totalScore {} exceeds maxPossibleScore {}",
                result.total_score, result.max_possible_score
            )));
        }

        Ok(Self {
            student_id: student_id.to_string(),
            submission_id: Uuid::new_v4(),
            result: result.clone(),
        })
    }
}

/// Score the session and submit the result.
///
/// Idempotent under the auto-submit/manual race: the first caller takes
/// the `Submitting` slot and every concurrent attempt fails the state
/// check. On a network or validation failure the session returns to
/// `InProgress` with the timer resumed and every answer intact.
///
/// The follow-up enrollment-status update is best-effort: its failure
/// is logged and never fails the submission outcome.
pub async fn submit_session(
    session: &mut ExamSession,
    api: &dyn LearningApi,
    student_id: &str,
) -> Result<AssessmentResult, CoreError> {
    session.begin_submission()?;

    let timing = session.timing();
    let result = scoring::score(session.assessment(), session.answers(), &timing);

    let payload = match SubmissionPayload::build(student_id, &result) {
        Ok(p) => p,
        Err(e) => {
            session.submission_failed();
            return Err(e);
        }
    };

    let submitted = match api.submit_result(student_id, &payload).await {
        Ok(ack) => ack,
        Err(e) => {
            tracing::warn!(error = %e, "result submission failed; session resumes");
            session.submission_failed();
            return Err(e.into());
        }
    };

    if let Err(e) = api
        .update_test_status(student_id, &submitted.result_id, result.is_passed)
        .await
    {
        tracing::warn!(
            result_id = %submitted.result_id,
            error = %e,
            "enrollment status update failed; submission stands"
        );
    }

    session.complete()?;
    tracing::info!(
        assessment_id = %result.assessment_id,
        percentage = result.percentage_score,
        passed = result.is_passed,
        "submission confirmed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::model::{
        AnswerOption, Assessment, AssessmentKind, AssessmentSettings, Enrollment, PendingTest,
        Question, QuestionKind,
    };
    use crate::results::{ResultMetadata, ResultStatus};
    use crate::session::SessionState;
    use crate::store::{DraftStore, MemoryDraftStore};
    use crate::traits::SubmittedResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Backend stub with scriptable submission failures.
    #[derive(Default)]
    struct StubApi {
        fail_submits: AtomicU32,
        fail_status_updates: bool,
        submit_calls: AtomicU32,
        status_calls: AtomicU32,
        last_payload: Mutex<Option<SubmissionPayload>>,
    }

    #[async_trait]
    impl LearningApi for StubApi {
        async fn pending_assessments(&self, _: &str) -> Result<Vec<PendingTest>, ApiError> {
            Ok(vec![])
        }

        async fn assessment(&self, id: &str) -> Result<Assessment, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }

        async fn enrollments(&self, _: &str) -> Result<Vec<Enrollment>, ApiError> {
            Ok(vec![])
        }

        async fn submit_result(
            &self,
            _: &str,
            payload: &SubmissionPayload,
        ) -> Result<SubmittedResult, ApiError> {
            self.submit_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail_submits.load(Ordering::Relaxed) > 0 {
                self.fail_submits.fetch_sub(1, Ordering::Relaxed);
                return Err(ApiError::Network("connection reset".into()));
            }
            *self.last_payload.lock().unwrap() = Some(payload.clone());
            Ok(SubmittedResult {
                result_id: "res-0001".into(),
            })
        }

        async fn update_test_status(&self, _: &str, _: &str, _: bool) -> Result<(), ApiError> {
            self.status_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail_status_updates {
                return Err(ApiError::Api {
                    status: 500,
                    message: "flaky".into(),
                });
            }
            Ok(())
        }

        async fn assign_tests(&self, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn assessment() -> Assessment {
        Assessment {
            id: "66f2a9c1b4e8d05a3c7f1e20".into(),
            title: "Aptitude".into(),
            kind: AssessmentKind::Aptitude,
            class_id: "class-9".into(),
            subject_id: "math".into(),
            questions: vec![Question {
                id: "q1".into(),
                text: "2 + 2 = ?".into(),
                kind: QuestionKind::Mcq,
                options: vec![
                    AnswerOption {
                        text: "4".into(),
                        is_correct: true,
                        explanation: None,
                    },
                    AnswerOption {
                        text: "5".into(),
                        is_correct: false,
                        explanation: None,
                    },
                ],
                points: 2,
                difficulty_level: None,
                tags: vec!["arithmetic".into()],
                explanation: None,
                hints: vec![],
            }],
            total_points: 2,
            passing_score: 50.0,
            settings: AssessmentSettings {
                time_limit_minutes: 10,
                shuffle_questions: false,
                show_results: true,
                attempts_allowed: 1,
                is_published: true,
            },
        }
    }

    fn started_session(store: Arc<MemoryDraftStore>) -> ExamSession {
        let mut session = ExamSession::new(assessment(), store).unwrap();
        session.begin_intro().unwrap();
        session.start().unwrap();
        session
    }

    fn bare_result() -> AssessmentResult {
        AssessmentResult {
            assessment_id: String::new(),
            class_id: String::new(),
            subject_id: "math".into(),
            total_score: 0,
            max_possible_score: 0,
            percentage_score: 0.0,
            is_passed: false,
            time_spent_minutes: 0,
            question_responses: vec![],
            skill_scores: BTreeMap::new(),
            status: ResultStatus::Completed,
            metadata: ResultMetadata {
                start_time: Utc::now(),
                end_time: Utc::now(),
            },
        }
    }

    #[test]
    fn build_names_every_missing_field() {
        let err = SubmissionPayload::build("", &bare_result()).unwrap_err();
        let message = err.to_string();
        for field in ["studentId", "assessmentId", "classId", "questionResponses"] {
            assert!(message.contains(field), "missing {field} in: {message}");
        }
    }

    #[test]
    fn build_rejects_score_above_maximum() {
        let mut result = bare_result();
        result.assessment_id = "a".into();
        result.class_id = "c".into();
        result.total_score = 5;
        result.max_possible_score = 3;
        result.question_responses.push(crate::results::Response {
            question_id: "q1".into(),
            selected_answer: None,
            is_correct: false,
            score: 0,
            time_spent_seconds: 0,
            needs_review: false,
        });

        let err = SubmissionPayload::build("s1", &result).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn payload_flattens_the_result() {
        let mut result = bare_result();
        result.assessment_id = "a".into();
        result.class_id = "c".into();
        result.question_responses.push(crate::results::Response {
            question_id: "q1".into(),
            selected_answer: None,
            is_correct: false,
            score: 0,
            time_spent_seconds: 0,
            needs_review: false,
        });

        let payload = SubmissionPayload::build("s1", &result).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["studentId"], "s1");
        assert_eq!(json["assessmentId"], "a");
        assert!(json["submissionId"].is_string());
        // Flattened, not nested under a "result" key.
        assert!(json.get("result").is_none());
    }

    #[tokio::test]
    async fn successful_submission_finalizes_the_session() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut session = started_session(Arc::clone(&store));
        session.select_option("q1", "4").unwrap();

        let api = StubApi::default();
        let result = submit_session(&mut session, &api, "s1").await.unwrap();

        assert_eq!(result.total_score, 2);
        assert!(result.is_passed);
        assert_eq!(session.state(), SessionState::Results);
        assert_eq!(api.status_calls.load(Ordering::Relaxed), 1);
        assert!(store.load_responses("66f2a9c1b4e8d05a3c7f1e20").is_empty());

        let payload = api.last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.student_id, "s1");
        assert_eq!(payload.result.total_score, 2);
    }

    #[tokio::test]
    async fn network_failure_resumes_the_session_with_answers_intact() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut session = started_session(Arc::clone(&store));
        session.select_option("q1", "4").unwrap();

        let api = StubApi {
            fail_submits: AtomicU32::new(1),
            ..Default::default()
        };

        let err = submit_session(&mut session, &api, "s1").await.unwrap_err();
        assert!(matches!(err, CoreError::Api(ApiError::Network(_))));
        assert_eq!(session.state(), SessionState::InProgress);
        assert!(!session.answers().is_empty());
        // No status update without a stored result.
        assert_eq!(api.status_calls.load(Ordering::Relaxed), 0);

        // Retrying succeeds and finalizes.
        submit_session(&mut session, &api, "s1").await.unwrap();
        assert_eq!(session.state(), SessionState::Results);
        assert_eq!(api.submit_calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn status_update_failure_does_not_fail_the_submission() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut session = started_session(store);
        session.select_option("q1", "4").unwrap();

        let api = StubApi {
            fail_status_updates: true,
            ..Default::default()
        };

        let result = submit_session(&mut session, &api, "s1").await.unwrap();
        assert!(result.is_passed);
        assert_eq!(session.state(), SessionState::Results);
    }

    #[tokio::test]
    async fn missing_student_id_fails_validation_and_resumes() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut session = started_session(store);
        session.select_option("q1", "4").unwrap();

        let api = StubApi::default();
        let err = submit_session(&mut session, &api, "").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(api.submit_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn concurrent_submission_attempt_is_rejected() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut session = started_session(store);
        session.select_option("q1", "4").unwrap();
        session.begin_submission().unwrap();

        // A second dispatch (e.g. timer expiry racing a click) is refused
        // by the state gate before any network call.
        let api = StubApi::default();
        let err = submit_session(&mut session, &api, "s1").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(api.submit_calls.load(Ordering::Relaxed), 0);
    }
}
