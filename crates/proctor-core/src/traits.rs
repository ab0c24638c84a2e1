//! The backend seam: the async trait the surrounding application (or a
//! test double) implements to reach the learning platform's REST API.
//!
//! Implemented by `proctor-client` for the real backend and by its mock
//! for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{Assessment, Enrollment, PendingTest};
use crate::submission::SubmissionPayload;

/// Async interface to the learning backend.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// Tests assigned to the student but not yet taken.
    async fn pending_assessments(&self, student_id: &str) -> Result<Vec<PendingTest>, ApiError>;

    /// Full assessment detail, questions included.
    async fn assessment(&self, assessment_id: &str) -> Result<Assessment, ApiError>;

    /// The student's enrollment records with aptitude-test flags.
    async fn enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError>;

    /// Persist a graded result. The returned id feeds the follow-up
    /// enrollment-status update.
    async fn submit_result(
        &self,
        student_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmittedResult, ApiError>;

    /// Flip the enrollment's completion/pass flags for a stored result.
    async fn update_test_status(
        &self,
        student_id: &str,
        result_id: &str,
        passed: bool,
    ) -> Result<(), ApiError>;

    /// Ask the backend to assign aptitude tests to the student.
    async fn assign_tests(&self, student_id: &str) -> Result<(), ApiError>;
}

/// Acknowledgement of a stored assessment result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResult {
    /// Server-side id of the stored result. Some backend versions key
    /// this as `_id`.
    #[serde(alias = "_id")]
    pub result_id: String,
}
