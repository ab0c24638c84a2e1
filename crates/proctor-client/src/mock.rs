//! Mock backend for testing the session flow without a live server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use proctor_core::error::ApiError;
use proctor_core::model::{Assessment, Enrollment, PendingTest};
use proctor_core::submission::SubmissionPayload;
use proctor_core::traits::{LearningApi, SubmittedResult};

/// A canned-data [`LearningApi`] with failure injection and call
/// counting.
#[derive(Default)]
pub struct MockLearningApi {
    pending: Mutex<Vec<PendingTest>>,
    enrollments: Mutex<Vec<Enrollment>>,
    assessments: Mutex<HashMap<String, Assessment>>,
    /// Number of upcoming submit calls that fail with a network error.
    fail_submits: AtomicU32,
    /// All status updates fail while set.
    fail_status_updates: AtomicBool,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
    assign_calls: AtomicU32,
    last_payload: Mutex<Option<SubmissionPayload>>,
    last_status: Mutex<Option<(String, bool)>>,
}

impl MockLearningApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assessment(self, assessment: Assessment) -> Self {
        self.assessments
            .lock()
            .unwrap()
            .insert(assessment.id.clone(), assessment);
        self
    }

    pub fn with_pending(self, pending: Vec<PendingTest>) -> Self {
        *self.pending.lock().unwrap() = pending;
        self
    }

    pub fn with_enrollments(self, enrollments: Vec<Enrollment>) -> Self {
        *self.enrollments.lock().unwrap() = enrollments;
        self
    }

    /// Make the next `count` submissions fail with a network error.
    pub fn fail_next_submits(&self, count: u32) {
        self.fail_submits.store(count, Ordering::Relaxed);
    }

    pub fn fail_status_updates(&self, fail: bool) {
        self.fail_status_updates.store(fail, Ordering::Relaxed);
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::Relaxed)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::Relaxed)
    }

    pub fn assign_calls(&self) -> u32 {
        self.assign_calls.load(Ordering::Relaxed)
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.last_payload.lock().unwrap().clone()
    }

    /// `(result_id, passed)` of the most recent status update.
    pub fn last_status(&self) -> Option<(String, bool)> {
        self.last_status.lock().unwrap().clone()
    }

    /// Simulate the backend assigning a test: subsequent
    /// `pending_assessments` calls return it.
    pub fn assign_pending(&self, entry: PendingTest) {
        self.pending.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl LearningApi for MockLearningApi {
    async fn pending_assessments(&self, _student_id: &str) -> Result<Vec<PendingTest>, ApiError> {
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn assessment(&self, assessment_id: &str) -> Result<Assessment, ApiError> {
        self.assessments
            .lock()
            .unwrap()
            .get(assessment_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("assessment {assessment_id}")))
    }

    async fn enrollments(&self, _student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        Ok(self.enrollments.lock().unwrap().clone())
    }

    async fn submit_result(
        &self,
        _student_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmittedResult, ApiError> {
        let call = self.submit_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_submits.load(Ordering::Relaxed) > 0 {
            self.fail_submits.fetch_sub(1, Ordering::Relaxed);
            return Err(ApiError::Network("connection reset by peer".into()));
        }
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        Ok(SubmittedResult {
            result_id: format!("res-{call:04}"),
        })
    }

    async fn update_test_status(
        &self,
        _student_id: &str,
        result_id: &str,
        passed: bool,
    ) -> Result<(), ApiError> {
        self.status_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_status_updates.load(Ordering::Relaxed) {
            return Err(ApiError::Api {
                status: 500,
                message: "status update unavailable".into(),
            });
        }
        *self.last_status.lock().unwrap() = Some((result_id.to_string(), passed));
        Ok(())
    }

    async fn assign_tests(&self, _student_id: &str) -> Result<(), ApiError> {
        self.assign_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
