//! REST implementation of the learning-backend API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use proctor_core::error::ApiError;
use proctor_core::model::{Assessment, Enrollment, PendingTest};
use proctor_core::submission::SubmissionPayload;
use proctor_core::traits::{LearningApi, SubmittedResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the learning platform's REST backend.
pub struct RestLearningApi {
    base_url: String,
    api_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

/// Error body most backend endpoints return.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl RestLearningApi {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, api_token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout_secs,
            client,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}/{path}", self.base_url));
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Branch a response's status into the typed error taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        Err(match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Api { status, message },
        })
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response.json().await.map_err(|e| ApiError::Api {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })
    }
}

#[async_trait]
impl LearningApi for RestLearningApi {
    #[instrument(skip(self))]
    async fn pending_assessments(&self, student_id: &str) -> Result<Vec<PendingTest>, ApiError> {
        let response = self
            .request(reqwest::Method::GET, &format!("pending-assessments/{student_id}"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::parse_json(Self::check(response).await?).await
    }

    #[instrument(skip(self))]
    async fn assessment(&self, assessment_id: &str) -> Result<Assessment, ApiError> {
        let response = self
            .request(reqwest::Method::GET, &format!("assessments/{assessment_id}"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::parse_json(Self::check(response).await?).await
    }

    #[instrument(skip(self))]
    async fn enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, ApiError> {
        let response = self
            .request(reqwest::Method::GET, "enrollments")
            .query(&[("studentId", student_id)])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::parse_json(Self::check(response).await?).await
    }

    #[instrument(skip(self, payload), fields(assessment_id = %payload.result.assessment_id))]
    async fn submit_result(
        &self,
        student_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<SubmittedResult, ApiError> {
        let response = self
            .request(reqwest::Method::POST, &format!("assessment-results/{student_id}"))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::parse_json(Self::check(response).await?).await
    }

    #[instrument(skip(self))]
    async fn update_test_status(
        &self,
        student_id: &str,
        result_id: &str,
        passed: bool,
    ) -> Result<(), ApiError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("enrollment/update-test-status/{student_id}/{result_id}"),
            )
            .query(&[("passed", passed)])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn assign_tests(&self, student_id: &str) -> Result<(), ApiError> {
        let response = self
            .request(reqwest::Method::POST, &format!("enrollment/assign-tests/{student_id}"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check(response).await?;
        Ok(())
    }
}
