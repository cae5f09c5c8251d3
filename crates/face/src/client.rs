//! HTTP client for the face-match service.
//!
//! ```text
//! POST {base}/verify    { "student_id", "image" } -> { "matched", "score" }
//! POST {base}/register  { "student_id", "image" } -> 2xx
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::{FaceError, FaceMatcher, FaceVerdict};

/// [`FaceMatcher`] backed by the face service's REST API.
pub struct HttpFaceMatcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFaceMatcher {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` bounds each request at the transport level; callers may
    /// still wrap calls in a tighter deadline.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FaceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn payload(student_code: &str, image_base64: &str) -> serde_json::Value {
        serde_json::json!({
            "student_id": student_code,
            "image": image_base64,
        })
    }

    /// Ensure the response has a success status code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FaceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FaceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl FaceMatcher for HttpFaceMatcher {
    async fn verify(
        &self,
        student_code: &str,
        image_base64: &str,
    ) -> Result<FaceVerdict, FaceError> {
        tracing::debug!(student_code, "Verifying face");
        let response = self
            .client
            .post(format!("{}/verify", self.base_url))
            .json(&Self::payload(student_code, image_base64))
            .send()
            .await?;
        let verdict = Self::ensure_success(response)
            .await?
            .json::<FaceVerdict>()
            .await?;
        tracing::info!(
            student_code,
            matched = verdict.matched,
            score = verdict.score,
            "Face verification result"
        );
        Ok(verdict)
    }

    async fn register(&self, student_code: &str, image_base64: &str) -> Result<(), FaceError> {
        tracing::debug!(student_code, "Registering face");
        let response = self
            .client
            .post(format!("{}/register", self.base_url))
            .json(&Self::payload(student_code, image_base64))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        tracing::info!(student_code, "Face registered");
        Ok(())
    }
}
