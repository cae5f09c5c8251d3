//! Boundary to the external face-match service.
//!
//! The attendance flow only consumes a pass/fail verdict and a confidence
//! score; matching itself happens in the remote service. [`FaceMatcher`] is
//! the seam, [`HttpFaceMatcher`] the production implementation.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HttpFaceMatcher;

/// Result of comparing a probe image to a student's enrolled face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceVerdict {
    pub matched: bool,
    pub score: f64,
}

/// Errors reaching or talking to the face-match service.
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Face service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// A face-match oracle keyed by student code.
#[async_trait]
pub trait FaceMatcher: Send + Sync {
    /// Compare `image_base64` with the face enrolled for `student_code`.
    async fn verify(&self, student_code: &str, image_base64: &str)
        -> Result<FaceVerdict, FaceError>;

    /// Enrol (or replace) the reference face for `student_code`.
    async fn register(&self, student_code: &str, image_base64: &str) -> Result<(), FaceError>;
}
