//! Success envelope shared by every handler.

use serde::Serialize;

/// `{ "data": T }`. Errors use `{ "error", "code" }` instead; see
/// [`crate::error::AppError`].
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
