//! API error type and [`axum::response::IntoResponse`] implementation.

use acms_core::store::StoreError;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The submission contains blocklisted language and the server is in
  /// reject mode.
  #[error("submission contains disallowed language")]
  Rejected { matched_terms: Vec<String> },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a store error. Domain rule violations the store reports map like
  /// any other [`acms_core::Error`]; everything else is a backend failure,
  /// logged on the way out.
  pub fn store<E: StoreError>(err: E) -> Self {
    if let Some(domain) = err.as_domain() {
      tracing::debug!(error = %domain, "store rejected operation");
      return Self::domain(domain);
    }
    tracing::error!(error = %err, "store operation failed");
    ApiError::Store(Box::new(err))
  }

  fn domain(err: &acms_core::Error) -> Self {
    match err {
      acms_core::Error::PollClosed(_) => ApiError::Conflict(err.to_string()),
      other => ApiError::BadRequest(other.to_string()),
    }
  }
}

impl From<acms_core::Error> for ApiError {
  fn from(err: acms_core::Error) -> Self { Self::domain(&err) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Rejected { matched_terms } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
          "error": "submission contains disallowed language",
          "matched_terms": matched_terms,
        })),
      )
        .into_response(),
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("complaint service unavailable: {e}") })),
      )
        .into_response(),
    }
  }
}
