//! Handlers for complaint submission and anonymous tracking.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/complaints` | Body: [`NewComplaint`]; returns 201 + [`SubmissionReceipt`] |
//! | `GET`  | `/track/{tracking_id}` | Public projection; 404 if no complaint has the ID |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use acms_core::{
  complaint::{NewComplaint, PublicComplaint},
  store::ComplaintStore,
  tracking::TrackingId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, ScreeningMode, error::ApiError};

// ─── Submit ──────────────────────────────────────────────────────────────────

/// What the submitter gets back. The tracking ID is the only handle an
/// anonymous submitter has on their complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
  pub tracking_id:  TrackingId,
  pub complaint_id: Uuid,
  pub created_at:   DateTime<Utc>,
}

/// `POST /complaints`
pub async fn submit<S>(
  State(state): State<ApiState<S>>,
  Json(mut body): Json<NewComplaint>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + 'static,
{
  body.validate()?;

  let title       = state.blocklist.screen(&body.title);
  let description = state.blocklist.screen(&body.description);

  if !title.is_clean() || !description.is_clean() {
    let mut matched_terms = title.matched_terms;
    for term in description.matched_terms {
      if !matched_terms.contains(&term) {
        matched_terms.push(term);
      }
    }

    match state.policy.mode {
      ScreeningMode::Reject => {
        tracing::warn!(?matched_terms, "submission rejected by screening");
        return Err(ApiError::Rejected { matched_terms });
      }
      ScreeningMode::Mask => {
        tracing::debug!(?matched_terms, "masking disallowed terms in submission");
        body.title       = title.masked;
        body.description = description.masked;
      }
    }
  }

  let complaint = state
    .store
    .create_complaint(body)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(tracking_id = %complaint.tracking_id, "complaint received");
  Ok((
    StatusCode::CREATED,
    Json(SubmissionReceipt {
      tracking_id:  complaint.tracking_id,
      complaint_id: complaint.complaint_id,
      created_at:   complaint.created_at,
    }),
  ))
}

// ─── Track ───────────────────────────────────────────────────────────────────

/// `GET /track/{tracking_id}`
///
/// Exact match, no caller identity required. A malformed ID is looked up like
/// any other and simply comes back not found.
pub async fn track<S>(
  State(state): State<ApiState<S>>,
  Path(tracking_id): Path<String>,
) -> Result<Json<PublicComplaint>, ApiError>
where
  S: ComplaintStore + 'static,
{
  if tracking_id.trim().is_empty() {
    return Err(ApiError::BadRequest("tracking ID must not be blank".into()));
  }

  let complaint = state
    .store
    .find_by_tracking_id(&tracking_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no complaint found for tracking ID {tracking_id}"))
    })?;

  Ok(Json(PublicComplaint::from(&complaint)))
}
