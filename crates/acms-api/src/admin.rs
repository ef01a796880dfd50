//! Administrator endpoints. Mounted by the server behind its auth gate; this
//! crate does no authentication of its own.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/admin/complaints` | `?status`, `?category`, `?user_id`, `?limit`, `?offset` |
//! | `GET`   | `/admin/complaints/{id}` | Full record, including submitter and notes |
//! | `PATCH` | `/admin/complaints/{id}` | Body: [`ComplaintUpdate`] |
//! | `GET`   | `/admin/stats` | [`ComplaintStats`] |
//! | `POST`  | `/admin/polls` | Body: [`NewPoll`]; returns 201 + poll |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use acms_core::{
  complaint::{Category, Complaint, ComplaintStats, ComplaintUpdate, Status},
  poll::NewPoll,
  store::{ComplaintQuery, ComplaintStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Complaints ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status:   Option<Status>,
  pub category: Option<Category>,
  pub user_id:  Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /admin/complaints`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore + 'static,
{
  let query = ComplaintQuery {
    status:   params.status,
    category: params.category,
    user_id:  params.user_id,
    limit:    params.limit,
    offset:   params.offset,
  };
  let complaints = state
    .store
    .list_complaints(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(complaints))
}

/// `GET /admin/complaints/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + 'static,
{
  let complaint = state
    .store
    .get_complaint(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;
  Ok(Json(complaint))
}

/// `PATCH /admin/complaints/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ComplaintUpdate>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + 'static,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest("update must set at least one field".into()));
  }
  let complaint = state
    .store
    .update_complaint(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;

  tracing::info!(%id, status = complaint.status.as_str(), "complaint updated");
  Ok(Json(complaint))
}

/// `GET /admin/stats`
pub async fn stats<S>(State(state): State<ApiState<S>>) -> Result<Json<ComplaintStats>, ApiError>
where
  S: ComplaintStore + 'static,
{
  let stats = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(stats))
}

// ─── Polls ───────────────────────────────────────────────────────────────────

/// `POST /admin/polls`
pub async fn create_poll<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPoll>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + 'static,
{
  body.resolved_options()?;
  let poll = state.store.create_poll(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(poll)))
}
