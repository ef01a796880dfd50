//! Handlers for public poll endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/polls` | Newest first |
//! | `POST` | `/polls/{id}/vote` | Body: `{"option":"..."}`; 404 / 400 / 409 |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use acms_core::{poll::Poll, store::ComplaintStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `GET /polls`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Poll>>, ApiError>
where
  S: ComplaintStore + 'static,
{
  let polls = state.store.list_polls().await.map_err(ApiError::store)?;
  Ok(Json(polls))
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub option: String,
}

/// `POST /polls/{id}/vote`
pub async fn vote<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<VoteBody>,
) -> Result<Json<Poll>, ApiError>
where
  S: ComplaintStore + 'static,
{
  let not_found = || ApiError::NotFound(format!("poll {id} not found"));

  let poll = state
    .store
    .get_poll(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  poll.check_vote(&body.option, Utc::now())?;

  let poll = state
    .store
    .vote(id, &body.option)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  Ok(Json(poll))
}
