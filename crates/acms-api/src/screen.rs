//! Handler for `POST /screen`: a dry run of the blocklist over arbitrary text.

use axum::{Json, extract::State};
use acms_core::{screening::ScreeningReport, store::ComplaintStore};
use serde::Deserialize;

use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct ScreenBody {
  pub text: String,
}

/// `POST /screen`, body: `{"text":"..."}`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ScreenBody>,
) -> Json<ScreeningReport>
where
  S: ComplaintStore + 'static,
{
  Json(state.blocklist.screen(&body.text))
}
