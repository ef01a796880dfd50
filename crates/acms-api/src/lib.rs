//! JSON REST API for ACMS.
//!
//! Exposes axum [`Router`]s backed by any [`acms_core::store::ComplaintStore`].
//! Submissions are screened against the configured [`Blocklist`] before they
//! reach the store. Auth, TLS, and transport concerns are the caller's
//! responsibility: [`admin_router`] must be mounted behind an auth gate.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = acms_api::api_router(state.clone())
//!   .merge(acms_api::admin_router(state).layer(auth_gate));
//! ```

pub mod admin;
pub mod complaints;
pub mod error;
pub mod polls;
pub mod screen;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use acms_core::{screening::Blocklist, store::ComplaintStore};
use serde::{Deserialize, Serialize};

pub use error::ApiError;

// ─── Screening policy ────────────────────────────────────────────────────────

/// What happens to a submission whose title or description hits the
/// blocklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningMode {
  /// Refuse it with 422 and the matched terms.
  #[default]
  Reject,
  /// Store it with every matched term replaced by asterisks.
  Mask,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreeningPolicy {
  pub mode: ScreeningMode,
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub blocklist: Arc<Blocklist>,
  pub policy:    ScreeningPolicy,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, blocklist: Blocklist, policy: ScreeningPolicy) -> Self {
    Self { store, blocklist: Arc::new(blocklist), policy }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      blocklist: Arc::clone(&self.blocklist),
      policy:    self.policy,
    }
  }
}

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Routes open to anonymous callers.
///
/// The returned `Router<()>` can be nested or merged into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ComplaintStore + 'static,
{
  Router::new()
    .route("/complaints", post(complaints::submit::<S>))
    .route("/track/{tracking_id}", get(complaints::track::<S>))
    .route("/screen", post(screen::handler::<S>))
    .route("/polls", get(polls::list::<S>))
    .route("/polls/{id}/vote", post(polls::vote::<S>))
    .with_state(state)
}

/// Administrator routes, all under `/admin`.
pub fn admin_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ComplaintStore + 'static,
{
  Router::new()
    .route("/admin/complaints", get(admin::list::<S>))
    .route(
      "/admin/complaints/{id}",
      get(admin::get_one::<S>).patch(admin::update::<S>),
    )
    .route("/admin/stats", get(admin::stats::<S>))
    .route("/admin/polls", post(admin::create_poll::<S>))
    .with_state(state)
}
