//! HTTP server for ACMS.
//!
//! Composes the public and administrator routers from `acms-api`, puts the
//! administrator routes behind HTTP Basic auth, and adds request tracing.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use acms_api::{ApiState, ScreeningMode, ScreeningPolicy};
use acms_core::{screening::Blocklist, store::ComplaintStore};
use acms_store_sqlite::DEFAULT_MAX_TRACKING_ATTEMPTS;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_admin};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_max_tracking_attempts() -> u32 { DEFAULT_MAX_TRACKING_ATTEMPTS }

/// Runtime server configuration, deserialised from `config.toml` and
/// `ACMS_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  pub store_path:            PathBuf,
  pub admin_username:        String,
  pub admin_password_hash:   String,
  #[serde(default)]
  pub screening_mode:        ScreeningMode,
  /// Added to the builtin blocklist.
  #[serde(default)]
  pub extra_blocked_terms:   Vec<String>,
  #[serde(default = "default_max_tracking_attempts")]
  pub max_tracking_attempts: u32,
}

impl ServerConfig {
  pub fn blocklist(&self) -> acms_core::Result<Blocklist> {
    Blocklist::with_extra_terms(&self.extra_blocked_terms)
  }

  pub fn policy(&self) -> ScreeningPolicy {
    ScreeningPolicy { mode: self.screening_mode }
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S> {
  pub api:  ApiState<S>,
  pub auth: Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete axum [`Router`]: public routes open, `/admin/*` gated.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ComplaintStore + 'static,
{
  let admin = acms_api::admin_router(state.api.clone())
    .layer(middleware::from_fn_with_state(state.auth, require_admin));

  acms_api::api_router(state.api)
    .merge(admin)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use acms_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use tower::ServiceExt as _;

  const CONFIG: &str = r#"
    store_path          = "~/acms/acms.db"
    admin_username      = "admin"
    admin_password_hash = "$argon2id$placeholder"
  "#;

  fn load(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn config_defaults() {
    let cfg = load(CONFIG);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.screening_mode, ScreeningMode::Reject);
    assert!(cfg.extra_blocked_terms.is_empty());
    assert_eq!(cfg.max_tracking_attempts, DEFAULT_MAX_TRACKING_ATTEMPTS);
  }

  #[test]
  fn config_overrides_and_extra_terms() {
    let cfg = load(&format!(
      "{CONFIG}\nscreening_mode = \"mask\"\nextra_blocked_terms = [\"Heck\", \"dang it\"]\nport = 9000\n"
    ));
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.policy().mode, ScreeningMode::Mask);

    let blocklist = cfg.blocklist().unwrap();
    assert!(blocklist.contains_disallowed_term("oh heck"));
    assert!(blocklist.contains_disallowed_term("Dang   it all"));
    assert!(blocklist.contains_disallowed_term("damn"));
  }

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      api:  ApiState::new(
        Arc::new(store),
        Blocklist::builtin().unwrap(),
        ScreeningPolicy::default(),
      ),
      auth: Arc::new(AuthConfig {
        username:      "admin".to_string(),
        password_hash: auth::hash_password(password).unwrap(),
      }),
    }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn get(
    state:   AppState<SqliteStore>,
    uri:     &str,
    headers: Vec<(header::HeaderName, String)>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn admin_requires_credentials() {
    let res = get(make_state("secret").await, "/admin/stats", vec![]).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn admin_rejects_wrong_password() {
    let res = get(
      make_state("secret").await,
      "/admin/stats",
      vec![(header::AUTHORIZATION, auth_header("admin", "nope"))],
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn admin_accepts_valid_credentials() {
    let res = get(
      make_state("secret").await,
      "/admin/stats",
      vec![(header::AUTHORIZATION, auth_header("admin", "secret"))],
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(stats["total"], 0);
  }

  #[tokio::test]
  async fn public_routes_need_no_credentials() {
    let res = get(make_state("secret").await, "/polls", vec![]).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get(make_state("secret").await, "/track/ACMS-2025-1000", vec![]).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }
}
