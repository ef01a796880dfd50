//! Error type for `acms-store-sqlite`.

use acms_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] acms_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value the domain types cannot represent.
  #[error("decode error: {0}")]
  Decode(String),

  /// Every candidate tracking ID drawn was already taken.
  #[error("no free tracking ID after {attempts} attempts")]
  TrackingIdsExhausted { attempts: u32 },
}

impl StoreError for Error {
  fn as_domain(&self) -> Option<&acms_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
