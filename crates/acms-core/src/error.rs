//! Error types for `acms-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid contact email: {0:?}")]
  InvalidEmail(String),

  #[error("malformed tracking ID: {0:?}")]
  InvalidTrackingId(String),

  #[error("invalid poll: {0}")]
  InvalidPoll(String),

  #[error("poll has no option {0:?}")]
  UnknownOption(String),

  #[error("poll {0} is closed")]
  PollClosed(Uuid),

  #[error("blocklist term could not be compiled: {0}")]
  Pattern(#[from] regex::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
