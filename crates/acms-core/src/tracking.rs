//! Tracking identifiers, the public, shareable key for a complaint.
//!
//! An identifier has the shape `ACMS-YYYY-NNNN`: a fixed prefix, the UTC year
//! at generation time, and a number drawn uniformly from `1000..=9999`.
//!
//! The space is small (9000 values per year), so a draw alone is not unique.
//! Uniqueness is the persistence layer's job: stores draw from a
//! [`TrackingIdSource`], insert under a uniqueness constraint, and draw again
//! on conflict.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const PREFIX: &str = "ACMS";

/// Smallest numeric suffix.
pub const SUFFIX_MIN: u16 = 1000;

/// Number of distinct suffixes; suffixes lie in `SUFFIX_MIN..SUFFIX_MIN + SUFFIX_SPAN`.
pub const SUFFIX_SPAN: u16 = 9000;

// ─── TrackingId ──────────────────────────────────────────────────────────────

/// A complaint tracking identifier.
///
/// Lookups compare the raw string exactly and case-sensitively, so values
/// assigned by an external collaborator can be wrapped with
/// [`TrackingId::from_raw`] without validation. Use [`str::parse`] when the
/// canonical format must be enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
  pub fn new(year: i32, number: u16) -> Self {
    Self(format!("{PREFIX}-{year:04}-{number:04}"))
  }

  pub fn from_raw(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for TrackingId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for TrackingId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl FromStr for TrackingId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidTrackingId(s.to_owned());
    let mut parts = s.split('-');
    let (Some(prefix), Some(year), Some(number), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      return Err(invalid());
    };

    let four_digits = |p: &str| p.len() == 4 && p.bytes().all(|b| b.is_ascii_digit());
    if prefix != PREFIX || !four_digits(year) || !four_digits(number) {
      return Err(invalid());
    }

    let number: u16 = number.parse().map_err(|_| invalid())?;
    if !(SUFFIX_MIN..SUFFIX_MIN + SUFFIX_SPAN).contains(&number) {
      return Err(invalid());
    }
    Ok(Self(s.to_owned()))
  }
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Draw an identifier for the current UTC year from the thread-local RNG.
/// Never fails; makes no uniqueness promise.
pub fn generate_tracking_id() -> TrackingId {
  generate_tracking_id_with(Utc::now().year(), &mut rand::thread_rng())
}

/// Draw an identifier for `year` from `rng`.
pub fn generate_tracking_id_with<R: Rng + ?Sized>(year: i32, rng: &mut R) -> TrackingId {
  let offset = rng.gen_range(0..SUFFIX_SPAN);
  TrackingId::new(year, SUFFIX_MIN + offset)
}

/// Where a store gets candidate identifiers from.
pub trait TrackingIdSource: Send + Sync {
  fn next_id(&self) -> TrackingId;
}

/// The production source: system clock plus thread-local randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTrackingIds;

impl TrackingIdSource for RandomTrackingIds {
  fn next_id(&self) -> TrackingId { generate_tracking_id() }
}
