//! Simple polls with naive per-option vote counters.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollKind {
  YesNo,
  MultipleChoice,
}

impl PollKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::YesNo => "yes_no",
      Self::MultipleChoice => "multiple_choice",
    }
  }
}

fn default_expiry_days() -> u32 { 7 }

/// Longest lifetime a poll may be created with.
pub const MAX_EXPIRY_DAYS: u32 = 365;

/// Input to [`crate::store::ComplaintStore::create_poll`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPoll {
  pub title:           String,
  pub description:     String,
  pub kind:            PollKind,
  /// Ignored for yes/no polls.
  #[serde(default)]
  pub options:         Vec<String>,
  #[serde(default = "default_expiry_days")]
  pub expires_in_days: u32,
}

impl NewPoll {
  /// Validate the poll and return the option labels it will be created with.
  ///
  /// Yes/no polls always get `["Yes", "No"]`. Multiple-choice polls keep their
  /// trimmed, non-blank, distinct options and need at least two.
  pub fn resolved_options(&self) -> Result<Vec<String>> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.description.trim().is_empty() {
      return Err(Error::MissingField("description"));
    }
    if self.expires_in_days == 0 {
      return Err(Error::InvalidPoll("expiry must be at least one day".into()));
    }
    if self.expires_in_days > MAX_EXPIRY_DAYS {
      return Err(Error::InvalidPoll(format!(
        "expiry must be at most {MAX_EXPIRY_DAYS} days"
      )));
    }

    match self.kind {
      PollKind::YesNo => Ok(vec!["Yes".to_owned(), "No".to_owned()]),
      PollKind::MultipleChoice => {
        let mut options: Vec<String> = Vec::new();
        for option in self.options.iter().map(|o| o.trim()) {
          if !option.is_empty() && !options.iter().any(|o| o == option) {
            options.push(option.to_owned());
          }
        }
        if options.len() < 2 {
          return Err(Error::InvalidPoll(
            "a multiple-choice poll needs at least two options".into(),
          ));
        }
        Ok(options)
      }
    }
  }

  /// Expiry relative to `created_at`. Lifetimes beyond [`MAX_EXPIRY_DAYS`]
  /// are clamped; [`Self::resolved_options`] rejects them outright.
  pub fn expires_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
    let days = self.expires_in_days.min(MAX_EXPIRY_DAYS);
    created_at + Duration::days(i64::from(days))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
  pub label: String,
  pub votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
  pub poll_id:     Uuid,
  pub title:       String,
  pub description: String,
  pub kind:        PollKind,
  /// In creation order.
  pub options:     Vec<PollOption>,
  pub total_votes: u64,
  pub created_at:  DateTime<Utc>,
  pub expires_at:  DateTime<Utc>,
}

impl Poll {
  pub fn is_open(&self, now: DateTime<Utc>) -> bool { now < self.expires_at }

  /// Check that a vote for `option` would be accepted at `now`.
  pub fn check_vote(&self, option: &str, now: DateTime<Utc>) -> Result<()> {
    if !self.is_open(now) {
      return Err(Error::PollClosed(self.poll_id));
    }
    if !self.options.iter().any(|o| o.label == option) {
      return Err(Error::UnknownOption(option.to_owned()));
    }
    Ok(())
  }
}
