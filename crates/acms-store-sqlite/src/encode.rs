//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological. Enums are stored as their
//! snake_case names, [`Submitter`] as compact JSON, UUIDs as hyphenated
//! lowercase strings.

use acms_core::{
  complaint::{Category, Complaint, Priority, Status, Submitter},
  poll::{Poll, PollKind, PollOption},
  tracking::TrackingId,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_category(s: &str) -> Result<Category> {
  match s {
    "academic" => Ok(Category::Academic),
    "facility" => Ok(Category::Facility),
    "staff" => Ok(Category::Staff),
    "others" => Ok(Category::Others),
    other => Err(Error::Decode(format!("unknown category: {other:?}"))),
  }
}

pub fn decode_priority(s: &str) -> Result<Priority> {
  match s {
    "low" => Ok(Priority::Low),
    "medium" => Ok(Priority::Medium),
    "high" => Ok(Priority::High),
    other => Err(Error::Decode(format!("unknown priority: {other:?}"))),
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "pending" => Ok(Status::Pending),
    "in_progress" => Ok(Status::InProgress),
    "resolved" => Ok(Status::Resolved),
    "closed" => Ok(Status::Closed),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

pub fn decode_poll_kind(s: &str) -> Result<PollKind> {
  match s {
    "yes_no" => Ok(PollKind::YesNo),
    "multiple_choice" => Ok(PollKind::MultipleChoice),
    other => Err(Error::Decode(format!("unknown poll kind: {other:?}"))),
  }
}

// ─── Submitter ───────────────────────────────────────────────────────────────

pub fn encode_submitter(s: &Submitter) -> Result<String> {
  Ok(serde_json::to_string(s)?)
}

pub fn decode_submitter(s: &str) -> Result<Submitter> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every complaint `SELECT`, in [`RawComplaint`] order.
pub const COMPLAINT_COLUMNS: &str = "complaint_id, tracking_id, title, description, \
   category, priority, department, location, contact_email, expected_resolution, \
   submitter, status, admin_notes, resolution_notes, created_at, updated_at";

/// Raw strings read directly from a `complaints` row.
pub struct RawComplaint {
  pub complaint_id:        String,
  pub tracking_id:         String,
  pub title:               String,
  pub description:         String,
  pub category:            String,
  pub priority:            String,
  pub department:          Option<String>,
  pub location:            Option<String>,
  pub contact_email:       Option<String>,
  pub expected_resolution: Option<String>,
  pub submitter:           String,
  pub status:              String,
  pub admin_notes:         Option<String>,
  pub resolution_notes:    Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawComplaint {
  /// Map a row selected with [`COMPLAINT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      complaint_id:        row.get(0)?,
      tracking_id:         row.get(1)?,
      title:               row.get(2)?,
      description:         row.get(3)?,
      category:            row.get(4)?,
      priority:            row.get(5)?,
      department:          row.get(6)?,
      location:            row.get(7)?,
      contact_email:       row.get(8)?,
      expected_resolution: row.get(9)?,
      submitter:           row.get(10)?,
      status:              row.get(11)?,
      admin_notes:         row.get(12)?,
      resolution_notes:    row.get(13)?,
      created_at:          row.get(14)?,
      updated_at:          row.get(15)?,
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      complaint_id:        decode_uuid(&self.complaint_id)?,
      tracking_id:         TrackingId::from_raw(self.tracking_id),
      title:               self.title,
      description:         self.description,
      category:            decode_category(&self.category)?,
      priority:            decode_priority(&self.priority)?,
      department:          self.department,
      location:            self.location,
      contact_email:       self.contact_email,
      expected_resolution: self
        .expected_resolution
        .as_deref()
        .map(decode_date)
        .transpose()?,
      submitter:           decode_submitter(&self.submitter)?,
      status:              decode_status(&self.status)?,
      admin_notes:         self.admin_notes,
      resolution_notes:    self.resolution_notes,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `polls` row plus its options, in position order.
pub struct RawPoll {
  pub poll_id:     String,
  pub title:       String,
  pub description: String,
  pub kind:        String,
  pub created_at:  String,
  pub expires_at:  String,
  pub options:     Vec<(String, i64)>,
}

impl RawPoll {
  pub fn into_poll(self) -> Result<Poll> {
    let options = self
      .options
      .into_iter()
      .map(|(label, votes)| {
        let votes = u64::try_from(votes)
          .map_err(|_| Error::Decode(format!("negative vote count for {label:?}")))?;
        Ok(PollOption { label, votes })
      })
      .collect::<Result<Vec<_>>>()?;
    let total_votes = options.iter().map(|o| o.votes).sum();

    Ok(Poll {
      poll_id: decode_uuid(&self.poll_id)?,
      title: self.title,
      description: self.description,
      kind: decode_poll_kind(&self.kind)?,
      options,
      total_votes,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}
