//! Complaint records and their public projection.
//!
//! A complaint is created by a (possibly anonymous) submitter and triaged by
//! administrators. The submitter retrieves progress with the tracking ID
//! alone, through [`PublicComplaint`], which never exposes who submitted the
//! complaint, how to contact them, or internal notes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, tracking::TrackingId};

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Academic,
  Facility,
  Staff,
  Others,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Academic => "academic",
      Self::Facility => "facility",
      Self::Staff => "staff",
      Self::Others => "others",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
  Low,
  Medium,
  High,
}

impl Priority {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
    }
  }
}

/// Triage state. Every complaint starts as [`Status::Pending`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  #[default]
  Pending,
  InProgress,
  Resolved,
  Closed,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::InProgress => "in_progress",
      Self::Resolved => "resolved",
      Self::Closed => "closed",
    }
  }
}

/// Who filed the complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Submitter {
  #[default]
  Anonymous,
  /// A free-text display name, not tied to an account.
  Named { display_name: String },
  /// A reference to an account held by the authentication provider.
  User { user_id: String },
}

// ─── NewComplaint ────────────────────────────────────────────────────────────

/// Input to [`crate::store::ComplaintStore::create_complaint`].
///
/// Identity, tracking ID, status and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
  pub title:               String,
  pub description:         String,
  pub category:            Category,
  pub priority:            Priority,
  #[serde(default)]
  pub department:          Option<String>,
  #[serde(default)]
  pub location:            Option<String>,
  #[serde(default)]
  pub contact_email:       Option<String>,
  #[serde(default)]
  pub expected_resolution: Option<NaiveDate>,
  #[serde(default)]
  pub submitter:           Submitter,
}

impl NewComplaint {
  /// Convenience constructor for an anonymous complaint with no optional
  /// fields set.
  pub fn new(
    title: impl Into<String>,
    description: impl Into<String>,
    category: Category,
    priority: Priority,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      category,
      priority,
      department: None,
      location: None,
      contact_email: None,
      expected_resolution: None,
      submitter: Submitter::Anonymous,
    }
  }

  /// Check required fields and the shape of the contact email.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.description.trim().is_empty() {
      return Err(Error::MissingField("description"));
    }
    if let Submitter::Named { display_name } = &self.submitter
      && display_name.trim().is_empty()
    {
      return Err(Error::MissingField("display_name"));
    }
    if let Some(email) = &self.contact_email
      && !looks_like_email(email)
    {
      return Err(Error::InvalidEmail(email.clone()));
    }
    Ok(())
  }
}

fn looks_like_email(s: &str) -> bool {
  match s.trim().split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    }
    None => false,
  }
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// A stored complaint, as seen by administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
  pub complaint_id:        Uuid,
  /// Assigned once at creation; never changes.
  pub tracking_id:         TrackingId,
  pub title:               String,
  pub description:         String,
  pub category:            Category,
  pub priority:            Priority,
  pub department:          Option<String>,
  pub location:            Option<String>,
  pub contact_email:       Option<String>,
  pub expected_resolution: Option<NaiveDate>,
  pub submitter:           Submitter,
  pub status:              Status,
  /// Internal; never shown to the submitter.
  pub admin_notes:         Option<String>,
  /// Shown to the submitter on tracking lookup.
  pub resolution_notes:    Option<String>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

/// The fields a tracking-ID lookup may reveal without authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicComplaint {
  pub tracking_id:      TrackingId,
  pub title:            String,
  pub description:      String,
  pub category:         Category,
  pub priority:         Priority,
  pub status:           Status,
  pub location:         Option<String>,
  pub resolution_notes: Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl From<&Complaint> for PublicComplaint {
  fn from(c: &Complaint) -> Self {
    Self {
      tracking_id:      c.tracking_id.clone(),
      title:            c.title.clone(),
      description:      c.description.clone(),
      category:         c.category,
      priority:         c.priority,
      status:           c.status,
      location:         c.location.clone(),
      resolution_notes: c.resolution_notes.clone(),
      created_at:       c.created_at,
      updated_at:       c.updated_at,
    }
  }
}

// ─── Triage ──────────────────────────────────────────────────────────────────

/// An administrator's patch. `None` leaves a field as it is; the store always
/// bumps `updated_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintUpdate {
  pub status:           Option<Status>,
  pub admin_notes:      Option<String>,
  pub resolution_notes: Option<String>,
}

impl ComplaintUpdate {
  pub fn is_empty(&self) -> bool {
    self.status.is_none()
      && self.admin_notes.is_none()
      && self.resolution_notes.is_none()
  }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintStats {
  pub total:       u64,
  pub pending:     u64,
  pub in_progress: u64,
  pub resolved:    u64,
  pub closed:      u64,
}
