//! [`SqliteStore`], the SQLite implementation of [`ComplaintStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use acms_core::{
  complaint::{Complaint, ComplaintStats, ComplaintUpdate, NewComplaint, Status},
  poll::{NewPoll, Poll, PollOption},
  store::{ComplaintQuery, ComplaintStore},
  tracking::{RandomTrackingIds, TrackingId, TrackingIdSource},
};

use crate::{
  encode::{
    COMPLAINT_COLUMNS, RawComplaint, RawPoll, decode_status, encode_date,
    encode_dt, encode_submitter, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// How many candidate tracking IDs `create_complaint` draws before giving up.
pub const DEFAULT_MAX_TRACKING_ATTEMPTS: u32 = 16;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An ACMS store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection and tracking source are
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:                  tokio_rusqlite::Connection,
  tracking:              Arc<dyn TrackingIdSource>,
  max_tracking_attempts: u32,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      tracking: Arc::new(RandomTrackingIds),
      max_tracking_attempts: DEFAULT_MAX_TRACKING_ATTEMPTS,
    })
  }

  /// Replace the source of candidate tracking IDs.
  pub fn with_tracking_source(mut self, source: Arc<dyn TrackingIdSource>) -> Self {
    self.tracking = source;
    self
  }

  /// Bound the number of draws per complaint. Values below one are raised to
  /// one.
  pub fn with_max_tracking_attempts(mut self, attempts: u32) -> Self {
    self.max_tracking_attempts = attempts.max(1);
    self
  }

  async fn load_poll(&self, id: Uuid) -> Result<Option<Poll>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPoll> = self
      .conn
      .call(move |conn| Ok(select_poll(conn, &id_str)?))
      .await?;
    raw.map(RawPoll::into_poll).transpose()
  }
}

/// `true` if `err` is the `UNIQUE` violation on `complaints.tracking_id`.
fn is_tracking_conflict(err: &rusqlite::Error) -> bool {
  match err {
    rusqlite::Error::SqliteFailure(e, Some(msg)) => {
      e.code == rusqlite::ErrorCode::ConstraintViolation
        && msg.contains("complaints.tracking_id")
    }
    _ => false,
  }
}

fn select_poll(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawPoll>> {
  let head = conn
    .query_row(
      "SELECT poll_id, title, description, kind, created_at, expires_at
       FROM polls WHERE poll_id = ?1",
      rusqlite::params![id],
      |row| {
        Ok(RawPoll {
          poll_id:     row.get(0)?,
          title:       row.get(1)?,
          description: row.get(2)?,
          kind:        row.get(3)?,
          created_at:  row.get(4)?,
          expires_at:  row.get(5)?,
          options:     Vec::new(),
        })
      },
    )
    .optional()?;

  let Some(mut poll) = head else { return Ok(None) };
  let mut stmt = conn.prepare(
    "SELECT label, votes FROM poll_options WHERE poll_id = ?1 ORDER BY position",
  )?;
  poll.options = stmt
    .query_map(rusqlite::params![id], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(Some(poll))
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  // ── Complaints ────────────────────────────────────────────────────────────

  async fn create_complaint(&self, input: NewComplaint) -> Result<Complaint> {
    input.validate()?;

    let complaint_id = Uuid::new_v4();
    let now          = Utc::now();

    let id_str        = encode_uuid(complaint_id);
    let title         = input.title.clone();
    let description   = input.description.clone();
    let category      = input.category.as_str();
    let priority      = input.priority.as_str();
    let department    = input.department.clone();
    let location      = input.location.clone();
    let contact_email = input.contact_email.clone();
    let expected      = input.expected_resolution.map(encode_date);
    let submitter     = encode_submitter(&input.submitter)?;
    let status        = Status::Pending.as_str();
    let at_str        = encode_dt(now);

    let source   = Arc::clone(&self.tracking);
    let attempts = self.max_tracking_attempts;

    let assigned: Option<String> = self
      .conn
      .call(move |conn| {
        for attempt in 1..=attempts {
          let candidate = source.next_id().into_inner();
          let inserted = conn.execute(
            "INSERT INTO complaints (
               complaint_id, tracking_id, title, description, category, priority,
               department, location, contact_email, expected_resolution,
               submitter, status, admin_notes, resolution_notes,
               created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, NULL, NULL, ?13, ?13)",
            rusqlite::params![
              id_str,
              candidate,
              title,
              description,
              category,
              priority,
              department,
              location,
              contact_email,
              expected,
              submitter,
              status,
              at_str,
            ],
          );
          match inserted {
            Ok(_) => return Ok(Some(candidate)),
            Err(e) if is_tracking_conflict(&e) => {
              tracing::warn!(tracking_id = %candidate, attempt, "tracking ID collision; drawing again");
            }
            Err(e) => return Err(e.into()),
          }
        }
        Ok(None)
      })
      .await?;

    let tracking_id = assigned.ok_or(Error::TrackingIdsExhausted { attempts })?;
    tracing::debug!(%complaint_id, %tracking_id, "complaint stored");

    Ok(Complaint {
      complaint_id,
      tracking_id:         TrackingId::from_raw(tracking_id),
      title:               input.title,
      description:         input.description,
      category:            input.category,
      priority:            input.priority,
      department:          input.department,
      location:            input.location,
      contact_email:       input.contact_email,
      expected_resolution: input.expected_resolution,
      submitter:           input.submitter,
      status:              Status::Pending,
      admin_notes:         None,
      resolution_notes:    None,
      created_at:          now,
      updated_at:          now,
    })
  }

  async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<Complaint>> {
    let key = tracking_id.to_owned();

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE tracking_id = ?1"),
            rusqlite::params![key],
            RawComplaint::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
            rusqlite::params![id_str],
            RawComplaint::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn list_complaints(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    let status_str   = query.status.map(Status::as_str);
    let category_str = query.category.map(|c| c.as_str());
    let user_id      = query.user_id.clone();
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMPLAINT_COLUMNS} FROM complaints
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR category = ?2)
             AND (?3 IS NULL OR (json_extract(submitter, '$.kind') = 'user'
                                 AND json_extract(submitter, '$.user_id') = ?3))
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status_str, category_str, user_id, limit_val, offset_val],
            RawComplaint::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn update_complaint(
    &self,
    id:     Uuid,
    update: ComplaintUpdate,
  ) -> Result<Option<Complaint>> {
    let id_str     = encode_uuid(id);
    let status_str = update.status.map(Status::as_str);
    let at_str     = encode_dt(Utc::now());

    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE complaints SET
             status           = COALESCE(?2, status),
             admin_notes      = COALESCE(?3, admin_notes),
             resolution_notes = COALESCE(?4, resolution_notes),
             updated_at       = ?5
           WHERE complaint_id = ?1",
          rusqlite::params![
            id_str,
            status_str,
            update.admin_notes,
            update.resolution_notes,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"),
            rusqlite::params![id_str],
            RawComplaint::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn stats(&self) -> Result<ComplaintStats> {
    let counts: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT status, COUNT(*) FROM complaints GROUP BY status")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut stats = ComplaintStats::default();
    for (status, count) in counts {
      let count = count as u64;
      stats.total += count;
      match decode_status(&status)? {
        Status::Pending => stats.pending += count,
        Status::InProgress => stats.in_progress += count,
        Status::Resolved => stats.resolved += count,
        Status::Closed => stats.closed += count,
      }
    }
    Ok(stats)
  }

  // ── Polls ─────────────────────────────────────────────────────────────────

  async fn create_poll(&self, input: NewPoll) -> Result<Poll> {
    let labels     = input.resolved_options()?;
    let poll_id    = Uuid::new_v4();
    let created_at = Utc::now();
    let expires_at = input.expires_at(created_at);

    let id_str      = encode_uuid(poll_id);
    let title       = input.title.trim().to_owned();
    let description = input.description.trim().to_owned();
    let kind_str    = input.kind.as_str();
    let created_str = encode_dt(created_at);
    let expires_str = encode_dt(expires_at);
    let option_rows = labels.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO polls (poll_id, title, description, kind, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, title, description, kind_str, created_str, expires_str],
        )?;
        for (position, label) in option_rows.iter().enumerate() {
          tx.execute(
            "INSERT INTO poll_options (poll_id, position, label) VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, position as i64, label],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(Poll {
      poll_id,
      title: input.title.trim().to_owned(),
      description: input.description.trim().to_owned(),
      kind: input.kind,
      options: labels
        .into_iter()
        .map(|label| PollOption { label, votes: 0 })
        .collect(),
      total_votes: 0,
      created_at,
      expires_at,
    })
  }

  async fn list_polls(&self) -> Result<Vec<Poll>> {
    let raws: Vec<RawPoll> = self
      .conn
      .call(|conn| {
        let ids: Vec<String> = {
          let mut stmt = conn
            .prepare("SELECT poll_id FROM polls ORDER BY created_at DESC, rowid DESC")?;
          stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let mut polls = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(poll) = select_poll(conn, &id)? {
            polls.push(poll);
          }
        }
        Ok(polls)
      })
      .await?;

    raws.into_iter().map(RawPoll::into_poll).collect()
  }

  async fn get_poll(&self, id: Uuid) -> Result<Option<Poll>> { self.load_poll(id).await }

  async fn vote(&self, poll_id: Uuid, option: &str) -> Result<Option<Poll>> {
    let Some(poll) = self.load_poll(poll_id).await? else {
      return Ok(None);
    };
    poll.check_vote(option, Utc::now())?;

    let id_str = encode_uuid(poll_id);
    let label  = option.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE poll_options SET votes = votes + 1 WHERE poll_id = ?1 AND label = ?2",
          rusqlite::params![id_str, label],
        )?;
        Ok(())
      })
      .await?;

    self.load_poll(poll_id).await
  }
}
