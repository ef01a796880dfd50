//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use acms_core::{
  complaint::{Category, ComplaintUpdate, NewComplaint, Priority, Status, Submitter},
  poll::{NewPoll, PollKind},
  store::{ComplaintQuery, ComplaintStore},
  tracking::{TrackingId, TrackingIdSource},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Hands out a fixed sequence of IDs, then repeats the last one forever.
struct ScriptedIds(Mutex<VecDeque<TrackingId>>);

impl ScriptedIds {
  fn new(ids: &[&str]) -> Arc<Self> {
    Arc::new(Self(Mutex::new(ids.iter().map(|s| TrackingId::from_raw(*s)).collect())))
  }
}

impl TrackingIdSource for ScriptedIds {
  fn next_id(&self) -> TrackingId {
    let mut ids = self.0.lock().unwrap();
    if ids.len() > 1 {
      ids.pop_front().unwrap()
    } else {
      ids.front().cloned().unwrap()
    }
  }
}

fn complaint(title: &str) -> NewComplaint {
  NewComplaint::new(
    title,
    "The lights in the east stairwell flicker constantly.",
    Category::Facility,
    Priority::Medium,
  )
}

// ─── Complaints ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_find_by_tracking_id() {
  let s = store().await;

  let mut input = complaint("Flickering lights");
  input.location = Some("East stairwell".into());
  input.contact_email = Some("me@example.edu".into());
  input.submitter = Submitter::Named { display_name: "Night owl".into() };

  let created = s.create_complaint(input).await.unwrap();
  assert_eq!(created.status, Status::Pending);
  assert!(created.tracking_id.as_str().parse::<TrackingId>().is_ok());

  let found = s
    .find_by_tracking_id(created.tracking_id.as_str())
    .await
    .unwrap()
    .expect("complaint should be found");
  assert_eq!(found.complaint_id, created.complaint_id);
  assert_eq!(found.title, "Flickering lights");
  assert_eq!(found.location.as_deref(), Some("East stairwell"));
  assert_eq!(found.submitter, Submitter::Named { display_name: "Night owl".into() });
  assert_eq!(found.created_at, created.created_at);
}

#[tokio::test]
async fn unknown_tracking_id_is_none_not_error() {
  let s = store().await;
  s.create_complaint(complaint("Something")).await.unwrap();

  let result = s.find_by_tracking_id("ACMS-1999-1000").await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn tracking_lookup_is_case_sensitive() {
  let s = store()
    .await
    .with_tracking_source(ScriptedIds::new(&["ACMS-2025-4242"]));
  s.create_complaint(complaint("Case")).await.unwrap();

  assert!(s.find_by_tracking_id("ACMS-2025-4242").await.unwrap().is_some());
  assert!(s.find_by_tracking_id("acms-2025-4242").await.unwrap().is_none());
}

#[tokio::test]
async fn colliding_tracking_id_is_redrawn() {
  let ids = ScriptedIds::new(&["ACMS-2025-1111", "ACMS-2025-1111", "ACMS-2025-2222"]);
  let s = store().await.with_tracking_source(ids);

  let first = s.create_complaint(complaint("First")).await.unwrap();
  let second = s.create_complaint(complaint("Second")).await.unwrap();

  assert_eq!(first.tracking_id.as_str(), "ACMS-2025-1111");
  assert_eq!(second.tracking_id.as_str(), "ACMS-2025-2222");

  let found = s.find_by_tracking_id("ACMS-2025-2222").await.unwrap().unwrap();
  assert_eq!(found.title, "Second");
}

#[tokio::test]
async fn exhausted_tracking_ids_are_an_error() {
  let s = store()
    .await
    .with_tracking_source(ScriptedIds::new(&["ACMS-2025-5555"]))
    .with_max_tracking_attempts(3);

  s.create_complaint(complaint("Taken")).await.unwrap();
  let err = s.create_complaint(complaint("Unlucky")).await.unwrap_err();
  assert!(matches!(err, Error::TrackingIdsExhausted { attempts: 3 }), "{err}");

  let all = s.list_complaints(&ComplaintQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn invalid_complaint_is_rejected_before_insert() {
  let s = store().await;
  let err = s.create_complaint(complaint("  ")).await.unwrap_err();
  assert!(matches!(err, Error::Core(acms_core::Error::MissingField("title"))));
}

#[tokio::test]
async fn list_is_newest_first_and_filterable() {
  let s = store().await;
  let a = s.create_complaint(complaint("A")).await.unwrap();
  let mut staff = complaint("B");
  staff.category = Category::Staff;
  s.create_complaint(staff).await.unwrap();
  s.create_complaint(complaint("C")).await.unwrap();

  let all = s.list_complaints(&ComplaintQuery::default()).await.unwrap();
  let titles: Vec<_> = all.iter().map(|c| c.title.as_str()).collect();
  assert_eq!(titles, vec!["C", "B", "A"]);

  let staff_only = s
    .list_complaints(&ComplaintQuery { category: Some(Category::Staff), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(staff_only.len(), 1);
  assert_eq!(staff_only[0].title, "B");

  s.update_complaint(a.complaint_id, ComplaintUpdate {
    status: Some(Status::Resolved),
    ..Default::default()
  })
  .await
  .unwrap();
  let resolved = s
    .list_complaints(&ComplaintQuery { status: Some(Status::Resolved), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(resolved.len(), 1);
  assert_eq!(resolved[0].complaint_id, a.complaint_id);

  let page = s
    .list_complaints(&ComplaintQuery { limit: Some(1), offset: Some(1), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].title, "B");
}

#[tokio::test]
async fn list_filters_by_submitting_account() {
  let s = store().await;
  for (title, submitter) in [
    ("A", Submitter::User { user_id: "u-1".into() }),
    ("B", Submitter::User { user_id: "u-2".into() }),
    ("C", Submitter::Named { display_name: "u-1".into() }),
    ("D", Submitter::Anonymous),
    ("E", Submitter::User { user_id: "u-1".into() }),
  ] {
    let mut input = complaint(title);
    input.submitter = submitter;
    s.create_complaint(input).await.unwrap();
  }

  let mine = s
    .list_complaints(&ComplaintQuery { user_id: Some("u-1".into()), ..Default::default() })
    .await
    .unwrap();
  let titles: Vec<_> = mine.iter().map(|c| c.title.as_str()).collect();
  assert_eq!(titles, vec!["E", "A"]);

  let nobody = s
    .list_complaints(&ComplaintQuery { user_id: Some("u-3".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(nobody.is_empty());
}

#[tokio::test]
async fn update_applies_patch_and_keeps_unset_fields() {
  let s = store().await;
  let c = s.create_complaint(complaint("Lights")).await.unwrap();

  let updated = s
    .update_complaint(c.complaint_id, ComplaintUpdate {
      status:           Some(Status::InProgress),
      admin_notes:      Some("electrician booked".into()),
      resolution_notes: None,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, Status::InProgress);
  assert_eq!(updated.admin_notes.as_deref(), Some("electrician booked"));
  assert!(updated.updated_at >= c.updated_at);

  let updated = s
    .update_complaint(c.complaint_id, ComplaintUpdate {
      resolution_notes: Some("Bulbs replaced".into()),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, Status::InProgress);
  assert_eq!(updated.admin_notes.as_deref(), Some("electrician booked"));
  assert_eq!(updated.resolution_notes.as_deref(), Some("Bulbs replaced"));
  assert_eq!(updated.tracking_id, c.tracking_id);
}

#[tokio::test]
async fn update_missing_complaint_returns_none() {
  let s = store().await;
  let result = s
    .update_complaint(Uuid::new_v4(), ComplaintUpdate {
      status: Some(Status::Closed),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn get_complaint_by_id() {
  let s = store().await;
  let c = s.create_complaint(complaint("By id")).await.unwrap();
  assert!(s.get_complaint(c.complaint_id).await.unwrap().is_some());
  assert!(s.get_complaint(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn stats_count_by_status() {
  let s = store().await;
  let a = s.create_complaint(complaint("A")).await.unwrap();
  let b = s.create_complaint(complaint("B")).await.unwrap();
  s.create_complaint(complaint("C")).await.unwrap();

  s.update_complaint(a.complaint_id, ComplaintUpdate {
    status: Some(Status::InProgress),
    ..Default::default()
  })
  .await
  .unwrap();
  s.update_complaint(b.complaint_id, ComplaintUpdate {
    status: Some(Status::Resolved),
    ..Default::default()
  })
  .await
  .unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.total, 3);
  assert_eq!(stats.pending, 1);
  assert_eq!(stats.in_progress, 1);
  assert_eq!(stats.resolved, 1);
  assert_eq!(stats.closed, 0);
}

// ─── Polls ───────────────────────────────────────────────────────────────────

fn poll(kind: PollKind, options: &[&str]) -> NewPoll {
  NewPoll {
    title: "Facilities".into(),
    description: "What should we fix first?".into(),
    kind,
    options: options.iter().map(|s| s.to_string()).collect(),
    expires_in_days: 5,
  }
}

#[tokio::test]
async fn create_and_list_polls() {
  let s = store().await;
  let yes_no = s.create_poll(poll(PollKind::YesNo, &[])).await.unwrap();
  let multi = s
    .create_poll(poll(PollKind::MultipleChoice, &["WiFi", "Parking", "Study rooms"]))
    .await
    .unwrap();

  let polls = s.list_polls().await.unwrap();
  assert_eq!(polls.len(), 2);
  assert_eq!(polls[0].poll_id, multi.poll_id);
  assert_eq!(polls[1].poll_id, yes_no.poll_id);

  let labels: Vec<_> = polls[0].options.iter().map(|o| o.label.as_str()).collect();
  assert_eq!(labels, vec!["WiFi", "Parking", "Study rooms"]);
  assert_eq!(polls[1].options.len(), 2);
  assert!(polls.iter().all(|p| p.total_votes == 0));
}

#[tokio::test]
async fn votes_increment_counters() {
  let s = store().await;
  let p = s
    .create_poll(poll(PollKind::MultipleChoice, &["WiFi", "Parking"]))
    .await
    .unwrap();

  s.vote(p.poll_id, "WiFi").await.unwrap();
  s.vote(p.poll_id, "WiFi").await.unwrap();
  let after = s.vote(p.poll_id, "Parking").await.unwrap().unwrap();

  assert_eq!(after.total_votes, 3);
  assert_eq!(after.options[0].votes, 2);
  assert_eq!(after.options[1].votes, 1);
}

#[tokio::test]
async fn vote_for_unknown_option_or_poll() {
  let s = store().await;
  let p = s.create_poll(poll(PollKind::YesNo, &[])).await.unwrap();

  let err = s.vote(p.poll_id, "Maybe").await.unwrap_err();
  assert!(matches!(err, Error::Core(acms_core::Error::UnknownOption(_))));

  assert!(s.vote(Uuid::new_v4(), "Yes").await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_poll_is_rejected() {
  let s = store().await;
  let err = s
    .create_poll(poll(PollKind::MultipleChoice, &["Only"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(acms_core::Error::InvalidPoll(_))));
  assert!(s.list_polls().await.unwrap().is_empty());
}
