//! The `ComplaintStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `acms-store-sqlite`).
//! Higher layers (`acms-api`, `acms-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  complaint::{Category, Complaint, ComplaintStats, ComplaintUpdate, NewComplaint, Status},
  poll::{NewPoll, Poll},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ComplaintStore::list_complaints`].
#[derive(Debug, Clone, Default)]
pub struct ComplaintQuery {
  pub status:   Option<Status>,
  pub category: Option<Category>,
  /// Only complaints filed as [`Submitter::User`](crate::complaint::Submitter::User) with this account ID.
  pub user_id:  Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A backend error that may carry a domain rule violation.
///
/// Stores re-check some rules inside their own transaction (a poll can close
/// between a caller's check and the write). Those failures surface through
/// [`as_domain`](StoreError::as_domain) so callers can report them as the
/// rule violation they are rather than as a backend fault.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn as_domain(&self) -> Option<&crate::Error> { None }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the persistence collaborator.
///
/// Lookups return `Ok(None)` when nothing matches. `Err` is reserved for the
/// backend itself failing, so callers can tell "no such complaint" apart from
/// "could not ask".
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ComplaintStore: Send + Sync {
  type Error: StoreError;

  // ── Complaints ────────────────────────────────────────────────────────

  /// Persist a new complaint.
  ///
  /// The store assigns the UUID, timestamps, `Pending` status and a tracking
  /// ID that is unique among stored complaints.
  fn create_complaint(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  /// Exact, case-sensitive match on the tracking ID. Requires no caller
  /// identity.
  fn find_by_tracking_id<'a>(
    &'a self,
    tracking_id: &'a str,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + 'a;

  fn get_complaint(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Complaints matching `query`, newest first.
  fn list_complaints<'a>(
    &'a self,
    query: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Apply an administrator's patch. Returns `None` if the complaint does not
  /// exist.
  fn update_complaint(
    &self,
    id: Uuid,
    update: ComplaintUpdate,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<ComplaintStats, Self::Error>> + Send + '_;

  // ── Polls ─────────────────────────────────────────────────────────────

  fn create_poll(
    &self,
    input: NewPoll,
  ) -> impl Future<Output = Result<Poll, Self::Error>> + Send + '_;

  /// All polls, newest first.
  fn list_polls(&self) -> impl Future<Output = Result<Vec<Poll>, Self::Error>> + Send + '_;

  fn get_poll(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Poll>, Self::Error>> + Send + '_;

  /// Add one vote to `option`. Returns `None` if the poll does not exist.
  fn vote<'a>(
    &'a self,
    poll_id: Uuid,
    option: &'a str,
  ) -> impl Future<Output = Result<Option<Poll>, Self::Error>> + Send + 'a;
}
