//! Async HTTP client wrapping the ACMS JSON API.

use acms_core::{
  complaint::{ComplaintStats, NewComplaint, PublicComplaint},
  poll::Poll,
  screening::ScreeningReport,
  tracking::TrackingId,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the ACMS API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Returned by `POST /complaints`.
#[derive(Debug, Clone, Deserialize)]
pub struct Receipt {
  pub tracking_id: TrackingId,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
  Accepted(Receipt),
  /// The server screens in reject mode and the text hit the blocklist.
  Rejected { matched_terms: Vec<String> },
}

/// Result of a tracking lookup that reached the service. Transport and
/// backend failures are `Err`, never `NotFound`.
#[derive(Debug)]
pub enum TrackOutcome {
  Found(PublicComplaint),
  NotFound,
}

#[derive(Deserialize)]
struct ErrorBody {
  error:         String,
  #[serde(default)]
  matched_terms: Vec<String>,
}

/// Async HTTP client for the ACMS JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// The base URL with `segments` appended, each percent-encoded as a single
  /// path segment.
  fn url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.config.base_url)
      .with_context(|| format!("invalid service URL {:?}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("service URL {:?} cannot take a path", self.config.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<Response> {
    tracing::debug!(%what, "sending request");
    req
      .send()
      .await
      .with_context(|| format!("could not reach the complaint service ({what})"))
  }

  // ── Complaints ────────────────────────────────────────────────────────────

  /// `POST /complaints`
  pub async fn submit_complaint(&self, complaint: &NewComplaint) -> Result<SubmitOutcome> {
    let resp = self
      .send(self.client.post(self.url(&["complaints"])?).json(complaint), "POST /complaints")
      .await?;

    match resp.status() {
      s if s.is_success() => Ok(SubmitOutcome::Accepted(
        resp.json().await.context("deserialising receipt")?,
      )),
      StatusCode::UNPROCESSABLE_ENTITY => {
        let body: ErrorBody = resp.json().await.context("deserialising rejection")?;
        Ok(SubmitOutcome::Rejected { matched_terms: body.matched_terms })
      }
      _ => Err(failure("POST /complaints", resp).await),
    }
  }

  /// `GET /track/{tracking_id}`
  pub async fn track(&self, tracking_id: &str) -> Result<TrackOutcome> {
    // Dot segments are dropped when building the path; neither is a tracking ID.
    if matches!(tracking_id, "." | "..") {
      return Ok(TrackOutcome::NotFound);
    }
    let url = self.url(&["track", tracking_id])?;
    let resp = self.send(self.client.get(url), "GET /track").await?;

    match resp.status() {
      s if s.is_success() => Ok(TrackOutcome::Found(
        resp.json().await.context("deserialising complaint")?,
      )),
      // Only the API's own JSON 404 means "no such complaint"; a bare 404
      // comes from a wrong base URL or a proxy in front of the service.
      StatusCode::NOT_FOUND => match resp.json::<ErrorBody>().await {
        Ok(_) => Ok(TrackOutcome::NotFound),
        Err(_) => Err(anyhow!(
          "GET /track → 404 without an API error body; check the service URL ({})",
          self.config.base_url
        )),
      },
      _ => Err(failure("GET /track", resp).await),
    }
  }

  /// `POST /screen`
  pub async fn screen(&self, text: &str) -> Result<ScreeningReport> {
    let resp = self
      .send(self.client.post(self.url(&["screen"])?).json(&json!({ "text": text })), "POST /screen")
      .await?;
    if !resp.status().is_success() {
      return Err(failure("POST /screen", resp).await);
    }
    resp.json().await.context("deserialising screening report")
  }

  // ── Polls ─────────────────────────────────────────────────────────────────

  /// `GET /polls`
  pub async fn list_polls(&self) -> Result<Vec<Poll>> {
    let resp = self.send(self.client.get(self.url(&["polls"])?), "GET /polls").await?;
    if !resp.status().is_success() {
      return Err(failure("GET /polls", resp).await);
    }
    resp.json().await.context("deserialising polls")
  }

  /// `POST /polls/{id}/vote`
  pub async fn vote(&self, poll_id: Uuid, option: &str) -> Result<Poll> {
    let poll_id = poll_id.to_string();
    let url = self.url(&["polls", &poll_id, "vote"])?;
    let resp = self
      .send(self.client.post(url).json(&json!({ "option": option })), "POST /vote")
      .await?;
    if !resp.status().is_success() {
      return Err(failure("POST /vote", resp).await);
    }
    resp.json().await.context("deserialising poll")
  }

  // ── Admin ─────────────────────────────────────────────────────────────────

  /// `GET /admin/stats`
  pub async fn stats(&self) -> Result<ComplaintStats> {
    let resp = self
      .send(self.auth(self.client.get(self.url(&["admin", "stats"])?)), "GET /admin/stats")
      .await?;
    if !resp.status().is_success() {
      return Err(failure("GET /admin/stats", resp).await);
    }
    resp.json().await.context("deserialising stats")
  }
}

/// Turn a non-success response into an error carrying the server's message.
async fn failure(what: &str, resp: Response) -> anyhow::Error {
  let status = resp.status();
  match resp.json::<ErrorBody>().await {
    Ok(body) => anyhow!("{what} → {status}: {}", body.error),
    Err(_) => anyhow!("{what} → {status}"),
  }
}
