//! `acms`: command-line client for the anonymous complaint service.
//!
//! # Usage
//!
//! ```
//! acms submit --title "Broken heater" --description "Room 204" --category facility --priority high
//! acms track ACMS-2025-4821
//! acms screen "is this text acceptable?"
//! acms --user admin --password secret stats
//! ```

mod client;

use std::process::ExitCode;

use acms_core::{
  complaint::{Category, NewComplaint, Priority, PublicComplaint, Submitter},
  poll::Poll,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, SubmitOutcome, TrackOutcome};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "acms", about = "Submit and track anonymous complaints")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the ACMS server (default: http://localhost:8080).
  #[arg(long, env = "ACMS_URL")]
  url: Option<String>,

  /// Administrator username, for admin commands.
  #[arg(long, env = "ACMS_USER")]
  user: Option<String>,

  /// Administrator password (plaintext).
  #[arg(long, env = "ACMS_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// File a new complaint and print its tracking ID.
  Submit {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: String,
    /// academic, facility, staff or others
    #[arg(long, value_parser = parse_category, default_value = "others")]
    category:    Category,
    /// low, medium or high
    #[arg(long, value_parser = parse_priority, default_value = "medium")]
    priority:    Priority,
    #[arg(long)]
    location:    Option<String>,
    #[arg(long)]
    department:  Option<String>,
    /// Contact address for follow-up; omit to stay unreachable.
    #[arg(long)]
    email:       Option<String>,
    /// Display name; omit to submit anonymously.
    #[arg(long)]
    name:        Option<String>,
    /// Date by which you expect a resolution (YYYY-MM-DD).
    #[arg(long)]
    expected_by: Option<NaiveDate>,
  },
  /// Look up a complaint by tracking ID.
  Track { tracking_id: String },
  /// Check text against the server's blocklist without submitting it.
  Screen { text: String },
  /// List open and closed polls.
  Polls,
  /// Vote in a poll.
  Vote { poll_id: Uuid, option: String },
  /// Complaint counters by status (admin).
  Stats,
}

fn parse_category(s: &str) -> Result<Category, String> {
  match s.to_ascii_lowercase().as_str() {
    "academic" => Ok(Category::Academic),
    "facility" => Ok(Category::Facility),
    "staff" => Ok(Category::Staff),
    "others" | "other" => Ok(Category::Others),
    other => Err(format!("unknown category {other:?}")),
  }
}

fn parse_priority(s: &str) -> Result<Priority, String> {
  match s.to_ascii_lowercase().as_str() {
    "low" => Ok(Priority::Low),
    "medium" => Ok(Priority::Medium),
    "high" => Ok(Priority::High),
    other => Err(format!("unknown priority {other:?}")),
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Exit codes ────────────────────────────────────────────────────────────────

/// Exit codes for outcomes that are answers rather than failures. Failures
/// (unreachable service, server errors) exit with 1.
const EXIT_REJECTED: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<ExitCode> {
  match command {
    Command::Submit {
      title,
      description,
      category,
      priority,
      location,
      department,
      email,
      name,
      expected_by,
    } => {
      let mut complaint = NewComplaint::new(title, description, category, priority);
      complaint.location = location;
      complaint.department = department;
      complaint.contact_email = email;
      complaint.expected_resolution = expected_by;
      complaint.submitter = match name {
        Some(display_name) => Submitter::Named { display_name },
        None => Submitter::Anonymous,
      };

      match client.submit_complaint(&complaint).await? {
        SubmitOutcome::Accepted(receipt) => {
          println!("Complaint received.");
          println!("Tracking ID: {}", receipt.tracking_id);
          println!("Received at: {}", receipt.created_at.format("%Y-%m-%d %H:%M UTC"));
          println!("Keep this ID; it is the only way to check on your complaint.");
          Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Rejected { matched_terms } => {
          eprintln!(
            "Complaint not submitted: please remove disallowed language ({}).",
            matched_terms.join(", ")
          );
          Ok(ExitCode::from(EXIT_REJECTED))
        }
      }
    }

    Command::Track { tracking_id } => match client.track(&tracking_id).await? {
      TrackOutcome::Found(complaint) => {
        print!("{}", render_complaint(&complaint));
        Ok(ExitCode::SUCCESS)
      }
      TrackOutcome::NotFound => {
        println!("No complaint found for tracking ID {tracking_id}");
        Ok(ExitCode::from(EXIT_NOT_FOUND))
      }
    },

    Command::Screen { text } => {
      let report = client.screen(&text).await?;
      if report.is_clean() {
        println!("No disallowed terms found.");
      } else {
        println!("Disallowed terms: {}", report.matched_terms.join(", "));
        println!("Masked: {}", report.masked);
      }
      Ok(ExitCode::SUCCESS)
    }

    Command::Polls => {
      let polls = client.list_polls().await?;
      if polls.is_empty() {
        println!("No polls.");
      }
      for poll in &polls {
        print!("{}", render_poll(poll));
      }
      Ok(ExitCode::SUCCESS)
    }

    Command::Vote { poll_id, option } => {
      let poll = client.vote(poll_id, &option).await?;
      print!("{}", render_poll(&poll));
      Ok(ExitCode::SUCCESS)
    }

    Command::Stats => {
      let stats = client.stats().await?;
      println!("total:       {}", stats.total);
      println!("pending:     {}", stats.pending);
      println!("in progress: {}", stats.in_progress);
      println!("resolved:    {}", stats.resolved);
      println!("closed:      {}", stats.closed);
      Ok(ExitCode::SUCCESS)
    }
  }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn render_complaint(c: &PublicComplaint) -> String {
  let mut out = String::new();
  out.push_str(&format!("Tracking ID: {}\n", c.tracking_id));
  out.push_str(&format!("Title:       {}\n", c.title));
  out.push_str(&format!("Category:    {}\n", c.category.as_str()));
  out.push_str(&format!("Priority:    {}\n", c.priority.as_str()));
  out.push_str(&format!("Status:      {}\n", c.status.as_str()));
  if let Some(location) = &c.location {
    out.push_str(&format!("Location:    {location}\n"));
  }
  out.push_str(&format!("Submitted:   {}\n", c.created_at.format("%Y-%m-%d %H:%M UTC")));
  out.push_str(&format!("Updated:     {}\n", c.updated_at.format("%Y-%m-%d %H:%M UTC")));
  if let Some(notes) = &c.resolution_notes {
    out.push_str(&format!("Resolution:  {notes}\n"));
  }
  out
}

fn render_poll(p: &Poll) -> String {
  let state = if p.is_open(chrono::Utc::now()) { "open" } else { "closed" };
  let mut out = format!("{} [{}] ({state}, {} votes)\n", p.title, p.poll_id, p.total_votes);
  for option in &p.options {
    out.push_str(&format!("  {:<20} {}\n", option.label, option.votes));
  }
  out
}
