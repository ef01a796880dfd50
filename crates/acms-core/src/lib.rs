//! Core types and trait definitions for ACMS, the anonymous complaint
//! management system.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the two pieces of independent logic (text screening and tracking
//! identifiers) plus the domain model and the [`store::ComplaintStore`]
//! contract that persistence backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod complaint;
pub mod error;
pub mod poll;
pub mod screening;
pub mod store;
pub mod tracking;

pub use error::{Error, Result};
