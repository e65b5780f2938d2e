//! Update Timestamp - PocketBase record touch
//!
//! Authenticates against a PocketBase backend and sets one record's
//! `lastUpdate` field to the current time. Meant to run once per CI job.
//!
//! A token in `PB_TOKEN` is used as-is; otherwise `PB_EMAIL` and
//! `PB_PASSWORD` are exchanged for one at the superuser login endpoint.

pub mod client;
pub mod config;
pub mod error;
pub mod workflow;

pub use client::PocketBaseClient;
pub use error::{ActionError, Result};
pub use workflow::{escape_command_data, failure_message, RawInputs, UpdateWorkflow};
