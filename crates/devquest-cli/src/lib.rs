//! DevQuest CLI - terminal client for the DevQuest portfolio API
//!
//! Talks to the backend through the edge relay. Every API call degrades to
//! `None` on failure and the commands substitute offline placeholder data.

pub mod client;
pub mod commands;
pub mod error;
pub mod output;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, truncate_string};
