//! DevQuest Edge - same-origin relay for the DevQuest portfolio API
//!
//! The portfolio SPA and its backend are deployed to different origins. This
//! crate serves `/api/*` next to the SPA and relays each request, unchanged,
//! to one configured backend origin.

pub mod config;
pub mod error;
pub mod proxy;

pub use error::EdgeError;
