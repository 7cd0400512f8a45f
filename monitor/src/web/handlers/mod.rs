//! HTTP request handlers for the status API.
//!
//! - `common` - Response envelope shared by every handler
//! - `monitors` - Service and per-monitor status
//! - `notifications` - Notification channel check

pub mod common;
pub mod monitors;
pub mod notifications;

pub use monitors::*;
pub use notifications::*;
