//! Flat-file ledgers: AI usage counters and answer feedback.

pub mod feedback;
pub mod usage;

pub use feedback::{FeedbackEntry, FeedbackLog, FeedbackStatus};
pub use usage::{estimate_tokens, UsageLedger, UsageStats};
