//! Unlock state for one interactive user.
//!
//! A [`Session`] holds the key derived at unlock time and the last-activity
//! instant. Auto-lock is a wall-clock comparison made by
//! [`Session::check_expiry`] on each interaction; nothing runs in the
//! background.

use std::time::{Duration, Instant};

use crate::crypto::NoteCipher;

pub const UNLOCKED_HEADING: &str = "🛡️ Safe Vault";
pub const LOCKED_HEADING: &str = "📝 My Notes";

#[derive(Debug)]
pub struct Session {
    cipher: Option<NoteCipher>,
    last_activity: Instant,
    auto_lock: Duration,
}

impl Session {
    pub fn new(auto_lock: Duration) -> Self {
        Self {
            cipher: None,
            last_activity: Instant::now(),
            auto_lock,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.cipher.is_some()
    }

    /// Key for secret notes, present only while unlocked.
    pub fn cipher(&self) -> Option<&NoteCipher> {
        self.cipher.as_ref()
    }

    pub fn unlock(&mut self, cipher: NoteCipher, now: Instant) {
        self.cipher = Some(cipher);
        self.last_activity = now;
    }

    pub fn lock(&mut self) {
        self.cipher = None;
    }

    /// Record user activity, pushing the auto-lock deadline out.
    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Lock if the session has been idle longer than the auto-lock window.
    /// Returns true when this call locked it.
    pub fn check_expiry(&mut self, now: Instant) -> bool {
        if self.is_unlocked() && now.saturating_duration_since(self.last_activity) > self.auto_lock {
            tracing::info!(idle_secs = self.auto_lock.as_secs(), "session auto-locked");
            self.lock();
            return true;
        }
        false
    }

    /// Whole seconds left before auto-lock, zero once overdue.
    pub fn seconds_until_lock(&self, now: Instant) -> u64 {
        self.auto_lock
            .saturating_sub(now.saturating_duration_since(self.last_activity))
            .as_secs()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_unlocked() {
            UNLOCKED_HEADING
        } else {
            LOCKED_HEADING
        }
    }
}
