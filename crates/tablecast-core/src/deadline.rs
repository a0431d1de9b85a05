//! Publish-cycle deadline, propagated to every network call.

use std::time::{Duration, Instant};

/// A wall-clock deadline for one publish cycle.
///
/// Copied freely into every fetch and store; each network operation
/// derives its request timeout from the remaining budget, so expiry
/// aborts in-flight work promptly instead of waiting for natural
/// completion.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    /// Time left before expiry, or `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.checked_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_none()
    }
}
