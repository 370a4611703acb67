//! Caller-supplied deadlines

use std::time::Duration;

use tokio::time::Instant;

/// Point in time after which a caller no longer wants an answer
///
/// `Deadline::none()` never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// Expire `budget` from now
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now().checked_add(budget))
    }

    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Time left, or `None` when unbounded
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// The smaller of `budget` and the time left
    #[must_use]
    pub fn cap(&self, budget: Duration) -> Duration {
        self.remaining().map_or(budget, |left| left.min(budget))
    }
}
