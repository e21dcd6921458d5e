use std::time::Duration;
use time::OffsetDateTime;

/// A cached payload together with the moment it was fetched and how long it
/// stays valid.
///
/// A snapshot is fresh iff `now - fetched_at < ttl`. A snapshot stamped in the
/// future (clock skew between runs) counts as fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub payload: T,
    pub fetched_at: OffsetDateTime,
    pub ttl: Duration,
}
impl<T> Snapshot<T> {
    pub fn new(payload: T, fetched_at: OffsetDateTime, ttl: Duration) -> Self {
        Self { payload, fetched_at, ttl }
    }

    /// How long ago the payload was fetched.
    pub fn age(&self, now: OffsetDateTime) -> time::Duration {
        now - self.fetched_at
    }

    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        // A TTL too large to represent never expires.
        let ttl = time::Duration::try_from(self.ttl).unwrap_or(time::Duration::MAX);
        self.age(now) < ttl
    }
}
