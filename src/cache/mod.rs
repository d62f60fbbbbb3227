mod refresh;

pub use refresh::{refresh_once, select_upcoming, spawn_refresh_loop};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ics::Event;

/// Complete cache state. Snapshots are immutable once published; every
/// mutation builds a new one and swaps it in, so readers never observe a
/// half-updated state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Upcoming events, ascending by start time, at most the configured max
    pub events: Vec<Event>,
    /// Time of the last successful refresh
    pub fetched_at: Option<DateTime<Utc>>,
    /// Time of the most recent refresh attempt, successful or not
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Message from the last failed attempt, cleared on success
    pub error: Option<String>,
}

impl Snapshot {
    /// True whenever the most recent attempt failed, regardless of whether
    /// older data is still being served.
    pub fn stale(&self) -> bool {
        self.error.is_some()
    }
}

/// Shared handle to the cache. The refresh loop is the single writer;
/// request handlers only ever read.
#[derive(Clone, Default)]
pub struct CacheHandle {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl CacheHandle {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.inner.read().await)
    }

    /// Record that a refresh cycle has started
    pub async fn record_attempt(&self, at: DateTime<Utc>) {
        let mut guard = self.inner.write().await;
        let mut next = (**guard).clone();
        next.last_attempt_at = Some(at);
        *guard = Arc::new(next);
    }

    /// Publish a successful refresh, clearing any previous error
    pub async fn store_success(&self, events: Vec<Event>, fetched_at: DateTime<Utc>) {
        let mut guard = self.inner.write().await;
        let mut next = (**guard).clone();
        next.events = events;
        next.fetched_at = Some(fetched_at);
        next.error = None;
        *guard = Arc::new(next);
    }

    /// Record a failed refresh. The last good events and fetch time are
    /// kept and served until a later cycle succeeds.
    pub async fn store_failure(&self, message: String) {
        let mut guard = self.inner.write().await;
        let mut next = (**guard).clone();
        next.error = Some(message);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event(id: &str, date: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {}", id),
            description: String::new(),
            date,
            all_day: false,
        }
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let cache = CacheHandle::new();
        let snapshot = cache.snapshot().await;
        assert!(snapshot.events.is_empty());
        assert!(snapshot.fetched_at.is_none());
        assert!(snapshot.last_attempt_at.is_none());
        assert!(!snapshot.stale());
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_events() {
        let cache = CacheHandle::new();
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        cache.record_attempt(when).await;
        cache.store_success(vec![event("a", when)], when).await;

        let later = when + chrono::Duration::seconds(10);
        cache.record_attempt(later).await;
        cache.store_failure("upstream went away".to_string()).await;

        let snapshot = cache.snapshot().await;
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.fetched_at, Some(when));
        assert_eq!(snapshot.last_attempt_at, Some(later));
        assert!(snapshot.stale());
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let cache = CacheHandle::new();
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        cache.store_failure("boom".to_string()).await;
        cache.store_success(vec![], when).await;

        let snapshot = cache.snapshot().await;
        assert!(!snapshot.stale());
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.fetched_at, Some(when));
    }

    #[tokio::test]
    async fn test_old_snapshots_stay_consistent_after_swap() {
        let cache = CacheHandle::new();
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        cache.store_success(vec![event("a", when)], when).await;
        let held = cache.snapshot().await;

        cache.store_success(vec![event("b", when), event("c", when)], when).await;

        // A reader holding the old snapshot still sees the old state
        assert_eq!(held.events.len(), 1);
        assert_eq!(cache.snapshot().await.events.len(), 2);
    }
}
