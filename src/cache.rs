// src/cache.rs
//! Time-bounded cache slot for the scraped Record Set.

use std::future::Future;
use std::time::{Duration, Instant};

/// Default freshness window for scraped data.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Cached<T> {
    value: T,
    stored_at: Instant,
}

/// Owns at most one value plus the moment it was stored.
#[derive(Debug)]
pub struct TtlCache<T> {
    slot: Option<Cached<T>>,
    ttl: Duration,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Time since the current value was stored.
    pub fn age(&self) -> Option<Duration> {
        self.slot.as_ref().map(|c| c.stored_at.elapsed())
    }

    pub fn is_fresh(&self) -> bool {
        self.age().is_some_and(|age| age < self.ttl)
    }

    /// Returns the fresh value or awaits `refresh` to replace it.
    /// A failed refresh leaves the slot empty; errors are never cached.
    pub async fn get_or_refresh<F, Fut, E>(&mut self, refresh: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cached = match self.slot.take() {
            Some(cached) if cached.stored_at.elapsed() < self.ttl => {
                tracing::debug!("Serving cached value ({:?} old)", cached.stored_at.elapsed());
                cached
            }
            _ => {
                tracing::debug!("Cache empty or stale, refreshing");
                let value = refresh().await?;
                Cached { value, stored_at: Instant::now() }
            }
        };
        Ok(&self.slot.insert(cached).value)
    }

    /// Drops the cached value so the next read refreshes.
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            tracing::info!("Cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fresh_value_is_served_without_refresh() {
        let counter = Cell::new(0);
        let calls = &counter;
        let mut cache = TtlCache::new(DEFAULT_TTL);

        tokio_test::block_on(async {
            for _ in 0..3 {
                let value = cache
                    .get_or_refresh(move || async move {
                        calls.set(calls.get() + 1);
                        Ok::<_, String>(42)
                    })
                    .await
                    .unwrap();
                assert_eq!(*value, 42);
            }
        });

        assert_eq!(calls.get(), 1);
        assert!(cache.is_fresh());
    }

    #[test]
    fn zero_ttl_always_refreshes() {
        let counter = Cell::new(0);
        let calls = &counter;
        let mut cache = TtlCache::new(Duration::ZERO);

        tokio_test::block_on(async {
            for i in 0..3 {
                let value = cache
                    .get_or_refresh(move || async move {
                        calls.set(calls.get() + 1);
                        Ok::<_, String>(i)
                    })
                    .await
                    .unwrap();
                assert_eq!(*value, i);
            }
        });

        assert_eq!(calls.get(), 3);
        assert!(!cache.is_fresh());
    }

    #[test]
    fn invalidate_forces_refresh() {
        let mut cache = TtlCache::new(DEFAULT_TTL);
        tokio_test::block_on(async {
            cache.get_or_refresh(|| async { Ok::<_, String>("old") }).await.unwrap();
            cache.invalidate();
            assert!(cache.age().is_none());
            let value = cache.get_or_refresh(|| async { Ok::<_, String>("new") }).await.unwrap();
            assert_eq!(*value, "new");
        });
    }

    #[test]
    fn failed_refresh_leaves_slot_empty() {
        let mut cache: TtlCache<u32> = TtlCache::new(Duration::ZERO);
        tokio_test::block_on(async {
            cache.get_or_refresh(|| async { Ok::<_, String>(1) }).await.unwrap();
            let err = cache
                .get_or_refresh(|| async { Err::<u32, _>("network down".to_string()) })
                .await
                .unwrap_err();
            assert_eq!(err, "network down");
        });
        assert!(cache.age().is_none());
    }
}
