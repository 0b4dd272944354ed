//! Expiry Sweeper Task
//!
//! Background task that periodically sweeps expired entries out of both
//! cache tiers. Lazy expiry on read already hides stale entries; the sweep
//! only reclaims space.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Sweep interval used when none is configured (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Owns at most one running sweep loop.
///
/// Starting an already running sweeper is a no-op. Stopping, or dropping the
/// sweeper, aborts the loop and releases its handle.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheManager::new("portal_", store));
/// let sweeper = Sweeper::new(DEFAULT_SWEEP_INTERVAL);
/// sweeper.start(cache.clone());
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
#[derive(Debug)]
pub struct Sweeper {
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Start ==
    /// Spawns the sweep loop on the current tokio runtime.
    ///
    /// Returns `false` without spawning if a loop is already running.
    pub fn start<T>(&self, cache: Arc<CacheManager<T>>) -> bool
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("expiry sweeper already running");
            return false;
        }

        let interval = self.interval;
        *handle = Some(tokio::spawn(async move {
            info!(
                "Starting expiry sweeper with interval of {} seconds",
                interval.as_secs()
            );

            loop {
                tokio::time::sleep(interval).await;

                let outcome = cache.clear_expired();
                if outcome.total() > 0 {
                    info!(
                        "Expiry sweep: removed {} memory and {} persistent entries",
                        outcome.memory, outcome.persistent
                    );
                } else {
                    debug!("Expiry sweep: no expired entries found");
                }
            }
        }));
        true
    }

    // == Stop ==
    /// Aborts the sweep loop. Returns `false` if none was running.
    pub fn stop(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                handle.abort();
                info!("Expiry sweeper stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, Ttl};
    use crate::storage::InMemoryKvStore;
    use serde_json::{json, Value};

    fn cache(clock: &ManualClock) -> Arc<CacheManager<Value>> {
        Arc::new(
            CacheManager::new("portal_", Arc::new(InMemoryKvStore::new()))
                .with_clock(Arc::new(clock.clone())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let clock = ManualClock::new(0);
        let cache = cache(&clock);
        cache
            .set("blog", "expire_soon", json!(1), &(), Duration::from_secs(1))
            .unwrap();

        let sweeper = Sweeper::new(DEFAULT_SWEEP_INTERVAL);
        assert!(sweeper.start(cache.clone()));

        clock.advance(Duration::from_secs(2));
        tokio::time::sleep(DEFAULT_SWEEP_INTERVAL + Duration::from_secs(1)).await;

        let stats = cache.get_stats();
        assert_eq!(stats.memory.entries, 0, "Expired entry should have been swept");
        assert_eq!(stats.persistent.entries, 0);

        sweeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_preserves_valid_entries() {
        let clock = ManualClock::new(0);
        let cache = cache(&clock);
        cache
            .set("doctors", "long_lived", json!("value"), &(), Ttl::LONG)
            .unwrap();

        let sweeper = Sweeper::new(Duration::from_secs(1));
        sweeper.start(cache.clone());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            cache.get("doctors", "long_lived", &()).unwrap(),
            Some(json!("value")),
            "Valid entry should not be removed"
        );
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let clock = ManualClock::new(0);
        let cache = cache(&clock);
        let sweeper = Sweeper::new(Duration::from_secs(60));

        assert!(sweeper.start(cache.clone()));
        assert!(!sweeper.start(cache.clone()));
        assert!(sweeper.is_running());

        assert!(sweeper.stop());
    }

    #[tokio::test]
    async fn test_stop_releases_handle_and_allows_restart() {
        let clock = ManualClock::new(0);
        let cache = cache(&clock);
        let sweeper = Sweeper::new(Duration::from_secs(60));

        assert!(!sweeper.stop(), "nothing to stop yet");
        sweeper.start(cache.clone());
        assert!(sweeper.stop());
        assert!(!sweeper.is_running());
        assert!(!sweeper.stop());

        assert!(sweeper.start(cache));
        assert!(sweeper.is_running());
    }

    #[tokio::test]
    async fn test_drop_aborts_loop() {
        let clock = ManualClock::new(0);
        let cache = cache(&clock);
        {
            let sweeper = Sweeper::new(Duration::from_secs(60));
            sweeper.start(cache.clone());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The aborted task dropped its clone of the manager.
        assert_eq!(Arc::strong_count(&cache), 1);
    }
}
