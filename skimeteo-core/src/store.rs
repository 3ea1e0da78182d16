//! Aggregation of per-resort lookups with a keyed, time-limited cache.
//!
//! A load for a key fetches every resort it names, turns individual failures
//! into [`WeatherOutcome::Failed`], and caches the resulting map. Within the
//! staleness window the cached map is served as is; afterwards the next load
//! for that key fetches again. Nothing refreshes in the background.
//!
//! The cache is written only once all lookups of a load have completed, so a
//! load that is cancelled or dropped midway leaves it untouched.
//!
//! Loads of the same key are serialized: while one is fetching, later callers
//! wait for it and then read its result from the cache. If the fetching load
//! is dropped, the next waiter fetches instead.

use std::{collections::HashMap, slice, sync::Arc, time::Duration};

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::{sync::Mutex as LoadLock, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Config,
    catalog::Resort,
    model::WeatherOutcome,
    provider::{WeatherProvider, provider_from_config},
};

/// Outcomes keyed by resort id.
pub type Outcomes = HashMap<String, WeatherOutcome>;

/// Identity of a cached load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The whole dashboard.
    AllResorts,
    /// A comparison, keyed by the ids in the order they were requested.
    Comparison(Vec<String>),
    /// A single resort's detail view.
    Resort(String),
}

impl QueryKey {
    pub fn comparison<S: AsRef<str>>(ids: &[S]) -> Self {
        Self::Comparison(ids.iter().map(|id| id.as_ref().to_string()).collect())
    }
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    outcomes: Outcomes,
}

#[derive(Debug)]
pub struct WeatherStore {
    provider: Box<dyn WeatherProvider>,
    stale_after: Duration,
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    in_flight: Mutex<HashMap<QueryKey, Arc<LoadLock<()>>>>,
}

impl WeatherStore {
    pub fn new(provider: Box<dyn WeatherProvider>, stale_after: Duration) -> Self {
        Self {
            provider,
            stale_after,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(provider_from_config(config)?, config.stale_window()))
    }

    /// Outcomes for `resorts`, from cache when fresh, otherwise by fetching each one.
    pub async fn load_all(&self, key: QueryKey, resorts: &[Resort]) -> Outcomes {
        if let Some(cached) = self.fresh(&key) {
            debug!(?key, "serving cached weather");
            return cached;
        }

        let lock = self.load_lock(&key);
        let _guard = lock.lock().await;
        if let Some(cached) = self.fresh(&key) {
            debug!(?key, "serving weather fetched by a concurrent load");
            return cached;
        }

        info!(?key, resorts = resorts.len(), "loading weather");
        let outcomes = self.fetch_all(resorts).await;

        self.entries
            .lock()
            .insert(key, CacheEntry { fetched_at: Instant::now(), outcomes: outcomes.clone() });

        outcomes
    }

    /// [`load_all`](Self::load_all), abandoned with `None` once `cancel` fires.
    pub async fn load_all_until(
        &self,
        key: QueryKey,
        resorts: &[Resort],
        cancel: &CancellationToken,
    ) -> Option<Outcomes> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("weather load cancelled");
                None
            }
            outcomes = self.load_all(key, resorts) => Some(outcomes),
        }
    }

    /// Outcome for a single resort, cached under [`QueryKey::Resort`].
    pub async fn load_one(&self, resort: &Resort) -> WeatherOutcome {
        let key = QueryKey::Resort(resort.id.to_string());
        let mut outcomes = self.load_all(key, slice::from_ref(resort)).await;
        outcomes.remove(resort.id).unwrap_or_default()
    }

    pub async fn load_one_until(&self, resort: &Resort, cancel: &CancellationToken) -> Option<WeatherOutcome> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            outcome = self.load_one(resort) => Some(outcome),
        }
    }

    /// Cached outcomes for `key` without fetching, stale or not.
    ///
    /// Resorts the cache knows nothing about are `Pending`.
    pub fn snapshot(&self, key: &QueryKey, resorts: &[Resort]) -> Outcomes {
        let entries = self.entries.lock();
        let cached = entries.get(key).map(|entry| &entry.outcomes);

        resorts
            .iter()
            .map(|resort| {
                let outcome = cached.and_then(|o| o.get(resort.id)).cloned().unwrap_or_default();
                (resort.id.to_string(), outcome)
            })
            .collect()
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.stale_after)
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn load_lock(&self, key: &QueryKey) -> Arc<LoadLock<()>> {
        self.in_flight.lock().entry(key.clone()).or_default().clone()
    }

    fn fresh(&self, key: &QueryKey) -> Option<Outcomes> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        (entry.fetched_at.elapsed() < self.stale_after).then(|| entry.outcomes.clone())
    }

    async fn fetch_all(&self, resorts: &[Resort]) -> Outcomes {
        let lookups = resorts.iter().map(|resort| async move {
            let outcome = match self.provider.fetch_weather(resort.latitude, resort.longitude).await {
                Ok(reading) => WeatherOutcome::Available(reading),
                Err(err) => {
                    warn!(resort = resort.id, error = %err, "weather lookup failed");
                    WeatherOutcome::Failed(err.to_string())
                }
            };
            (resort.id.to_string(), outcome)
        });

        join_all(lookups).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::WeatherError, model::WeatherReading};
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    const WINDOW: Duration = Duration::from_secs(10 * 60);

    /// Answers from the latitude: negative latitudes fail, everything else is
    /// a reading whose temperature is the longitude.
    #[derive(Debug)]
    struct ScriptedProvider {
        calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherReading, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if latitude < 0.0 {
                return Err(WeatherError::Network("connection reset".into()));
            }
            Ok(WeatherReading {
                temperature: longitude,
                windspeed: 10.0,
                winddirection: 180.0,
                weathercode: 0,
                is_daytime: true,
                observed_at: "2024-01-15T10:00".into(),
            })
        }
    }

    fn resort(id: &'static str, latitude: f64, longitude: f64) -> Resort {
        Resort { id, name: id, latitude, longitude, elevation: 1000, country: "Suisse", region: "Valais" }
    }

    fn store(delay: Option<Duration>) -> (WeatherStore, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = ScriptedProvider { calls: calls.clone(), delay };
        (WeatherStore::new(Box::new(provider), WINDOW), calls)
    }

    #[tokio::test]
    async fn failures_are_isolated_per_resort() {
        let (store, _) = store(None);
        let resorts = [resort("a", -1.0, 6.0), resort("b", 46.0, 7.5)];

        let outcomes = store.load_all(QueryKey::AllResorts, &resorts).await;

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(&outcomes["a"], WeatherOutcome::Failed(msg) if msg.contains("connection reset")));
        assert_eq!(outcomes["b"].reading().map(|r| r.temperature), Some(7.5));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_loads_within_window_hit_cache() {
        let (store, calls) = store(None);
        let resorts = [resort("a", 45.0, 6.0), resort("b", 46.0, 7.0)];

        let first = store.load_all(QueryKey::AllResorts, &resorts).await;
        tokio::time::advance(Duration::from_secs(9 * 60)).await;
        let second = store.load_all(QueryKey::AllResorts, &resorts).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(first, second);
        assert!(store.is_fresh(&QueryKey::AllResorts));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_refetches_once_per_resort() {
        let (store, calls) = store(None);
        let resorts = [resort("a", 45.0, 6.0), resort("b", 46.0, 7.0)];

        store.load_all(QueryKey::AllResorts, &resorts).await;
        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        assert!(!store.is_fresh(&QueryKey::AllResorts));

        store.load_all(QueryKey::AllResorts, &resorts).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        store.load_all(QueryKey::AllResorts, &resorts).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn keys_are_cached_independently() {
        let (store, calls) = store(None);
        let resorts = [resort("a", 45.0, 6.0), resort("b", 46.0, 7.0)];

        store.load_all(QueryKey::AllResorts, &resorts).await;
        store.load_all(QueryKey::comparison(&["b"]), &resorts[1..]).await;
        store.load_all(QueryKey::comparison(&["b"]), &resorts[1..]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn load_one_is_cached_by_resort_id() {
        let (store, calls) = store(None);
        let verbier = resort("verbier", 46.0952, 7.2262);

        let first = store.load_one(&verbier).await;
        let second = store.load_one(&verbier).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(store.is_fresh(&QueryKey::Resort("verbier".into())));
    }

    #[tokio::test]
    async fn load_one_failure_becomes_failed_outcome() {
        let (store, _) = store(None);
        let outcome = store.load_one(&resort("nowhere", -10.0, 0.0)).await;
        assert!(matches!(outcome, WeatherOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn snapshot_is_pending_before_first_load() {
        let (store, calls) = store(None);
        let resorts = [resort("a", 45.0, 6.0)];

        let before = store.snapshot(&QueryKey::AllResorts, &resorts);
        assert_eq!(before["a"], WeatherOutcome::Pending);

        store.load_all(QueryKey::AllResorts, &resorts).await;
        let after = store.snapshot(&QueryKey::AllResorts, &resorts);
        assert!(after["a"].is_available());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_load_writes_nothing() {
        let (store, calls) = store(Some(Duration::from_secs(30)));
        let resorts = [resort("a", 45.0, 6.0), resort("b", 46.0, 7.0)];
        let cancel = CancellationToken::new();

        let (result, ()) = tokio::join!(
            store.load_all_until(QueryKey::AllResorts, &resorts, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            }
        );

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!store.is_fresh(&QueryKey::AllResorts));
        let snapshot = store.snapshot(&QueryKey::AllResorts, &resorts);
        assert!(snapshot.values().all(|o| *o == WeatherOutcome::Pending));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_loads_of_one_key_share_lookups() {
        let (store, calls) = store(Some(Duration::from_secs(1)));
        let resorts = [resort("a", 45.0, 6.0)];

        let (first, second) = tokio::join!(
            store.load_all(QueryKey::AllResorts, &resorts),
            store.load_all(QueryKey::AllResorts, &resorts)
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_loads_of_different_keys_run_separately() {
        let (store, calls) = store(Some(Duration::from_secs(1)));
        let resorts = [resort("a", 45.0, 6.0)];

        tokio::join!(
            store.load_all(QueryKey::AllResorts, &resorts),
            store.load_all(QueryKey::comparison(&["a"]), &resorts)
        );

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_fetches_when_first_load_is_cancelled() {
        let (store, calls) = store(Some(Duration::from_secs(5)));
        let resorts = [resort("a", 45.0, 6.0)];
        let cancel = CancellationToken::new();

        let (cancelled, waited, ()) = tokio::join!(
            store.load_all_until(QueryKey::AllResorts, &resorts, &cancel),
            store.load_all(QueryKey::AllResorts, &resorts),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            }
        );

        assert!(cancelled.is_none());
        assert!(waited["a"].is_available());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_fresh(&QueryKey::AllResorts));
    }

    #[tokio::test(start_paused = true)]
    async fn uncancelled_load_completes() {
        let (store, _) = store(Some(Duration::from_secs(2)));
        let cancel = CancellationToken::new();

        let outcome = store.load_one_until(&resort("a", 45.0, 6.0), &cancel).await;
        assert!(outcome.is_some_and(|o| o.is_available()));
    }

    #[test]
    fn from_config_rejects_oversized_window() {
        let config = Config { stale_minutes: u64::MAX / 2, ..Config::default() };
        let err = WeatherStore::from_config(&config).unwrap_err();
        assert!(format!("{err:#}").contains("stale_minutes"));
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (store, calls) = store(None);
        let resorts = [resort("a", 45.0, 6.0)];

        store.load_all(QueryKey::AllResorts, &resorts).await;
        store.invalidate(&QueryKey::AllResorts);
        store.load_all(QueryKey::AllResorts, &resorts).await;
        store.clear();
        store.load_all(QueryKey::AllResorts, &resorts).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
