use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::CatalogSnapshot,
    services::catalog::CatalogStore,
};

/// Default snapshot time-to-live (30 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
/// Default timeout for one backing catalog fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one physical fetch as seen by every caller that waited on it
type RefreshOutcome = Result<Arc<CatalogSnapshot>, String>;

#[derive(Default)]
struct RefreshState {
    /// Set while a refresh task is running
    in_flight: Option<watch::Receiver<Option<RefreshOutcome>>>,
    /// Error from the most recent failed fetch
    last_error: Option<String>,
}

struct CacheInner {
    store: Arc<dyn CatalogStore>,
    snapshot: ArcSwapOption<CatalogSnapshot>,
    ttl: Duration,
    fetch_timeout: Duration,
    invalidated: AtomicBool,
    /// Number of completed fetch attempts, successful or not
    completed_fetches: AtomicU64,
    refresh: Mutex<RefreshState>,
}

/// TTL-bounded snapshot of the song catalog
///
/// Readers load the current snapshot through an atomic pointer and never see a
/// half-built one. When the snapshot is stale, the first caller spawns a
/// refresh task and everyone arriving while it runs waits on that same task.
/// The task belongs to the cache, not to a request, so a caller that goes away
/// mid-refresh neither aborts the fetch nor causes a second one.
///
/// A failed refresh keeps serving the previous snapshot. Only a cache that has
/// never loaded a snapshot reports [`AppError::CatalogUnavailable`].
pub struct CatalogCache {
    inner: Arc<CacheInner>,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn CatalogStore>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store,
                snapshot: ArcSwapOption::empty(),
                ttl,
                fetch_timeout,
                invalidated: AtomicBool::new(false),
                completed_fetches: AtomicU64::new(0),
                refresh: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Loads the first snapshot; the server should not accept traffic until this succeeds
    pub async fn warm(&self) -> AppResult<Arc<CatalogSnapshot>> {
        let snapshot = self.refresh().await?;
        tracing::info!(
            store = self.inner.store.name(),
            songs = snapshot.len(),
            chords = snapshot.chord_universe().len(),
            "Catalog cache warmed"
        );
        Ok(snapshot)
    }

    /// Returns a snapshot no older than the TTL, refreshing if needed
    pub async fn get(&self) -> AppResult<Arc<CatalogSnapshot>> {
        // Read the fetch counter before looking at the snapshot, so a refresh
        // that lands in between is recognised once we hold the lock
        let observed = self.inner.completed_fetches.load(Ordering::Acquire);

        if let Some(snapshot) = self.inner.fresh_snapshot() {
            return Ok(snapshot);
        }

        self.refresh_after(observed).await
    }

    /// Fetches a new snapshot now, joining a refresh that is already running
    pub async fn refresh(&self) -> AppResult<Arc<CatalogSnapshot>> {
        let observed = self.inner.completed_fetches.load(Ordering::Acquire);
        self.refresh_after(observed).await
    }

    /// Makes the next `get()` refresh even if the snapshot is within its TTL
    pub fn invalidate(&self) {
        self.inner.invalidated.store(true, Ordering::Release);
        tracing::info!("Catalog cache invalidated");
    }

    /// The held snapshot regardless of age, if one was ever loaded
    pub fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.inner.snapshot.load_full()
    }

    async fn refresh_after(&self, observed: u64) -> AppResult<Arc<CatalogSnapshot>> {
        let mut outcome_rx = {
            let mut state = self.inner.refresh.lock().await;

            // A closed sender means the task died without publishing
            let running = state
                .in_flight
                .as_ref()
                .filter(|rx| rx.has_changed().is_ok())
                .cloned();

            match running {
                Some(rx) => {
                    tracing::debug!("Joined in-flight catalog refresh");
                    rx
                }
                None if self.inner.completed_fetches.load(Ordering::Acquire) != observed => {
                    // A fetch finished after this caller found the snapshot stale
                    return self.inner.shared_outcome(&state);
                }
                None => {
                    let (tx, rx) = watch::channel(None);
                    state.in_flight = Some(rx.clone());
                    tokio::spawn(Arc::clone(&self.inner).run_refresh(tx));
                    rx
                }
            }
        };

        let outcome = outcome_rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|published| published.clone());

        match outcome {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(msg)) => Err(AppError::CatalogUnavailable(msg)),
            None => Err(AppError::Internal(
                "catalog refresh ended without a result".to_string(),
            )),
        }
    }
}

impl CacheInner {
    fn fresh_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        if self.invalidated.load(Ordering::Acquire) {
            return None;
        }
        self.snapshot
            .load_full()
            .filter(|snapshot| snapshot.age() < self.ttl)
    }

    fn shared_outcome(&self, state: &RefreshState) -> AppResult<Arc<CatalogSnapshot>> {
        match self.snapshot.load_full() {
            Some(snapshot) => Ok(snapshot),
            None => Err(AppError::CatalogUnavailable(
                state
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "catalog refresh failed".to_string()),
            )),
        }
    }

    /// Performs one physical fetch and publishes its outcome to every waiter
    async fn run_refresh(self: Arc<Self>, tx: watch::Sender<Option<RefreshOutcome>>) {
        let was_invalidated = self.invalidated.swap(false, Ordering::AcqRel);
        let fetched = self.fetch_snapshot().await;

        let mut state = self.refresh.lock().await;

        let outcome = match fetched {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot.store(Some(Arc::clone(&snapshot)));
                state.last_error = None;
                Ok(snapshot)
            }
            Err(e) => {
                if was_invalidated {
                    self.invalidated.store(true, Ordering::Release);
                }
                state.last_error = Some(e.to_string());

                match self.snapshot.load_full() {
                    Some(stale) => {
                        tracing::warn!(
                            error = %e,
                            store = self.store.name(),
                            stale_age_secs = stale.age().as_secs(),
                            "Catalog refresh failed, serving stale snapshot"
                        );
                        Ok(stale)
                    }
                    None => {
                        tracing::error!(
                            error = %e,
                            store = self.store.name(),
                            "Catalog refresh failed and no snapshot is cached"
                        );
                        Err(e.to_string())
                    }
                }
            }
        };

        self.completed_fetches.fetch_add(1, Ordering::AcqRel);
        state.in_flight = None;
        drop(state);

        // Every caller may have gone away; the snapshot is stored regardless
        tx.send_replace(Some(outcome));
    }

    async fn fetch_snapshot(&self) -> AppResult<CatalogSnapshot> {
        let start = Instant::now();

        let songs = tokio::time::timeout(self.fetch_timeout, self.store.fetch_catalog())
            .await
            .map_err(|_| {
                AppError::ExternalApi(format!(
                    "{} catalog fetch timed out after {:?}",
                    self.store.name(),
                    self.fetch_timeout
                ))
            })??;

        let snapshot = CatalogSnapshot::build(songs);

        tracing::info!(
            store = self.store.name(),
            songs = snapshot.len(),
            chords = snapshot.chord_universe().len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Catalog snapshot refreshed"
        );

        Ok(snapshot)
    }
}
