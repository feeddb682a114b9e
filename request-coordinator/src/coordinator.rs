use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use autos_async_utils::Clock;
use autos_async_utils::TokioClock;
use autos_async_utils::backoff_delay;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use lru::LruCache;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::RequestConfig;
use crate::error::RequestError;
use crate::record::RequestRecord;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

type Erased = Arc<dyn Any + Send + Sync>;
type Outcome = Result<Erased, RequestError>;
type SharedOutcome = Shared<BoxFuture<'static, Outcome>>;

/// Keyed async-call manager: deduplication, TTL caching, retry with
/// exponential backoff, and per-key/global loading state.
///
/// Knows nothing about what it fetches; values are stored type-erased and
/// recovered by the caller's `T`.
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    state: Mutex<CoordinatorState>,
    global_loading: watch::Sender<bool>,
}

struct CoordinatorState {
    cache: LruCache<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
    /// Running executions per key; more than one only when dedup is off.
    active: HashMap<String, usize>,
    records: HashMap<String, watch::Sender<RequestRecord>>,
    loading_keys: usize,
    /// Bumped by `cancel_all`; executions from an older epoch leave no trace.
    epoch: u64,
    next_execution_id: u64,
}

struct InFlight {
    execution_id: u64,
    outcome: SharedOutcome,
}

struct CacheEntry {
    value: Erased,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        ttl.is_zero() || now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Identifies one execution so completion can tell whether it still owns the
/// bookkeeping it started.
#[derive(Debug, Clone, Copy)]
struct ExecutionTicket {
    id: u64,
    epoch: u64,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(TokioClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_clock_and_capacity(clock, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_clock_and_capacity(clock: Arc<dyn Clock>, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let (global_loading, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                clock,
                state: Mutex::new(CoordinatorState {
                    cache: LruCache::new(capacity),
                    in_flight: HashMap::new(),
                    active: HashMap::new(),
                    records: HashMap::new(),
                    loading_keys: 0,
                    epoch: 0,
                    next_execution_id: 0,
                }),
                global_loading,
            }),
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    /// Run `produce` under `key`.
    ///
    /// In priority order: a fresh cache entry is returned without touching
    /// loading state; an in-flight execution for the same key is joined when
    /// `deduplicate` is set; otherwise a new execution starts, retrying
    /// failures with exponential backoff until `retry_attempts` is exhausted.
    ///
    /// The execution runs on its own task, so dropping the returned future
    /// does not abandon the bookkeeping or other attached callers.
    pub async fn execute<T, F, Fut>(
        &self,
        key: impl Into<String>,
        produce: F,
        config: RequestConfig,
    ) -> Result<T, RequestError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let key = key.into();
        let outcome = {
            let mut state = self.inner.lock();
            let now = self.inner.clock.now();

            if config.caches()
                && let Some(value) = state.cached(&key, now, config.cache_time())
            {
                debug!(key = %key, "request served from cache");
                return downcast(&key, value);
            }

            let attached = if config.deduplicate {
                state
                    .in_flight
                    .get(&key)
                    .map(|in_flight| in_flight.outcome.clone())
            } else {
                None
            };

            match attached {
                Some(outcome) => {
                    debug!(key = %key, "attaching to in-flight request");
                    outcome
                }
                None => {
                    let ticket = state.begin(&key);
                    let outcome = self.spawn_execution(key.clone(), ticket, produce, config);
                    if config.deduplicate {
                        state.in_flight.insert(
                            key.clone(),
                            InFlight {
                                execution_id: ticket.id,
                                outcome: outcome.clone(),
                            },
                        );
                    }
                    self.inner.publish_global(&state);
                    outcome
                }
            }
        };

        let value = outcome.await?;
        downcast(&key, value)
    }

    fn spawn_execution<T, F, Fut>(
        &self,
        key: String,
        ticket: ExecutionTicket,
        produce: F,
        config: RequestConfig,
    ) -> SharedOutcome
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = run_with_retry(inner.clock.as_ref(), &task_key, produce, config)
                .await
                .map(|value| Arc::new(value) as Erased);
            inner.complete(&task_key, ticket, config, result)
        }
        .in_current_span());

        let inner = Arc::clone(&self.inner);
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(key = %key, error = %err, "request task aborted");
                    let aborted = Err(RequestError::Aborted { key: key.clone() });
                    inner.complete(&key, ticket, config, aborted)
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Live view of one key's loading/error state.
    pub fn get_loading_state(&self, key: &str) -> watch::Receiver<RequestRecord> {
        let mut state = self.inner.lock();
        state.record_sender(key).subscribe()
    }

    /// Snapshot of one key's state, if the key has ever been seen.
    pub fn record(&self, key: &str) -> Option<RequestRecord> {
        let state = self.inner.lock();
        state.records.get(key).map(|sender| sender.borrow().clone())
    }

    /// `true` while any key is loading.
    pub fn get_global_loading(&self) -> watch::Receiver<bool> {
        self.inner.global_loading.subscribe()
    }

    pub fn is_any_loading(&self) -> bool {
        self.inner.lock().loading_keys > 0
    }

    pub fn loading_count(&self) -> usize {
        self.inner.lock().loading_keys
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    pub fn cache_len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Drop one cached value, or all of them. In-flight executions are not
    /// affected and will still cache their result when they finish.
    pub fn clear_cache(&self, key: Option<&str>) {
        let mut state = self.inner.lock();
        match key {
            Some(key) => {
                state.cache.pop(key);
                debug!(key = %key, "cache entry cleared");
            }
            None => {
                state.cache.clear();
                info!("request cache cleared");
            }
        }
    }

    /// Reset all loading bookkeeping immediately.
    ///
    /// Outstanding executions keep running, but their completion no longer
    /// touches loading state or the cache; callers awaiting them still
    /// receive the outcome and must decide for themselves whether it is
    /// stale.
    pub fn cancel_all(&self) {
        let mut state = self.inner.lock();
        state.epoch += 1;
        let cancelled = state.in_flight.len();
        state.in_flight.clear();
        state.active.clear();
        state.loading_keys = 0;
        for sender in state.records.values() {
            sender.send_if_modified(|record| {
                if !record.loading {
                    return false;
                }
                record.loading = false;
                record.error = None;
                true
            });
        }
        self.inner.publish_global(&state);
        info!(cancelled, "cancelled all in-flight requests");
    }
}

impl Default for RequestCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn publish_global(&self, state: &CoordinatorState) {
        let loading = state.loading_keys > 0;
        self.global_loading.send_if_modified(|current| {
            if *current == loading {
                return false;
            }
            *current = loading;
            true
        });
    }

    fn complete(
        &self,
        key: &str,
        ticket: ExecutionTicket,
        config: RequestConfig,
        outcome: Outcome,
    ) -> Outcome {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.epoch != ticket.epoch {
            debug!(key = %key, "execution finished after cancel_all; bookkeeping skipped");
            return outcome;
        }

        if state
            .in_flight
            .get(key)
            .is_some_and(|in_flight| in_flight.execution_id == ticket.id)
        {
            state.in_flight.remove(key);
        }

        let now = self.clock.now();
        if let (true, Ok(value)) = (config.caches(), &outcome) {
            state.cache.put(
                key.to_string(),
                CacheEntry {
                    value: Arc::clone(value),
                    stored_at: now,
                },
            );
        }

        let running = state.active.get(key).copied().unwrap_or(0);
        let still_running = running > 1;
        if still_running {
            state.active.insert(key.to_string(), running - 1);
        } else if running == 1 {
            state.active.remove(key);
            state.loading_keys = state.loading_keys.saturating_sub(1);
        }

        let error = outcome.as_ref().err().cloned();
        let mut record = RequestRecord::finished(error, now);
        record.loading = still_running;
        state.record_sender(key).send_replace(record);
        self.publish_global(state);
        outcome
    }
}

impl CoordinatorState {
    fn cached(&mut self, key: &str, now: Instant, ttl: Duration) -> Option<Erased> {
        let fresh = self.cache.get(key).map(|entry| entry.is_fresh(now, ttl))?;
        if fresh {
            return self.cache.get(key).map(|entry| Arc::clone(&entry.value));
        }
        debug!(key = %key, "cache entry expired");
        self.cache.pop(key);
        None
    }

    fn begin(&mut self, key: &str) -> ExecutionTicket {
        self.next_execution_id += 1;
        let ticket = ExecutionTicket {
            id: self.next_execution_id,
            epoch: self.epoch,
        };

        let running = self.active.entry(key.to_string()).or_insert(0);
        *running += 1;
        if *running == 1 {
            self.loading_keys += 1;
        }

        let sender = self.record_sender(key);
        let started = RequestRecord::started(&sender.borrow());
        sender.send_replace(started);
        debug!(key = %key, execution = ticket.id, "request started");
        ticket
    }

    fn record_sender(&mut self, key: &str) -> &watch::Sender<RequestRecord> {
        self.records
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(RequestRecord::default()).0)
    }
}

async fn run_with_retry<T, F, Fut>(
    clock: &dyn Clock,
    key: &str,
    mut produce: F,
    config: RequestConfig,
) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match produce().await {
            Ok(value) => {
                if attempts > 1 {
                    info!(key = %key, attempts, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempts > config.retry_attempts => {
                warn!(key = %key, attempts, error = %format!("{err:#}"), "request failed");
                return Err(RequestError::Failed {
                    key: key.to_string(),
                    attempts,
                    message: format!("{err:#}"),
                });
            }
            Err(err) => {
                let delay = backoff_delay(config.retry_delay(), attempts - 1);
                debug!(
                    key = %key,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "request attempt failed; retrying"
                );
                clock.sleep(delay).await;
            }
        }
    }
}

fn downcast<T>(key: &str, value: Erased) -> Result<T, RequestError>
where
    T: Clone + Send + Sync + 'static,
{
    value
        .downcast::<T>()
        .map(|value| T::clone(&value))
        .map_err(|_| RequestError::TypeMismatch {
            key: key.to_string(),
        })
}
