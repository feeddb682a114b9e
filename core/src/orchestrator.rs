use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use autos_protocol::AppState;
use autos_protocol::DomainFilters;
use autos_protocol::VehicleResult;
use autos_request_coordinator::RequestCoordinator;
use autos_request_coordinator::RequestKey;
use autos_request_coordinator::request_key;
use autos_url_codec::ParamMap;
use autos_url_codec::UrlCodec;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::backend::SearchBackend;
use crate::config::DashboardConfig;
use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::location::Location;
use crate::patch::FilterPatch;
use crate::store::FilterStore;

/// Keeps the filter state, the page URL and the search results in step.
///
/// User edits go through [`update_filters`](Self::update_filters) and are
/// written to the URL. Navigation goes through [`hydrate`](Self::hydrate) (or
/// the task from [`spawn_location_watcher`](Self::spawn_location_watcher)) and
/// is never written back, so URL changes and state changes cannot re-trigger
/// each other.
///
/// Every fetch is stamped with a generation number. A response is applied
/// only if no newer fetch, reset or cancel happened in the meantime.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    codec: UrlCodec,
    fetch: FetchConfig,
    store: FilterStore,
    coordinator: Arc<RequestCoordinator>,
    location: Arc<dyn Location>,
    backend: Arc<dyn SearchBackend>,
    generation: AtomicU64,
}

impl SyncOrchestrator {
    pub fn new(
        config: DashboardConfig,
        location: Arc<dyn Location>,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<Self, ConfigError> {
        Self::with_coordinator(
            config,
            Arc::new(RequestCoordinator::new()),
            location,
            backend,
        )
    }

    /// Share a coordinator (and its cache) with other parts of the app.
    pub fn with_coordinator(
        config: DashboardConfig,
        coordinator: Arc<RequestCoordinator>,
        location: Arc<dyn Location>,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let DashboardConfig { codec, fetch } = config;
        let codec = UrlCodec::new(codec)?;
        let store = FilterStore::new(codec.defaults());
        Ok(Self {
            inner: Arc::new(Inner {
                codec,
                fetch,
                store,
                coordinator,
                location,
                backend,
                generation: AtomicU64::new(0),
            }),
        })
    }

    pub fn codec(&self) -> &UrlCodec {
        &self.inner.codec
    }

    pub fn store(&self) -> &FilterStore {
        &self.inner.store
    }

    pub fn coordinator(&self) -> &Arc<RequestCoordinator> {
        &self.inner.coordinator
    }

    pub fn get_current_filters(&self) -> DomainFilters {
        self.inner.store.filters()
    }

    pub fn state(&self) -> AppState {
        self.inner.store.snapshot()
    }

    pub fn filters(&self) -> watch::Receiver<DomainFilters> {
        self.inner.store.subscribe_filters()
    }

    pub fn results(&self) -> watch::Receiver<Vec<VehicleResult>> {
        self.inner.store.subscribe_results()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.store.subscribe_loading()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.inner.store.subscribe_error()
    }

    pub fn total(&self) -> watch::Receiver<u64> {
        self.inner.store.subscribe_total()
    }

    /// Apply a user edit.
    ///
    /// Invalid patches are reported through the error stream and change
    /// nothing else. Valid ones are written to the URL, then either fetched
    /// (when any filter is active) or answered locally with empty results.
    pub fn update_filters(&self, patch: FilterPatch) {
        if let Err(err) = patch.validate(self.inner.codec.config()) {
            warn!(error = %err, "filter update rejected");
            self.inner.store.apply_error(err.to_string());
            return;
        }
        let filters = self.inner.store.apply_patch(patch);
        self.inner.write_url(&filters);
        self.sync_results(filters);
    }

    /// Back to default filters with nothing loaded; any pending response is
    /// dropped.
    pub fn reset_filters(&self) {
        let generation = self.inner.next_generation();
        debug!(generation, "filters reset");
        let filters = self.inner.store.reset();
        self.inner.write_url(&filters);
    }

    /// Forget the cached response for the current query and fetch it again.
    pub fn refresh_data(&self) {
        let filters = self.inner.store.filters();
        if !filters.has_active_filters() {
            debug!("refresh skipped; no active filters");
            return;
        }
        match self.inner.request_key(&filters) {
            Ok(key) => self.inner.coordinator.clear_cache(Some(key.as_str())),
            Err(err) => warn!(error = %err, "could not derive request key for refresh"),
        }
        self.request_fetch(filters);
    }

    /// Read the current URL and adopt it if it differs from the held filters.
    ///
    /// Returns whether anything changed. The URL is not written.
    pub fn hydrate(&self) -> bool {
        let params = self.inner.location.current_params();
        self.hydrate_from(&params)
    }

    fn hydrate_from(&self, params: &ParamMap) -> bool {
        let parsed = self.inner.codec.parse(params);
        if !self.inner.store.replace_filters(parsed.clone()) {
            debug!("URL matches current filters; nothing to hydrate");
            return false;
        }
        info!(active = parsed.has_active_filters(), "filters hydrated from URL");
        self.sync_results(parsed);
        true
    }

    /// Hydrate on every navigation notification until the orchestrator is
    /// dropped or the handle is aborted.
    pub fn spawn_location_watcher(&self) -> JoinHandle<()> {
        let mut navigation = self.inner.location.subscribe();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while navigation.changed().await.is_ok() {
                let params = navigation.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                SyncOrchestrator { inner }.hydrate_from(&params);
            }
            debug!("location watcher stopped");
        })
    }

    /// Drop every outstanding request and its eventual response.
    pub fn cancel_all(&self) {
        let generation = self.inner.next_generation();
        self.inner.coordinator.cancel_all();
        self.inner.store.set_loading(false);
        info!(generation, "all pending fetches cancelled");
    }

    pub fn dismiss_error(&self) {
        self.inner.store.dismiss_error();
    }

    /// Resolves once no fetch is pending.
    pub async fn wait_idle(&self) {
        let mut loading = self.inner.store.subscribe_loading();
        loading.wait_for(|loading| !*loading).await.ok();
    }

    fn sync_results(&self, filters: DomainFilters) {
        if filters.has_active_filters() {
            self.request_fetch(filters);
        } else {
            let generation = self.inner.next_generation();
            debug!(generation, "no active filters; results cleared");
            self.inner.store.clear_results();
        }
    }

    fn request_fetch(&self, filters: DomainFilters) {
        let generation = self.inner.next_generation();
        debug!(generation, page = filters.page, "fetch requested");
        self.inner.store.set_loading(true);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(
            async move { inner.run_fetch(generation, filters).await }.in_current_span(),
        );
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn request_key(&self, filters: &DomainFilters) -> Result<RequestKey, serde_json::Error> {
        request_key(&self.fetch.endpoint, filters)
    }

    fn write_url(&self, filters: &DomainFilters) {
        let params = self.codec.serialize(filters);
        if params == self.location.current_params() {
            return;
        }
        self.location.set_params(params, false);
    }

    async fn run_fetch(&self, generation: u64, filters: DomainFilters) {
        let debounce = self.fetch.debounce();
        if !debounce.is_zero() {
            self.coordinator.clock().sleep(debounce).await;
            if !self.is_current(generation) {
                debug!(generation, "fetch superseded while debouncing");
                return;
            }
        }

        let key = match self.request_key(&filters) {
            Ok(key) => key,
            Err(err) => {
                warn!(generation, error = %err, "could not derive request key");
                if self.is_current(generation) {
                    self.store.apply_error(err.to_string());
                }
                return;
            }
        };

        let backend = Arc::clone(&self.backend);
        let query = filters;
        let outcome = self
            .coordinator
            .execute(
                key.as_str(),
                move || {
                    let backend = Arc::clone(&backend);
                    let query = query.clone();
                    async move { backend.search(&query).await }
                },
                self.fetch.request_config(),
            )
            .await;

        if !self.is_current(generation) {
            debug!(generation, key = %key, "discarding stale response");
            return;
        }
        match outcome {
            Ok(page) => {
                debug!(generation, total = page.total, "fetch applied");
                self.store.apply_results(page);
            }
            Err(err) => {
                warn!(generation, key = %key, error = %err, "fetch failed");
                self.store.apply_error(err.user_message());
            }
        }
    }
}
