use autos_protocol::AppState;
use autos_protocol::DomainFilters;
use autos_protocol::SearchPage;
use autos_protocol::VehicleResult;
use tokio::sync::watch;
use tracing::debug;

use crate::patch::FilterPatch;

/// The dashboard's [`AppState`], one watch channel per field.
///
/// The store only holds state. Deciding when to fetch and keeping the URL in
/// step is the orchestrator's job; UI code reads through the `subscribe_*`
/// receivers and never writes.
#[derive(Debug)]
pub struct FilterStore {
    defaults: DomainFilters,
    filters: watch::Sender<DomainFilters>,
    results: watch::Sender<Vec<VehicleResult>>,
    total: watch::Sender<u64>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl FilterStore {
    pub fn new(defaults: DomainFilters) -> Self {
        Self {
            filters: watch::channel(defaults.clone()).0,
            defaults,
            results: watch::channel(Vec::new()).0,
            total: watch::channel(0).0,
            loading: watch::channel(false).0,
            error: watch::channel(None).0,
        }
    }

    pub fn defaults(&self) -> &DomainFilters {
        &self.defaults
    }

    pub fn filters(&self) -> DomainFilters {
        self.filters.borrow().clone()
    }

    pub fn results(&self) -> Vec<VehicleResult> {
        self.results.borrow().clone()
    }

    pub fn total(&self) -> u64 {
        *self.total.borrow()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn snapshot(&self) -> AppState {
        AppState {
            filters: self.filters(),
            results: self.results(),
            total: self.total(),
            loading: self.is_loading(),
            error: self.error(),
        }
    }

    pub fn subscribe_filters(&self) -> watch::Receiver<DomainFilters> {
        self.filters.subscribe()
    }

    pub fn subscribe_results(&self) -> watch::Receiver<Vec<VehicleResult>> {
        self.results.subscribe()
    }

    pub fn subscribe_total(&self) -> watch::Receiver<u64> {
        self.total.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    /// Merge `patch` into the current filters and return the result.
    pub fn apply_patch(&self, patch: FilterPatch) -> DomainFilters {
        let next = patch.apply_to(&self.filters.borrow());
        self.replace_filters(next.clone());
        next
    }

    /// Returns whether the filters actually changed.
    pub fn replace_filters(&self, next: DomainFilters) -> bool {
        self.filters.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    /// Back to the default filters with nothing loaded.
    pub fn reset(&self) -> DomainFilters {
        self.replace_filters(self.defaults.clone());
        self.clear_results();
        set_if_changed(&self.error, None);
        self.defaults.clone()
    }

    pub fn set_loading(&self, loading: bool) {
        set_if_changed(&self.loading, loading);
    }

    /// Results are replaced wholesale, never merged.
    pub fn apply_results(&self, page: SearchPage) {
        debug!(count = page.results.len(), total = page.total, "results applied");
        self.results.send_replace(page.results);
        set_if_changed(&self.total, page.total);
        set_if_changed(&self.error, None);
        set_if_changed(&self.loading, false);
    }

    /// Surface a failure; whatever was on screen stays there.
    pub fn apply_error(&self, message: String) {
        set_if_changed(&self.error, Some(message));
        set_if_changed(&self.loading, false);
    }

    pub fn clear_results(&self) {
        self.results.send_if_modified(|results| {
            if results.is_empty() {
                return false;
            }
            results.clear();
            true
        });
        set_if_changed(&self.total, 0);
        set_if_changed(&self.loading, false);
    }

    pub fn dismiss_error(&self) {
        set_if_changed(&self.error, None);
    }
}

fn set_if_changed<T: PartialEq>(sender: &watch::Sender<T>, value: T) {
    sender.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
