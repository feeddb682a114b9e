use async_trait::async_trait;
use autos_protocol::DomainFilters;
use autos_protocol::SearchPage;

/// The search endpoint behind the dashboard.
///
/// Implementations own query construction and transport; any error is treated
/// as transient and retried by the coordinator.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, filters: &DomainFilters) -> anyhow::Result<SearchPage>;
}
