use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use autos_core::DashboardConfig;
use autos_core::MemoryLocation;
use autos_core::SearchBackend;
use autos_core::SyncOrchestrator;
use autos_protocol::DomainFilters;
use autos_protocol::SearchPage;
use autos_protocol::VehicleResult;
use autos_url_codec::ParamMap;
use autos_url_codec::parse_query_string;

/// Manufacturer whose searches always fail.
pub const FAILING: &str = "Failing";

const DEFAULT_DELAY: Duration = Duration::from_millis(10);

/// Backend answering with one vehicle for the filtered manufacturer, after a
/// per-manufacturer delay.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<DomainFilters>>,
}

impl ScriptedBackend {
    pub fn with_delays<const N: usize>(delays: [(&str, u64); N]) -> Self {
        Self {
            delays: delays
                .into_iter()
                .map(|(name, ms)| (name.to_string(), Duration::from_millis(ms)))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<DomainFilters> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, filters: &DomainFilters) -> anyhow::Result<SearchPage> {
        self.calls.lock().unwrap().push(filters.clone());
        let manufacturer = manufacturer_of(filters);
        let delay = self
            .delays
            .get(&manufacturer)
            .copied()
            .unwrap_or(DEFAULT_DELAY);
        tokio::time::sleep(delay).await;
        if manufacturer == FAILING {
            anyhow::bail!("index unavailable");
        }
        Ok(page_for(&manufacturer))
    }
}

pub fn manufacturer_of(filters: &DomainFilters) -> String {
    filters
        .column_filters
        .get("manufacturer")
        .cloned()
        .unwrap_or_default()
}

pub fn page_for(manufacturer: &str) -> SearchPage {
    let vehicle = VehicleResult::new(format!("{manufacturer}-1"), manufacturer, "Base");
    SearchPage::new(vec![vehicle], 1)
}

pub fn params(raw: &str) -> ParamMap {
    parse_query_string(raw)
}

pub struct Harness {
    pub orchestrator: SyncOrchestrator,
    pub location: Arc<MemoryLocation>,
    pub backend: Arc<ScriptedBackend>,
}

impl Harness {
    pub fn new(config: DashboardConfig) -> Self {
        Self::build(config, MemoryLocation::new(), ScriptedBackend::default())
    }

    pub fn build(
        config: DashboardConfig,
        location: MemoryLocation,
        backend: ScriptedBackend,
    ) -> Self {
        let location = Arc::new(location);
        let backend = Arc::new(backend);
        let orchestrator = SyncOrchestrator::new(config, location.clone(), backend.clone())
            .expect("valid config");
        Self {
            orchestrator,
            location,
            backend,
        }
    }

    pub fn href(&self) -> String {
        self.location.href(self.orchestrator.codec().config())
    }

    pub fn results(&self) -> Vec<VehicleResult> {
        self.orchestrator.state().results
    }
}
