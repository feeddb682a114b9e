use std::sync::Arc;
use std::time::Duration;

use autos_async_utils::ManualClock;
use autos_core::DashboardConfig;
use autos_core::FilterPatch;
use autos_core::MemoryLocation;
use autos_core::SyncOrchestrator;
use autos_protocol::AppState;
use autos_protocol::DomainFilters;
use autos_request_coordinator::RequestCoordinator;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

use crate::common::Harness;
use crate::common::ScriptedBackend;
use crate::common::manufacturer_of;
use crate::common::page_for;

fn slow_ford() -> Harness {
    Harness::build(
        DashboardConfig::default(),
        MemoryLocation::new(),
        ScriptedBackend::with_delays([("Ford", 500), ("Chevrolet", 50)]),
    )
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn late_response_for_superseded_filters_is_discarded() {
    let harness = slow_ford();
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Chevrolet"));
    orchestrator.wait_idle().await;
    assert_eq!(harness.results(), page_for("Chevrolet").results);

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(harness.backend.call_count(), 2);
    assert_eq!(harness.results(), page_for("Chevrolet").results);
    assert!(!*orchestrator.loading().borrow());
    assert!(logs_contain("discarding stale response"));
}

#[tokio::test(start_paused = true)]
async fn loading_stays_on_until_the_current_query_lands() {
    let harness = Harness::build(
        DashboardConfig::default(),
        MemoryLocation::new(),
        ScriptedBackend::with_delays([("Ford", 50), ("Chevrolet", 500)]),
    );
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Chevrolet"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Ford resolved first but is stale; nothing applied yet.
    assert!(*orchestrator.loading().borrow());
    assert!(harness.results().is_empty());

    orchestrator.wait_idle().await;
    assert_eq!(harness.results(), page_for("Chevrolet").results);
}

#[tokio::test(start_paused = true)]
async fn reset_discards_pending_response() {
    let harness = slow_ford();
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.reset_filters();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(orchestrator.state(), AppState::new(DomainFilters::default()));
}

#[tokio::test(start_paused = true)]
async fn clearing_filters_discards_pending_response() {
    let harness = slow_ford();
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.update_filters(FilterPatch::new().remove_column("manufacturer"));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(harness.results().is_empty());
    assert!(!*orchestrator.loading().borrow());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_drops_in_flight_fetch() {
    let harness = slow_ford();
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(orchestrator.coordinator().is_any_loading());

    orchestrator.cancel_all();
    assert!(!*orchestrator.loading().borrow());
    assert!(!orchestrator.coordinator().is_any_loading());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(harness.results().is_empty());
    assert!(!orchestrator.coordinator().is_any_loading());
    assert_eq!(orchestrator.coordinator().cache_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn debounce_collapses_a_burst_into_one_fetch() {
    let mut config = DashboardConfig::default();
    config.fetch.debounce_ms = 300;
    let harness = Harness::new(config);
    let orchestrator = &harness.orchestrator;

    for manufacturer in ["Ford", "Chevrolet", "Tesla"] {
        orchestrator.update_filters(FilterPatch::new().column("manufacturer", manufacturer));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    orchestrator.wait_idle().await;

    let calls = harness.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(manufacturer_of(&calls[0]), "Tesla");
    assert_eq!(harness.results(), page_for("Tesla").results);
    // Every edit still reached the URL.
    assert_eq!(harness.location.writes().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn debounce_sleeps_on_the_coordinator_clock() {
    let clock = Arc::new(ManualClock::new());
    let coordinator = Arc::new(RequestCoordinator::with_clock(clock.clone()));
    let mut config = DashboardConfig::default();
    config.fetch.debounce_ms = 250;
    let orchestrator = SyncOrchestrator::with_coordinator(
        config,
        coordinator,
        Arc::new(MemoryLocation::new()),
        Arc::new(ScriptedBackend::default()),
    )
    .expect("valid config");

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.wait_idle().await;

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(250)]);
    assert_eq!(orchestrator.state().results, page_for("Ford").results);
}
