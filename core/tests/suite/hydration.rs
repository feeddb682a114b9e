use autos_core::DashboardConfig;
use autos_core::FilterPatch;
use autos_core::MemoryLocation;
use autos_protocol::DomainFilters;
use autos_protocol::HierarchicalSelection;
use pretty_assertions::assert_eq;

use crate::common::Harness;
use crate::common::ScriptedBackend;
use crate::common::page_for;
use crate::common::params;

#[tokio::test(start_paused = true)]
async fn startup_hydration_fetches_without_writing_url() {
    let harness = Harness::build(
        DashboardConfig::default(),
        MemoryLocation::with_query("?manufacturer=Ford&page=2&utm_source=mail"),
        ScriptedBackend::default(),
    );
    let orchestrator = &harness.orchestrator;

    assert!(orchestrator.hydrate());
    orchestrator.wait_idle().await;

    let filters = orchestrator.get_current_filters();
    assert_eq!(filters.page, 2);
    assert_eq!(harness.backend.call_count(), 1);
    assert_eq!(harness.results(), page_for("Ford").results);
    assert!(harness.location.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hydrating_an_unchanged_url_is_a_no_op() {
    let harness = Harness::new(DashboardConfig::default());
    assert!(!harness.orchestrator.hydrate());
    assert_eq!(harness.backend.call_count(), 0);

    // Non-canonical spellings of the same filters compare equal by value.
    let harness = Harness::build(
        DashboardConfig::default(),
        MemoryLocation::with_query("page=abc&size=20&sortDirection=sideways"),
        ScriptedBackend::default(),
    );
    assert!(!harness.orchestrator.hydrate());
    assert!(harness.location.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn navigation_is_hydrated_by_the_watcher() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;
    let watcher = orchestrator.spawn_location_watcher();
    let mut filters_rx = orchestrator.filters();

    harness
        .location
        .navigate(params("bodyClass=Pickup&manufacturer=Ford&page=2"));
    filters_rx
        .wait_for(|filters| filters.page == 2)
        .await
        .expect("store alive");
    orchestrator.wait_idle().await;

    assert_eq!(harness.backend.call_count(), 1);
    assert_eq!(harness.results(), page_for("Ford").results);
    assert!(harness.location.writes().is_empty());

    assert!(harness.location.back());
    filters_rx
        .wait_for(|filters| *filters == DomainFilters::default())
        .await
        .expect("store alive");

    assert!(harness.results().is_empty());
    assert_eq!(harness.backend.call_count(), 1);
    assert!(harness.location.writes().is_empty());

    watcher.abort();
}

#[tokio::test(start_paused = true)]
async fn user_edit_followed_by_back_restores_previous_query() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;
    let watcher = orchestrator.spawn_location_watcher();
    let mut filters_rx = orchestrator.filters();

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.wait_idle().await;
    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Chevrolet"));
    orchestrator.wait_idle().await;
    assert_eq!(harness.location.writes().len(), 2);

    assert!(harness.location.back());
    filters_rx
        .wait_for(|filters| {
            filters.column_filters.get("manufacturer").map(String::as_str) == Some("Ford")
        })
        .await
        .expect("store alive");
    orchestrator.wait_idle().await;

    // Same key as the user-initiated Ford query, so the cache answers.
    assert_eq!(harness.backend.call_count(), 2);
    assert_eq!(harness.results(), page_for("Ford").results);
    assert_eq!(harness.location.writes().len(), 2);

    watcher.abort();
}

#[tokio::test(start_paused = true)]
async fn watcher_ignores_navigation_to_the_current_state() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;
    let watcher = orchestrator.spawn_location_watcher();

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.wait_idle().await;
    let before = harness.backend.call_count();

    harness.location.navigate(params("manufacturer=Ford"));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(harness.backend.call_count(), before);
    assert!(!*orchestrator.loading().borrow());

    watcher.abort();
}

#[tokio::test(start_paused = true)]
async fn untrimmed_selection_survives_its_own_url() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;
    let ford = HierarchicalSelection::from_path(["Ford ", " F-150"]).expect("non-empty path");

    orchestrator.update_filters(FilterPatch::new().select(vec![ford]));
    orchestrator.wait_idle().await;

    assert_eq!(
        orchestrator.get_current_filters().selected_items,
        vec![HierarchicalSelection::from_path(["Ford", "F-150"]).expect("non-empty path")]
    );
    assert_eq!(harness.href(), "?page=1&size=20&selected=Ford%3AF-150");
    assert!(!orchestrator.hydrate());
    assert_eq!(harness.backend.call_count(), 1);
}
