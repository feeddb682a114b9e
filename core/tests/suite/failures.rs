use autos_core::DashboardConfig;
use autos_core::FilterPatch;
use autos_core::ValidationError;
use autos_protocol::HierarchicalSelection;
use pretty_assertions::assert_eq;

use crate::common::FAILING;
use crate::common::Harness;
use crate::common::page_for;

#[tokio::test(start_paused = true)]
async fn terminal_failure_keeps_previous_results() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.wait_idle().await;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", FAILING));
    orchestrator.wait_idle().await;

    // One attempt plus the two default retries.
    assert_eq!(harness.backend.call_count(), 4);
    let state = orchestrator.state();
    assert_eq!(state.error.as_deref(), Some("index unavailable"));
    assert_eq!(state.results, page_for("Ford").results);
    assert_eq!(state.total, 1);
    assert!(!state.loading);

    orchestrator.dismiss_error();
    assert_eq!(*orchestrator.error().borrow(), None);
}

#[tokio::test(start_paused = true)]
async fn failures_are_not_cached() {
    let mut config = DashboardConfig::default();
    config.fetch.retry_attempts = 0;
    let harness = Harness::new(config);
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", FAILING));
    orchestrator.wait_idle().await;
    orchestrator.refresh_data();
    orchestrator.wait_idle().await;

    assert_eq!(harness.backend.call_count(), 2);
    assert!(orchestrator.state().error.is_some());
}

#[tokio::test(start_paused = true)]
async fn success_after_failure_clears_the_error() {
    let mut config = DashboardConfig::default();
    config.fetch.retry_attempts = 0;
    let harness = Harness::new(config);
    let orchestrator = &harness.orchestrator;

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", FAILING));
    orchestrator.wait_idle().await;
    assert!(orchestrator.state().error.is_some());

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford"));
    orchestrator.wait_idle().await;
    assert_eq!(orchestrator.state().error, None);
    assert_eq!(harness.results(), page_for("Ford").results);
}

#[tokio::test(start_paused = true)]
async fn invalid_update_is_rejected_before_any_work() {
    let harness = Harness::new(DashboardConfig::default());
    let orchestrator = &harness.orchestrator;
    let before = orchestrator.get_current_filters();

    orchestrator.update_filters(FilterPatch::new().column("manufacturer", "Ford").page(0));

    assert_eq!(
        orchestrator.state().error,
        Some(ValidationError::PageOutOfRange.to_string())
    );
    assert_eq!(orchestrator.get_current_filters(), before);
    assert!(harness.location.writes().is_empty());
    assert!(!*orchestrator.loading().borrow());
    tokio::task::yield_now().await;
    assert_eq!(harness.backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_column_is_rejected() {
    let harness = Harness::new(DashboardConfig::default());
    harness
        .orchestrator
        .update_filters(FilterPatch::new().column("color", "red"));

    assert_eq!(
        harness.orchestrator.state().error,
        Some(ValidationError::UnknownColumn("color".to_string()).to_string())
    );
    assert!(harness.location.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blank_selection_is_rejected() {
    let harness = Harness::new(DashboardConfig::default());
    let blank = HierarchicalSelection::from_path(["  "]).expect("non-empty path");
    harness
        .orchestrator
        .update_filters(FilterPatch::new().select(vec![blank]));

    assert_eq!(
        harness.orchestrator.state().error,
        Some(ValidationError::EmptySelection.to_string())
    );
    assert!(harness.location.writes().is_empty());
    assert_eq!(harness.href(), "");
    tokio::task::yield_now().await;
    assert_eq!(harness.backend.call_count(), 0);
}
