use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use overlay_geometry::core::{ChartCoordinates, ContainerDimensions, Margins};
use overlay_geometry::host::{PaneSize, ScriptedChart};
use overlay_geometry::service::{ChartId, CoordinateRequest, CoordinateService};
use overlay_geometry::{ReadinessConfig, ReadinessDetector};

/// Detector that gives up after a handful of millisecond attempts, for
/// scenarios where the host never becomes ready.
fn impatient_detector() -> ReadinessDetector {
    ReadinessDetector::new(ReadinessConfig {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        backoff_factor: 1.0,
        max_jitter: Duration::ZERO,
        ..ReadinessConfig::dimension()
    })
}

fn two_pane_chart() -> ScriptedChart {
    let chart = ScriptedChart::sized(800.0, 600.0);
    chart.set_pane_sizes(vec![
        PaneSize {
            width: 740.0,
            height: 300.0,
        },
        PaneSize {
            width: 740.0,
            height: 300.0,
        },
    ]);
    chart
}

#[test]
fn pane_y_is_the_prefix_sum_of_preceding_heights() {
    let chart = two_pane_chart();
    let service = CoordinateService::new();

    let pane0 = service.pane_coordinates(&chart, 0).expect("pane 0");
    let pane1 = service.pane_coordinates(&chart, 1).expect("pane 1");

    assert_eq!(pane0.y, 0.0);
    assert_eq!(pane1.y, 300.0);
    assert_eq!(pane1.absolute_y, 300.0);
    assert!(pane0.is_main_pane);
    assert!(!pane0.is_last_pane);
    assert!(!pane1.is_main_pane);
    assert!(pane1.is_last_pane);
}

#[test]
fn out_of_range_pane_index_yields_none() {
    let chart = two_pane_chart();
    let service = CoordinateService::new();
    assert!(service.pane_coordinates(&chart, 999).is_none());
}

#[test]
fn torn_down_host_yields_none_instead_of_error() {
    let chart = two_pane_chart();
    chart.fail_all_calls(true);
    let service = CoordinateService::new();
    assert!(service.pane_coordinates(&chart, 0).is_none());
    assert!(service.full_pane_bounds(&chart, 0).is_none());
}

#[test]
fn full_pane_bounds_include_scale_gutters() {
    let chart = two_pane_chart();
    let service = CoordinateService::new();

    let bounds = service.full_pane_bounds(&chart, 1).expect("bounds");
    assert_eq!(bounds.x, 0.0);
    assert_eq!(bounds.y, 300.0);
    // 740 pane + 0 left gutter + 60 right gutter.
    assert_eq!(bounds.width, 800.0);
    assert_eq!(bounds.height, 300.0);
}

#[tokio::test]
async fn snapshot_sweep_covers_scales_and_panes() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();

    let snapshot = service
        .coordinates(
            &chart,
            &ChartId::from("chart-1"),
            "container-1",
            CoordinateRequest::default(),
        )
        .await
        .expect("snapshot");

    assert!(snapshot.is_valid);
    assert_eq!(snapshot.panes.len(), 2);
    assert_eq!(snapshot.panes[1].y, 300.0);
    assert_eq!(snapshot.time_scale.y, 600.0);
    assert_eq!(snapshot.time_scale.height, 28.0);
    assert_eq!(snapshot.price_scale_right.x, 740.0);
    assert_eq!(snapshot.price_scale_right.width, 60.0);
    assert_eq!(snapshot.content_area.width, 740.0);
    assert_eq!(snapshot.content_area.height, 572.0);
    assert!(CoordinateService::dimensions_valid(&snapshot));
}

#[tokio::test]
async fn cached_snapshot_is_returned_by_identity() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();
    let chart_id = ChartId::from("chart-1");

    let first = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("first");
    let second = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("second");

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn expired_ttl_triggers_a_fresh_snapshot() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new().with_ttl(Duration::ZERO);
    let chart_id = ChartId::from("chart-1");

    let first = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("first");
    let second = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("second");

    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn bypassing_the_cache_never_stores_an_entry() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();
    let chart_id = ChartId::from("chart-1");

    let request = CoordinateRequest {
        use_cache: false,
        ..CoordinateRequest::default()
    };
    let _ = service
        .coordinates(&chart, &chart_id, "c", request)
        .await
        .expect("snapshot");

    assert!(service.cached_entry(&chart_id).is_none());
}

#[tokio::test]
async fn registering_a_chart_invalidates_its_previous_cache_entry() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();
    let chart_id = ChartId::from("chart-1");

    let first = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("first");
    assert!(service.cached_entry(&chart_id).is_some());

    // Same id, new chart instance: the old geometry must not survive.
    service.register_chart(chart_id.clone());
    assert!(service.cached_entry(&chart_id).is_none());
    assert!(service.is_registered(&chart_id));

    let second = service
        .coordinates(&chart, &chart_id, "c", CoordinateRequest::default())
        .await
        .expect("second");
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn invalidate_without_id_clears_every_entry() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();

    for raw in ["a", "b", "c"] {
        let _ = service
            .coordinates(&chart, &ChartId::from(raw), "c", CoordinateRequest::default())
            .await
            .expect("snapshot");
    }
    service.invalidate_cache(None);
    for raw in ["a", "b", "c"] {
        assert!(service.cached_entry(&ChartId::from(raw)).is_none());
    }
}

#[tokio::test]
async fn host_failure_degrades_to_invalid_snapshot_when_requested() {
    let chart = two_pane_chart();
    chart.fail_all_calls(true);
    let mut service = CoordinateService::new().with_detector(impatient_detector());

    let fallback = service
        .coordinates(
            &chart,
            &ChartId::from("chart-1"),
            "c",
            CoordinateRequest::default(),
        )
        .await
        .expect("best-effort snapshot");
    assert!(!fallback.is_valid);
    assert!(fallback.panes.is_empty());

    let strict = CoordinateRequest {
        fallback_on_error: false,
        ..CoordinateRequest::default()
    };
    let result = service
        .coordinates(&chart, &ChartId::from("chart-2"), "c", strict)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn margins_shrink_the_pane_content_area() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new().with_content_margins(Margins::uniform(8.0));

    let request = CoordinateRequest {
        include_margins: true,
        ..CoordinateRequest::default()
    };
    let snapshot = service
        .coordinates(&chart, &ChartId::from("chart-1"), "c", request)
        .await
        .expect("snapshot");

    let pane = &snapshot.panes[0];
    assert_eq!(pane.margins, Margins::uniform(8.0));
    assert_eq!(pane.content_area.width, 740.0 - 16.0);
    assert_eq!(pane.content_area.height, 300.0 - 16.0);
}

#[test]
fn forced_refresh_notifies_subscribers_until_unsubscribed() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();
    let chart_id = ChartId::from("chart-1");

    let seen = Rc::new(Cell::new(0u32));
    let seen_by_listener = Rc::clone(&seen);
    let subscription = service.on_coordinate_update(chart_id.clone(), move |coords| {
        assert!(coords.is_valid);
        seen_by_listener.set(seen_by_listener.get() + 1);
    });

    service
        .force_refresh_coordinates(&chart, &chart_id, "c")
        .expect("refresh");
    service
        .force_refresh_coordinates(&chart, &chart_id, "c")
        .expect("refresh");
    assert_eq!(seen.get(), 2);

    assert!(service.unsubscribe(subscription));
    service
        .force_refresh_coordinates(&chart, &chart_id, "c")
        .expect("refresh");
    assert_eq!(seen.get(), 2);
}

#[test]
fn unregister_drops_cache_and_listeners() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();
    let chart_id = ChartId::from("chart-1");

    service.register_chart(chart_id.clone());
    let _ = service.on_coordinate_update(chart_id.clone(), |_| {});
    service
        .force_refresh_coordinates(&chart, &chart_id, "c")
        .expect("refresh");
    assert!(service.cached_entry(&chart_id).is_some());

    service.unregister_chart(&chart_id);
    assert!(!service.is_registered(&chart_id));
    assert!(service.cached_entry(&chart_id).is_none());
}

#[test]
fn dimension_object_check_rejects_missing_and_small_containers() {
    assert!(!CoordinateService::dimensions_object_valid(None, 100.0, 100.0));

    let small = ContainerDimensions::new(40.0, 500.0, 0.0, 0.0);
    assert!(!CoordinateService::dimensions_object_valid(
        Some(&small),
        100.0,
        100.0
    ));

    let fine = ContainerDimensions::new(400.0, 500.0, 0.0, 0.0);
    assert!(CoordinateService::dimensions_object_valid(
        Some(&fine),
        100.0,
        100.0
    ));
}

#[tokio::test]
async fn snapshot_survives_a_json_round_trip() {
    let chart = two_pane_chart();
    let mut service = CoordinateService::new();

    let snapshot = service
        .coordinates(
            &chart,
            &ChartId::from("chart-1"),
            "c",
            CoordinateRequest::default(),
        )
        .await
        .expect("snapshot");

    let json = serde_json::to_string(&*snapshot).expect("serialize");
    let restored: ChartCoordinates = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(&*snapshot, &restored);
}
