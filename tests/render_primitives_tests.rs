use overlay_geometry::core::{calculate_bar_width_extensions, interpolate_y};
use overlay_geometry::render::{
    BandPoint, Canvas2d, CanvasOp, Color, FillStyle, RecordingCanvas, RenderPoint, VisibleRange,
    calculate_visible_range, fill_between_lines, fill_between_lines_with_gradient,
    fill_trapezoidal_segments, is_valid_pixel, with_saved_state,
};

#[test]
fn visible_range_examples_from_the_overlay_contract() {
    let trimmed = vec![
        RenderPoint::new(None, None),
        RenderPoint::at(10.0, 0.0),
        RenderPoint::at(20.0, 0.0),
        RenderPoint::at(30.0, 0.0),
        RenderPoint::new(None, None),
    ];
    assert_eq!(
        calculate_visible_range(&trimmed),
        Some(VisibleRange { from: 1, to: 4 })
    );

    assert_eq!(calculate_visible_range(&[]), None);

    let sentinel_only = vec![
        RenderPoint::new(None, None),
        RenderPoint::new(Some(-200.0), None),
        RenderPoint::new(None, None),
    ];
    assert_eq!(
        calculate_visible_range(&sentinel_only),
        Some(VisibleRange { from: 0, to: 3 })
    );
}

#[test]
fn interpolation_identities_hold() {
    assert_eq!(interpolate_y(5.0, 0.0, 0.0, 10.0, 100.0), 50.0);
    assert_eq!(interpolate_y(0.0, 0.0, 50.0, 10.0, 100.0), 50.0);
    assert_eq!(interpolate_y(10.0, 0.0, 50.0, 10.0, 100.0), 100.0);
}

#[test]
fn bar_width_extension_table() {
    let retina = calculate_bar_width_extensions(100.0, 200.0, 6.0, 2.0);
    assert_eq!((retina.extend_start, retina.extend_end), (6.0, 6.0));

    let plain = calculate_bar_width_extensions(100.0, 200.0, 6.0, 1.0);
    assert_eq!((plain.extend_start, plain.extend_end), (3.0, 3.0));

    let odd = calculate_bar_width_extensions(100.0, 200.0, 7.0, 1.0);
    assert_eq!((odd.extend_start, odd.extend_end), (3.0, 4.0));
}

#[test]
fn sentinel_validity_boundary() {
    assert!(is_valid_pixel(-99.0));
    assert!(!is_valid_pixel(-100.0));
}

#[test]
fn band_fill_draws_one_closed_path_and_one_fill() {
    let mut canvas = RecordingCanvas::new();
    let upper: Vec<RenderPoint> = (0..5)
        .map(|i| RenderPoint::at(i as f64 * 10.0, 100.0 - i as f64))
        .collect();
    let lower: Vec<RenderPoint> = (0..5)
        .map(|i| RenderPoint::at(i as f64 * 10.0, 200.0 + i as f64))
        .collect();

    fill_between_lines(
        &mut canvas,
        &upper,
        &lower,
        &FillStyle::Solid(Color::rgba(0.1, 0.3, 0.8, 0.25)),
    );

    assert_eq!(canvas.begin_path_count(), 1);
    assert_eq!(canvas.fill_count(), 1);
    assert_eq!(canvas.count(|op| matches!(op, CanvasOp::ClosePath)), 1);
    // 4 upper segments + 5 lower points walked back.
    assert_eq!(canvas.count(|op| matches!(op, CanvasOp::LineTo(_, _))), 9);
}

#[test]
fn invalid_points_are_filtered_before_tracing() {
    let mut canvas = RecordingCanvas::new();
    let upper = vec![
        RenderPoint::at(0.0, 10.0),
        RenderPoint::new(Some(-100.0), Some(11.0)),
        RenderPoint::at(20.0, 12.0),
    ];
    let lower = vec![RenderPoint::at(0.0, 30.0), RenderPoint::at(20.0, 31.0)];

    fill_between_lines(
        &mut canvas,
        &upper,
        &lower,
        &FillStyle::Solid(Color::rgb(0.0, 0.0, 0.0)),
    );

    // Sentinel point dropped: 1 upper segment + 2 lower walk-backs.
    assert_eq!(canvas.count(|op| matches!(op, CanvasOp::LineTo(_, _))), 3);
}

#[test]
fn gradient_fill_spans_the_plotted_extent() {
    let mut canvas = RecordingCanvas::new();
    let upper = vec![RenderPoint::at(40.0, 10.0), RenderPoint::at(140.0, 12.0)];
    let lower = vec![RenderPoint::at(40.0, 30.0), RenderPoint::at(140.0, 32.0)];
    let colored = vec![
        overlay_geometry::render::ColoredRenderPoint {
            x: Some(40.0),
            y: Some(10.0),
            color: Color::rgb(1.0, 0.0, 0.0),
        },
        overlay_geometry::render::ColoredRenderPoint {
            x: Some(90.0),
            y: Some(11.0),
            color: Color::rgb(0.0, 1.0, 0.0),
        },
    ];

    fill_between_lines_with_gradient(&mut canvas, &upper, &lower, &colored);

    let gradient = canvas
        .ops()
        .iter()
        .find_map(|op| match op {
            CanvasOp::SetFillStyle(FillStyle::Gradient(gradient)) => Some(gradient.clone()),
            _ => None,
        })
        .expect("gradient fill style");
    assert_eq!(gradient.x0, 40.0);
    assert_eq!(gradient.x1, 140.0);
    assert_eq!(gradient.stops.len(), 2);
    assert_eq!(gradient.stops[0].offset, 0.0);
    assert_eq!(gradient.stops[1].offset, 0.5);
    assert_eq!(canvas.fill_count(), 1);
}

#[test]
fn trapezoidal_segments_fill_one_quad_per_pair() {
    let mut canvas = RecordingCanvas::new();
    let band = vec![
        BandPoint {
            x: Some(0.0),
            upper_y: Some(10.0),
            lower_y: Some(20.0),
            fill_color: Some(Color::rgb(1.0, 0.0, 0.0)),
        },
        BandPoint {
            x: Some(10.0),
            upper_y: Some(11.0),
            lower_y: Some(21.0),
            fill_color: Some(Color::rgb(0.0, 1.0, 0.0)),
        },
        BandPoint {
            x: Some(20.0),
            upper_y: Some(12.0),
            lower_y: Some(22.0),
            fill_color: None,
        },
    ];

    fill_trapezoidal_segments(&mut canvas, &band, Color::rgb(0.5, 0.5, 0.5));

    assert_eq!(canvas.fill_count(), 2);
    assert_eq!(canvas.begin_path_count(), 2);
    // Each segment takes its starting point's color.
    let fills: Vec<_> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            CanvasOp::SetFillStyle(FillStyle::Solid(color)) => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(fills[0], Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(fills[1], Color::rgb(0.0, 1.0, 0.0));
}

#[test]
fn segments_missing_a_corner_are_skipped() {
    let mut canvas = RecordingCanvas::new();
    let band = vec![
        BandPoint {
            x: Some(0.0),
            upper_y: Some(10.0),
            lower_y: Some(20.0),
            fill_color: None,
        },
        BandPoint {
            x: Some(10.0),
            upper_y: Some(11.0),
            lower_y: None,
            fill_color: None,
        },
    ];
    fill_trapezoidal_segments(&mut canvas, &band, Color::rgb(0.5, 0.5, 0.5));
    assert!(canvas.is_empty());
}

#[test]
fn saved_state_error_path_restores_and_propagates() {
    let mut canvas = RecordingCanvas::new();
    let result = with_saved_state(&mut canvas, |canvas| {
        canvas.begin_path();
        Err::<(), _>(overlay_geometry::OverlayError::InvalidData(
            "mid-draw failure".to_owned(),
        ))
    });

    assert!(result.is_err());
    assert_eq!(canvas.save_count(), 1);
    assert_eq!(canvas.restore_count(), 1);
    assert!(matches!(canvas.ops().last(), Some(CanvasOp::Restore)));
}
