use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Values at or below this mark a coordinate as "not plottable".
///
/// The host returns it in place of `None` on some conversion paths; it is
/// distinguishable from any legitimate on-canvas pixel because the canvas
/// origin is top-left and real coordinates never go that far negative.
pub const COORDINATE_SENTINEL: f64 = -100.0;

/// A raw pixel value is valid iff it is finite and above the sentinel.
#[must_use]
pub fn is_valid_pixel(value: f64) -> bool {
    value.is_finite() && value > COORDINATE_SENTINEL
}

/// `None` and sentinel-marked values are both invalid.
#[must_use]
pub fn is_valid_coordinate(value: Option<f64>) -> bool {
    value.is_some_and(is_valid_pixel)
}

/// Intermediate pixel coordinates produced by domain conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RenderPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl RenderPoint {
    #[must_use]
    pub const fn new(x: Option<f64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

/// Render point carrying a per-point color for gradient construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredRenderPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Color,
}

/// One sample of a band: shared x, upper and lower y, optional segment fill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandPoint {
    pub x: Option<f64>,
    pub upper_y: Option<f64>,
    pub lower_y: Option<f64>,
    pub fill_color: Option<Color>,
}

/// Fully resolved pixel point after validity filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

#[must_use]
pub fn is_valid_render_point(point: &RenderPoint) -> bool {
    is_valid_coordinate(point.x) && is_valid_coordinate(point.y)
}

/// Drops points whose x or y is missing or sentinel-marked.
#[must_use]
pub fn filter_valid_render_points(points: &[RenderPoint]) -> Vec<PixelPoint> {
    points
        .iter()
        .filter_map(|point| match (point.x, point.y) {
            (Some(x), Some(y)) if is_valid_pixel(x) && is_valid_pixel(y) => {
                Some(PixelPoint { x, y })
            }
            _ => None,
        })
        .collect()
}

/// Keeps band points with a valid `x` and at least one valid y field.
///
/// A point with a valid `x` but no plottable y anywhere contributes nothing
/// to any band geometry and is dropped.
#[must_use]
pub fn filter_valid_band_points(points: &[BandPoint]) -> Vec<BandPoint> {
    points
        .iter()
        .filter(|point| {
            is_valid_coordinate(point.x)
                && (is_valid_coordinate(point.upper_y) || is_valid_coordinate(point.lower_y))
        })
        .copied()
        .collect()
}

/// Index span of plottable points, `to` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub from: usize,
    pub to: usize,
}

/// Finds the index span covering the first and last point with a valid `x`.
///
/// Empty input yields `None`. An array with zero valid points degrades to
/// the whole-array span rather than `None`; downstream band primitives rely
/// on the non-empty fallback during the first frames after a re-pane.
#[must_use]
pub fn calculate_visible_range(points: &[RenderPoint]) -> Option<VisibleRange> {
    if points.is_empty() {
        return None;
    }

    let first_valid = points.iter().position(|point| is_valid_coordinate(point.x));
    let last_valid = points.iter().rposition(|point| is_valid_coordinate(point.x));

    match (first_valid, last_valid) {
        (Some(from), Some(last)) => Some(VisibleRange { from, to: last + 1 }),
        _ => Some(VisibleRange {
            from: 0,
            to: points.len(),
        }),
    }
}
