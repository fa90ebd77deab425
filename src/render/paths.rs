use ordered_float::OrderedFloat;

use crate::core::clamp_unit;
use crate::render::canvas::{Canvas2d, Color, FillStyle, GradientStop, LinearGradient};
use crate::render::points::{
    BandPoint, ColoredRenderPoint, RenderPoint, filter_valid_band_points,
    filter_valid_render_points, is_valid_pixel,
};

/// Traces a closed path along `upper` left-to-right and `lower`
/// right-to-left, filtering invalid points first.
///
/// Returns `true` when a path was traced. When either side filters down to
/// nothing, no canvas call is made at all so no stray path state is left
/// behind.
pub fn create_fill_path<C>(canvas: &mut C, upper: &[RenderPoint], lower: &[RenderPoint]) -> bool
where
    C: Canvas2d + ?Sized,
{
    let upper = filter_valid_render_points(upper);
    let lower = filter_valid_render_points(lower);
    if upper.is_empty() || lower.is_empty() {
        return false;
    }

    canvas.begin_path();
    canvas.move_to(upper[0].x, upper[0].y);
    for point in &upper[1..] {
        canvas.line_to(point.x, point.y);
    }
    for point in lower.iter().rev() {
        canvas.line_to(point.x, point.y);
    }
    canvas.close_path();
    true
}

/// Fills the area between two lines with a solid or gradient style.
pub fn fill_between_lines<C>(
    canvas: &mut C,
    upper: &[RenderPoint],
    lower: &[RenderPoint],
    style: &FillStyle,
) where
    C: Canvas2d + ?Sized,
{
    if create_fill_path(canvas, upper, lower) {
        canvas.set_fill_style(style.clone());
        canvas.fill();
    }
}

/// Fills the area between two lines with a horizontal gradient built from
/// `colored` points; the gradient spans the upper line's plotted extent.
pub fn fill_between_lines_with_gradient<C>(
    canvas: &mut C,
    upper: &[RenderPoint],
    lower: &[RenderPoint],
    colored: &[ColoredRenderPoint],
) where
    C: Canvas2d + ?Sized,
{
    let plotted = filter_valid_render_points(upper);
    let (Some(first), Some(last)) = (plotted.first(), plotted.last()) else {
        return;
    };
    let gradient = LinearGradient {
        x0: first.x,
        y0: 0.0,
        x1: last.x,
        y1: 0.0,
        stops: gradient_stops(colored, first.x, last.x),
    };

    if create_fill_path(canvas, upper, lower) {
        canvas.set_fill_style(FillStyle::Gradient(gradient));
        canvas.fill();
    }
}

/// Maps colored points onto normalized gradient stop positions over
/// `[x_left, x_right]`.
///
/// Out-of-range positions clamp to the `[0, 1]` extremes instead of
/// erroring. Zero usable points yield a fully transparent gradient as a
/// safe default.
#[must_use]
pub fn gradient_stops(
    points: &[ColoredRenderPoint],
    x_left: f64,
    x_right: f64,
) -> Vec<GradientStop> {
    let span = x_right - x_left;
    let mut stops: Vec<GradientStop> = points
        .iter()
        .filter_map(|point| {
            let x = point.x.filter(|value| value.is_finite())?;
            let offset = if span == 0.0 {
                0.0
            } else {
                clamp_unit((x - x_left) / span)
            };
            Some(GradientStop {
                offset,
                color: point.color,
            })
        })
        .collect();

    if stops.is_empty() {
        return vec![
            GradientStop {
                offset: 0.0,
                color: Color::TRANSPARENT,
            },
            GradientStop {
                offset: 1.0,
                color: Color::TRANSPARENT,
            },
        ];
    }

    stops.sort_by_key(|stop| OrderedFloat(stop.offset));
    stops
}

/// Fills an axis-aligned rectangle, skipping degenerate boxes entirely.
pub fn fill_rect_box<C>(canvas: &mut C, x: f64, y: f64, width: f64, height: f64, style: &FillStyle)
where
    C: Canvas2d + ?Sized,
{
    if !(width > 0.0 && height > 0.0 && x.is_finite() && y.is_finite()) {
        return;
    }
    canvas.set_fill_style(style.clone());
    canvas.fill_rect(x, y, width, height);
}

/// Draws one filled quad per consecutive pair of band points, each with its
/// own segment color.
///
/// Segments missing any of their four corners are skipped; the first point's
/// fill color wins, falling back to `fallback`.
pub fn fill_trapezoidal_segments<C>(canvas: &mut C, points: &[BandPoint], fallback: Color)
where
    C: Canvas2d + ?Sized,
{
    let valid = filter_valid_band_points(points);
    for pair in valid.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let (Some(x0), Some(x1)) = (start.x, end.x) else {
            continue;
        };
        let corners = (start.upper_y, end.upper_y, start.lower_y, end.lower_y);
        let (Some(u0), Some(u1), Some(l0), Some(l1)) = corners else {
            continue;
        };
        if ![u0, u1, l0, l1].into_iter().all(is_valid_pixel) {
            continue;
        }

        canvas.begin_path();
        canvas.move_to(x0, u0);
        canvas.line_to(x1, u1);
        canvas.line_to(x1, l1);
        canvas.line_to(x0, l0);
        canvas.close_path();
        canvas.set_fill_style(FillStyle::Solid(start.fill_color.unwrap_or(fallback)));
        canvas.fill();
    }
}
