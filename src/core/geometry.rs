use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{OverlayError, OverlayResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> OverlayResult<f64> {
    value.to_f64().ok_or_else(|| {
        OverlayError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Linear interpolation of `y` at `x` between `(x0, y0)` and `(x1, y1)`.
///
/// Exact at both endpoints. The degenerate case `x1 == x0` returns `y0`
/// rather than dividing by zero.
#[must_use]
pub fn interpolate_y(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[must_use]
pub fn clamp_to_range(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

/// Clamps a gradient stop offset into `[0, 1]`, mapping non-finite input to `0`.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    clamp_to_range(value, 0.0, 1.0)
}

/// Signed whole-device-pixel extensions past the first and last plotted bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarWidthExtensions {
    pub extend_start: f64,
    pub extend_end: f64,
}

/// Computes how far a line or fill must extend past its first and last bar
/// so that it visually spans half a bar width on each side, snapped to whole
/// device pixels.
///
/// `first_x`/`last_x` are bitmap (device) pixels; `bar_spacing` is in media
/// (CSS) pixels; `h_ratio` is the horizontal device pixel ratio.
///
/// The target edge is computed in media pixels and only then rounded back in
/// bitmap space. Rounding before scaling misaligns fills on high-DPI
/// displays by up to one device pixel.
#[must_use]
pub fn calculate_bar_width_extensions(
    first_x: f64,
    last_x: f64,
    bar_spacing: f64,
    h_ratio: f64,
) -> BarWidthExtensions {
    if !first_x.is_finite() || !last_x.is_finite() || !bar_spacing.is_finite() || h_ratio <= 0.0 {
        return BarWidthExtensions {
            extend_start: 0.0,
            extend_end: 0.0,
        };
    }

    let half_bar_spacing = bar_spacing / 2.0;

    let start_target_media = first_x / h_ratio - half_bar_spacing;
    let start_target_bitmap = (start_target_media * h_ratio).round();
    let extend_start = first_x - start_target_bitmap;

    let end_target_media = last_x / h_ratio + half_bar_spacing;
    let end_target_bitmap = (end_target_media * h_ratio).round();
    let extend_end = end_target_bitmap - last_x;

    BarWidthExtensions {
        extend_start,
        extend_end,
    }
}

#[cfg(test)]
mod tests {
    use super::{calculate_bar_width_extensions, clamp_unit, interpolate_y};

    #[test]
    fn interpolation_is_exact_at_endpoints() {
        assert_eq!(interpolate_y(0.0, 0.0, 50.0, 10.0, 100.0), 50.0);
        assert_eq!(interpolate_y(10.0, 0.0, 50.0, 10.0, 100.0), 100.0);
        assert_eq!(interpolate_y(5.0, 0.0, 0.0, 10.0, 100.0), 50.0);
    }

    #[test]
    fn interpolation_degenerate_span_returns_first_value() {
        assert_eq!(interpolate_y(3.0, 3.0, 42.0, 3.0, 99.0), 42.0);
    }

    #[test]
    fn bar_width_extensions_snap_to_whole_device_pixels() {
        let retina = calculate_bar_width_extensions(100.0, 200.0, 6.0, 2.0);
        assert_eq!(retina.extend_start, 6.0);
        assert_eq!(retina.extend_end, 6.0);

        let standard = calculate_bar_width_extensions(100.0, 200.0, 6.0, 1.0);
        assert_eq!(standard.extend_start, 3.0);
        assert_eq!(standard.extend_end, 3.0);
    }

    #[test]
    fn bar_width_extensions_round_asymmetrically_on_half_pixels() {
        let odd = calculate_bar_width_extensions(100.0, 200.0, 7.0, 1.0);
        assert_eq!(odd.extend_start, 3.0);
        assert_eq!(odd.extend_end, 4.0);
    }

    #[test]
    fn bar_width_extensions_reject_degenerate_input() {
        let out = calculate_bar_width_extensions(f64::NAN, 200.0, 6.0, 2.0);
        assert_eq!(out.extend_start, 0.0);
        assert_eq!(out.extend_end, 0.0);

        let out = calculate_bar_width_extensions(100.0, 200.0, 6.0, 0.0);
        assert_eq!(out.extend_start, 0.0);
        assert_eq!(out.extend_end, 0.0);
    }

    #[test]
    fn clamp_unit_handles_non_finite_input() {
        assert_eq!(clamp_unit(0.5), 0.5);
        assert_eq!(clamp_unit(-2.0), 0.0);
        assert_eq!(clamp_unit(2.0), 1.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }
}
