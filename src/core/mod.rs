mod dimensions;
mod geometry;

pub use dimensions::{
    Adjustments, BoundingBox, ChartCoordinates, ContainerDimensions, ContentArea,
    ContentAreaDimensions, CornerPosition, Margins, OverlayPosition, PaneCoordinates,
    ScaleDimensions, ScalingFactor, ValidationResult,
};
pub use geometry::{
    BarWidthExtensions, calculate_bar_width_extensions, clamp_to_range, clamp_unit,
    datetime_to_unix_seconds, decimal_to_f64, interpolate_y,
};
