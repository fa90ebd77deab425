mod canvas;
mod paths;
mod points;
mod state;

pub use canvas::{
    Canvas2d, CanvasOp, Color, FillStyle, GradientStop, LinearGradient, RecordingCanvas,
};
pub use paths::{
    create_fill_path, fill_between_lines, fill_between_lines_with_gradient, fill_rect_box,
    fill_trapezoidal_segments, gradient_stops,
};
pub use points::{
    BandPoint, COORDINATE_SENTINEL, ColoredRenderPoint, PixelPoint, RenderPoint, VisibleRange,
    calculate_visible_range, filter_valid_band_points, filter_valid_render_points,
    is_valid_coordinate, is_valid_pixel, is_valid_render_point,
};
pub use state::{LineDash, LineStyle, apply_line_style, with_saved_state};
