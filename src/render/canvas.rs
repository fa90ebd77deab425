use crate::error::{OverlayError, OverlayResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> OverlayResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(OverlayError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// One normalized stop of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient between two pixel anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid(Color),
    Gradient(LinearGradient),
}

/// The narrow 2D-context surface the rendering primitives actually use.
///
/// Embedders adapt their drawing target (HTML canvas, cairo, skia) to this
/// trait; the primitives stay backend-agnostic the same way the geometry
/// core stays host-agnostic.
pub trait Canvas2d {
    fn save(&mut self);
    fn restore(&mut self);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_fill_style(&mut self, style: FillStyle);
    fn set_stroke_style(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]);
    fn set_global_alpha(&mut self, alpha: f64);
}

/// Every call a `RecordingCanvas` has observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Fill,
    Stroke,
    FillRect(f64, f64, f64, f64),
    SetFillStyle(FillStyle),
    SetStrokeStyle(Color),
    SetLineWidth(f64),
    SetLineDash(Vec<f64>),
    SetGlobalAlpha(f64),
}

/// Recording backend used by tests and headless usage.
///
/// It captures the full call sequence so tests can assert path construction
/// and state bracketing without a real drawing surface.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    #[must_use]
    pub fn count(&self, matcher: impl Fn(&CanvasOp) -> bool) -> usize {
        self.ops.iter().filter(|op| matcher(op)).count()
    }

    #[must_use]
    pub fn fill_count(&self) -> usize {
        self.count(|op| matches!(op, CanvasOp::Fill))
    }

    #[must_use]
    pub fn begin_path_count(&self) -> usize {
        self.count(|op| matches!(op, CanvasOp::BeginPath))
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.count(|op| matches!(op, CanvasOp::Save))
    }

    #[must_use]
    pub fn restore_count(&self) -> usize {
        self.count(|op| matches!(op, CanvasOp::Restore))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Canvas2d for RecordingCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn begin_path(&mut self) {
        self.ops.push(CanvasOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.ops.push(CanvasOp::ClosePath);
    }

    fn fill(&mut self) {
        self.ops.push(CanvasOp::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(CanvasOp::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(CanvasOp::FillRect(x, y, width, height));
    }

    fn set_fill_style(&mut self, style: FillStyle) {
        self.ops.push(CanvasOp::SetFillStyle(style));
    }

    fn set_stroke_style(&mut self, color: Color) {
        self.ops.push(CanvasOp::SetStrokeStyle(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(CanvasOp::SetLineWidth(width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.ops.push(CanvasOp::SetLineDash(segments.to_vec()));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(CanvasOp::SetGlobalAlpha(alpha));
    }
}
