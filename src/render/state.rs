use smallvec::{SmallVec, smallvec};

use crate::error::OverlayResult;
use crate::render::canvas::{Canvas2d, Color};

/// Dash vocabulary for overlay strokes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LineDash {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Custom(Vec<f64>),
}

impl LineDash {
    /// Canvas dash segments; empty means solid.
    #[must_use]
    pub fn segments(&self) -> SmallVec<[f64; 4]> {
        match self {
            Self::Solid => SmallVec::new(),
            Self::Dashed => smallvec![4.0, 2.0],
            Self::Dotted => smallvec![1.0, 2.0],
            Self::Custom(segments) => SmallVec::from_slice(segments),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: LineDash,
    pub alpha: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.0, 0.0, 0.0),
            width: 1.0,
            dash: LineDash::Solid,
            alpha: 1.0,
        }
    }
}

/// Applies stroke color, width, dash pattern and alpha in one call.
pub fn apply_line_style<C>(canvas: &mut C, style: &LineStyle)
where
    C: Canvas2d + ?Sized,
{
    canvas.set_stroke_style(style.color);
    canvas.set_line_width(style.width);
    canvas.set_line_dash(&style.dash.segments());
    canvas.set_global_alpha(style.alpha);
}

/// Runs `f` between `save()` and `restore()`.
///
/// `restore()` runs on the error path too, and the callback's error
/// propagates to the caller afterwards.
pub fn with_saved_state<C, T>(
    canvas: &mut C,
    f: impl FnOnce(&mut C) -> OverlayResult<T>,
) -> OverlayResult<T>
where
    C: Canvas2d + ?Sized,
{
    canvas.save();
    let result = f(canvas);
    canvas.restore();
    result
}
