use serde::{Deserialize, Serialize};

/// Raw container box as reported by the host, in media (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ContainerDimensions {
    pub width: f64,
    pub height: f64,
    pub offset_top: f64,
    pub offset_left: f64,
}

impl ContainerDimensions {
    #[must_use]
    pub fn new(width: f64, height: f64, offset_top: f64, offset_left: f64) -> Self {
        Self {
            width,
            height,
            offset_top,
            offset_left,
        }
    }

    #[must_use]
    pub fn meets_minimum(self, min_width: f64, min_height: f64) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= min_width
            && self.height >= min_height
    }
}

/// Pixel rectangle of the time scale or one price scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScaleDimensions {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The plotting rectangle of the whole chart, excluding scale gutters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentAreaDimensions {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Generic pixel rectangle used for positioning checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Pane-local plotting rectangle after margins are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentArea {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Pixel geometry of one pane within the stacked multi-pane layout.
///
/// `y`/`absolute_y` is the cumulative vertical offset of this pane: pane N's
/// `y` equals the sum of heights of panes `0..N`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneCoordinates {
    pub pane_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub absolute_x: f64,
    pub absolute_y: f64,
    pub content_area: ContentArea,
    pub margins: Margins,
    pub is_main_pane: bool,
    pub is_last_pane: bool,
}

/// Aggregate geometry snapshot for one chart.
///
/// Snapshots are immutable once produced; every recomputation allocates a
/// fresh one. `captured_at` is unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartCoordinates {
    pub container: ContainerDimensions,
    pub time_scale: ScaleDimensions,
    pub price_scale_left: ScaleDimensions,
    pub price_scale_right: ScaleDimensions,
    pub panes: Vec<PaneCoordinates>,
    pub content_area: ContentAreaDimensions,
    pub captured_at: f64,
    pub is_valid: bool,
}

/// Minimal translation that would bring an element fully inside its container.
///
/// Positive `x` shifts right, positive `y` shifts down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Adjustments {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub adjustments: Adjustments,
    pub violations: Vec<String>,
}

/// The four literal anchor corners overlays can be docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Extended position vocabulary accepted from overlay configuration.
///
/// Centered positions have no corner of their own and collapse onto a corner
/// deterministically; see `CoordinateService::position_to_corner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    TopCenter,
    BottomCenter,
}

/// Axis scaling factors between two boxes, plus the preserve-aspect factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingFactor {
    pub x: f64,
    pub y: f64,
    pub uniform: f64,
}
