//! Narrow contract over the host charting engine.
//!
//! The geometry core calls only a handful of host methods; this trait pins
//! that surface down so the core compiles against a stable boundary instead
//! of the full third-party chart API. Host failures surface as `Err`,
//! legitimately absent values as `Ok(None)`.

mod scripted;

pub use scripted::{ScriptedChart, ScriptedSeries};

use crate::core::ContainerDimensions;
use crate::error::OverlayResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceScaleSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneSize {
    pub width: f64,
    pub height: f64,
}

/// Visible time span of the host time scale, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub from: f64,
    pub to: f64,
}

impl TimeRange {
    #[must_use]
    pub fn midpoint(self) -> f64 {
        (self.from + self.to) / 2.0
    }
}

/// Visible logical (bar-index) span of the host time scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

/// One sample of an attached series, used for readiness round-trip probes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSample {
    pub time: f64,
    pub value: f64,
}

pub trait HostChart {
    /// Bounding box of the chart container, when the host can report one.
    fn container_rect(&self) -> OverlayResult<Option<ContainerDimensions>>;

    fn time_scale_width(&self) -> OverlayResult<f64>;
    fn time_scale_height(&self) -> OverlayResult<f64>;

    fn visible_time_range(&self) -> OverlayResult<Option<TimeRange>>;
    fn visible_logical_range(&self) -> OverlayResult<Option<LogicalRange>>;

    /// Converts a time value to an x pixel; `None` when off-scale.
    fn time_to_coordinate(&self, time: f64) -> OverlayResult<Option<f64>>;

    /// Converts a logical bar index to an x pixel; `None` when off-scale.
    fn logical_to_coordinate(&self, logical: f64) -> OverlayResult<Option<f64>>;

    fn price_scale_width(&self, side: PriceScaleSide) -> OverlayResult<f64>;

    fn pane_count(&self) -> usize;

    /// Pixel size of one pane; `None` when the host has not laid it out yet
    /// or the index is out of range.
    fn pane_size(&self, pane_index: usize) -> OverlayResult<Option<PaneSize>>;
}

pub trait HostSeries {
    /// Converts a price to a pane-local y pixel; `None` when off-scale.
    fn price_to_coordinate(&self, price: f64) -> OverlayResult<Option<f64>>;

    fn sample_count(&self) -> usize;

    fn sample_at(&self, index: usize) -> Option<SeriesSample>;
}
