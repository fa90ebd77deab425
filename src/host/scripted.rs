use std::cell::{Cell, RefCell};

use crate::core::ContainerDimensions;
use crate::error::{OverlayError, OverlayResult};
use crate::host::{
    HostChart, HostSeries, LogicalRange, PaneSize, PriceScaleSide, SeriesSample, TimeRange,
};

/// Deterministic in-memory host used by tests and headless wiring.
///
/// Every reading the geometry core consumes from a real chart engine is
/// scripted here: container box, scale gutters, pane sizes, visible ranges,
/// linear coordinate conversion, fault injection, and a warm-up gate that
/// keeps the chart "not laid out yet" for the first N probes.
#[derive(Debug, Default)]
pub struct ScriptedChart {
    container: Cell<Option<ContainerDimensions>>,
    time_scale_width: Cell<f64>,
    time_scale_height: Cell<f64>,
    visible_time_range: Cell<Option<TimeRange>>,
    visible_logical_range: Cell<Option<LogicalRange>>,
    price_scale_left_width: Cell<f64>,
    price_scale_right_width: Cell<f64>,
    pane_sizes: RefCell<Vec<PaneSize>>,
    fail_all_calls: Cell<bool>,
    warmup_probes: Cell<u32>,
    probe_count: Cell<u32>,
}

impl ScriptedChart {
    /// Chart with an 800x600 container, a 28px time scale, a 60px right
    /// price scale and a single full-size pane.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        let chart = Self::default();
        chart.set_container(Some(ContainerDimensions::new(width, height, 0.0, 0.0)));
        chart.set_time_scale(width - 60.0, 28.0);
        chart.set_price_scale_widths(0.0, 60.0);
        chart.set_pane_sizes(vec![PaneSize {
            width: width - 60.0,
            height: height - 28.0,
        }]);
        chart.set_visible_time_range(Some(TimeRange {
            from: 1_700_000_000.0,
            to: 1_700_000_600.0,
        }));
        chart.set_visible_logical_range(Some(LogicalRange {
            from: 0.0,
            to: 100.0,
        }));
        chart
    }

    pub fn set_container(&self, container: Option<ContainerDimensions>) {
        self.container.set(container);
    }

    pub fn set_time_scale(&self, width: f64, height: f64) {
        self.time_scale_width.set(width);
        self.time_scale_height.set(height);
    }

    pub fn set_price_scale_widths(&self, left: f64, right: f64) {
        self.price_scale_left_width.set(left);
        self.price_scale_right_width.set(right);
    }

    pub fn set_pane_sizes(&self, sizes: Vec<PaneSize>) {
        *self.pane_sizes.borrow_mut() = sizes;
    }

    pub fn set_visible_time_range(&self, range: Option<TimeRange>) {
        self.visible_time_range.set(range);
    }

    pub fn set_visible_logical_range(&self, range: Option<LogicalRange>) {
        self.visible_logical_range.set(range);
    }

    /// Makes every host call return `Err`, simulating a torn-down chart.
    pub fn fail_all_calls(&self, fail: bool) {
        self.fail_all_calls.set(fail);
    }

    /// Keeps the chart "not laid out yet" for the next `probes` dimension
    /// probes; each probe consumes one unit of warm-up.
    pub fn require_warmup_probes(&self, probes: u32) {
        self.warmup_probes.set(probes);
        self.probe_count.set(0);
    }

    /// Number of dimension probes observed so far.
    #[must_use]
    pub fn probe_count(&self) -> u32 {
        self.probe_count.get()
    }

    fn guard(&self) -> OverlayResult<()> {
        if self.fail_all_calls.get() {
            return Err(OverlayError::HostUnavailable(
                "scripted chart configured to fail".to_owned(),
            ));
        }
        Ok(())
    }

    fn laid_out(&self) -> bool {
        let remaining = self.warmup_probes.get();
        if remaining > 0 {
            self.warmup_probes.set(remaining - 1);
            self.probe_count.set(self.probe_count.get() + 1);
            return false;
        }
        self.probe_count.set(self.probe_count.get() + 1);
        true
    }
}

impl HostChart for ScriptedChart {
    fn container_rect(&self) -> OverlayResult<Option<ContainerDimensions>> {
        self.guard()?;
        if !self.laid_out() {
            return Ok(None);
        }
        Ok(self.container.get())
    }

    fn time_scale_width(&self) -> OverlayResult<f64> {
        self.guard()?;
        if !self.laid_out() {
            return Ok(0.0);
        }
        Ok(self.time_scale_width.get())
    }

    fn time_scale_height(&self) -> OverlayResult<f64> {
        self.guard()?;
        Ok(self.time_scale_height.get())
    }

    fn visible_time_range(&self) -> OverlayResult<Option<TimeRange>> {
        self.guard()?;
        Ok(self.visible_time_range.get())
    }

    fn visible_logical_range(&self) -> OverlayResult<Option<LogicalRange>> {
        self.guard()?;
        Ok(self.visible_logical_range.get())
    }

    fn time_to_coordinate(&self, time: f64) -> OverlayResult<Option<f64>> {
        self.guard()?;
        let Some(range) = self.visible_time_range.get() else {
            return Ok(None);
        };
        if !time.is_finite() || time < range.from || time > range.to || range.to == range.from {
            return Ok(None);
        }
        let normalized = (time - range.from) / (range.to - range.from);
        Ok(Some(normalized * self.time_scale_width.get()))
    }

    fn logical_to_coordinate(&self, logical: f64) -> OverlayResult<Option<f64>> {
        self.guard()?;
        let Some(range) = self.visible_logical_range.get() else {
            return Ok(None);
        };
        if !logical.is_finite()
            || logical < range.from
            || logical > range.to
            || range.to == range.from
        {
            return Ok(None);
        }
        let normalized = (logical - range.from) / (range.to - range.from);
        Ok(Some(normalized * self.time_scale_width.get()))
    }

    fn price_scale_width(&self, side: PriceScaleSide) -> OverlayResult<f64> {
        self.guard()?;
        Ok(match side {
            PriceScaleSide::Left => self.price_scale_left_width.get(),
            PriceScaleSide::Right => self.price_scale_right_width.get(),
        })
    }

    fn pane_count(&self) -> usize {
        self.pane_sizes.borrow().len()
    }

    fn pane_size(&self, pane_index: usize) -> OverlayResult<Option<PaneSize>> {
        self.guard()?;
        Ok(self.pane_sizes.borrow().get(pane_index).copied())
    }
}

/// Scripted series companion for readiness round-trip probes.
#[derive(Debug, Default)]
pub struct ScriptedSeries {
    samples: RefCell<Vec<SeriesSample>>,
    price_range: Cell<(f64, f64)>,
    pane_height: Cell<f64>,
    fail_price_conversion: Cell<bool>,
}

impl ScriptedSeries {
    #[must_use]
    pub fn with_samples(samples: Vec<SeriesSample>, price_min: f64, price_max: f64) -> Self {
        let series = Self::default();
        *series.samples.borrow_mut() = samples;
        series.price_range.set((price_min, price_max));
        series.pane_height.set(572.0);
        series
    }

    pub fn set_pane_height(&self, height: f64) {
        self.pane_height.set(height);
    }

    /// Makes price conversion report "off-scale" regardless of input.
    pub fn fail_price_conversion(&self, fail: bool) {
        self.fail_price_conversion.set(fail);
    }
}

impl HostSeries for ScriptedSeries {
    fn price_to_coordinate(&self, price: f64) -> OverlayResult<Option<f64>> {
        if self.fail_price_conversion.get() {
            return Ok(None);
        }
        let (min, max) = self.price_range.get();
        if !price.is_finite() || max == min {
            return Ok(None);
        }
        let normalized = (price - min) / (max - min);
        // Canvas origin is top-left: larger prices map to smaller y.
        Ok(Some((1.0 - normalized) * self.pane_height.get()))
    }

    fn sample_count(&self) -> usize {
        self.samples.borrow().len()
    }

    fn sample_at(&self, index: usize) -> Option<SeriesSample> {
        self.samples.borrow().get(index).copied()
    }
}
