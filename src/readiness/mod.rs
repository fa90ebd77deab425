//! Readiness gating for host coordinate reads.
//!
//! Freshly mounted charts report zero-sized containers and off-scale
//! conversions for a few frames. Nothing in the geometry core may trust a
//! coordinate read until one of the probes here succeeds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;

use crate::host::{HostChart, HostSeries};

/// Price probed through the series when it has no data of its own.
const PLACEHOLDER_PROBE_PRICE: f64 = 1.0;

/// Clonable cooperative cancellation flag for the retry loops.
///
/// The default token never cancels, so fire-and-forget callers keep
/// run-until-exhaustion semantics; callers that abandon a pending wait can
/// cancel their clone and the loop stops at the next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Tuning for one readiness retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_jitter: Duration,
    pub min_width: f64,
    pub min_height: f64,
}

impl ReadinessConfig {
    /// Defaults for "does the chart have a usable bounding box" checks.
    #[must_use]
    pub fn dimension() -> Self {
        Self {
            max_attempts: 15,
            base_delay: Duration::from_millis(50),
            backoff_factor: 1.5,
            max_jitter: Duration::from_millis(50),
            min_width: 100.0,
            min_height: 100.0,
        }
    }

    /// Defaults for "is it safe to attach a primitive and convert
    /// coordinates" checks. More attempts, gentler backoff.
    #[must_use]
    pub fn primitive() -> Self {
        Self {
            max_attempts: 30,
            backoff_factor: 1.2,
            ..Self::dimension()
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self::dimension()
    }
}

/// Polls the host through fallback strategies until coordinate reads are
/// trustworthy, with exponential backoff between attempts.
#[derive(Debug, Clone)]
pub struct ReadinessDetector {
    config: ReadinessConfig,
}

impl Default for ReadinessDetector {
    fn default() -> Self {
        Self::new(ReadinessConfig::dimension())
    }
}

impl ReadinessDetector {
    #[must_use]
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> ReadinessConfig {
        self.config
    }

    /// Retries until the chart reports a non-trivial bounding box.
    ///
    /// Resolves `false` on exhaustion or cancellation, never an error.
    pub async fn wait_for_dimensions<C>(&self, chart: &C, cancel: &CancelToken) -> bool
    where
        C: HostChart + ?Sized,
    {
        for attempt in 0..self.config.max_attempts {
            if cancel.is_cancelled() {
                debug!(attempt, "dimension readiness wait cancelled");
                return false;
            }
            if self.dimensions_ready_now(chart) {
                return true;
            }
            sleep(self.backoff_delay(attempt)).await;
        }
        debug!(
            max_attempts = self.config.max_attempts,
            "dimension readiness attempts exhausted"
        );
        false
    }

    /// Retries until dimensions are ready, the time scale has a visible
    /// range, and a representative round-trip conversion succeeds.
    pub async fn wait_for_primitive<C, S>(&self, chart: &C, series: &S, cancel: &CancelToken) -> bool
    where
        C: HostChart + ?Sized,
        S: HostSeries + ?Sized,
    {
        for attempt in 0..self.config.max_attempts {
            if cancel.is_cancelled() {
                debug!(attempt, "primitive readiness wait cancelled");
                return false;
            }
            if self.primitive_ready_now(chart, series) {
                return true;
            }
            sleep(self.backoff_delay(attempt)).await;
        }
        debug!(
            max_attempts = self.config.max_attempts,
            "primitive readiness attempts exhausted"
        );
        false
    }

    /// One synchronous pass of the dimension strategies, no retry.
    ///
    /// For call sites that cannot await: chart API first, container
    /// bounding box as fallback.
    #[must_use]
    pub fn dimensions_ready_now<C>(&self, chart: &C) -> bool
    where
        C: HostChart + ?Sized,
    {
        if self.probe_chart_api(chart) {
            return true;
        }
        self.probe_container_rect(chart)
    }

    /// One synchronous pass of the primitive-attachment strategies.
    #[must_use]
    pub fn primitive_ready_now<C, S>(&self, chart: &C, series: &S) -> bool
    where
        C: HostChart + ?Sized,
        S: HostSeries + ?Sized,
    {
        if !self.dimensions_ready_now(chart) {
            return false;
        }

        match chart.visible_time_range() {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("primitive probe: no visible time range yet");
                return false;
            }
            Err(error) => {
                debug!(%error, "primitive probe: visible range read failed");
                return false;
            }
        }

        self.round_trip_converts(chart, series)
    }

    fn probe_chart_api<C>(&self, chart: &C) -> bool
    where
        C: HostChart + ?Sized,
    {
        let width = match chart.time_scale_width() {
            Ok(width) => width,
            Err(error) => {
                debug!(%error, strategy = "chart-api", "dimension probe failed");
                return false;
            }
        };

        let pane_height = match chart.pane_size(0) {
            Ok(Some(size)) => size.height,
            Ok(None) => 0.0,
            Err(error) => {
                debug!(%error, strategy = "chart-api", "pane size probe failed");
                return false;
            }
        };
        let time_scale_height = match chart.time_scale_height() {
            Ok(height) => height,
            Err(error) => {
                debug!(%error, strategy = "chart-api", "time scale height probe failed");
                return false;
            }
        };

        let height = pane_height + time_scale_height;
        width.is_finite()
            && height.is_finite()
            && width >= self.config.min_width
            && height >= self.config.min_height
    }

    fn probe_container_rect<C>(&self, chart: &C) -> bool
    where
        C: HostChart + ?Sized,
    {
        match chart.container_rect() {
            Ok(Some(rect)) => rect.meets_minimum(self.config.min_width, self.config.min_height),
            Ok(None) => false,
            Err(error) => {
                debug!(%error, strategy = "container-rect", "dimension probe failed");
                false
            }
        }
    }

    /// Round-trip conversion at a representative point.
    ///
    /// Prefers the middle element of the series data; synthetic probe values
    /// ahead of the data would hit time-scale extrapolation artifacts. An
    /// empty series falls back to the visible-range midpoint and a
    /// placeholder price.
    fn round_trip_converts<C, S>(&self, chart: &C, series: &S) -> bool
    where
        C: HostChart + ?Sized,
        S: HostSeries + ?Sized,
    {
        let (probe_time, probe_price) = match series.sample_at(series.sample_count() / 2) {
            Some(sample) => (sample.time, sample.value),
            None => {
                let Ok(Some(range)) = chart.visible_time_range() else {
                    return false;
                };
                (range.midpoint(), PLACEHOLDER_PROBE_PRICE)
            }
        };

        match chart.time_to_coordinate(probe_time) {
            Ok(Some(x)) if x.is_finite() => {}
            Ok(_) => {
                debug!(probe_time, "primitive probe: time conversion off-scale");
                return false;
            }
            Err(error) => {
                debug!(%error, "primitive probe: time conversion failed");
                return false;
            }
        }

        if let Ok(Some(logical)) = chart.visible_logical_range() {
            let mid_logical = (logical.from + logical.to) / 2.0;
            match chart.logical_to_coordinate(mid_logical) {
                Ok(Some(x)) if x.is_finite() => {}
                Ok(_) => {
                    debug!(mid_logical, "primitive probe: logical conversion off-scale");
                    return false;
                }
                Err(error) => {
                    debug!(%error, "primitive probe: logical conversion failed");
                    return false;
                }
            }
        }

        match series.price_to_coordinate(probe_price) {
            Ok(Some(y)) if y.is_finite() => true,
            Ok(_) => {
                debug!(probe_price, "primitive probe: price conversion off-scale");
                false
            }
            Err(error) => {
                debug!(%error, "primitive probe: price conversion failed");
                false
            }
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential =
            self.config.base_delay.as_secs_f64() * self.config.backoff_factor.powi(attempt as i32);
        let jitter = self.config.max_jitter.mul_f64(jitter_fraction());
        Duration::from_secs_f64(exponential.max(0.0)) + jitter
    }
}

/// Decorrelation fraction in `[0, 1)` from the clock's sub-millisecond bits.
fn jitter_fraction() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1_000_000) / 1_000_000.0
}
