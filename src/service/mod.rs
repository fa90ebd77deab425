//! Single source of truth for "where is pane N, its scales, and its content
//! area, in pixels".
//!
//! The service is an explicit object constructed at application wiring time
//! and passed by reference to every overlay primitive; per-test isolation is
//! a fresh instance, not a singleton reset.

mod cache;

pub use cache::{ChartId, CoordinateCacheEntry, DEFAULT_CACHE_TTL, derive_cache_key};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::{
    Adjustments, BoundingBox, ChartCoordinates, ContainerDimensions, ContentArea,
    ContentAreaDimensions, CornerPosition, Margins, OverlayPosition, PaneCoordinates,
    ScaleDimensions, ScalingFactor, ValidationResult, datetime_to_unix_seconds,
};
use crate::error::OverlayResult;
use crate::host::{HostChart, PriceScaleSide};
use crate::readiness::{CancelToken, ReadinessDetector};

/// Options for one snapshot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateRequest {
    pub include_margins: bool,
    pub use_cache: bool,
    pub validate_result: bool,
    pub fallback_on_error: bool,
}

impl Default for CoordinateRequest {
    fn default() -> Self {
        Self {
            include_margins: false,
            use_cache: true,
            validate_result: true,
            fallback_on_error: true,
        }
    }
}

/// Handle for one coordinate-update subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type CoordinateListener = Box<dyn FnMut(&ChartCoordinates)>;

pub struct CoordinateService {
    cache: IndexMap<ChartId, CoordinateCacheEntry>,
    registered: IndexMap<ChartId, f64>,
    listeners: IndexMap<ChartId, Vec<(SubscriptionId, CoordinateListener)>>,
    next_subscription: u64,
    ttl: Duration,
    content_margins: Margins,
    detector: ReadinessDetector,
}

impl Default for CoordinateService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoordinateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateService")
            .field("cached_charts", &self.cache.len())
            .field("registered_charts", &self.registered.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CoordinateService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: IndexMap::new(),
            registered: IndexMap::new(),
            listeners: IndexMap::new(),
            next_subscription: 0,
            ttl: DEFAULT_CACHE_TTL,
            content_margins: Margins::ZERO,
            detector: ReadinessDetector::default(),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_content_margins(mut self, margins: Margins) -> Self {
        self.content_margins = margins;
        self
    }

    #[must_use]
    pub fn with_detector(mut self, detector: ReadinessDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Pixel geometry of one pane, or `None` when the host reports no size
    /// for that pane.
    ///
    /// `y`/`absolute_y` is the running sum of the preceding panes' heights;
    /// pane 0 sits at `y = 0`.
    #[must_use]
    pub fn pane_coordinates<C>(&self, chart: &C, pane_index: usize) -> Option<PaneCoordinates>
    where
        C: HostChart + ?Sized,
    {
        let size = chart.pane_size(pane_index).ok().flatten()?;

        let mut y = 0.0;
        for preceding in 0..pane_index {
            if let Ok(Some(preceding_size)) = chart.pane_size(preceding) {
                y += preceding_size.height;
            }
        }

        let left_gutter = chart
            .price_scale_width(PriceScaleSide::Left)
            .unwrap_or(0.0);
        let container = chart.container_rect().ok().flatten().unwrap_or_default();

        let margins = self.content_margins;
        Some(PaneCoordinates {
            pane_index,
            x: left_gutter,
            y,
            width: size.width,
            height: size.height,
            absolute_x: container.offset_left + left_gutter,
            absolute_y: container.offset_top + y,
            content_area: ContentArea {
                top: margins.top,
                left: margins.left,
                width: (size.width - margins.left - margins.right).max(0.0),
                height: (size.height - margins.top - margins.bottom).max(0.0),
            },
            margins,
            is_main_pane: pane_index == 0,
            is_last_pane: pane_index + 1 == chart.pane_count(),
        })
    }

    /// The pane's rectangle including the price-scale gutters on both sides.
    #[must_use]
    pub fn full_pane_bounds<C>(&self, chart: &C, pane_index: usize) -> Option<BoundingBox>
    where
        C: HostChart + ?Sized,
    {
        let pane = self.pane_coordinates(chart, pane_index)?;
        let left_gutter = chart
            .price_scale_width(PriceScaleSide::Left)
            .unwrap_or(0.0);
        let right_gutter = chart
            .price_scale_width(PriceScaleSide::Right)
            .unwrap_or(0.0);
        Some(BoundingBox::new(
            0.0,
            pane.y,
            left_gutter + pane.width + right_gutter,
            pane.height,
        ))
    }

    /// Full coordinate snapshot for `chart`, cached under `chart_id`.
    ///
    /// A non-expired cache entry is returned as-is (same `Arc`, no host
    /// calls). Otherwise the host is swept once, synchronously, so the
    /// snapshot is internally consistent; the only suspension point is the
    /// readiness gate ahead of the sweep. Host errors degrade to a
    /// best-effort snapshot marked `is_valid: false` when
    /// `fallback_on_error` is set, and propagate otherwise.
    pub async fn coordinates<C>(
        &mut self,
        chart: &C,
        chart_id: &ChartId,
        container_id: &str,
        request: CoordinateRequest,
    ) -> OverlayResult<Arc<ChartCoordinates>>
    where
        C: HostChart + ?Sized,
    {
        if request.use_cache
            && let Some(entry) = self.cache.get(chart_id)
            && !entry.is_expired()
        {
            trace!(chart_id = %entry.chart_id, "coordinate cache hit");
            return Ok(Arc::clone(&entry.coordinates));
        }

        let ready = self
            .detector
            .wait_for_dimensions(chart, &CancelToken::default())
            .await;
        if !ready {
            debug!(chart_id = %chart_id, "computing snapshot before dimensions became ready");
        }

        self.compute_and_store(chart, chart_id, container_id, request)
    }

    /// Synchronous recompute used by `coordinates` after the readiness gate
    /// and by `force_refresh_coordinates`.
    fn compute_and_store<C>(
        &mut self,
        chart: &C,
        chart_id: &ChartId,
        container_id: &str,
        request: CoordinateRequest,
    ) -> OverlayResult<Arc<ChartCoordinates>>
    where
        C: HostChart + ?Sized,
    {
        let margins = if request.include_margins {
            self.content_margins
        } else {
            Margins::ZERO
        };

        let mut snapshot = match compute_snapshot(chart, margins) {
            Ok(snapshot) => snapshot,
            Err(error) if request.fallback_on_error => {
                warn!(chart_id = %chart_id, %error, "host sweep failed, returning invalid snapshot");
                invalid_snapshot()
            }
            Err(error) => return Err(error),
        };

        if request.validate_result && !Self::dimensions_valid(&snapshot) {
            snapshot.is_valid = false;
        }

        let coordinates = Arc::new(snapshot);
        if request.use_cache {
            self.cache.insert(
                chart_id.clone(),
                CoordinateCacheEntry::new(
                    Arc::clone(&coordinates),
                    chart_id.clone(),
                    container_id,
                    self.ttl,
                ),
            );
        }
        Ok(coordinates)
    }

    /// A snapshot is usable iff the content area stays strictly positive
    /// after the scale gutters are subtracted.
    #[must_use]
    pub fn dimensions_valid(coordinates: &ChartCoordinates) -> bool {
        coordinates.content_area.width > 0.0
            && coordinates.content_area.height > 0.0
            && coordinates.content_area.width.is_finite()
            && coordinates.content_area.height.is_finite()
    }

    /// Lightweight container-only check for synchronous fast paths that
    /// have no full snapshot. `None` is invalid.
    #[must_use]
    pub fn dimensions_object_valid(
        dimensions: Option<&ContainerDimensions>,
        min_width: f64,
        min_height: f64,
    ) -> bool {
        dimensions.is_some_and(|dims| dims.meets_minimum(min_width, min_height))
    }

    /// Pane-local half-open containment: `[0, width) x [0, height)`.
    ///
    /// Callers holding absolute chart coordinates must translate into the
    /// pane's local origin first.
    #[must_use]
    pub fn is_point_in_pane(x: f64, y: f64, pane: &PaneCoordinates) -> bool {
        x >= 0.0 && x < pane.width && y >= 0.0 && y < pane.height
    }

    /// Registers a chart id, always invalidating any cache entry held under
    /// it first. Reusing an id for a new chart instance must never serve the
    /// old instance's geometry.
    pub fn register_chart(&mut self, chart_id: ChartId) {
        self.invalidate_cache(Some(&chart_id));
        debug!(chart_id = %chart_id, "chart registered");
        self.registered
            .insert(chart_id, datetime_to_unix_seconds(Utc::now()));
    }

    pub fn unregister_chart(&mut self, chart_id: &ChartId) {
        self.invalidate_cache(Some(chart_id));
        self.registered.shift_remove(chart_id);
        self.listeners.shift_remove(chart_id);
        debug!(chart_id = %chart_id, "chart unregistered");
    }

    #[must_use]
    pub fn is_registered(&self, chart_id: &ChartId) -> bool {
        self.registered.contains_key(chart_id)
    }

    /// Drops one chart's cache entry, or every entry when `chart_id` is
    /// `None`.
    pub fn invalidate_cache(&mut self, chart_id: Option<&ChartId>) {
        match chart_id {
            Some(chart_id) => {
                if self.cache.shift_remove(chart_id).is_some() {
                    trace!(chart_id = %chart_id, "cache entry invalidated");
                }
            }
            None => {
                let dropped = self.cache.len();
                self.cache.clear();
                trace!(dropped, "coordinate cache cleared");
            }
        }
    }

    #[must_use]
    pub fn cached_entry(&self, chart_id: &ChartId) -> Option<&CoordinateCacheEntry> {
        self.cache.get(chart_id).filter(|entry| !entry.is_expired())
    }

    /// Registers a listener invoked on every forced refresh of `chart_id`.
    pub fn on_coordinate_update(
        &mut self,
        chart_id: ChartId,
        callback: impl FnMut(&ChartCoordinates) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners
            .entry(chart_id)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription; returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        for (_, listeners) in &mut self.listeners {
            if let Some(index) = listeners.iter().position(|(id, _)| *id == subscription) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    /// Recomputes the snapshot, replaces the cache entry, and notifies the
    /// chart's subscribers.
    pub fn force_refresh_coordinates<C>(
        &mut self,
        chart: &C,
        chart_id: &ChartId,
        container_id: &str,
    ) -> OverlayResult<Arc<ChartCoordinates>>
    where
        C: HostChart + ?Sized,
    {
        self.invalidate_cache(Some(chart_id));
        let coordinates =
            self.compute_and_store(chart, chart_id, container_id, CoordinateRequest::default())?;

        if let Some(listeners) = self.listeners.get_mut(chart_id) {
            for (_, listener) in listeners {
                listener(&coordinates);
            }
        }
        Ok(coordinates)
    }

    /// Collapses the extended position vocabulary onto the four anchor
    /// corners. Centered positions dock deterministically to the right.
    #[must_use]
    pub fn position_to_corner(position: OverlayPosition) -> CornerPosition {
        match position {
            OverlayPosition::TopLeft => CornerPosition::TopLeft,
            OverlayPosition::TopRight
            | OverlayPosition::Center
            | OverlayPosition::TopCenter => CornerPosition::TopRight,
            OverlayPosition::BottomLeft => CornerPosition::BottomLeft,
            OverlayPosition::BottomRight | OverlayPosition::BottomCenter => {
                CornerPosition::BottomRight
            }
        }
    }

    /// Per-axis scaling between two boxes plus the preserve-aspect factor.
    #[must_use]
    pub fn scaling_factor(
        from_width: f64,
        from_height: f64,
        to_width: f64,
        to_height: f64,
    ) -> ScalingFactor {
        let axis = |from: f64, to: f64| {
            if from > 0.0 && from.is_finite() && to.is_finite() {
                to / from
            } else {
                0.0
            }
        };
        let x = axis(from_width, to_width);
        let y = axis(from_height, to_height);
        ScalingFactor {
            x,
            y,
            uniform: x.min(y),
        }
    }

    /// Checks an element against its container and reports the minimal
    /// translation that would bring it fully inside.
    ///
    /// Positive adjustments shift right/down. An element larger than the
    /// container reports both edges and aligns to the container's near edge.
    #[must_use]
    pub fn validate_positioning(element: BoundingBox, container: BoundingBox) -> ValidationResult {
        let mut violations = Vec::new();
        let mut adjustments = Adjustments::default();

        if element.x < container.x {
            violations.push("element protrudes past the left edge".to_owned());
        }
        if element.right() > container.right() {
            violations.push("element protrudes past the right edge".to_owned());
        }
        if element.x < container.x {
            adjustments.x = container.x - element.x;
        } else if element.right() > container.right() {
            adjustments.x = container.right() - element.right();
        }

        if element.y < container.y {
            violations.push("element protrudes past the top edge".to_owned());
        }
        if element.bottom() > container.bottom() {
            violations.push("element protrudes past the bottom edge".to_owned());
        }
        if element.y < container.y {
            adjustments.y = container.y - element.y;
        } else if element.bottom() > container.bottom() {
            adjustments.y = container.bottom() - element.bottom();
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            adjustments,
            violations,
        }
    }
}

/// One synchronous sweep over every host dimension read.
///
/// No await happens between the first and last read, so the snapshot cannot
/// interleave with a host resize; a resize arriving afterwards is visible on
/// the next computation only.
fn compute_snapshot<C>(chart: &C, margins: Margins) -> OverlayResult<ChartCoordinates>
where
    C: HostChart + ?Sized,
{
    let container = chart.container_rect()?.unwrap_or_default();
    let time_scale_width = chart.time_scale_width()?;
    let time_scale_height = chart.time_scale_height()?;
    let left_gutter = chart.price_scale_width(PriceScaleSide::Left)?;
    let right_gutter = chart.price_scale_width(PriceScaleSide::Right)?;

    let pane_count = chart.pane_count();
    let mut panes = Vec::with_capacity(pane_count);
    let mut cursor = 0.0;
    for pane_index in 0..pane_count {
        let Some(size) = chart.pane_size(pane_index)? else {
            continue;
        };
        panes.push(PaneCoordinates {
            pane_index,
            x: left_gutter,
            y: cursor,
            width: size.width,
            height: size.height,
            absolute_x: container.offset_left + left_gutter,
            absolute_y: container.offset_top + cursor,
            content_area: ContentArea {
                top: margins.top,
                left: margins.left,
                width: (size.width - margins.left - margins.right).max(0.0),
                height: (size.height - margins.top - margins.bottom).max(0.0),
            },
            margins,
            is_main_pane: pane_index == 0,
            is_last_pane: pane_index + 1 == pane_count,
        });
        cursor += size.height;
    }

    let plot_height = (container.height - time_scale_height).max(0.0);
    Ok(ChartCoordinates {
        container,
        time_scale: ScaleDimensions {
            x: left_gutter,
            y: cursor,
            width: time_scale_width,
            height: time_scale_height,
        },
        price_scale_left: ScaleDimensions {
            x: 0.0,
            y: 0.0,
            width: left_gutter,
            height: plot_height,
        },
        price_scale_right: ScaleDimensions {
            x: (container.width - right_gutter).max(0.0),
            y: 0.0,
            width: right_gutter,
            height: plot_height,
        },
        content_area: ContentAreaDimensions {
            x: left_gutter,
            y: 0.0,
            width: (container.width - left_gutter - right_gutter).max(0.0),
            height: plot_height,
        },
        panes,
        captured_at: datetime_to_unix_seconds(Utc::now()),
        is_valid: true,
    })
}

fn invalid_snapshot() -> ChartCoordinates {
    ChartCoordinates {
        container: ContainerDimensions::default(),
        time_scale: ScaleDimensions::default(),
        price_scale_left: ScaleDimensions::default(),
        price_scale_right: ScaleDimensions::default(),
        panes: Vec::new(),
        content_area: ContentAreaDimensions::default(),
        captured_at: datetime_to_unix_seconds(Utc::now()),
        is_valid: false,
    }
}
