//! overlay-geometry: pixel-coordinate geometry engine for chart overlays.
//!
//! Converts time/price domain values into exact bitmap pixel positions
//! across multiple panes, price scales and device-pixel ratios, on top of a
//! Lightweight-Charts-style host engine. The host is consumed behind a
//! narrow trait; overlay primitives draw through an equally narrow canvas
//! trait, so the core stays framework- and backend-agnostic.

pub mod core;
pub mod error;
pub mod host;
pub mod readiness;
pub mod render;
pub mod service;
pub mod telemetry;

pub use error::{OverlayError, OverlayResult};
pub use readiness::{CancelToken, ReadinessConfig, ReadinessDetector};
pub use service::{ChartId, CoordinateRequest, CoordinateService};
