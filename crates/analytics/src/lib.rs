//! # SojaMetrics Analytics Engine
//!
//! This crate provides the derived metrics behind the dashboard sections:
//! year-over-year deltas for the KPI cards, rolling trends for the supply
//! and demand panels, and Pearson correlations for the price-driver cards.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** this is a pure logic crate. It has no knowledge of
//!   files or HTTP. It depends only on `core-types`.
//! - **Stateless Calculation:** the `MetricsEngine` takes slices in and
//!   produces report structs out, which makes it reliable and easy to test.
//! - **Fail fast:** degenerate statistics (zero denominator, constant
//!   series) are explicit errors, never silently propagated non-finite
//!   values.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{MetricsEngine, TREND_WINDOW};
pub use error::AnalyticsError;
pub use report::{CorrelationCard, KpiCard, SeriesPoint, Sparkline};
