//! # SojaMetrics Price Forecast
//!
//! A single-variable ordinary-least-squares model relating a soybean price
//! series to the USD/BRL close, projecting one future point at a
//! user-chosen horizon with a residual-based uncertainty band.
//!
//! The model is deliberately simple: one regressor, a closed-form fit, and
//! a fixed-width band. Empty or degenerate inputs are errors; the fit
//! never silently returns non-finite output.

pub mod error;
pub mod model;
pub mod report;

pub use error::ForecastError;
pub use model::PriceModel;
pub use report::PriceForecast;
