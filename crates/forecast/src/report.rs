use chrono::NaiveDate;
use core_types::PriceSeries;
use serde::{Deserialize, Serialize};

/// The output of one forecast request: a single projected point with its
/// residual-based band and the goodness-of-fit statistics of the model
/// behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceForecast {
    pub series: PriceSeries,
    /// USD/BRL assumption supplied by the user.
    pub fx_assumption: f64,
    pub horizon_months: u32,
    /// `last observed period + horizon`.
    pub forecast_period: NaiveDate,
    pub point: f64,
    /// `point + 1.5 × residual_std`.
    pub band_upper: f64,
    /// `point − 1.5 × residual_std`.
    pub band_lower: f64,
    pub r_squared: f64,
    pub residual_std: f64,
    /// Fitted model parameters, reported for the statistics cards.
    pub intercept: f64,
    pub slope: f64,
    pub observations: usize,
}
