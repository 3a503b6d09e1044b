use crate::error::ForecastError;
use crate::report::PriceForecast;
use chrono::{Months, NaiveDate};
use core_types::PriceSeries;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::info;

/// Width of the uncertainty band in residual standard deviations.
/// Fixed spread carried over from the source model; the interface presents
/// it as a 95% interval, which it is not.
const BAND_MULTIPLIER: f64 = 1.5;

/// A single-variable price model: `price = intercept + slope × usdbrl`,
/// fitted by ordinary least squares over the historical monthly rows where
/// both the quote and the FX close are present.
#[derive(Debug, Clone)]
pub struct PriceModel {
    series: PriceSeries,
    intercept: f64,
    slope: f64,
    r_squared: f64,
    residual_std: f64,
    last_period: NaiveDate,
    observations: usize,
}

impl PriceModel {
    /// Fits the model over `(period, usdbrl, price)` observations.
    ///
    /// The observations must already be pairwise complete; rows with a
    /// missing side are the caller's to drop. An empty or constant
    /// regressor fails loudly instead of producing a NaN-propagated fit.
    pub fn fit(
        series: PriceSeries,
        observations: &[(NaiveDate, f64, f64)],
    ) -> Result<Self, ForecastError> {
        if observations.len() < 2 {
            return Err(ForecastError::NotEnoughData(format!(
                "need at least 2 observations, got {}",
                observations.len()
            )));
        }

        let fx: Vec<f64> = observations.iter().map(|(_, fx, _)| *fx).collect();
        let prices: Vec<f64> = observations.iter().map(|(_, _, price)| *price).collect();

        let mean_fx = fx.iter().sum::<f64>() / fx.len() as f64;
        if fx.iter().all(|v| *v == mean_fx) {
            return Err(ForecastError::Singular(
                "the FX regressor is constant over the fitted range".to_string(),
            ));
        }

        let x = DenseMatrix::from_2d_vec(&fx.iter().map(|v| vec![*v]).collect::<Vec<_>>())
            .map_err(|e| ForecastError::Fit(e.to_string()))?;
        let model = LinearRegression::fit(&x, &prices, LinearRegressionParameters::default())
            .map_err(|e| ForecastError::Fit(e.to_string()))?;

        let predicted = model
            .predict(&x)
            .map_err(|e| ForecastError::Fit(e.to_string()))?;

        let intercept = *model.intercept();
        let slope = *model.coefficients().get((0, 0));

        // Residual summary statistics; smartcore has no ready-made OLS
        // summary, so they are computed from the in-sample predictions.
        let n = prices.len() as f64;
        let residuals: Vec<f64> = prices
            .iter()
            .zip(predicted.iter())
            .map(|(y, y_hat)| y - y_hat)
            .collect();
        let mean_residual = residuals.iter().sum::<f64>() / n;
        let residual_std = (residuals
            .iter()
            .map(|r| (r - mean_residual).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        let mean_price = prices.iter().sum::<f64>() / n;
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = prices.iter().map(|y| (y - mean_price).powi(2)).sum();
        let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

        let last_period = observations
            .iter()
            .map(|(period, _, _)| *period)
            .max()
            .ok_or_else(|| ForecastError::NotEnoughData("no periods".to_string()))?;

        info!(
            series = %series,
            observations = observations.len(),
            r_squared,
            "Fitted price model"
        );

        Ok(Self {
            series,
            intercept,
            slope,
            r_squared,
            residual_std,
            last_period,
            observations: observations.len(),
        })
    }

    /// Projects a single point at `last observed period + horizon` months
    /// for the supplied FX assumption.
    pub fn forecast(
        &self,
        fx_assumption: f64,
        horizon_months: u32,
    ) -> Result<PriceForecast, ForecastError> {
        let forecast_period = self
            .last_period
            .checked_add_months(Months::new(horizon_months))
            .ok_or_else(|| {
                ForecastError::InvalidInput(format!(
                    "horizon of {horizon_months} months overflows the calendar"
                ))
            })?;

        let point = self.intercept + self.slope * fx_assumption;
        let spread = BAND_MULTIPLIER * self.residual_std;

        Ok(PriceForecast {
            series: self.series,
            fx_assumption,
            horizon_months,
            forecast_period,
            point,
            band_upper: point + spread,
            band_lower: point - spread,
            r_squared: self.r_squared,
            residual_std: self.residual_std,
            intercept: self.intercept,
            slope: self.slope,
            observations: self.observations,
        })
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    pub fn last_period(&self) -> NaiveDate {
        self.last_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_observations() -> Vec<(NaiveDate, f64, f64)> {
        // price = 2 × fx + 1, no noise.
        (0..24)
            .map(|i| {
                let period = NaiveDate::from_ymd_opt(2020 + i / 12, (i % 12) as u32 + 1, 1).unwrap();
                let fx = 4.0 + i as f64 * 0.1;
                (period, fx, 2.0 * fx + 1.0)
            })
            .collect()
    }

    #[test]
    fn recovers_a_noiseless_linear_relation_exactly() {
        let model = PriceModel::fit(PriceSeries::Rondonopolis, &linear_observations()).unwrap();

        assert!((model.r_squared() - 1.0).abs() < 1e-9);
        assert!(model.residual_std().abs() < 1e-9);

        let forecast = model.forecast(7.5, 12).unwrap();
        assert!((forecast.point - 16.0).abs() < 1e-9);
        assert!((forecast.band_upper - forecast.point).abs() < 1e-9);
        assert!((forecast.band_lower - forecast.point).abs() < 1e-9);
    }

    #[test]
    fn forecast_period_is_last_observation_plus_horizon() {
        let model = PriceModel::fit(PriceSeries::ChicagoCbot, &linear_observations()).unwrap();
        assert_eq!(
            model.last_period(),
            NaiveDate::from_ymd_opt(2021, 12, 1).unwrap()
        );

        let forecast = model.forecast(6.0, 12).unwrap();
        assert_eq!(
            forecast.forecast_period,
            NaiveDate::from_ymd_opt(2022, 12, 1).unwrap()
        );
    }

    #[test]
    fn band_is_a_fixed_multiple_of_the_residual_spread() {
        // Alternating noise of ±1 around price = fx gives residual_std = 1.
        let observations: Vec<(NaiveDate, f64, f64)> = (0..40)
            .map(|i| {
                let period = NaiveDate::from_ymd_opt(2015 + i / 12, (i % 12) as u32 + 1, 1).unwrap();
                let fx = 3.0 + (i % 2) as f64; // alternates 3, 4
                let noise = if i % 4 < 2 { 1.0 } else { -1.0 };
                (period, fx, fx + noise)
            })
            .collect();

        let model = PriceModel::fit(PriceSeries::Maringa, &observations).unwrap();
        let forecast = model.forecast(5.0, 1).unwrap();

        let spread = forecast.band_upper - forecast.point;
        assert!((spread - 1.5 * model.residual_std()).abs() < 1e-9);
        assert!((forecast.point - forecast.band_lower - spread).abs() < 1e-9);
    }

    #[test]
    fn empty_and_constant_inputs_fail_loudly() {
        assert!(matches!(
            PriceModel::fit(PriceSeries::Mogiana, &[]),
            Err(ForecastError::NotEnoughData(_))
        ));

        let constant_fx: Vec<(NaiveDate, f64, f64)> = (0..12)
            .map(|i| {
                let period = NaiveDate::from_ymd_opt(2020, i + 1, 1).unwrap();
                (period, 5.0, 100.0 + i as f64)
            })
            .collect();
        assert!(matches!(
            PriceModel::fit(PriceSeries::Mogiana, &constant_fx),
            Err(ForecastError::Singular(_))
        ));
    }
}
