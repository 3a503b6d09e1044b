use crate::error::AnalyticsError;
use crate::report::{CorrelationCard, KpiCard, SeriesPoint, Sparkline};
use core_types::{CorrelationSign, Trend};

/// Number of samples in the rolling trend window: one year of months.
pub const TREND_WINDOW: usize = 12;

/// A stateless calculator for deriving dashboard metrics from the loaded
/// tables. It takes plain slices as input and produces report structs as
/// output, which keeps it easy to test in isolation.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Year-over-year percentage change between the latest and the
    /// second-latest value.
    ///
    /// A previous value of zero is reported as an explicit error instead of
    /// propagating an infinite result into the payload.
    pub fn yoy_change(
        &self,
        current: f64,
        previous: f64,
        metric: &str,
    ) -> Result<f64, AnalyticsError> {
        if previous == 0.0 {
            return Err(AnalyticsError::DivisionByZero(metric.to_string()));
        }
        Ok((current - previous) / previous * 100.0)
    }

    /// Moving average with a left-partial window: the first outputs average
    /// whatever samples exist so far (minimum one) instead of being
    /// undefined until the window fills.
    pub fn rolling_mean(&self, values: &[f64], window: usize) -> Vec<f64> {
        self.rolling(values, window, |slice| {
            slice.iter().sum::<f64>() / slice.len() as f64
        })
    }

    /// Moving sum with the same left-partial window policy.
    pub fn rolling_sum(&self, values: &[f64], window: usize) -> Vec<f64> {
        self.rolling(values, window, |slice| slice.iter().sum())
    }

    fn rolling<F: Fn(&[f64]) -> f64>(&self, values: &[f64], window: usize, f: F) -> Vec<f64> {
        let window = window.max(1);
        (0..values.len())
            .map(|i| {
                let start = i.saturating_sub(window - 1);
                f(&values[start..=i])
            })
            .collect()
    }

    /// Pearson product-moment correlation over pairwise-complete rows:
    /// a row is excluded when either side is missing.
    pub fn pearson(
        &self,
        xs: &[Option<f64>],
        ys: &[Option<f64>],
    ) -> Result<f64, AnalyticsError> {
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();

        if pairs.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "correlation needs at least 2 complete pairs, got {}",
                pairs.len()
            )));
        }

        let n = pairs.len() as f64;
        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in &pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            tracing::warn!(pairs = pairs.len(), "Correlation requested over a constant series.");
            return Err(AnalyticsError::Calculation(
                "correlation is undefined for a constant series".to_string(),
            ));
        }

        Ok(cov / (var_x.sqrt() * var_y.sqrt()))
    }

    /// Assembles a correlation statistic card with its sign label.
    pub fn correlation_card(
        &self,
        label: &str,
        xs: &[Option<f64>],
        ys: &[Option<f64>],
    ) -> Result<CorrelationCard, AnalyticsError> {
        let value = self.pearson(xs, ys)?;
        Ok(CorrelationCard {
            label: label.to_string(),
            value,
            sign: CorrelationSign::of(value),
        })
    }

    /// Assembles a KPI card from a per-period value series covering the
    /// filtered range. The card value is the latest sample; the delta is
    /// the year-over-year change against the second-latest.
    pub fn kpi_card(
        &self,
        label: &str,
        series: &[SeriesPoint],
    ) -> Result<KpiCard, AnalyticsError> {
        if series.len() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "KPI '{label}' needs at least 2 periods, got {}",
                series.len()
            )));
        }

        let current = series[series.len() - 1].value;
        let previous = series[series.len() - 2].value;
        self.kpi_card_detailed(label, current, previous, series)
    }

    /// Assembles a KPI card whose delta compares explicit current/previous
    /// values while the sparkline tracks a denser series, e.g. a yearly
    /// delta over daily or monthly sparkline samples.
    pub fn kpi_card_detailed(
        &self,
        label: &str,
        current: f64,
        previous: f64,
        sparkline_series: &[SeriesPoint],
    ) -> Result<KpiCard, AnalyticsError> {
        let yoy_pct = self.yoy_change(current, previous, label)?;
        let direction = if yoy_pct >= 0.0 { Trend::Up } else { Trend::Down };

        Ok(KpiCard {
            label: label.to_string(),
            value: current,
            yoy_pct,
            direction,
            sparkline: self.sparkline(sparkline_series),
        })
    }

    /// A sparkline over the full series; the trend compares last vs. first.
    pub fn sparkline(&self, series: &[SeriesPoint]) -> Sparkline {
        let trend = match (series.first(), series.last()) {
            (Some(first), Some(last)) if last.value < first.value => Trend::Down,
            _ => Trend::Up,
        };
        Sparkline {
            points: series.to_vec(),
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint {
                period: format!("{}", 2000 + i as i32),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn yoy_of_110_over_100_is_ten_percent() {
        let engine = MetricsEngine::new();
        let yoy = engine.yoy_change(110.0, 100.0, "producao").unwrap();
        assert!((yoy - 10.0).abs() < 1e-12);
    }

    #[test]
    fn yoy_with_zero_previous_is_an_explicit_error() {
        let engine = MetricsEngine::new();
        let result = engine.yoy_change(50.0, 0.0, "importacao");
        assert!(matches!(result, Err(AnalyticsError::DivisionByZero(_))));
    }

    #[test]
    fn rolling_mean_starts_with_a_partial_window() {
        let engine = MetricsEngine::new();
        let values: Vec<f64> = (1..=24).map(|v| v as f64).collect();
        let out = engine.rolling_mean(&values, TREND_WINDOW);

        assert_eq!(out.len(), 24);
        // First output equals the first input.
        assert!((out[0] - 1.0).abs() < 1e-12);
        // Second output averages the first two samples.
        assert!((out[1] - 1.5).abs() < 1e-12);
        // The 12th output is the mean of the first twelve inputs.
        let expected: f64 = (1..=12).map(|v| v as f64).sum::<f64>() / 12.0;
        assert!((out[11] - expected).abs() < 1e-12);
        // Later outputs use the trailing full window.
        let expected: f64 = (13..=24).map(|v| v as f64).sum::<f64>() / 12.0;
        assert!((out[23] - expected).abs() < 1e-12);
    }

    #[test]
    fn rolling_sum_accumulates_the_trailing_window() {
        let engine = MetricsEngine::new();
        let values = vec![5.0; 30];
        let out = engine.rolling_sum(&values, TREND_WINDOW);

        assert!((out[0] - 5.0).abs() < 1e-12);
        assert!((out[11] - 60.0).abs() < 1e-12);
        assert!((out[29] - 60.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_stays_within_bounds_and_is_one_for_itself() {
        let engine = MetricsEngine::new();
        let xs: Vec<Option<f64>> = vec![1.0, 4.0, 2.0, 8.0, 5.0].into_iter().map(Some).collect();
        let ys: Vec<Option<f64>> = vec![2.0, 1.0, 7.0, 3.0, 9.0].into_iter().map(Some).collect();

        let r = engine.pearson(&xs, &ys).unwrap();
        assert!((-1.0..=1.0).contains(&r));

        let self_r = engine.pearson(&xs, &xs).unwrap();
        assert!((self_r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_excludes_incomplete_pairs() {
        let engine = MetricsEngine::new();
        // With the None rows dropped both series are perfectly linear.
        let xs = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        let ys = vec![Some(2.0), Some(99.0), Some(4.0), None, Some(8.0)];

        let r = engine.pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_rejects_constant_and_empty_series() {
        let engine = MetricsEngine::new();
        let constant: Vec<Option<f64>> = vec![Some(3.0); 5];
        let varying: Vec<Option<f64>> = vec![1.0, 2.0, 3.0, 4.0, 5.0].into_iter().map(Some).collect();

        assert!(matches!(
            engine.pearson(&constant, &varying),
            Err(AnalyticsError::Calculation(_))
        ));
        assert!(matches!(
            engine.pearson(&[], &[]),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }

    #[test]
    fn kpi_card_reports_latest_value_and_yoy_delta() {
        let engine = MetricsEngine::new();
        let card = engine.kpi_card("Produção (1000 t)", &series(&[90.0, 100.0, 110.0])).unwrap();

        assert!((card.value - 110.0).abs() < 1e-12);
        assert!((card.yoy_pct - 10.0).abs() < 1e-12);
        assert_eq!(card.direction, Trend::Up);
        assert_eq!(card.sparkline.trend, Trend::Up);
        assert_eq!(card.sparkline.points.len(), 3);
    }

    #[test]
    fn sparkline_trend_compares_last_against_first() {
        let engine = MetricsEngine::new();
        assert_eq!(engine.sparkline(&series(&[5.0, 9.0, 4.0])).trend, Trend::Down);
        assert_eq!(engine.sparkline(&series(&[4.0, 1.0, 4.0])).trend, Trend::Up);
    }
}
