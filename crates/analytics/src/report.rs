use core_types::{CorrelationSign, Trend};
use serde::{Deserialize, Serialize};

/// One point of a rendered time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

/// A compact trend chart drawn under a KPI card. The trend field decides
/// the fill color (green rise, red fall) from the first and last values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    pub points: Vec<SeriesPoint>,
    pub trend: Trend,
}

/// A numeric KPI card: the latest value of an indicator, its year-over-year
/// percentage change, and the sparkline of the filtered range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub label: String,
    pub value: f64,
    pub yoy_pct: f64,
    pub direction: Trend,
    pub sparkline: Sparkline,
}

/// A correlation statistic card with its sign label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCard {
    pub label: String,
    pub value: f64,
    pub sign: CorrelationSign,
}
