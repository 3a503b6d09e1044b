use core_types::{PriceSeries, Trend};
use serde::Serialize;

/// Fixed chart color encodings carried in every payload, so each client
/// renders the sections identically.
pub mod palette {
    /// The USD/BRL line.
    pub const FX: &str = "#FF8800";
    /// Price lines and import/export bars.
    pub const GREEN: &str = "#008000";
    /// Stock evolution and scatter points.
    pub const STOCK: &str = "#ADFF2F";
    /// Sparkline fill when the series rises.
    pub const SPARK_UP: &str = "#2ca02c";
    /// Sparkline fill when the series falls.
    pub const SPARK_DOWN: &str = "#d62728";

    /// The fill color encoding a sparkline's trend.
    pub fn spark_fill(trend: super::Trend) -> &'static str {
        match trend {
            super::Trend::Up => SPARK_UP,
            super::Trend::Down => SPARK_DOWN,
        }
    }
    /// Event markers on the FX chart.
    pub const EVENT: &str = "blue";
    /// Historical price line on the forecast chart.
    pub const FORECAST_HISTORY: &str = "yellow";
    /// The projected point marker.
    pub const FORECAST_POINT: &str = "red";
    /// The uncertainty band fill.
    pub const FORECAST_BAND: &str = "rgba(255,140,0,0.3)";
}

/// One dashboard page template: title, default filters and the sections
/// it renders. A single parameterized description replaces per-page
/// scripts with copy-pasted variations.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub default_price: PriceSeries,
    /// Section endpoints rendered by this page, in display order.
    pub sections: &'static [&'static str],
}

/// The page templates served by `/api/meta`.
pub fn pages() -> Vec<DashboardPage> {
    vec![
        DashboardPage {
            slug: "panorama",
            title: "A Dinâmica da Soja: Como Câmbio, Oferta e Demanda Impactam os Preços no Brasil",
            default_price: PriceSeries::Rondonopolis,
            sections: &["kpis", "fx", "fx/correlation", "supply", "demand", "balance"],
        },
        DashboardPage {
            slug: "forecast",
            title: "Previsão de Preços da Soja",
            default_price: PriceSeries::Rondonopolis,
            sections: &["forecast"],
        },
    ]
}
