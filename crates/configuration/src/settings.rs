use core_types::PriceSeries;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data: DataFiles,
    pub dashboard: Dashboard,
    pub server: Server,
    pub forecast: ForecastBounds,
}

/// Locations of the three flat files the dashboard reads at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct DataFiles {
    /// The normalized monthly indicator table written by the ETL step.
    pub monthly: PathBuf,
    /// The normalized annual balance table written by the ETL step.
    pub annual: PathBuf,
    /// The daily USD/BRL close series.
    pub fx: PathBuf,
}

/// Parameters shared by every dashboard section.
#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    /// First year of the fixed window the loaded tables are restricted to.
    pub year_min: i32,
    /// Last year of the fixed window (inclusive).
    pub year_max: i32,
    /// The price series pre-selected in every section's dropdown.
    #[serde(default)]
    pub default_price: PriceSeries,
}

/// Bind address for the dashboard API server.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

/// Accepted input ranges for the forecast controls. Mirrors the bounds of
/// the original numeric-input and slider widgets.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastBounds {
    /// Lowest accepted USD/BRL assumption.
    pub fx_min: f64,
    /// Highest accepted USD/BRL assumption.
    pub fx_max: f64,
    /// Shortest accepted horizon, in months.
    pub horizon_min: u32,
    /// Longest accepted horizon, in months.
    pub horizon_max: u32,
}
