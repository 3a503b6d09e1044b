use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Dashboard, DataFiles, ForecastBounds, Server, Settings};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Settings`
/// struct, validates the cross-field constraints the type system cannot
/// express, and returns it.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.dashboard.year_min > settings.dashboard.year_max {
        return Err(ConfigError::ValidationError(format!(
            "dashboard year window is inverted: {}..{}",
            settings.dashboard.year_min, settings.dashboard.year_max
        )));
    }
    if settings.forecast.fx_min >= settings.forecast.fx_max {
        return Err(ConfigError::ValidationError(format!(
            "forecast FX bounds are inverted: {}..{}",
            settings.forecast.fx_min, settings.forecast.fx_max
        )));
    }
    if settings.forecast.horizon_min == 0 || settings.forecast.horizon_min > settings.forecast.horizon_max {
        return Err(ConfigError::ValidationError(format!(
            "forecast horizon bounds are invalid: {}..{}",
            settings.forecast.horizon_min, settings.forecast.horizon_max
        )));
    }
    Ok(())
}
