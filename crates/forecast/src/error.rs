use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Not enough data to fit the price model: {0}")]
    NotEnoughData(String),

    #[error("Degenerate regressor: {0}")]
    Singular(String),

    #[error("Regression failed: {0}")]
    Fit(String),

    #[error("Invalid forecast input: {0}")]
    InvalidInput(String),
}
