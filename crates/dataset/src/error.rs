use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Data file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing from {1}")]
    MissingColumn(String, PathBuf),

    #[error("Duplicate period key '{0}' in {1}")]
    DuplicatePeriod(String, PathBuf),
}
