use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing from {1}")]
    MissingColumn(String, PathBuf),

    #[error("Could not parse value '{1}' in column '{0}'")]
    Parse(String, String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
