//! # SojaMetrics Dataset Layer
//!
//! This crate owns the dashboard's only I/O: loading the three flat tables
//! (monthly indicators, annual balance, daily FX) into a read-only
//! [`MarketData`] context at startup.
//!
//! ## Architectural Principles
//!
//! - **Load once, filter per render:** the context is built a single time
//!   and shared immutably; every dashboard section derives its view through
//!   the year-range filters, which return fresh owned copies.
//! - **Fail fast:** a missing file, missing column, or duplicated period
//!   key aborts the load with a descriptive error. There is no partial
//!   recovery.

pub mod error;
pub mod loader;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::DatasetError;
pub use loader::DataLoader;
pub use store::MarketData;
