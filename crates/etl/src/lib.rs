//! # SojaMetrics ETL Reshape
//!
//! The offline, run-once step that turns the per-indicator source extracts
//! (one CSV per sheet of the upstream workbook: annual balance,
//! processing, exports, imports, stocks, prices, purchases, plus the daily
//! FX series) into the two normalized tables the dashboard consumes.
//!
//! The reshape is a straight pipeline: select and rename per source,
//! pivot the long-form sheets (balance by discrimination label, prices by
//! market label) to one row per period, outer-join everything on the
//! period key, zero-fill missing flows while leaving missing quotes empty,
//! derive the stock-difference balance, apportion annual production by the
//! seasonal weights, attach the monthly FX close, and write both outputs
//! wholesale. A missing input aborts before anything is written.

pub mod error;
pub mod reshape;
pub mod sources;

pub use error::EtlError;
pub use reshape::{run, run_with_progress, EtlSummary};
pub use sources::SOURCE_FILES;
