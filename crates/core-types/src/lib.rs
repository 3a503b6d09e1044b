pub mod constants;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use constants::{market_events, seasonal_weight, SEASONAL_WEIGHTS};
pub use enums::{CorrelationSign, PriceSeries, Trend};
pub use error::CoreError;
pub use structs::{AnnualRecord, EventAnnotation, FxRecord, MonthlyRecord};
