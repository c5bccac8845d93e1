//! Stream control domain module.
//!
//! # Module Structure
//!
//! - `model`: Analysis model selection (`ModelType`) and detection statistics rows
//! - `backend`: The `StreamBackend` trait the session manager drives

mod backend;
mod model;

// Re-export public API
pub use backend::StreamBackend;
pub use model::{DailyCount, DetectionSummary, HourlyCount, ModelFilter, ModelType};
