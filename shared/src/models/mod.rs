//! Domain models for NDVI analysis

mod history;
mod ndvi;
mod palette;
mod trend;

pub use history::*;
pub use ndvi::*;
pub use palette::*;
pub use trend::*;

/// Round to a fixed number of decimal places for reporting
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
