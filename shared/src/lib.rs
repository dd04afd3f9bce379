//! Shared types and models for the agricultural field monitoring platform
//!
//! This crate contains the pure NDVI domain: geometry resolution, date
//! validation, raster reduction, health classification and trend analysis.
//! It is shared between the backend server and the browser (via WASM).

pub mod geometry;
pub mod models;
pub mod types;
pub mod validation;

pub use geometry::*;
pub use models::*;
pub use types::*;
pub use validation::*;
