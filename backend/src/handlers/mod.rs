//! HTTP handlers

pub mod health;
pub mod ndvi;

pub use health::*;
pub use ndvi::*;
