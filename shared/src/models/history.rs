//! NDVI time series points

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ndvi::{HealthStatus, NdviSummary};

/// One sample of an NDVI time series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    /// End date of the sampled window
    pub date: NaiveDate,
    /// Median NDVI over the valid pixels
    pub ndvi_value: f64,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub valid_pixel_count: usize,
    #[serde(default)]
    pub vegetation_health: HealthStatus,
}

impl HistoryPoint {
    /// `None` when the summary had no usable pixels
    pub fn from_summary(summary: &NdviSummary) -> Option<Self> {
        if !summary.has_data() {
            return None;
        }
        Some(Self {
            date: summary.end_date,
            ndvi_value: summary.ndvi_value?,
            mean: summary.mean,
            min: summary.min,
            max: summary.max,
            valid_pixel_count: summary.valid_pixel_count,
            vegetation_health: summary.vegetation_health,
        })
    }
}
