//! Linear trend analysis over an NDVI time series

use serde::{Deserialize, Serialize};

use super::history::HistoryPoint;
use super::round_to;

/// Slope per step above which the trend is "improving fast"
pub const FAST_SLOPE: f64 = 0.05;
/// Slope per step above which the trend is "slightly improving"
pub const SLIGHT_SLOPE: f64 = 0.01;

/// Classified direction of an NDVI series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendLabel {
    #[serde(rename = "improving fast")]
    ImprovingFast,
    #[serde(rename = "slightly improving")]
    SlightlyImproving,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "slightly declining")]
    SlightlyDeclining,
    #[serde(rename = "declining fast")]
    DecliningFast,
    #[serde(rename = "insufficient_data")]
    InsufficientData,
}

impl TrendLabel {
    pub fn from_slope(slope: f64) -> Self {
        if slope > FAST_SLOPE {
            TrendLabel::ImprovingFast
        } else if slope > SLIGHT_SLOPE {
            TrendLabel::SlightlyImproving
        } else if slope < -FAST_SLOPE {
            TrendLabel::DecliningFast
        } else if slope < -SLIGHT_SLOPE {
            TrendLabel::SlightlyDeclining
        } else {
            TrendLabel::Stable
        }
    }
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendLabel::ImprovingFast => write!(f, "improving fast"),
            TrendLabel::SlightlyImproving => write!(f, "slightly improving"),
            TrendLabel::Stable => write!(f, "stable"),
            TrendLabel::SlightlyDeclining => write!(f, "slightly declining"),
            TrendLabel::DecliningFast => write!(f, "declining fast"),
            TrendLabel::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

/// Outcome of [`analyze_trend`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendResult {
    pub trend: TrendLabel,
    /// NDVI change per sample, 4 decimals
    pub slope: f64,
    pub current_avg: Option<f64>,
    pub message: String,
}

/// Ordinary least-squares slope of `values` against their index.
///
/// Samples are treated as equally spaced regardless of calendar gaps.
/// Returns 0 for fewer than two values.
pub fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (covariance, variance) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, &y)| {
            let dx = i as f64 - x_mean;
            (cov + dx * (y - y_mean), var + dx * dx)
        });

    covariance / variance
}

/// Fit and classify a trend over raw NDVI values (oldest first)
pub fn analyze_values(values: &[f64]) -> TrendResult {
    if values.len() < 2 {
        return TrendResult {
            trend: TrendLabel::InsufficientData,
            slope: 0.0,
            current_avg: None,
            message: "Not enough data for trend analysis".to_string(),
        };
    }

    let slope = least_squares_slope(values);
    let trend = TrendLabel::from_slope(slope);
    let average = values.iter().sum::<f64>() / values.len() as f64;

    TrendResult {
        trend,
        slope: round_to(slope, 4),
        current_avg: Some(round_to(average, 3)),
        message: format!("Vegetation health is {}", trend),
    }
}

/// Fit and classify a trend over a history series (oldest first)
pub fn analyze_trend(series: &[HistoryPoint]) -> TrendResult {
    let values: Vec<f64> = series.iter().map(|p| p.ndvi_value).collect();
    analyze_values(&values)
}
