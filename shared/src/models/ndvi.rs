//! NDVI raster reduction and vegetation health classification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::round_to;
use crate::geometry::ResolvedGeometry;
use crate::types::{BoundingBox, GeometryMode, TimeInterval};

/// Upper bound (exclusive) of the Poor bucket
pub const POOR_UPPER: f64 = 0.2;
/// Upper bound (exclusive) of the Fair bucket
pub const FAIR_UPPER: f64 = 0.4;
/// Upper bound (exclusive) of the Good bucket
pub const GOOD_UPPER: f64 = 0.6;

/// Decimal places used for reported statistics
const STAT_DECIMALS: i32 = 3;

/// `(nir - red) / (nir + red)`, or `None` when the denominator is zero
pub fn ndvi_from_bands(nir: f64, red: f64) -> Option<f64> {
    let denominator = nir + red;
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((nir - red) / denominator)
}

/// Vegetation health bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HealthStatus {
    Poor,
    Fair,
    Good,
    Excellent,
    /// No usable pixels in the requested window
    #[default]
    Unknown,
}

impl HealthStatus {
    /// Step function over the representative NDVI value
    pub fn classify(ndvi: f64) -> Self {
        if !ndvi.is_finite() {
            HealthStatus::Unknown
        } else if ndvi < POOR_UPPER {
            HealthStatus::Poor
        } else if ndvi < FAIR_UPPER {
            HealthStatus::Fair
        } else if ndvi < GOOD_UPPER {
            HealthStatus::Good
        } else {
            HealthStatus::Excellent
        }
    }

    /// Field management recommendations for this bucket
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            HealthStatus::Poor => &[
                "Consider irrigation if water is available",
                "Check for pest or disease issues",
                "Soil testing recommended",
                "Consider fertilization",
            ],
            HealthStatus::Fair => &[
                "Monitor closely for improvement",
                "Ensure adequate water supply",
                "Check for early signs of stress",
            ],
            HealthStatus::Good => &[
                "Maintain current management practices",
                "Continue regular monitoring",
                "Prepare for potential seasonal changes",
            ],
            HealthStatus::Excellent => &[
                "Vegetation is healthy",
                "Continue current management",
                "Good time for planning future crops",
            ],
            HealthStatus::Unknown => &["Continue monitoring"],
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Poor => write!(f, "Poor"),
            HealthStatus::Fair => write!(f, "Fair"),
            HealthStatus::Good => write!(f, "Good"),
            HealthStatus::Excellent => write!(f, "Excellent"),
            HealthStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Pixel counts per health bucket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthHistogram {
    pub poor: usize,
    pub fair: usize,
    pub good: usize,
    pub excellent: usize,
}

impl HealthHistogram {
    pub fn record(&mut self, ndvi: f64) {
        match HealthStatus::classify(ndvi) {
            HealthStatus::Poor => self.poor += 1,
            HealthStatus::Fair => self.fair += 1,
            HealthStatus::Good => self.good += 1,
            HealthStatus::Excellent => self.excellent += 1,
            HealthStatus::Unknown => {}
        }
    }

    pub fn total(&self) -> usize {
        self.poor + self.fair + self.good + self.excellent
    }
}

/// One provider fetch: a row-major single-band NDVI raster.
///
/// Masked (cloud, snow, no-data) pixels are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSample {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl RasterSample {
    /// Build a raster, returning `None` if the value count does not match
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Option<Self> {
        if width.checked_mul(height)? != values.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.values.len()
    }

    /// Finite pixel values as f64
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| f64::from(v))
    }
}

/// Summary statistics over the valid pixels of a raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdviStats {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub valid_pixel_count: usize,
    pub histogram: HealthHistogram,
}

impl NdviStats {
    /// Reduce the valid pixels; `None` when every pixel is masked
    pub fn from_sample(sample: &RasterSample) -> Option<Self> {
        let mut values: Vec<f64> = sample.valid_values().collect();
        if values.is_empty() {
            return None;
        }

        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mut histogram = HealthHistogram::default();
        let mut sum = 0.0;
        for &v in &values {
            sum += v;
            histogram.record(v);
        }

        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };

        Some(Self {
            median,
            mean: sum / count as f64,
            min: values[0],
            max: values[count - 1],
            valid_pixel_count: count,
            histogram,
        })
    }
}

/// Result of one NDVI analysis.
///
/// `latitude`/`longitude` are only set in point mode; `bbox` is always the
/// region actually sent to the provider. Statistics are `None` when the
/// window had no usable pixels, which is reported as health `Unknown`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdviSummary {
    pub mode: GeometryMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bbox: BoundingBox,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Median NDVI, the representative value
    pub ndvi_value: Option<f64>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub valid_pixel_count: usize,
    pub total_pixel_count: usize,
    pub histogram: HealthHistogram,
    pub vegetation_health: HealthStatus,
    pub message: String,
}

impl NdviSummary {
    pub fn from_sample(
        region: &ResolvedGeometry,
        interval: &TimeInterval,
        sample: &RasterSample,
    ) -> Self {
        let stats = NdviStats::from_sample(sample);
        let point = match region.mode {
            GeometryMode::Point => region.point,
            GeometryMode::Bbox => None,
        };

        let (vegetation_health, message) = match &stats {
            Some(s) => (
                HealthStatus::classify(s.median),
                "NDVI analysis from Sentinel Hub".to_string(),
            ),
            None => (
                HealthStatus::Unknown,
                "No cloud-free imagery in the requested window".to_string(),
            ),
        };

        Self {
            mode: region.mode,
            latitude: point.map(|p| p.latitude),
            longitude: point.map(|p| p.longitude),
            bbox: region.bbox,
            start_date: interval.start_date,
            end_date: interval.end_date,
            ndvi_value: stats.map(|s| round_to(s.median, STAT_DECIMALS)),
            mean: stats.map(|s| round_to(s.mean, STAT_DECIMALS)),
            min: stats.map(|s| round_to(s.min, STAT_DECIMALS)),
            max: stats.map(|s| round_to(s.max, STAT_DECIMALS)),
            valid_pixel_count: stats.map_or(0, |s| s.valid_pixel_count),
            total_pixel_count: sample.pixel_count(),
            histogram: stats.map(|s| s.histogram).unwrap_or_default(),
            vegetation_health,
            message,
        }
    }

    pub fn has_data(&self) -> bool {
        self.valid_pixel_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    fn interval() -> TimeInterval {
        TimeInterval {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        }
    }

    fn bbox_region() -> ResolvedGeometry {
        ResolvedGeometry {
            bbox: BoundingBox::new(18.80, 18.78, 98.99, 98.97),
            mode: GeometryMode::Bbox,
            point: None,
        }
    }

    #[test]
    fn test_health_boundaries() {
        assert_eq!(HealthStatus::classify(0.0), HealthStatus::Poor);
        assert_eq!(HealthStatus::classify(0.1999), HealthStatus::Poor);
        assert_eq!(HealthStatus::classify(0.2), HealthStatus::Fair);
        assert_eq!(HealthStatus::classify(0.3999), HealthStatus::Fair);
        assert_eq!(HealthStatus::classify(0.4), HealthStatus::Good);
        assert_eq!(HealthStatus::classify(0.5999), HealthStatus::Good);
        assert_eq!(HealthStatus::classify(0.6), HealthStatus::Excellent);
        assert_eq!(HealthStatus::classify(1.0), HealthStatus::Excellent);
        assert_eq!(HealthStatus::classify(-0.5), HealthStatus::Poor);
        assert_eq!(HealthStatus::classify(f64::NAN), HealthStatus::Unknown);
    }

    #[test]
    fn test_health_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Excellent).unwrap(),
            "\"Excellent\""
        );
        assert_eq!(HealthStatus::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_ndvi_from_bands() {
        let ndvi = ndvi_from_bands(0.5, 0.1).unwrap();
        assert!((ndvi - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(ndvi_from_bands(0.0, 0.0), None);
    }

    #[test]
    fn test_raster_sample_size_mismatch() {
        assert!(RasterSample::new(2, 2, vec![0.1; 3]).is_none());
        assert!(RasterSample::new(2, 2, vec![0.1; 4]).is_some());
    }

    #[test]
    fn test_stats_ignore_masked_pixels() {
        let sample =
            RasterSample::new(3, 2, vec![0.1, f32::NAN, 0.3, 0.5, f32::NAN, 0.7]).unwrap();
        let stats = NdviStats::from_sample(&sample).unwrap();
        assert_eq!(stats.valid_pixel_count, 4);
        assert!((stats.median - 0.4).abs() < 1e-6);
        assert!((stats.mean - 0.4).abs() < 1e-6);
        assert!((stats.min - 0.1).abs() < 1e-6);
        assert!((stats.max - 0.7).abs() < 1e-6);
        assert_eq!(
            stats.histogram,
            HealthHistogram {
                poor: 1,
                fair: 1,
                good: 1,
                excellent: 1
            }
        );
    }

    #[test]
    fn test_stats_median_is_robust_to_outliers() {
        let sample = RasterSample::new(5, 1, vec![0.5, 0.5, 0.5, 0.5, -1.0]).unwrap();
        let stats = NdviStats::from_sample(&sample).unwrap();
        assert!((stats.median - 0.5).abs() < 1e-6);
        assert!(stats.mean < 0.5);
    }

    #[test]
    fn test_stats_all_masked() {
        let sample = RasterSample::new(2, 2, vec![f32::NAN; 4]).unwrap();
        assert!(NdviStats::from_sample(&sample).is_none());
    }

    #[test]
    fn test_summary_no_data_is_unknown() {
        let sample = RasterSample::new(2, 2, vec![f32::NAN; 4]).unwrap();
        let summary = NdviSummary::from_sample(&bbox_region(), &interval(), &sample);
        assert_eq!(summary.valid_pixel_count, 0);
        assert_eq!(summary.total_pixel_count, 4);
        assert_eq!(summary.vegetation_health, HealthStatus::Unknown);
        assert!(summary.ndvi_value.is_none());
        assert!(!summary.has_data());
    }

    #[test]
    fn test_summary_bbox_mode_has_no_point() {
        let sample = RasterSample::new(1, 1, vec![0.65]).unwrap();
        let region = bbox_region();
        let summary = NdviSummary::from_sample(&region, &interval(), &sample);
        assert_eq!(summary.mode, GeometryMode::Bbox);
        assert!(summary.latitude.is_none());
        assert!(summary.longitude.is_none());
        assert_eq!(summary.bbox, region.bbox);
        assert_eq!(summary.vegetation_health, HealthStatus::Excellent);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["latitude"].is_null());
        assert_eq!(json["mode"], "bbox");
    }

    #[test]
    fn test_summary_point_mode_echoes_point() {
        let point = GeoPoint::new(18.79, 98.98);
        let region = ResolvedGeometry {
            bbox: BoundingBox::around(point, 0.01),
            mode: GeometryMode::Point,
            point: Some(point),
        };
        let sample = RasterSample::new(1, 2, vec![0.25, 0.35]).unwrap();
        let summary = NdviSummary::from_sample(&region, &interval(), &sample);
        assert_eq!(summary.latitude, Some(18.79));
        assert_eq!(summary.longitude, Some(98.98));
        assert_eq!(summary.ndvi_value, Some(0.3));
        assert_eq!(summary.vegetation_health, HealthStatus::Fair);
    }
}
