//! NDVI calculation service
//!
//! Resolves the requested region, fetches a cloud-masked NDVI raster and
//! reduces it to summary statistics and a health label.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    GeoPoint, Geometry, GeometryResolver, HealthStatus, NdviSummary, ResolvedGeometry,
    TimeInterval,
};

use super::raster_request::{RasterPurpose, RasterRequestBuilder};
use crate::config::NdviConfig;
use crate::error::AppResult;
use crate::external::ImageryProvider;

/// NDVI calculation service
#[derive(Clone)]
pub struct NdviService {
    provider: Arc<dyn ImageryProvider>,
    resolver: GeometryResolver,
    requests: RasterRequestBuilder,
}

/// Current vegetation health at a point, with management advice
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatusReport {
    pub latitude: f64,
    pub longitude: f64,
    pub current_ndvi: Option<f64>,
    pub vegetation_health: HealthStatus,
    pub date: NaiveDate,
    pub recommendations: Vec<String>,
}

impl NdviService {
    /// Create a new NdviService
    pub fn new(provider: Arc<dyn ImageryProvider>, config: &NdviConfig) -> Self {
        Self {
            provider,
            resolver: GeometryResolver::new(config.point_margin_deg),
            requests: RasterRequestBuilder::new(config),
        }
    }

    /// Analyze NDVI over a point or bounding box for a validated window.
    ///
    /// A window with no usable pixels is not an error: the summary comes
    /// back with zero valid pixels and health `Unknown`.
    pub async fn calculate(
        &self,
        geometry: &Geometry,
        interval: &TimeInterval,
    ) -> AppResult<NdviSummary> {
        let region = self.resolver.resolve(geometry)?;
        self.calculate_region(&region, interval).await
    }

    /// Analyze an already resolved region
    pub async fn calculate_region(
        &self,
        region: &ResolvedGeometry,
        interval: &TimeInterval,
    ) -> AppResult<NdviSummary> {
        let request = self
            .requests
            .build(&region.bbox, interval, RasterPurpose::NdviValues);
        let sample = self.provider.fetch_raster(&request).await?;
        let summary = NdviSummary::from_sample(region, interval, &sample);

        if summary.has_data() {
            tracing::debug!(
                mode = %summary.mode,
                valid_pixels = summary.valid_pixel_count,
                health = %summary.vegetation_health,
                "NDVI computed"
            );
        } else {
            tracing::info!(
                mode = %summary.mode,
                start = %interval.start_date,
                end = %interval.end_date,
                "No valid pixels in window"
            );
        }

        Ok(summary)
    }

    /// Vegetation health over the last day at a point
    pub async fn health_status(
        &self,
        point: GeoPoint,
        today: NaiveDate,
    ) -> AppResult<HealthStatusReport> {
        let interval = TimeInterval::single_pass(today);
        let summary = self.calculate(&Geometry::Point(point), &interval).await?;

        Ok(HealthStatusReport {
            latitude: point.latitude,
            longitude: point.longitude,
            current_ndvi: summary.ndvi_value,
            vegetation_health: summary.vegetation_health,
            date: summary.end_date,
            recommendations: summary
                .vegetation_health
                .recommendations()
                .iter()
                .map(|r| r.to_string())
                .collect(),
        })
    }
}
