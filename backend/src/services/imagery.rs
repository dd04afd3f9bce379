//! Display imagery rendering

use std::sync::Arc;

use shared::{Geometry, GeometryResolver, TimeInterval};

use super::raster_request::{RasterPurpose, RasterRequestBuilder};
use crate::config::NdviConfig;
use crate::error::AppResult;
use crate::external::ImageryProvider;

/// Renders true-color and NDVI heatmap PNGs for a region
#[derive(Clone)]
pub struct ImageryService {
    provider: Arc<dyn ImageryProvider>,
    resolver: GeometryResolver,
    requests: RasterRequestBuilder,
}

impl ImageryService {
    pub fn new(provider: Arc<dyn ImageryProvider>, config: &NdviConfig) -> Self {
        Self {
            provider,
            resolver: GeometryResolver::new(config.point_margin_deg),
            requests: RasterRequestBuilder::new(config),
        }
    }

    /// Least-cloudy natural color composite
    pub async fn true_color(
        &self,
        geometry: &Geometry,
        interval: &TimeInterval,
    ) -> AppResult<Vec<u8>> {
        self.render(geometry, interval, RasterPurpose::TrueColor)
            .await
    }

    /// NDVI colored with the fixed 9-step ramp, masked pixels black
    pub async fn heatmap(&self, geometry: &Geometry, interval: &TimeInterval) -> AppResult<Vec<u8>> {
        self.render(geometry, interval, RasterPurpose::Heatmap).await
    }

    async fn render(
        &self,
        geometry: &Geometry,
        interval: &TimeInterval,
        purpose: RasterPurpose,
    ) -> AppResult<Vec<u8>> {
        let region = self.resolver.resolve(geometry)?;
        let request = self.requests.build(&region.bbox, interval, purpose);

        let png = self.provider.fetch_image(&request).await?;
        tracing::debug!(
            ?purpose,
            width = request.width,
            height = request.height,
            bytes = png.len(),
            "Rendered image"
        );
        Ok(png)
    }
}
