//! External API integrations

pub mod sentinel_hub;

pub use sentinel_hub::SentinelHubClient;

use async_trait::async_trait;
use shared::{BoundingBox, RasterSample, TimeInterval};

use crate::error::AppResult;

/// Encoding requested from the imagery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single-band 32-bit float raster for analysis
    Float32Tiff,
    /// 8-bit RGB image for display
    Png,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Float32Tiff => "image/tiff",
            OutputFormat::Png => "image/png",
        }
    }
}

/// A fully specified raster fetch
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    pub bbox: BoundingBox,
    pub interval: TimeInterval,
    pub width: u32,
    pub height: u32,
    /// Pixel evaluation script run by the provider
    pub evalscript: String,
    pub format: OutputFormat,
}

/// Earth-observation data provider.
///
/// Implementations must be `Send + Sync`; every call is independent.
#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Fetch a float raster; masked pixels come back as NaN
    async fn fetch_raster(&self, request: &RasterRequest) -> AppResult<RasterSample>;

    /// Fetch a rendered PNG
    async fn fetch_image(&self, request: &RasterRequest) -> AppResult<Vec<u8>>;
}
