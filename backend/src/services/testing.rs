//! In-memory imagery provider for service tests

use std::sync::Mutex;

use async_trait::async_trait;
use shared::RasterSample;

use crate::error::{AppError, AppResult};
use crate::external::{ImageryProvider, RasterRequest};

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

type RasterFn = Box<dyn Fn(&RasterRequest) -> AppResult<Vec<f32>> + Send + Sync>;

/// Provider that fills each requested raster from a closure and records
/// every request it sees
pub struct FakeProvider {
    raster: RasterFn,
    pub requests: Mutex<Vec<RasterRequest>>,
}

impl FakeProvider {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RasterRequest) -> AppResult<Vec<f32>> + Send + Sync + 'static,
    {
        Self {
            raster: Box::new(f),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every pixel has the same value (NaN for a fully clouded window)
    pub fn uniform(value: f32) -> Self {
        Self::from_fn(move |req| Ok(vec![value; (req.width * req.height) as usize]))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::from_fn(move |_| Err(AppError::Provider(message.to_string())))
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageryProvider for FakeProvider {
    async fn fetch_raster(&self, request: &RasterRequest) -> AppResult<RasterSample> {
        self.requests.lock().unwrap().push(request.clone());
        let values = (self.raster)(request)?;
        RasterSample::new(request.width as usize, request.height as usize, values)
            .ok_or_else(|| AppError::Provider("size mismatch".to_string()))
    }

    async fn fetch_image(&self, request: &RasterRequest) -> AppResult<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        (self.raster)(request)?;
        Ok(PNG_BYTES.to_vec())
    }
}
