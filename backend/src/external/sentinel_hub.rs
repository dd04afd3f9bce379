//! Sentinel Hub client for the Process API
//!
//! Authenticates with OAuth2 client credentials and runs evalscripts over
//! Sentinel-2 imagery for a bounding box and time window.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::ImageFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::RasterSample;
use tiff::decoder::{Decoder, DecodingResult};
use tokio::sync::Mutex;

use super::{ImageryProvider, RasterRequest};
use crate::config::SentinelHubConfig;
use crate::error::{AppError, AppResult};

/// WGS84 with longitude-first axis order, matching `[west, south, east, north]`
const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Refresh tokens this long before they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Sentinel Hub API client
#[derive(Clone)]
pub struct SentinelHubClient {
    http_client: Client,
    client_id: String,
    client_secret: String,
    process_url: String,
    token_url: String,
    data_collection: String,
    token: Arc<Mutex<Option<AccessToken>>>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// OAuth token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Process API request body
#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    input: ProcessInput<'a>,
    output: ProcessOutput,
    evalscript: &'a str,
}

#[derive(Debug, Serialize)]
struct ProcessInput<'a> {
    bounds: Bounds,
    data: Vec<DataSource<'a>>,
}

#[derive(Debug, Serialize)]
struct Bounds {
    bbox: [f64; 4],
    properties: BoundsProperties,
}

#[derive(Debug, Serialize)]
struct BoundsProperties {
    crs: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataSource<'a> {
    #[serde(rename = "type")]
    collection: &'a str,
    data_filter: DataFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataFilter {
    time_range: TimeRange,
    mosaicking_order: &'static str,
}

#[derive(Debug, Serialize)]
struct TimeRange {
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct ProcessOutput {
    width: u32,
    height: u32,
    responses: Vec<OutputResponse>,
}

#[derive(Debug, Serialize)]
struct OutputResponse {
    identifier: &'static str,
    format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    mime_type: &'static str,
}

impl SentinelHubClient {
    /// Create a new Sentinel Hub client
    pub fn new(config: &SentinelHubConfig) -> AppResult<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(AppError::Configuration(
                "Sentinel Hub client_id and client_secret are required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            process_url: format!("{}/api/v1/process", config.base_url.trim_end_matches('/')),
            token_url: config.token_url.clone(),
            data_collection: config.data_collection.clone(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// Return a cached bearer token or fetch a fresh one
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Requesting Sentinel Hub access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Authentication failed: {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse token response: {}", e)))?;

        let value = token.access_token;
        *cached = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(value)
    }

    fn build_body<'a>(&'a self, request: &'a RasterRequest) -> ProcessRequest<'a> {
        ProcessRequest {
            input: ProcessInput {
                bounds: Bounds {
                    bbox: request.bbox.to_wsen(),
                    properties: BoundsProperties { crs: CRS84 },
                },
                data: vec![DataSource {
                    collection: &self.data_collection,
                    data_filter: DataFilter {
                        time_range: TimeRange {
                            from: format!("{}T00:00:00Z", request.interval.start_date),
                            to: format!("{}T23:59:59Z", request.interval.end_date),
                        },
                        mosaicking_order: "leastCC",
                    },
                }],
            },
            output: ProcessOutput {
                width: request.width,
                height: request.height,
                responses: vec![OutputResponse {
                    identifier: "default",
                    format: ResponseFormat {
                        mime_type: request.format.mime_type(),
                    },
                }],
            },
            evalscript: &request.evalscript,
        }
    }

    /// Run a Process API request and return the raw response body
    async fn process(&self, request: &RasterRequest) -> AppResult<Vec<u8>> {
        let token = self.access_token().await?;

        tracing::debug!(
            bbox = ?request.bbox.to_wsen(),
            from = %request.interval.start_date,
            to = %request.interval.end_date,
            width = request.width,
            height = request.height,
            format = request.format.mime_type(),
            "Sentinel Hub process request"
        );

        let response = self
            .http_client
            .post(&self.process_url)
            .bearer_auth(token)
            .header("Accept", request.format.mime_type())
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Process request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Process API error: {} - {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read response: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageryProvider for SentinelHubClient {
    async fn fetch_raster(&self, request: &RasterRequest) -> AppResult<RasterSample> {
        let bytes = self.process(request).await?;
        decode_float_tiff(&bytes, request.width, request.height)
    }

    async fn fetch_image(&self, request: &RasterRequest) -> AppResult<Vec<u8>> {
        let bytes = self.process(request).await?;
        ensure_png(&bytes)?;
        Ok(bytes)
    }
}

/// Decode a single-band FLOAT32 TIFF of the expected size
pub fn decode_float_tiff(bytes: &[u8], width: u32, height: u32) -> AppResult<RasterSample> {
    let malformed = |e: tiff::TiffError| AppError::Provider(format!("Malformed raster: {}", e));

    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(malformed)?;
    let (actual_width, actual_height) = decoder.dimensions().map_err(malformed)?;
    if (actual_width, actual_height) != (width, height) {
        return Err(AppError::Provider(format!(
            "Raster is {}x{}, expected {}x{}",
            actual_width, actual_height, width, height
        )));
    }

    let values = match decoder.read_image().map_err(malformed)? {
        DecodingResult::F32(values) => values,
        _ => {
            return Err(AppError::Provider(
                "Raster is not a 32-bit float image".to_string(),
            ))
        }
    };

    if values.is_empty() {
        return Err(AppError::Provider("Raster is empty".to_string()));
    }

    RasterSample::new(width as usize, height as usize, values).ok_or_else(|| {
        AppError::Provider("Raster has more than one band".to_string())
    })
}

/// Reject anything that does not sniff as PNG
pub fn ensure_png(bytes: &[u8]) -> AppResult<()> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(()),
        Ok(other) => Err(AppError::Provider(format!(
            "Expected PNG image, got {:?}",
            other
        ))),
        Err(_) => Err(AppError::Provider("Response is not an image".to_string())),
    }
}
