//! NDVI analysis HTTP handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    analyze_trend, parse_time_interval, GeoPoint, Geometry, HistoryPoint, NdviSummary,
    RegionInput, TimeInterval, TrendResult,
};
use validator::Validate;

use crate::error::AppResult;
use crate::services::{HealthStatusReport, HistoryService, ImageryService, NdviService};
use crate::AppState;

/// Region plus date window, shared by analysis and imagery endpoints
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(flatten)]
    pub region: RegionInput,
    pub start_date: String,
    pub end_date: String,
}

impl AnalyzeRequest {
    fn into_parts(self, today: NaiveDate) -> AppResult<(Geometry, TimeInterval)> {
        let interval = parse_time_interval(&self.start_date, &self.end_date, today)?;
        let geometry = self.region.into_geometry()?;
        Ok((geometry, interval))
    }
}

fn default_days() -> u32 {
    30
}

fn default_step_days() -> u32 {
    7
}

/// Query parameters for NDVI history
#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 365))]
    pub days: u32,
    #[serde(default = "default_step_days")]
    #[validate(range(min = 1, max = 30))]
    pub step_days: u32,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub history: Vec<HistoryPoint>,
    pub trend_analysis: TrendResult,
}

/// Query parameters for the current health status
#[derive(Debug, Deserialize, Validate)]
pub struct HealthStatusQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Analyze NDVI for a point or bounding box
pub async fn analyze_ndvi(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeRequest>,
) -> AppResult<Json<NdviSummary>> {
    let (geometry, interval) = input.into_parts(today())?;
    let service = NdviService::new(state.provider.clone(), &state.config.ndvi);
    let summary = service.calculate(&geometry, &interval).await?;
    Ok(Json(summary))
}

/// True-color PNG for a region
pub async fn true_color_image(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeRequest>,
) -> AppResult<impl IntoResponse> {
    let (geometry, interval) = input.into_parts(today())?;
    let service = ImageryService::new(state.provider.clone(), &state.config.ndvi);
    let png = service.true_color(&geometry, &interval).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// NDVI heatmap PNG for a region
pub async fn ndvi_heatmap(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeRequest>,
) -> AppResult<impl IntoResponse> {
    let (geometry, interval) = input.into_parts(today())?;
    let service = ImageryService::new(state.provider.clone(), &state.config.ndvi);
    let png = service.heatmap(&geometry, &interval).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// NDVI time series at a point with its trend
pub async fn ndvi_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    query.validate()?;

    let service = HistoryService::new(state.provider.clone(), &state.config.ndvi);
    let center = GeoPoint::new(query.latitude, query.longitude);
    let history = service
        .sample(center, query.days, query.step_days, today())
        .await?;
    let trend_analysis = analyze_trend(&history);

    Ok(Json(HistoryResponse {
        latitude: query.latitude,
        longitude: query.longitude,
        history,
        trend_analysis,
    }))
}

/// Trend of a caller-supplied series, ordered by date before fitting
pub async fn ndvi_trend(Json(mut series): Json<Vec<HistoryPoint>>) -> Json<TrendResult> {
    series.sort_by_key(|p| p.date);
    Json(analyze_trend(&series))
}

/// Current vegetation health at a point
pub async fn health_status(
    State(state): State<AppState>,
    Query(query): Query<HealthStatusQuery>,
) -> AppResult<Json<HealthStatusReport>> {
    query.validate()?;

    let service = NdviService::new(state.provider.clone(), &state.config.ndvi);
    let report = service
        .health_status(GeoPoint::new(query.latitude, query.longitude), today())
        .await?;
    Ok(Json(report))
}
