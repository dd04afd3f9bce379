//! Historical NDVI sampling
//!
//! Walks backwards from today in fixed steps, taking one short window per
//! step around a point, and returns the non-empty samples oldest first.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use futures::stream::{self, StreamExt};
use shared::{GeoPoint, Geometry, GeometryResolver, HistoryPoint, TimeInterval};

use super::ndvi::NdviService;
use crate::config::NdviConfig;
use crate::error::{AppError, AppResult};
use crate::external::ImageryProvider;

/// Longest history the sampler will walk back over
pub const MAX_HISTORY_DAYS: u32 = 365;

/// Samples an NDVI time series at a point
#[derive(Clone)]
pub struct HistoryService {
    ndvi: NdviService,
    resolver: GeometryResolver,
    concurrency: usize,
}

impl HistoryService {
    pub fn new(provider: Arc<dyn ImageryProvider>, config: &NdviConfig) -> Self {
        Self {
            ndvi: NdviService::new(provider, config),
            resolver: GeometryResolver::new(config.history_margin_deg),
            concurrency: config.history_concurrency.max(1),
        }
    }

    /// End dates of each sample, newest first: `today - i * step_days`
    pub fn sample_dates(
        total_days: u32,
        step_days: u32,
        today: NaiveDate,
    ) -> AppResult<Vec<NaiveDate>> {
        if step_days == 0 {
            return Err(AppError::InvalidRange(
                "step_days must be at least 1".to_string(),
            ));
        }
        if total_days > MAX_HISTORY_DAYS {
            return Err(AppError::InvalidRange(format!(
                "days ({}) must be at most {}",
                total_days, MAX_HISTORY_DAYS
            )));
        }
        if total_days < step_days {
            return Err(AppError::InvalidRange(format!(
                "days ({}) must be at least step_days ({})",
                total_days, step_days
            )));
        }

        let count = (total_days / step_days).max(1);
        (0..count)
            .map(|i| {
                today
                    .checked_sub_signed(Duration::days(i64::from(i * step_days)))
                    .ok_or_else(|| {
                        AppError::InvalidRange(format!(
                            "sample dates before {} are out of range",
                            today
                        ))
                    })
            })
            .collect()
    }

    /// Sample NDVI every `step_days` over the last `total_days`.
    ///
    /// At most `history_concurrency` samples are in flight at once. Windows
    /// without usable pixels are dropped; any provider failure fails the
    /// whole series.
    pub async fn sample(
        &self,
        center: GeoPoint,
        total_days: u32,
        step_days: u32,
        today: NaiveDate,
    ) -> AppResult<Vec<HistoryPoint>> {
        let dates = Self::sample_dates(total_days, step_days, today)?;
        let region = self.resolver.resolve(&Geometry::Point(center))?;

        let windows: Vec<TimeInterval> =
            dates.into_iter().map(TimeInterval::single_pass).collect();
        let results: Vec<_> = stream::iter(
            (0..windows.len()).map(|i| self.ndvi.calculate_region(&region, &windows[i])),
        )
        .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let requested = windows.len();
        let mut series = Vec::with_capacity(requested);
        for result in results {
            let summary = result?;
            if let Some(point) = HistoryPoint::from_summary(&summary) {
                series.push(point);
            }
        }
        series.sort_by_key(|p| p.date);

        tracing::info!(
            requested,
            returned = series.len(),
            dropped = requested - series.len(),
            "NDVI history sampled"
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::external::RasterRequest;
    use crate::services::testing::FakeProvider;
    use async_trait::async_trait;
    use shared::RasterSample;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn service(provider: Arc<FakeProvider>) -> HistoryService {
        HistoryService::new(provider, &NdviConfig::default())
    }

    #[test]
    fn test_sample_dates() {
        let dates = HistoryService::sample_dates(30, 7, today()).unwrap();
        assert_eq!(
            dates,
            vec![
                today(),
                NaiveDate::from_ymd_opt(2024, 6, 23).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            ]
        );
    }

    #[test]
    fn test_sample_dates_single_step() {
        let dates = HistoryService::sample_dates(7, 7, today()).unwrap();
        assert_eq!(dates, vec![today()]);
    }

    #[test]
    fn test_sample_dates_rejects_too_long_history() {
        assert!(matches!(
            HistoryService::sample_dates(u32::MAX, 1, today()),
            Err(AppError::InvalidRange(_))
        ));
        assert!(HistoryService::sample_dates(MAX_HISTORY_DAYS, 1, today()).is_ok());
    }

    #[test]
    fn test_sample_dates_before_calendar_start() {
        let today = NaiveDate::MIN + Duration::days(10);
        assert!(matches!(
            HistoryService::sample_dates(30, 7, today),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_sample_dates_rejects_bad_ranges() {
        assert!(matches!(
            HistoryService::sample_dates(5, 7, today()),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            HistoryService::sample_dates(30, 0, today()),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn test_sample_issues_one_day_windows() {
        let provider = Arc::new(FakeProvider::uniform(0.5));
        let center = GeoPoint::new(13.75, 100.5);

        let series = service(provider.clone())
            .sample(center, 30, 7, today())
            .await
            .unwrap();

        assert_eq!(series.len(), 4);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.last().unwrap().date, today());

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        for request in requests.iter() {
            assert_eq!(
                request.interval.end_date - request.interval.start_date,
                Duration::days(1)
            );
            assert_eq!(request.bbox, shared::BoundingBox::around(center, 0.005));
        }
    }

    #[tokio::test]
    async fn test_sample_drops_clouded_windows() {
        let clouded = NaiveDate::from_ymd_opt(2024, 6, 23).unwrap();
        let provider = Arc::new(FakeProvider::from_fn(move |req| {
            let value = if req.interval.end_date == clouded {
                f32::NAN
            } else {
                0.45
            };
            Ok(vec![value; (req.width * req.height) as usize])
        }));

        let series = service(provider)
            .sample(GeoPoint::new(13.75, 100.5), 30, 7, today())
            .await
            .unwrap();

        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|p| p.date != clouded));
    }

    #[tokio::test]
    async fn test_sample_fails_on_provider_error() {
        let provider = Arc::new(FakeProvider::failing("rate limited"));
        let result = service(provider)
            .sample(GeoPoint::new(13.75, 100.5), 14, 7, today())
            .await;
        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn test_sample_rejects_range_before_fetching() {
        let provider = Arc::new(FakeProvider::uniform(0.5));
        let result = service(provider.clone())
            .sample(GeoPoint::new(13.75, 100.5), 5, 7, today())
            .await;
        assert!(matches!(result, Err(AppError::InvalidRange(_))));
        assert_eq!(provider.request_count(), 0);
    }

    /// Counts overlapping fetches; each one holds its slot for a few ms
    struct InFlightProvider {
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageryProvider for InFlightProvider {
        async fn fetch_raster(&self, request: &RasterRequest) -> AppResult<RasterSample> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            let (width, height) = (request.width as usize, request.height as usize);
            Ok(RasterSample::new(width, height, vec![0.5; width * height]).unwrap())
        }

        async fn fetch_image(&self, _request: &RasterRequest) -> AppResult<Vec<u8>> {
            unreachable!("history only fetches rasters")
        }
    }

    #[tokio::test]
    async fn test_sample_bounds_requests_in_flight() {
        let provider = Arc::new(InFlightProvider {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        });
        let config = NdviConfig {
            history_concurrency: 3,
            ..NdviConfig::default()
        };

        let series = HistoryService::new(provider.clone(), &config)
            .sample(GeoPoint::new(13.75, 100.5), 365, 1, today())
            .await
            .unwrap();

        assert_eq!(series.len(), 365);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 365);

        let peak = provider.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {}", peak);
        assert!(peak > 1, "fetches never overlapped");
    }
}
