//! Concurrent weather-event scan over a lat/lon grid
//!
//! One provider lookup runs per grid cell. Lookups go through a worker pool
//! sized at startup, every cell has its own timeout, and a failing cell is
//! logged and skipped without affecting the rest of the scan.

use std::sync::Arc;
use std::time::Duration;

use shared::geometry::enumerate_cells;
use shared::{classify, Coordinate, FlaggedPoint, GridError, SearchWindow};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ScannerConfig;
use crate::external::weather::{ProviderError, WeatherSampleProvider};

/// Why a single cell produced no result
#[derive(Error, Debug)]
enum CellFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("lookup timed out after {0:?}")]
    TimedOut(Duration),

    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Grid scanner with an owned, bounded worker pool
pub struct GridScanner {
    workers: Arc<Semaphore>,
    concurrency: usize,
    cell_timeout: Duration,
    max_cells: usize,
}

impl GridScanner {
    pub fn new(config: &ScannerConfig) -> Self {
        Self::with_limits(
            config.concurrency,
            Duration::from_secs(config.cell_timeout_secs),
            config.max_cells,
        )
    }

    /// Build a scanner with explicit limits; concurrency is at least 1
    pub fn with_limits(concurrency: usize, cell_timeout: Duration, max_cells: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            workers: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            cell_timeout,
            max_cells,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    /// Total cell count across `windows`, rejected when it exceeds the budget
    pub fn check_budget(
        &self,
        windows: &[SearchWindow],
        lat_step: f64,
        lon_step: f64,
    ) -> Result<usize, GridError> {
        let mut requested = 0usize;
        for window in windows {
            let cells = enumerate_cells(window, lat_step, lon_step)?;
            requested = requested.saturating_add(cells.total());
        }

        if requested > self.max_cells {
            return Err(GridError::TooManyCells {
                requested,
                limit: self.max_cells,
            });
        }
        Ok(requested)
    }

    /// Scan one non-wrapping window.
    ///
    /// Steps and the cell budget are checked before any lookup is dispatched.
    /// Returns the cells with at least one event tag, in no particular order.
    pub async fn scan(
        &self,
        window: &SearchWindow,
        lat_step: f64,
        lon_step: f64,
        provider: Arc<dyn WeatherSampleProvider>,
    ) -> Result<Vec<FlaggedPoint>, GridError> {
        let total = self.check_budget(std::slice::from_ref(window), lat_step, lon_step)?;
        let cells = enumerate_cells(window, lat_step, lon_step)?;

        let scan_id = Uuid::new_v4();
        info!(
            %scan_id,
            cells = total,
            provider = provider.name(),
            min_lat = window.min_lat,
            max_lat = window.max_lat,
            min_lon = window.min_lon,
            max_lon = window.max_lon,
            "Grid scan started"
        );

        let mut lookups = JoinSet::new();
        for cell in cells {
            let provider = Arc::clone(&provider);
            let workers = Arc::clone(&self.workers);
            let cell_timeout = self.cell_timeout;

            lookups.spawn(async move {
                let result = lookup_cell(cell, provider, workers, cell_timeout).await;
                (cell, result)
            });
        }

        let mut points = Vec::new();
        let mut failures = 0usize;

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((_, Ok(Some(point)))) => points.push(point),
                Ok((_, Ok(None))) => {}
                Ok((cell, Err(failure))) => {
                    failures += 1;
                    warn!(
                        %scan_id,
                        lat = cell.latitude,
                        lon = cell.longitude,
                        error = %failure,
                        "Cell lookup failed"
                    );
                }
                Err(join_err) => {
                    failures += 1;
                    warn!(%scan_id, error = %join_err, "Cell task panicked");
                }
            }
        }

        info!(
            %scan_id,
            cells = total,
            flagged = points.len(),
            failed = failures,
            "Grid scan finished"
        );

        Ok(points)
    }

    /// Close the worker pool. Lookups waiting for a worker, and any started
    /// later, fail instead of blocking.
    pub fn shutdown(&self) {
        self.workers.close();
        info!("Grid scanner worker pool closed");
    }
}

async fn lookup_cell(
    cell: Coordinate,
    provider: Arc<dyn WeatherSampleProvider>,
    workers: Arc<Semaphore>,
    cell_timeout: Duration,
) -> Result<Option<FlaggedPoint>, CellFailure> {
    let _permit = workers
        .acquire_owned()
        .await
        .map_err(|_| CellFailure::PoolClosed)?;

    let sample = tokio::time::timeout(cell_timeout, provider.fetch(cell))
        .await
        .map_err(|_| CellFailure::TimedOut(cell_timeout))??;

    Ok(FlaggedPoint::new(cell, classify(&sample)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cloud_cover, FakeProvider};
    use shared::geometry::compute_window;
    use shared::EventTag;
    use std::sync::atomic::Ordering;
    use tokio_test::{assert_err, assert_ok};

    fn scanner() -> GridScanner {
        GridScanner::with_limits(10, Duration::from_secs(5), 2000)
    }

    fn window_around_origin() -> SearchWindow {
        compute_window(Coordinate::new(0.0, 0.0), 10.0)
    }

    #[tokio::test]
    async fn test_single_cloudy_cell_is_flagged() {
        let provider = FakeProvider::new(|c| {
            if c.latitude == 10.0 && c.longitude == 10.0 {
                Ok(cloud_cover(80.0))
            } else {
                Ok(cloud_cover(10.0))
            }
        })
        .into_arc();

        let points = assert_ok!(
            scanner()
                .scan(&window_around_origin(), 10.0, 10.0, provider.clone())
                .await
        );

        assert_eq!(provider.calls.load(Ordering::SeqCst), 9);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].coordinate, Coordinate::new(10.0, 10.0));
        assert_eq!(
            points[0].tags.iter().copied().collect::<Vec<_>>(),
            vec![EventTag::Cloudiness]
        );
    }

    #[tokio::test]
    async fn test_failing_cell_is_isolated() {
        let provider = FakeProvider::new(|c| {
            if c.latitude == 0.0 && c.longitude == 0.0 {
                Err(ProviderError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(cloud_cover(90.0))
            }
        })
        .into_arc();

        let points = assert_ok!(
            scanner()
                .scan(&window_around_origin(), 10.0, 10.0, provider)
                .await
        );

        assert_eq!(points.len(), 8);
        assert!(points
            .iter()
            .all(|p| p.coordinate != Coordinate::new(0.0, 0.0)));
    }

    #[tokio::test]
    async fn test_all_cells_failing_yields_empty() {
        let provider =
            FakeProvider::new(|_| Err(ProviderError::MissingData("data".to_string()))).into_arc();

        let points = assert_ok!(
            scanner()
                .scan(&window_around_origin(), 5.0, 5.0, provider)
                .await
        );
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_cell_is_skipped() {
        let provider = FakeProvider::new(|c| {
            if c.latitude == -10.0 {
                panic!("provider bug");
            }
            Ok(cloud_cover(60.0))
        })
        .into_arc();

        let points = assert_ok!(
            scanner()
                .scan(&window_around_origin(), 10.0, 10.0, provider)
                .await
        );
        assert_eq!(points.len(), 6);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let provider = FakeProvider::new(|_| Ok(cloud_cover(0.0)))
            .with_delay(Duration::from_millis(20))
            .into_arc();
        let scanner = GridScanner::with_limits(3, Duration::from_secs(5), 2000);

        let window = SearchWindow::new(0.0, 10.0, 0.0, 10.0);
        assert_ok!(scanner.scan(&window, 2.0, 2.0, provider.clone()).await);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 36);
        let peak = provider.max_in_flight.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak in flight was {}", peak);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let provider = FakeProvider::new(|_| Ok(cloud_cover(100.0)))
            .with_delay(Duration::from_secs(5))
            .into_arc();
        let scanner = GridScanner::with_limits(10, Duration::from_millis(50), 2000);

        let window = SearchWindow::new(0.0, 5.0, 0.0, 5.0);
        let points = assert_ok!(scanner.scan(&window, 5.0, 5.0, provider).await);
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_step_rejected_before_dispatch() {
        let provider = FakeProvider::new(|_| Ok(cloud_cover(100.0))).into_arc();

        let err = assert_err!(
            scanner()
                .scan(&window_around_origin(), 0.0, 5.0, provider.clone())
                .await
        );
        assert!(matches!(err, GridError::InvalidStep { .. }));

        let err = assert_err!(
            scanner()
                .scan(&window_around_origin(), 5.0, f64::NAN, provider.clone())
                .await
        );
        assert!(matches!(err, GridError::InvalidStep { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cell_budget_enforced() {
        let provider = FakeProvider::new(|_| Ok(cloud_cover(100.0))).into_arc();
        let scanner = GridScanner::with_limits(4, Duration::from_secs(5), 8);

        let err = assert_err!(
            scanner
                .scan(&window_around_origin(), 10.0, 10.0, provider.clone())
                .await
        );
        assert_eq!(
            err,
            GridError::TooManyCells {
                requested: 9,
                limit: 8
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_budget_sums_windows() {
        let scanner = GridScanner::with_limits(4, Duration::from_secs(5), 30);
        let parts = [
            SearchWindow::new(-10.0, 10.0, 165.0, 180.0),
            SearchWindow::new(-10.0, 10.0, -180.0, -175.0),
        ];
        assert_eq!(scanner.check_budget(&parts, 5.0, 5.0), Ok(30));
        assert!(scanner.check_budget(&parts, 4.0, 5.0).is_err());
    }

    #[tokio::test]
    async fn test_scan_after_shutdown_returns_empty() {
        let provider = FakeProvider::new(|_| Ok(cloud_cover(100.0))).into_arc();
        let scanner = scanner();
        scanner.shutdown();

        let points = assert_ok!(
            scanner
                .scan(&window_around_origin(), 10.0, 10.0, provider.clone())
                .await
        );
        assert!(points.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
