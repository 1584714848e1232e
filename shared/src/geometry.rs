//! Grid geometry for weather-event scans
//!
//! Turns a center point and a radius into one or two non-wrapping search
//! windows and enumerates the grid cells inside a window.

use crate::error::GridError;
use crate::types::{Coordinate, SearchWindow};
use crate::validation::validate_step;

/// Relative slack accepted past the inclusive upper bound of an axis
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Upper bound on cells along one axis
const MAX_AXIS_CELLS: usize = u32::MAX as usize;

/// Compute the search window around `center`.
///
/// Latitude is clamped to [-90, 90]. Longitude is left unclamped and may fall
/// outside [-180, 180]; [`split_antimeridian`] normalizes it.
pub fn compute_window(center: Coordinate, radius_degrees: f64) -> SearchWindow {
    SearchWindow {
        min_lat: (center.latitude - radius_degrees).clamp(-90.0, 90.0),
        max_lat: (center.latitude + radius_degrees).clamp(-90.0, 90.0),
        min_lon: center.longitude - radius_degrees,
        max_lon: center.longitude + radius_degrees,
    }
}

/// Wrap a longitude into [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        -180.0
    } else {
        wrapped - 180.0
    }
}

/// Normalize the longitude bounds of `window` and split it at ±180° if needed.
///
/// A raw span of 360° or more (within float slack) becomes the single window `[-180, 180]`.
/// Otherwise returns one window when the normalized range does not wrap, or
/// `[min_lon, 180]` followed by `[-180, max_lon]`. Latitude bounds are copied
/// unchanged into every returned window.
pub fn split_antimeridian(window: &SearchWindow) -> Vec<SearchWindow> {
    if window.max_lon - window.min_lon >= 360.0 - BOUNDARY_TOLERANCE {
        return vec![SearchWindow::new(
            window.min_lat,
            window.max_lat,
            -180.0,
            180.0,
        )];
    }

    let min_lon = normalize_longitude(window.min_lon);
    let max_lon = normalize_longitude(window.max_lon);

    if min_lon <= max_lon {
        return vec![SearchWindow::new(
            window.min_lat,
            window.max_lat,
            min_lon,
            max_lon,
        )];
    }

    vec![
        SearchWindow::new(window.min_lat, window.max_lat, min_lon, 180.0),
        SearchWindow::new(window.min_lat, window.max_lat, -180.0, max_lon),
    ]
}

/// Enumerate the grid cells of a non-wrapping window, row by row.
pub fn enumerate_cells(
    window: &SearchWindow,
    lat_step: f64,
    lon_step: f64,
) -> Result<Cells, GridError> {
    validate_step("latitude", lat_step)?;
    validate_step("longitude", lon_step)?;

    if window.wraps_antimeridian() {
        return Err(GridError::WrappingWindow {
            min_lon: window.min_lon,
            max_lon: window.max_lon,
        });
    }

    Ok(Cells {
        window: *window,
        lat_step,
        lon_step,
        rows: axis_len(window.lat_span(), lat_step),
        cols: axis_len(window.lon_span(), lon_step),
        next: 0,
    })
}

/// Number of cells along one axis with an inclusive upper bound
fn axis_len(span: f64, step: f64) -> usize {
    if !(span >= 0.0) {
        return 0;
    }
    let slack = step * BOUNDARY_TOLERANCE;
    let steps = (span / step).floor();
    if steps >= MAX_AXIS_CELLS as f64 {
        return MAX_AXIS_CELLS;
    }
    let mut count = steps as usize + 1;
    // Float division can land either side of an exact multiple
    if (count as f64) * step <= span + slack {
        count += 1;
    }
    while count > 1 && ((count - 1) as f64) * step > span + slack {
        count -= 1;
    }
    count
}

/// Iterator over the cells of a search window.
///
/// Cloning yields an independent iterator starting from the same position, so
/// a fresh clone taken before iteration replays the full grid.
#[derive(Debug, Clone)]
pub struct Cells {
    window: SearchWindow,
    lat_step: f64,
    lon_step: f64,
    rows: usize,
    cols: usize,
    next: usize,
}

impl Cells {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells in the grid, saturating on overflow
    pub fn total(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    fn coordinate(&self, index: usize) -> Coordinate {
        let row = index / self.cols;
        let col = index % self.cols;
        let lat = self.window.min_lat + row as f64 * self.lat_step;
        let lon = self.window.min_lon + col as f64 * self.lon_step;
        // A cell within tolerance of the bound lands on the bound itself
        Coordinate::new(lat.min(self.window.max_lat), lon.min(self.window.max_lon))
    }
}

impl Iterator for Cells {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        if self.next >= self.total() {
            return None;
        }
        let cell = self.coordinate(self.next);
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells {}
