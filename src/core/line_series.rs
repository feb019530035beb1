use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{CoordinateMap, DataPoint, Row, ScaleKind};

/// Projected polyline vertex in plot-area pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// Column selection for one line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColumns<'a> {
    pub x_column: &'a str,
    pub x_kind: ScaleKind,
    pub y_column: &'a str,
    pub y_kind: ScaleKind,
}

/// Coerced samples plus the number of rows that could not be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPoints {
    pub points: Vec<DataPoint>,
    pub skipped: usize,
}

/// Extracts samples from rows in their given order.
///
/// Rows whose selected columns are absent or do not coerce for the active
/// scale kind are skipped.
#[must_use]
pub fn extract_points(rows: &[Row], columns: SeriesColumns<'_>) -> SeriesPoints {
    let mut series = SeriesPoints {
        points: Vec::with_capacity(rows.len()),
        skipped: 0,
    };
    for (index, row) in rows.iter().enumerate() {
        let x = row.coordinate(columns.x_column, columns.x_kind);
        let y = row.coordinate(columns.y_column, columns.y_kind);
        match (x, y) {
            (Some(x), Some(y)) => series.points.push(DataPoint::new(x, y)),
            _ => {
                trace!(row = index, "skipping row without usable coordinates");
                series.skipped += 1;
            }
        }
    }
    series
}

/// Minimum and maximum `x` across samples, or `None` when empty.
#[must_use]
pub fn x_extent(points: &[DataPoint]) -> Option<(f64, f64)> {
    extent(points.iter().map(|point| point.x))
}

/// Minimum and maximum `y` across samples, or `None` when empty.
#[must_use]
pub fn y_extent(points: &[DataPoint]) -> Option<(f64, f64)> {
    extent(points.iter().map(|point| point.y))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

/// Projects samples through the axis maps, preserving sample order.
///
/// The function is deterministic and side-effect free so both rendering and
/// tests can consume the exact same geometry output.
#[must_use]
pub fn project_polyline(
    points: &[DataPoint],
    x_map: CoordinateMap,
    y_map: CoordinateMap,
) -> Vec<PathPoint> {
    points
        .iter()
        .map(|point| PathPoint {
            x: x_map.apply(point.x),
            y: y_map.apply(point.y),
        })
        .collect()
}
