//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Axis-aligned rectangle in WGS84 degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Square box of half-width `half_width` degrees around `center`.
    ///
    /// Edges are clamped to the valid geographic range, so a point within
    /// `half_width` of a pole or the antimeridian yields a narrower box.
    pub fn around(center: GeoPoint, half_width: f64) -> Self {
        Self {
            north: (center.latitude + half_width).min(90.0),
            south: (center.latitude - half_width).max(-90.0),
            east: (center.longitude + half_width).min(180.0),
            west: (center.longitude - half_width).max(-180.0),
        }
    }

    /// Bounds in provider order: west, south, east, north
    pub fn to_wsen(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

/// Region of interest: either a single point or a bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point(GeoPoint),
    BoundingBox(BoundingBox),
}

/// Which input shape a resolved region came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeometryMode {
    Point,
    Bbox,
}

impl std::fmt::Display for GeometryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryMode::Point => write!(f, "point"),
            GeometryMode::Bbox => write!(f, "bbox"),
        }
    }
}

/// Flat request shape accepted from clients.
///
/// Either all four bounds or both point coordinates must be given; the bbox
/// wins when both are present. Converted into [`Geometry`] at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
}

/// Inclusive calendar window (both ends `YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TimeInterval {
    /// One-day window `[end - 1 day, end]`, the narrowest window that still
    /// catches a single satellite pass.
    pub fn single_pass(end_date: NaiveDate) -> Self {
        Self {
            start_date: end_date - chrono::Duration::days(1),
            end_date,
        }
    }
}
