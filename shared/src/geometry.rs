//! Geometry resolution
//!
//! Turns a point or bounding box request into a validated rectangle that can
//! be sent to the imagery provider, remembering which shape it came from.

use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, GeoPoint, Geometry, GeometryMode, RegionInput};
use crate::validation::{validate_bounding_box, validate_point, GeometryError};

/// Default half-width (degrees) used to expand a point into a box
pub const DEFAULT_POINT_MARGIN_DEG: f64 = 0.01;

/// A validated region ready for a raster request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResolvedGeometry {
    pub bbox: BoundingBox,
    pub mode: GeometryMode,
    /// The original point, only in point mode
    pub point: Option<GeoPoint>,
}

/// Resolves requested regions into validated bounding boxes
#[derive(Debug, Clone, Copy)]
pub struct GeometryResolver {
    point_margin_deg: f64,
}

impl Default for GeometryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_POINT_MARGIN_DEG)
    }
}

impl GeometryResolver {
    pub fn new(point_margin_deg: f64) -> Self {
        Self { point_margin_deg }
    }

    /// Validate a geometry and expand points into boxes
    pub fn resolve(&self, geometry: &Geometry) -> Result<ResolvedGeometry, GeometryError> {
        match geometry {
            Geometry::BoundingBox(bbox) => {
                validate_bounding_box(bbox)?;
                Ok(ResolvedGeometry {
                    bbox: *bbox,
                    mode: GeometryMode::Bbox,
                    point: None,
                })
            }
            Geometry::Point(point) => {
                validate_point(point)?;
                Ok(ResolvedGeometry {
                    bbox: BoundingBox::around(*point, self.point_margin_deg),
                    mode: GeometryMode::Point,
                    point: Some(*point),
                })
            }
        }
    }
}

impl RegionInput {
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn bbox(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north: Some(north),
            south: Some(south),
            east: Some(east),
            west: Some(west),
            ..Self::default()
        }
    }

    /// Pick the input shape: all four bounds win over a point.
    ///
    /// Only shape selection happens here; range and ordering checks are left
    /// to [`GeometryResolver::resolve`].
    pub fn into_geometry(self) -> Result<Geometry, GeometryError> {
        let numeric = |v: Option<f64>| v.filter(|x| x.is_finite());

        if let (Some(north), Some(south), Some(east), Some(west)) = (
            numeric(self.north),
            numeric(self.south),
            numeric(self.east),
            numeric(self.west),
        ) {
            return Ok(Geometry::BoundingBox(BoundingBox::new(
                north, south, east, west,
            )));
        }

        if let (Some(latitude), Some(longitude)) = (numeric(self.latitude), numeric(self.longitude))
        {
            return Ok(Geometry::Point(GeoPoint::new(latitude, longitude)));
        }

        Err(GeometryError::MissingCoordinates)
    }
}

impl TryFrom<RegionInput> for Geometry {
    type Error = GeometryError;

    fn try_from(input: RegionInput) -> Result<Self, Self::Error> {
        input.into_geometry()
    }
}
