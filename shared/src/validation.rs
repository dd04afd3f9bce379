//! Validation utilities for coordinates and date windows

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{BoundingBox, GeoPoint, TimeInterval};

/// Date format accepted on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reasons a region is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Provide either latitude/longitude or all of north/south/east/west")]
    MissingCoordinates,

    #[error("{field} must be between -90 and 90 (got {value})")]
    LatitudeOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be between -180 and 180 (got {value})")]
    LongitudeOutOfRange { field: &'static str, value: f64 },

    #[error("north ({north}) must be greater than south ({south})")]
    NorthNotAboveSouth { north: f64, south: f64 },

    #[error("east ({east}) must be greater than west ({west})")]
    EastNotAboveWest { east: f64, west: f64 },
}

impl GeometryError {
    /// Request field the error refers to, if a single one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            GeometryError::MissingCoordinates => None,
            GeometryError::LatitudeOutOfRange { field, .. }
            | GeometryError::LongitudeOutOfRange { field, .. } => Some(*field),
            GeometryError::NorthNotAboveSouth { .. } => Some("north"),
            GeometryError::EastNotAboveWest { .. } => Some("east"),
        }
    }
}

/// Reasons a date window is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Invalid {field} '{value}'. Use YYYY-MM-DD")]
    InvalidFormat { field: &'static str, value: String },

    #[error("Start date {start} must not be after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} cannot be in the future (today is {today})")]
    EndInFuture { end: NaiveDate, today: NaiveDate },
}

impl DateRangeError {
    pub fn field(&self) -> &'static str {
        match self {
            DateRangeError::InvalidFormat { field, .. } => *field,
            DateRangeError::StartAfterEnd { .. } => "start_date",
            DateRangeError::EndInFuture { .. } => "end_date",
        }
    }
}

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate a latitude value, naming the offending field on failure
pub fn validate_latitude(field: &'static str, value: f64) -> Result<(), GeometryError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(GeometryError::LatitudeOutOfRange { field, value })
    }
}

/// Validate a longitude value, naming the offending field on failure
pub fn validate_longitude(field: &'static str, value: f64) -> Result<(), GeometryError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(GeometryError::LongitudeOutOfRange { field, value })
    }
}

pub fn validate_point(point: &GeoPoint) -> Result<(), GeometryError> {
    validate_latitude("latitude", point.latitude)?;
    validate_longitude("longitude", point.longitude)
}

/// Validate bound ranges first, then ordering
pub fn validate_bounding_box(bbox: &BoundingBox) -> Result<(), GeometryError> {
    validate_latitude("north", bbox.north)?;
    validate_latitude("south", bbox.south)?;
    validate_longitude("east", bbox.east)?;
    validate_longitude("west", bbox.west)?;

    if bbox.north <= bbox.south {
        return Err(GeometryError::NorthNotAboveSouth {
            north: bbox.north,
            south: bbox.south,
        });
    }
    if bbox.east <= bbox.west {
        return Err(GeometryError::EastNotAboveWest {
            east: bbox.east,
            west: bbox.west,
        });
    }
    Ok(())
}

// ============================================================================
// Date Validations
// ============================================================================

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        DateRangeError::InvalidFormat {
            field,
            value: value.to_string(),
        }
    })
}

/// Validate `start <= end <= today`
pub fn validate_time_interval(
    interval: &TimeInterval,
    today: NaiveDate,
) -> Result<(), DateRangeError> {
    if interval.start_date > interval.end_date {
        return Err(DateRangeError::StartAfterEnd {
            start: interval.start_date,
            end: interval.end_date,
        });
    }
    if interval.end_date > today {
        return Err(DateRangeError::EndInFuture {
            end: interval.end_date,
            today,
        });
    }
    Ok(())
}

/// Parse and validate a window from its wire representation
pub fn parse_time_interval(
    start_date: &str,
    end_date: &str,
    today: NaiveDate,
) -> Result<TimeInterval, DateRangeError> {
    let interval = TimeInterval {
        start_date: parse_date("start_date", start_date)?,
        end_date: parse_date("end_date", end_date)?,
    };
    validate_time_interval(&interval, today)?;
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    // ========================================================================
    // Coordinate Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_latitude_limits() {
        assert!(validate_latitude("latitude", 90.0).is_ok());
        assert!(validate_latitude("latitude", -90.0).is_ok());
        assert!(validate_latitude("latitude", 90.0001).is_err());
        assert!(validate_latitude("latitude", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_longitude_limits() {
        assert!(validate_longitude("longitude", 180.0).is_ok());
        assert!(validate_longitude("longitude", -180.0).is_ok());
        assert_eq!(
            validate_longitude("west", -181.0),
            Err(GeometryError::LongitudeOutOfRange {
                field: "west",
                value: -181.0
            })
        );
    }

    #[test]
    fn test_validate_bounding_box_valid() {
        let bbox = BoundingBox::new(13.8, 13.7, 100.6, 100.5);
        assert!(validate_bounding_box(&bbox).is_ok());
    }

    #[test]
    fn test_validate_bounding_box_inverted_latitudes() {
        let bbox = BoundingBox::new(13.7, 13.8, 100.6, 100.5);
        let err = validate_bounding_box(&bbox).unwrap_err();
        assert!(matches!(err, GeometryError::NorthNotAboveSouth { .. }));
        assert_eq!(err.field(), Some("north"));
    }

    #[test]
    fn test_validate_bounding_box_degenerate_width() {
        let bbox = BoundingBox::new(13.8, 13.7, 100.5, 100.5);
        assert!(matches!(
            validate_bounding_box(&bbox),
            Err(GeometryError::EastNotAboveWest { .. })
        ));
    }

    #[test]
    fn test_validate_bounding_box_range_checked_before_order() {
        let bbox = BoundingBox::new(95.0, 100.0, 10.0, 20.0);
        assert_eq!(
            validate_bounding_box(&bbox),
            Err(GeometryError::LatitudeOutOfRange {
                field: "north",
                value: 95.0
            })
        );
    }

    // ========================================================================
    // Date Validation Tests
    // ========================================================================

    #[test]
    fn test_parse_time_interval_valid() {
        let today = date("2024-06-30");
        let interval = parse_time_interval("2024-06-01", "2024-06-15", today).unwrap();
        assert_eq!(interval.start_date, date("2024-06-01"));
        assert_eq!(interval.end_date, date("2024-06-15"));
    }

    #[test]
    fn test_parse_time_interval_same_day() {
        let today = date("2024-06-30");
        assert!(parse_time_interval("2024-06-30", "2024-06-30", today).is_ok());
    }

    #[test]
    fn test_parse_time_interval_bad_format() {
        let today = date("2024-06-30");
        let err = parse_time_interval("06/01/2024", "2024-06-15", today).unwrap_err();
        assert_eq!(err.field(), "start_date");
        assert!(matches!(err, DateRangeError::InvalidFormat { .. }));
    }

    #[test]
    fn test_parse_time_interval_start_after_end() {
        let today = date("2024-06-30");
        assert!(matches!(
            parse_time_interval("2024-06-20", "2024-06-10", today),
            Err(DateRangeError::StartAfterEnd { .. })
        ));
    }

    #[test]
    fn test_parse_time_interval_future_end() {
        let today = date("2024-06-30");
        let err = parse_time_interval("2024-06-20", "2024-07-01", today).unwrap_err();
        assert_eq!(err.field(), "end_date");
    }
}
