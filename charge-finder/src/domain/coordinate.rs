//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
///
/// No range validation is applied: coordinates come straight from the
/// device or a geocoder and are handed on unchanged.
///
/// # Examples
///
/// ```
/// use charge_finder::domain::Coordinate;
///
/// let boulder = Coordinate::new(40.0, -105.3);
/// assert_eq!(boulder.latitude, 40.0);
/// assert_eq!(boulder.to_string(), "40.0,-105.3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude rendered as a query parameter value.
    ///
    /// Always includes a decimal point, so `40.0` stays `"40.0"` rather
    /// than `"40"`.
    pub fn latitude_param(&self) -> String {
        format_degrees(self.latitude)
    }

    /// Longitude rendered as a query parameter value.
    pub fn longitude_param(&self) -> String {
        format_degrees(self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.latitude, c.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude_param(), self.longitude_param())
    }
}

/// Shortest round-trip representation, keeping a trailing `.0` on whole numbers.
fn format_degrees(value: f64) -> String {
    format!("{value:?}")
}
