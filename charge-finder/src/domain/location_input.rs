//! Location supplied by the caller, either free text or coordinates.

use std::fmt;

use super::Coordinate;

/// Where to search from.
///
/// The station directory accepts either a free-text place ("Boulder, CO",
/// a postal code, a street address) or an explicit coordinate pair, and the
/// query parameters differ between the two.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Free-text location understood by the upstream API.
    Text(String),
    /// Explicit latitude/longitude.
    Coordinates(Coordinate),
}

impl LocationInput {
    /// Build a text location.
    pub fn text(s: impl Into<String>) -> Self {
        LocationInput::Text(s.into())
    }

    /// Returns the coordinate if this location is one.
    pub fn as_coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationInput::Coordinates(c) => Some(*c),
            LocationInput::Text(_) => None,
        }
    }

    /// Query parameters identifying this location.
    ///
    /// Text becomes `location`; coordinates become `latitude` and `longitude`.
    pub fn query_params(&self) -> Vec<(String, String)> {
        match self {
            LocationInput::Text(text) => vec![("location".to_string(), text.clone())],
            LocationInput::Coordinates(c) => vec![
                ("latitude".to_string(), c.latitude_param()),
                ("longitude".to_string(), c.longitude_param()),
            ],
        }
    }
}

impl From<Coordinate> for LocationInput {
    fn from(c: Coordinate) -> Self {
        LocationInput::Coordinates(c)
    }
}

impl From<&str> for LocationInput {
    fn from(s: &str) -> Self {
        LocationInput::Text(s.to_string())
    }
}

impl From<String> for LocationInput {
    fn from(s: String) -> Self {
        LocationInput::Text(s)
    }
}

impl fmt::Display for LocationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationInput::Text(text) => f.write_str(text),
            LocationInput::Coordinates(c) => write!(f, "{c}"),
        }
    }
}
