//! Mapping API response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Coordinate;

/// Routing response, kept exactly as the API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteInfo(Value);

impl RouteInfo {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Summary of the first route, if any.
    fn summary(&self) -> Option<&Value> {
        self.0.pointer("/response/route/0/summary")
    }

    /// Length of the first route in meters.
    pub fn distance_meters(&self) -> Option<f64> {
        self.summary()?.get("distance")?.as_f64()
    }

    /// Travel time of the first route in seconds.
    pub fn travel_time_secs(&self) -> Option<f64> {
        self.summary()?.get("travelTime")?.as_f64()
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

/// Geocoder response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeResponse {
    pub response: GeocodeBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeBody {
    #[serde(default)]
    pub view: Vec<GeocodeView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeView {
    #[serde(default)]
    pub result: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeResult {
    #[serde(default)]
    pub relevance: Option<f64>,
    pub location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeocodeLocation {
    pub display_position: GeoPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodeResponse {
    /// Position of the most relevant match, if the geocoder found one.
    ///
    /// Results without a relevance score rank lowest; ties go to the one
    /// listed first.
    pub fn best_match(&self) -> Option<Coordinate> {
        let relevance = |r: &GeocodeResult| r.relevance.unwrap_or(0.0);
        let result = self
            .response
            .view
            .iter()
            .flat_map(|v| &v.result)
            .reduce(|best, r| if relevance(r) > relevance(best) { r } else { best })?;
        let pos = &result.location.display_position;
        Some(Coordinate::new(pos.latitude, pos.longitude))
    }
}
