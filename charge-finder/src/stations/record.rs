//! Station records and response normalization.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::domain::Coordinate;

/// Keys kept on a station record. Everything else the API returns is dropped.
pub const STATION_KEYS: &[&str] = &[
    "station_name",
    "id",
    "station_id",
    "access_code",
    "access_days_time",
    "station_phone",
    "updated_at",
    "latitude",
    "longitude",
    "city",
    "intersection_directions",
    "state",
    "street_address",
    "zip",
    "country",
    "ev_connector_types",
    "ev_dc_fast_num",
    "ev_level1_evse_num",
    "ev_level2_evse_num",
    "ev_network",
    "ev_pricing",
    "ev_network_ids",
    "ports",
    "distance",
    "distance_km",
];

/// Raw station directory response.
///
/// Only the station list is required; the paging metadata is kept when
/// present.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsResponse {
    pub fuel_stations: Vec<Map<String, Value>>,

    #[serde(default)]
    pub total_results: Option<u64>,
}

/// One charging station, restricted to [`STATION_KEYS`].
///
/// Keys keep the order the API sent them in. Deserializing goes through
/// [`StationRecord::from_raw`]; serializing writes the plain object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct StationRecord(Map<String, Value>);

impl StationRecord {
    /// Build a record from a raw station object, dropping unknown keys.
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        Self(
            raw.into_iter()
                .filter(|(k, _)| STATION_KEYS.contains(&k.as_str()))
                .collect(),
        )
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field names, in upstream order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Station name.
    pub fn name(&self) -> Option<&str> {
        self.get("station_name").and_then(Value::as_str)
    }

    /// Station identifier (`id`, falling back to `station_id`).
    pub fn id(&self) -> Option<i64> {
        self.get("id")
            .or_else(|| self.get("station_id"))
            .and_then(Value::as_i64)
    }

    /// Station location, if both latitude and longitude are numeric.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.get("latitude").and_then(Value::as_f64)?;
        let lon = self.get("longitude").and_then(Value::as_f64)?;
        Some(Coordinate::new(lat, lon))
    }

    /// Distance from the search location in miles, as reported by the API.
    pub fn distance(&self) -> Option<f64> {
        self.get("distance").and_then(Value::as_f64)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for StationRecord {
    fn from(raw: Map<String, Value>) -> Self {
        Self::from_raw(raw)
    }
}

impl Serialize for StationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Normalize every station in a response.
pub fn normalize_stations(response: StationsResponse) -> Vec<StationRecord> {
    let stations: Vec<StationRecord> = response
        .fuel_stations
        .into_iter()
        .map(StationRecord::from_raw)
        .collect();

    trace!(
        count = stations.len(),
        total_results = ?response.total_results,
        "normalized station list"
    );

    stations
}
