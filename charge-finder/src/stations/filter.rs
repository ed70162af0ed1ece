//! Station filters.
//!
//! A filter is a set of field/value pairs. It is sent to the API as query
//! parameters, and can also be applied to fetched records with [`matches`].

use serde_json::{Map, Value};

use super::record::StationRecord;

/// Field name to required value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationFilter(Map<String, Value>);

impl StationFilter {
    /// An empty filter, which matches every station.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a required field value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The filter as query parameters, in insertion order.
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), query_value(v)))
            .collect()
    }
}

impl From<Map<String, Value>> for StationFilter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StationFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Render a filter value the way the API expects it in a query string.
///
/// Arrays become comma-separated lists (`J1772,CHADEMO`).
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Whether `station` has every field in `filter` with an equal value.
///
/// An empty filter matches every station.
pub fn matches(station: &StationRecord, filter: &StationFilter) -> bool {
    filter.iter().all(|(k, v)| station.get(k) == Some(v))
}

/// Keep only the stations matching `filter`.
pub fn filter_stations(stations: Vec<StationRecord>, filter: &StationFilter) -> Vec<StationRecord> {
    stations
        .into_iter()
        .filter(|s| matches(s, filter))
        .collect()
}
