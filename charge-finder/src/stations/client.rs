//! NREL Alternative Fuel Stations API client.

use tracing::debug;

use crate::domain::LocationInput;

use super::error::StationError;
use super::filter::StationFilter;
use super::record::{StationRecord, StationsResponse, normalize_stations};

/// Default endpoint: stations nearest a location.
const DEFAULT_BASE_URL: &str = "https://developer.nrel.gov/api/alt-fuel-stations/v1/nearest.json";

/// Fuel type sent with every query unless a filter overrides it.
pub const DEFAULT_FUEL_TYPE: &str = "ELEC";

/// Configuration for the station API client.
#[derive(Debug, Clone, PartialEq)]
pub struct StationClientConfig {
    /// API key, sent as the `api_key` query parameter
    pub api_key: String,
    /// Endpoint URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StationClientConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the charging-station directory.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl StationClient {
    /// Create a new station API client.
    pub fn new(config: StationClientConfig) -> Result<Self, StationError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    /// Query parameters for a search.
    ///
    /// Defaults come first (`api_key`, `fuel_type`, then the location).
    /// Filters follow; a filter naming an existing parameter replaces it.
    pub fn query_params(
        &self,
        location: &LocationInput,
        filters: &StationFilter,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("fuel_type".to_string(), DEFAULT_FUEL_TYPE.to_string()),
        ];
        params.extend(location.query_params());

        for (key, value) in filters.query_params() {
            match params.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => params.push((key, value)),
            }
        }

        params
    }

    /// Build the search request without sending it.
    pub fn build_request(
        &self,
        location: &LocationInput,
        filters: &StationFilter,
    ) -> Result<reqwest::Request, StationError> {
        let params = self.query_params(location, filters);
        Ok(self.http.get(&self.base_url).query(&params).build()?)
    }

    /// Fetch the raw station list for a location.
    pub async fn fetch(
        &self,
        location: &LocationInput,
        filters: &StationFilter,
    ) -> Result<StationsResponse, StationError> {
        let request = self.build_request(location, filters)?;
        debug!(%location, filters = filters.len(), "querying station directory");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StationError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StationError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| StationError::Json {
            message: e.to_string(),
        })
    }

    /// Find charging stations near a location.
    ///
    /// Returns normalized records, in the order the API ranked them.
    pub async fn find_stations(
        &self,
        location: &LocationInput,
        filters: &StationFilter,
    ) -> Result<Vec<StationRecord>, StationError> {
        let response = self.fetch(location, filters).await?;
        Ok(normalize_stations(response))
    }
}
