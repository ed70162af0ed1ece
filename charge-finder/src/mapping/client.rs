//! HERE routing and geocoding client.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Coordinate, LocationInput};
use crate::location::Geocoder;

use super::error::MappingError;
use super::types::{GeocodeResponse, RouteInfo};

/// Default routing endpoint.
const DEFAULT_ROUTE_URL: &str = "https://route.api.here.com/routing/7.2/calculateroute.json";

/// Default geocoding endpoint.
const DEFAULT_GEOCODE_URL: &str = "https://geocoder.api.here.com/6.2/geocode.json";

/// Fastest driving route, ignoring live traffic.
pub const ROUTE_MODE: &str = "fastest;car;traffic:disabled";

/// Configuration for the mapping client.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Application ID
    pub app_id: String,
    /// Application code
    pub app_code: String,
    /// Routing endpoint URL
    pub route_url: String,
    /// Geocoding endpoint URL
    pub geocode_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MappingConfig {
    /// Create a new config with the given app credentials.
    pub fn new(app_id: impl Into<String>, app_code: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_code: app_code.into(),
            route_url: DEFAULT_ROUTE_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom routing URL (for testing).
    pub fn with_route_url(mut self, url: impl Into<String>) -> Self {
        self.route_url = url.into();
        self
    }

    /// Set a custom geocoding URL (for testing).
    pub fn with_geocode_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Format a coordinate as a routing waypoint: `geo!{lat},{lon}`.
pub fn waypoint(point: Coordinate) -> String {
    format!("geo!{},{}", point.latitude_param(), point.longitude_param())
}

/// Client for the HERE routing and geocoding APIs.
#[derive(Debug, Clone)]
pub struct MappingClient {
    http: reqwest::Client,
    route_url: String,
    geocode_url: String,
    app_id: String,
    app_code: String,
}

impl MappingClient {
    /// Create a new mapping client.
    pub fn new(config: MappingConfig) -> Result<Self, MappingError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            route_url: config.route_url,
            geocode_url: config.geocode_url,
            app_id: config.app_id,
            app_code: config.app_code,
        })
    }

    fn credentials(&self) -> Vec<(String, String)> {
        vec![
            ("app_id".to_string(), self.app_id.clone()),
            ("app_code".to_string(), self.app_code.clone()),
        ]
    }

    /// Query parameters for a route between two points.
    ///
    /// `origin` is the user's location as originally supplied: coordinates
    /// add `latitude`/`longitude`, free text adds `location`.
    pub fn route_params(
        &self,
        point_a: Coordinate,
        point_b: Coordinate,
        origin: &LocationInput,
    ) -> Vec<(String, String)> {
        let mut params = self.credentials();
        params.push(("mode".to_string(), ROUTE_MODE.to_string()));
        params.push(("waypoint0".to_string(), waypoint(point_a)));
        params.push(("waypoint1".to_string(), waypoint(point_b)));
        params.extend(origin.query_params());
        params
    }

    /// Build the routing request without sending it.
    pub fn build_route_request(
        &self,
        point_a: Coordinate,
        point_b: Coordinate,
        origin: &LocationInput,
    ) -> Result<reqwest::Request, MappingError> {
        let params = self.route_params(point_a, point_b, origin);
        Ok(self.http.get(&self.route_url).query(&params).build()?)
    }

    /// Route information between two points.
    ///
    /// The response body is returned unmodified.
    pub async fn estimate_distance(
        &self,
        point_a: Coordinate,
        point_b: Coordinate,
        origin: &LocationInput,
    ) -> Result<RouteInfo, MappingError> {
        let request = self.build_route_request(point_a, point_b, origin)?;
        debug!(from = %point_a, to = %point_b, "requesting route");
        self.send(request).await.map(RouteInfo::new)
    }

    /// Build the geocoding request without sending it.
    pub fn build_geocode_request(&self, address: &str) -> Result<reqwest::Request, MappingError> {
        let mut params = self.credentials();
        params.push(("searchtext".to_string(), address.to_string()));
        Ok(self.http.get(&self.geocode_url).query(&params).build()?)
    }

    /// Convert an address to coordinates.
    ///
    /// Returns `None` if the geocoder has no match.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, MappingError> {
        let request = self.build_geocode_request(address)?;
        debug!("geocoding address");
        let response: GeocodeResponse = self.send(request).await?;
        Ok(response.best_match())
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T, MappingError> {
        let response = self.http.execute(request).await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(MappingError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MappingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MappingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MappingError::Json {
            message: e.to_string(),
        })
    }
}

impl Geocoder for MappingClient {
    type Error = MappingError;

    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, MappingError> {
        MappingClient::geocode(self, address).await
    }
}
