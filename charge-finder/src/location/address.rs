//! Registered device address resolver.
//!
//! Looks up the postal address registered for the device, then converts it
//! to coordinates through a [`Geocoder`].

use std::future::Future;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::Coordinate;

use super::envelope::RequestEnvelope;
use super::error::{LocationError, PlatformError};

/// Postal address registered for a device.
///
/// Every field may be absent; the platform returns `null` for anything the
/// user has not filled in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAddress {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub address_line3: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district_or_county: Option<String>,
    #[serde(default)]
    pub state_or_region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl DeviceAddress {
    /// Single-line address for geocoding: `"{line1}, {state}, {postal_code}"`.
    ///
    /// Returns `None` unless both the first address line and the
    /// state/region are present and non-empty.
    pub fn geocoding_query(&self) -> Option<String> {
        let line1 = non_empty(&self.address_line1)?;
        let state = non_empty(&self.state_or_region)?;
        let postal_code = self.postal_code.as_deref().unwrap_or_default();
        Some(format!("{line1}, {state}, {postal_code}"))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Source of a device's registered address.
///
/// This abstraction allows the resolver to be tested without the platform.
pub trait AddressService {
    /// Fetch the full postal address registered for `device_id`.
    fn get_full_address(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<DeviceAddress, PlatformError>> + Send;
}

/// Converts a free-text address into coordinates.
pub trait Geocoder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Geocode `address`, returning `None` if nothing matches.
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>, Self::Error>> + Send;
}

/// Client for the platform's Device Address API.
///
/// Endpoint and token come from the request envelope; a client built from
/// an envelope without them fails every lookup with
/// [`PlatformError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct DeviceAddressClient {
    http: reqwest::Client,
    api_endpoint: Option<String>,
    access_token: Option<String>,
}

impl DeviceAddressClient {
    /// Create a client for the given API endpoint and access token.
    pub fn new(api_endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_endpoint: Some(api_endpoint.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Create a client using the endpoint and token carried by a request.
    pub fn from_envelope(envelope: &RequestEnvelope) -> Self {
        let system = &envelope.context.system;
        Self {
            http: reqwest::Client::new(),
            api_endpoint: system.api_endpoint.clone(),
            access_token: system.api_access_token.clone(),
        }
    }
}

impl AddressService for DeviceAddressClient {
    async fn get_full_address(&self, device_id: &str) -> Result<DeviceAddress, PlatformError> {
        let endpoint = self
            .api_endpoint
            .as_deref()
            .ok_or(PlatformError::NotConfigured("missing apiEndpoint"))?;
        let token = self
            .access_token
            .as_deref()
            .ok_or(PlatformError::NotConfigured("missing apiAccessToken"))?;

        let url = address_url(endpoint, device_id)?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Service {
                status: status.as_u16(),
                message: body,
            });
        }

        // The API answers 204 when there is nothing on file.
        if status == StatusCode::NO_CONTENT {
            return Ok(DeviceAddress::default());
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlatformError::Json {
            message: e.to_string(),
        })
    }
}

/// `{endpoint}/v1/devices/{device_id}/settings/address`, with the device id
/// percent-encoded as a single path segment.
fn address_url(endpoint: &str, device_id: &str) -> Result<Url, PlatformError> {
    let mut url =
        Url::parse(endpoint).map_err(|_| PlatformError::NotConfigured("invalid apiEndpoint"))?;
    url.path_segments_mut()
        .map_err(|_| PlatformError::NotConfigured("invalid apiEndpoint"))?
        .pop_if_empty()
        .extend(["v1", "devices", device_id, "settings", "address"]);
    Ok(url)
}

/// Resolve the user's coordinates from the device's registered address.
///
/// Returns `Ok(None)` if the platform reports a service fault, the address
/// lacks a street line or state/region, or the geocoder finds no match.
/// Transport and decoding failures are returned as errors.
pub async fn resolve_device_address<A, G>(
    envelope: &RequestEnvelope,
    address_service: &A,
    geocoder: &G,
) -> Result<Option<Coordinate>, LocationError>
where
    A: AddressService,
    G: Geocoder,
{
    let address = match address_service.get_full_address(envelope.device_id()).await {
        Ok(address) => address,
        Err(e) if e.is_service_fault() => {
            debug!(error = %e, "device address service error");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(query) = address.geocoding_query() else {
        debug!("device address not available");
        return Ok(None);
    };

    let coordinate = geocoder
        .geocode(&query)
        .await
        .map_err(|e| LocationError::Geocode(Box::new(e)))?;

    if coordinate.is_none() {
        debug!("device address did not geocode");
    }

    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::Router;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;

    use super::*;
    use crate::test_support::serve;

    fn envelope(api_endpoint: Option<&str>) -> RequestEnvelope {
        let json = serde_json::json!({
            "context": {
                "System": {
                    "device": { "deviceId": "dev-1" },
                    "apiEndpoint": api_endpoint,
                    "apiAccessToken": "token-123"
                }
            },
            "request": { "timestamp": "2024-03-15T12:00:00Z" }
        });
        serde_json::from_value(json).unwrap()
    }

    fn address(line1: Option<&str>, state: Option<&str>, postal: Option<&str>) -> DeviceAddress {
        DeviceAddress {
            address_line1: line1.map(String::from),
            state_or_region: state.map(String::from),
            postal_code: postal.map(String::from),
            ..DeviceAddress::default()
        }
    }

    /// Mock address service returning a canned result.
    struct MockAddresses {
        result: Mutex<Option<Result<DeviceAddress, PlatformError>>>,
        requested: Mutex<Vec<String>>,
    }

    impl MockAddresses {
        fn new(result: Result<DeviceAddress, PlatformError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl AddressService for MockAddresses {
        async fn get_full_address(&self, device_id: &str) -> Result<DeviceAddress, PlatformError> {
            self.requested.lock().unwrap().push(device_id.to_string());
            self.result.lock().unwrap().take().unwrap()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("geocoder down")]
    struct GeocoderDown;

    /// Mock geocoder recording queries.
    struct MockGeocoder {
        answer: Option<Coordinate>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl MockGeocoder {
        fn answering(answer: Option<Coordinate>) -> Self {
            Self {
                answer,
                fail: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                fail: true,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl Geocoder for MockGeocoder {
        type Error = GeocoderDown;

        async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocoderDown> {
            self.queries.lock().unwrap().push(address.to_string());
            if self.fail {
                return Err(GeocoderDown);
            }
            Ok(self.answer)
        }
    }

    #[test]
    fn geocoding_query_format() {
        let addr = address(Some("410 Terry Ave N"), Some("WA"), Some("98109"));
        assert_eq!(
            addr.geocoding_query().as_deref(),
            Some("410 Terry Ave N, WA, 98109")
        );

        let addr = address(Some("410 Terry Ave N"), Some("WA"), None);
        assert_eq!(
            addr.geocoding_query().as_deref(),
            Some("410 Terry Ave N, WA, ")
        );
    }

    #[test]
    fn geocoding_query_requires_line1_and_state() {
        assert!(address(Some("410 Terry Ave N"), None, Some("98109")).geocoding_query().is_none());
        assert!(address(None, Some("WA"), Some("98109")).geocoding_query().is_none());
        assert!(address(Some("  "), Some("WA"), None).geocoding_query().is_none());
    }

    #[test]
    fn parse_address_json() {
        let json = r#"{
            "stateOrRegion": "WA",
            "city": "Seattle",
            "countryCode": "US",
            "postalCode": "98109",
            "addressLine1": "410 Terry Ave North",
            "addressLine2": null,
            "addressLine3": "",
            "districtOrCounty": ""
        }"#;
        let addr: DeviceAddress = serde_json::from_str(json).unwrap();
        assert_eq!(addr.address_line1.as_deref(), Some("410 Terry Ave North"));
        assert_eq!(addr.address_line2, None);
        assert_eq!(addr.city.as_deref(), Some("Seattle"));
        assert_eq!(addr.country_code.as_deref(), Some("US"));
    }

    #[tokio::test]
    async fn resolves_through_geocoder() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Ok(address(
            Some("1617 Cole Blvd"),
            Some("CO"),
            Some("80401"),
        )));
        let geocoder = MockGeocoder::answering(Some(Coordinate::new(39.74, -105.17)));

        let result = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap();

        assert_eq!(result, Some(Coordinate::new(39.74, -105.17)));
        assert_eq!(*addresses.requested.lock().unwrap(), vec!["dev-1"]);
        assert_eq!(geocoder.queries(), vec!["1617 Cole Blvd, CO, 80401"]);
    }

    #[tokio::test]
    async fn missing_state_is_unavailable() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Ok(address(Some("1617 Cole Blvd"), None, Some("80401"))));
        let geocoder = MockGeocoder::answering(Some(Coordinate::new(39.74, -105.17)));

        let result = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test]
    async fn service_fault_is_unavailable() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Err(PlatformError::Service {
            status: 403,
            message: "ACCESS_DENIED".into(),
        }));
        let geocoder = MockGeocoder::answering(None);

        let result = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn unexpected_fault_propagates() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Err(PlatformError::Json {
            message: "truncated".into(),
        }));
        let geocoder = MockGeocoder::answering(None);

        let err = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::Platform(PlatformError::Json { .. })));
    }

    #[tokio::test]
    async fn geocoder_failure_propagates() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Ok(address(Some("1617 Cole Blvd"), Some("CO"), None)));
        let geocoder = MockGeocoder::failing();

        let err = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "geocoding failed: geocoder down");
    }

    #[tokio::test]
    async fn no_geocode_match_is_unavailable() {
        let env = envelope(None);
        let addresses = MockAddresses::new(Ok(address(Some("nowhere"), Some("ZZ"), None)));
        let geocoder = MockGeocoder::answering(None);

        let result = resolve_device_address(&env, &addresses, &geocoder)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    async fn address_handler(Path(device_id): Path<String>, headers: HeaderMap) -> Response {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer token-123");
        if !authorized {
            return (AxumStatus::FORBIDDEN, "ACCESS_DENIED").into_response();
        }
        if device_id != "dev-1" {
            return (AxumStatus::NOT_FOUND, "unknown device").into_response();
        }
        axum::Json(serde_json::json!({
            "addressLine1": "1617 Cole Blvd",
            "stateOrRegion": "CO",
            "postalCode": "80401",
            "city": "Golden"
        }))
        .into_response()
    }

    fn address_router() -> Router {
        Router::new().route("/v1/devices/:device_id/settings/address", get(address_handler))
    }

    #[tokio::test]
    async fn client_fetches_address() {
        let base = serve(address_router()).await;
        let client = DeviceAddressClient::new(format!("{base}/"), "token-123");

        let addr = client.get_full_address("dev-1").await.unwrap();
        assert_eq!(addr.address_line1.as_deref(), Some("1617 Cole Blvd"));
        assert_eq!(addr.state_or_region.as_deref(), Some("CO"));
        assert_eq!(addr.city.as_deref(), Some("Golden"));
    }

    #[test]
    fn address_url_encodes_device_id() {
        let url = address_url("https://api.amazonalexa.com", "amzn1.ask.device.ABC").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.amazonalexa.com/v1/devices/amzn1.ask.device.ABC/settings/address"
        );

        let url = address_url("https://api.example.com/base/", "dev/1?x#y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/base/v1/devices/dev%2F1%3Fx%23y/settings/address"
        );
        assert!(url.query().is_none());
    }

    #[test]
    fn address_url_rejects_bad_endpoint() {
        let err = address_url("not a url", "dev-1").unwrap_err();
        assert!(matches!(err, PlatformError::NotConfigured("invalid apiEndpoint")));
        assert!(err.is_service_fault());
    }

    #[tokio::test]
    async fn client_sends_device_id_as_one_segment() {
        async fn echo(Path(device_id): Path<String>) -> axum::Json<serde_json::Value> {
            axum::Json(serde_json::json!({ "addressLine1": device_id }))
        }
        let router =
            Router::new().route("/v1/devices/:device_id/settings/address", get(echo));
        let base = serve(router).await;
        let client = DeviceAddressClient::new(base, "token-123");

        let addr = client.get_full_address("dev/1?x").await.unwrap();
        assert_eq!(addr.address_line1.as_deref(), Some("dev/1?x"));
    }

    #[tokio::test]
    async fn client_reports_service_fault() {
        let base = serve(address_router()).await;
        let client = DeviceAddressClient::new(base, "wrong-token");

        let err = client.get_full_address("dev-1").await.unwrap_err();
        assert!(err.is_service_fault());
        assert!(matches!(err, PlatformError::Service { status: 403, .. }));
    }

    #[tokio::test]
    async fn client_from_envelope_without_endpoint() {
        let client = DeviceAddressClient::from_envelope(&envelope(None));

        let err = client.get_full_address("dev-1").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotConfigured("missing apiEndpoint")));
    }

    #[tokio::test]
    async fn end_to_end_with_envelope_client() {
        let base = serve(address_router()).await;
        let env = envelope(Some(base.as_str()));
        let client = DeviceAddressClient::from_envelope(&env);
        let geocoder = MockGeocoder::answering(Some(Coordinate::new(39.74, -105.17)));

        let result = resolve_device_address(&env, &client, &geocoder)
            .await
            .unwrap();

        assert_eq!(result, Some(Coordinate::new(39.74, -105.17)));
        assert_eq!(geocoder.queries(), vec!["1617 Cole Blvd, CO, 80401"]);
    }
}
